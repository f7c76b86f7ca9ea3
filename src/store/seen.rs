//! Seen-set store: a single JSON file holding the identifiers of entries
//! that have already been notified, as a flat array of strings.
//!
//! Reads are fail-open: a missing, unreadable, or malformed file loads as
//! an empty set rather than an error. The policy here is availability over
//! strict correctness — an occasional duplicate notification beats a
//! crashed run. Writes are atomic (write-temp-then-rename) so the prior
//! content is never left partially overwritten.
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write state file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Handle to the persisted seen-set file.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and, if the state file is absent, seed
    /// it with an empty array. Existing content is left untouched.
    pub fn init(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if !self.path.exists() {
            write_atomic(&self.path, b"[]")?;
            tracing::info!(path = %self.path.display(), "Initialized new state file");
        }
        Ok(())
    }

    /// Load the persisted set.
    ///
    /// Never fails: a missing file, an unreadable file, or a root value
    /// that is not a JSON array (including the legacy `{}` bootstrap
    /// object) all yield an empty set. The condition is logged so an
    /// operator can tell a fresh start from a corrupted file.
    pub fn load(&self) -> HashSet<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No state file, starting empty");
                return HashSet::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable state file, starting empty");
                return HashSet::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "State file is not a JSON string array, starting empty"
                );
                HashSet::new()
            }
        }
    }

    /// Persist the set, replacing the file atomically. Ordering within the
    /// file is unspecified — membership is all that matters.
    pub fn save(&self, seen: &HashSet<String>) -> Result<(), StoreError> {
        let ids: Vec<&String> = seen.iter().collect();
        let json = serde_json::to_string_pretty(&ids)?;
        write_atomic(&self.path, json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), count = seen.len(), "Saved state file");
        Ok(())
    }

    /// Unconditionally reset the persisted state to an empty array.
    pub fn clear(&self) -> Result<(), StoreError> {
        write_atomic(&self.path, b"[]")?;
        tracing::info!(path = %self.path.display(), "Cleared state file");
        Ok(())
    }
}

/// Atomically replace `dst` using the write-temp-then-rename pattern.
/// The randomized temp filename prevents TOCTOU races: an attacker cannot
/// predict the path and plant a symlink before `create_new` runs.
fn write_atomic(dst: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true) // Fails atomically if file exists (prevents symlink race)
        .open(&temp_path)?;

    if let Err(e) = temp_file
        .write_all(content)
        .and_then(|_| temp_file.sync_all())
    {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    // Drop the file handle before rename
    drop(temp_file);

    // POSIX guarantees atomicity for rename on the same filesystem.
    // On Windows, rename fails if the destination exists, so remove it first.
    #[cfg(windows)]
    if dst.exists() {
        if let Err(e) = std::fs::remove_file(dst) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }
    }

    if let Err(e) = std::fs::rename(&temp_path, dst) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(())
}
