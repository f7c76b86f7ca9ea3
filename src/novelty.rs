//! New-item detection against the persisted seen set.
//!
//! Feeds conventionally list newest-first and make no ordering guarantee,
//! so detection walks the snapshot in reverse of its native order to
//! produce oldest-first notification order. Both functions mutate the
//! in-memory set only; persisting it is the orchestrator's job.
use crate::feed::FeedEntry;
use std::collections::HashSet;

/// Select the entries not yet in `seen`, oldest-of-the-new first.
///
/// Each new entry's identifier is inserted into `seen` immediately, so a
/// duplicate identifier later in the same batch is not notified twice.
pub fn detect_new(entries: Vec<FeedEntry>, seen: &mut HashSet<String>) -> Vec<FeedEntry> {
    let mut new_entries = Vec::new();
    for entry in entries.into_iter().rev() {
        let id = entry.identifier();
        if seen.contains(id) {
            continue;
        }
        seen.insert(id.to_string());
        new_entries.push(entry);
    }
    new_entries
}

/// First-run bootstrap: mark every entry in the current snapshot as seen
/// without notifying. Returns how many identifiers were added.
pub fn seed_all(entries: &[FeedEntry], seen: &mut HashSet<String>) -> usize {
    let before = seen.len();
    for entry in entries {
        seen.insert(entry.identifier().to_string());
    }
    seen.len() - before
}
