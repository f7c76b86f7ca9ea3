//! Single-pass run orchestration.
//!
//! One invocation: load state, fetch the feed, detect new entries, enrich
//! and notify each in oldest-first order, persist the updated state.
//! Repeated polling is driven by an external scheduler invoking the
//! process again; there is no loop here.
//!
//! Known limitation: concurrent invocations against the same state file
//! are not coordinated — the process model is single-invocation,
//! single-process, and an external lock would be needed otherwise.
use crate::config::Config;
use crate::enrich;
use crate::feed;
use crate::notify;
use crate::novelty;
use crate::store::SeenStore;
use anyhow::Result;
use chrono::Utc;

/// Command-line switches affecting a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// First-run bootstrap: mark everything currently in the feed as seen
    /// instead of flooding the webhook with historical entries.
    pub skip_existing: bool,
    /// Reset the persisted seen set before loading it.
    pub clear: bool,
}

/// Execute one poll-notify-persist pass.
pub async fn run_once(
    config: &Config,
    client: &reqwest::Client,
    options: RunOptions,
) -> Result<()> {
    run_with_channel_base(config, client, options, None).await
}

/// Like [`run_once`], with the channel-page host overridable so tests can
/// point the icon scrape at a mock server.
pub async fn run_with_channel_base(
    config: &Config,
    client: &reqwest::Client,
    options: RunOptions,
    channel_base_url: Option<&str>,
) -> Result<()> {
    let store = SeenStore::new(&config.data_file);
    if let Err(e) = store.init() {
        // Persistence is fail-open: keep going, the save at the end will
        // report its own failure if the path is truly unusable.
        tracing::warn!(path = %store.path().display(), error = %e, "Failed to initialize state file");
    }

    if options.clear {
        match store.clear() {
            Ok(()) => {}
            Err(e) => {
                tracing::error!(path = %store.path().display(), error = %e, "Failed to clear state file")
            }
        }
    }

    let mut seen = store.load();

    let entries = match feed::fetch_feed(client, config.rss_feed_url.as_str()).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(feed = %config.rss_feed_url, error = %e, "Feed fetch failed, next poll will retry");
            return Ok(());
        }
    };

    if seen.is_empty() && options.skip_existing {
        let seeded = novelty::seed_all(&entries, &mut seen);
        if let Err(e) = store.save(&seen) {
            tracing::error!(error = %e, "Failed to save state file");
        }
        tracing::info!(seeded = seeded, "Initialized, skipped existing feed items as seen");
    }

    let new_entries = novelty::detect_new(entries, &mut seen);
    if new_entries.is_empty() {
        tracing::debug!("No new feed items");
        return Ok(());
    }
    tracing::info!(count = new_entries.len(), "New feed items found");

    for entry in &new_entries {
        let id = entry.identifier().to_string();
        let normalized = enrich::enrich(client, entry, channel_base_url).await;
        let payload = notify::build_payload(&normalized, Utc::now());

        tracing::info!(id = %id, title = %normalized.title, "Notifying new feed item");
        if let Err(e) = notify::deliver(client, config, &payload).await {
            tracing::error!(id = %id, error = %e, "Webhook delivery failed");
            if !config.mark_seen_on_failure {
                seen.remove(&id);
            }
        }

        // Pacing courtesy toward the receiving endpoint.
        tokio::time::sleep(config.send_delay).await;
    }

    // Persist only when the pass actually found something; an unchanged
    // set is not worth a write.
    if let Err(e) = store.save(&seen) {
        tracing::error!(error = %e, "Failed to save state file");
    }

    Ok(())
}
