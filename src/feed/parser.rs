use anyhow::Result;
use feed_rs::parser;

/// One item from the source feed, flattened to the fields the notifier
/// consumes. Every field except `id` and `link` is optional — absence of
/// any of them is normal, not an error.
///
/// Timestamps are kept as RFC 3339 strings; nothing downstream parses
/// them, they only pass through to display.
#[derive(Debug, Clone, Default)]
pub struct FeedEntry {
    /// Native entry id (e.g. `yt:video:abc123`). May be empty.
    pub id: String,
    /// Entry link URL. May be empty for a degenerate entry.
    pub link: String,
    pub title: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub author_name: Option<String>,
    pub author_uri: Option<String>,
    pub media_description: Option<String>,
    /// View count as reported by `media:statistics`, as a raw string.
    pub views: Option<String>,
    /// Rating count from `media:starRating`, as a raw string.
    pub likes: Option<String>,
    /// First feed-provided thumbnail URL.
    pub thumbnail_url: Option<String>,
    /// Channel id, when the feed-level id carries the `yt:channel:` prefix.
    pub channel_id: Option<String>,
}

impl FeedEntry {
    /// Stable unique identifier for novelty detection: the native entry id
    /// when present, otherwise the link. Identical items resolve to the
    /// same identifier across polls. Always succeeds; a degenerate entry
    /// with neither field yields an empty identifier.
    pub fn identifier(&self) -> &str {
        if self.id.is_empty() {
            &self.link
        } else {
            &self.id
        }
    }
}

/// Parse a feed document into entries in the feed's native order
/// (conventionally newest-first; the caller must not assume otherwise).
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = parser::parse(bytes)?;

    // YouTube channel feeds carry the channel id at the feed level.
    let channel_id = feed
        .id
        .strip_prefix("yt:channel:")
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let author = entry.authors.first();

            // YouTube puts entry metadata in a single media:group.
            let media = entry.media.first();
            let community = media.and_then(|m| m.community.as_ref());

            FeedEntry {
                id: entry.id.clone(),
                link,
                title: entry.title.as_ref().map(|t| t.content.clone()),
                published: entry.published.map(|dt| dt.to_rfc3339()),
                updated: entry.updated.map(|dt| dt.to_rfc3339()),
                author_name: author.map(|a| a.name.clone()),
                author_uri: author.and_then(|a| a.uri.clone()),
                media_description: media
                    .and_then(|m| m.description.as_ref())
                    .map(|d| d.content.clone()),
                views: community
                    .and_then(|c| c.stats_views)
                    .map(|v| v.to_string()),
                likes: community
                    .and_then(|c| c.stars_count)
                    .map(|v| v.to_string()),
                thumbnail_url: media
                    .and_then(|m| m.thumbnails.first())
                    .map(|t| t.image.uri.clone()),
                channel_id: channel_id.clone(),
            }
        })
        .collect();

    Ok(entries)
}
