//! Entry enrichment: turns a raw [`FeedEntry`] into a display-ready
//! [`NormalizedEntry`].
//!
//! Every sub-step here is best-effort and the whole function is
//! contractually infallible: missing upstream fields get defaults
//! ("Unknown Title", "Unknown Channel", "0", empty string) and the
//! channel-icon scrape falls back to a fixed default on any failure.
use crate::feed::FeedEntry;
use futures::StreamExt;
use std::time::Duration;

/// Shown when the channel page scrape cannot produce a real icon.
const DEFAULT_CHANNEL_ICON: &str =
    "https://upload.wikimedia.org/wikipedia/commons/e/ef/Youtube_logo.png";

/// YouTube serves a consent interstitial to clients without a browser UA.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_PAGE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Enriched, display-ready record for one new entry. Built at notification
/// time, never persisted. Unknown string fields are empty rather than
/// absent so the payload renderer has no optionality to deal with.
#[derive(Debug, Clone)]
pub struct NormalizedEntry {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub published: String,
    pub updated: String,
    pub channel_name: String,
    pub channel_id: String,
    pub channel_url: String,
    pub channel_icon_url: String,
    pub description: String,
    /// Optional transcript summary; empty unless a separate enrichment
    /// fills it in.
    pub summary: String,
    pub thumbnail_maxres: String,
    pub thumbnail_hq: String,
    /// Raw count strings; magnitude formatting happens at render time.
    pub views: String,
    pub likes: String,
}

/// Build a [`NormalizedEntry`] from a raw feed entry. Never fails.
///
/// `channel_base_url` overrides the channel-page host for the icon scrape
/// (tests point it at a local mock server); `None` means youtube.com.
pub async fn enrich(
    client: &reqwest::Client,
    entry: &FeedEntry,
    channel_base_url: Option<&str>,
) -> NormalizedEntry {
    // "yt:video:abc123" -> "abc123"; ids without a colon pass through.
    let video_id = entry.id.rsplit(':').next().unwrap_or("").to_string();

    let channel_id = entry.channel_id.clone().unwrap_or_default();
    let channel_url = if channel_id.is_empty() {
        entry.author_uri.clone().unwrap_or_default()
    } else {
        format!("https://www.youtube.com/channel/{}", channel_id)
    };

    let channel_icon_url = fetch_channel_icon(client, &channel_id, channel_base_url).await;

    let (thumbnail_maxres, thumbnail_hq) = if video_id.is_empty() {
        // No id to template from; reuse whatever the feed provided.
        let fallback = entry.thumbnail_url.clone().unwrap_or_default();
        (fallback.clone(), fallback)
    } else {
        (
            format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id),
            format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id),
        )
    };

    NormalizedEntry {
        video_id,
        title: entry
            .title
            .clone()
            .unwrap_or_else(|| "Unknown Title".to_string()),
        url: entry.link.clone(),
        published: entry.published.clone().unwrap_or_default(),
        updated: entry.updated.clone().unwrap_or_default(),
        channel_name: entry
            .author_name
            .clone()
            .unwrap_or_else(|| "Unknown Channel".to_string()),
        channel_id,
        channel_url,
        channel_icon_url,
        description: entry.media_description.clone().unwrap_or_default(),
        summary: String::new(),
        thumbnail_maxres,
        thumbnail_hq,
        views: entry.views.clone().unwrap_or_else(|| "0".to_string()),
        likes: entry.likes.clone().unwrap_or_else(|| "0".to_string()),
    }
}

/// Scrape the channel page's `og:image` social-preview URL.
///
/// Best-effort and unconditionally returns a value: any network failure,
/// timeout, non-200 status, oversized body, or missing tag yields the
/// fixed default icon.
async fn fetch_channel_icon(
    client: &reqwest::Client,
    channel_id: &str,
    base_url: Option<&str>,
) -> String {
    if channel_id.is_empty() {
        return DEFAULT_CHANNEL_ICON.to_string();
    }

    let base = base_url.unwrap_or("https://www.youtube.com");
    let url = format!("{}/channel/{}", base, channel_id);

    match scrape_og_image(client, &url).await {
        Some(icon) => icon,
        None => {
            tracing::debug!(channel_id = %channel_id, "Channel icon scrape fell back to default");
            DEFAULT_CHANNEL_ICON.to_string()
        }
    }
}

async fn scrape_og_image(client: &reqwest::Client, url: &str) -> Option<String> {
    let response = tokio::time::timeout(
        SCRAPE_TIMEOUT,
        client
            .get(url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send(),
    )
    .await
    .ok()?
    .ok()?;

    if !response.status().is_success() {
        tracing::debug!(url = %url, status = %response.status(), "Channel page returned non-success status");
        return None;
    }

    let html = read_limited_text(response, MAX_PAGE_SIZE).await?;
    extract_og_image(&html)
}

async fn read_limited_text(response: reqwest::Response, limit: usize) -> Option<String> {
    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.ok()?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return None;
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).ok()
}

/// Extract the content of a `<meta property="og:image" content="...">`
/// tag. Tolerates either attribute order, either quote style, and a
/// `name=` variant of the property attribute.
fn extract_og_image(html: &str) -> Option<String> {
    let mut rest = html;
    while let Some(start) = rest.find("<meta") {
        let tag_start = &rest[start..];
        let end = tag_start.find('>')?;
        let tag = &tag_start[..end];

        let is_og_image = attr_value(tag, "property").as_deref() == Some("og:image")
            || attr_value(tag, "name").as_deref() == Some("og:image");
        if is_og_image {
            if let Some(content) = attr_value(tag, "content").filter(|c| !c.is_empty()) {
                return Some(content);
            }
        }

        rest = &tag_start[end..];
    }
    None
}

/// Find a quoted HTML attribute value within a single tag.
fn attr_value(tag: &str, name: &str) -> Option<String> {
    let mut search = tag;
    loop {
        let idx = search.find(name)?;
        let at_word_boundary = idx == 0 || search.as_bytes()[idx - 1].is_ascii_whitespace();
        let after = &search[idx + name.len()..];

        if at_word_boundary {
            if let Some(rest) = after.trim_start().strip_prefix('=') {
                let rest = rest.trim_start();
                let quote = rest.chars().next()?;
                if quote == '"' || quote == '\'' {
                    let inner = &rest[1..];
                    let close = inner.find(quote)?;
                    return Some(inner[..close].to_string());
                }
                return None;
            }
        }

        search = after;
    }
}
