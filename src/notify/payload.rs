use crate::enrich::NormalizedEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SENDER_USERNAME: &str = "YouTube Notifications";
const SENDER_AVATAR_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/0/09/\
     YouTube_full-color_icon_%282017%29.svg/512px-YouTube_full-color_icon_%282017%29.svg.png";
const EMBED_COLOR: u32 = 0xFF0000;
const FOOTER_TEXT: &str = "YouTube Playlist Monitor";
const DEFAULT_DESCRIPTION: &str = "No summary available.";

// Wire shapes for the Discord webhook API. Deserialize is derived as well
// so tests can decode what the mock endpoint received.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub username: String,
    pub avatar_url: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub description: String,
    pub color: u32,
    /// ISO-8601 UTC timestamp of *send* time, not publish time.
    pub timestamp: String,
    pub image: EmbedImage,
    pub author: EmbedAuthor,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Format a raw count string YouTube-style: `1.5K`, `2.3M`, `1.0B`.
/// Values below 1000 render as plain integers; anything unparseable is
/// `N/A`.
pub fn format_count(raw: &str) -> String {
    let Ok(n) = raw.trim().parse::<i64>() else {
        return "N/A".to_string();
    };
    let f = n as f64;
    if n >= 1_000_000_000 {
        format!("{:.1}B", f / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.1}M", f / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}K", f / 1e3)
    } else {
        n.to_string()
    }
}

/// Render the outbound payload for one entry. `sent_at` is injected
/// rather than read from the clock so tests can pin it.
pub fn build_payload(entry: &NormalizedEntry, sent_at: DateTime<Utc>) -> WebhookPayload {
    let description = if entry.summary.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        entry.summary.clone()
    };

    WebhookPayload {
        username: SENDER_USERNAME.to_string(),
        avatar_url: SENDER_AVATAR_URL.to_string(),
        embeds: vec![Embed {
            title: entry.title.clone(),
            url: entry.url.clone(),
            description,
            color: EMBED_COLOR,
            timestamp: sent_at.to_rfc3339(),
            image: EmbedImage {
                url: entry.thumbnail_maxres.clone(),
            },
            author: EmbedAuthor {
                name: entry.channel_name.clone(),
                url: entry.channel_url.clone(),
                icon_url: entry.channel_icon_url.clone(),
            },
            fields: vec![
                EmbedField {
                    name: "Views".to_string(),
                    value: format_count(&entry.views),
                    inline: true,
                },
                EmbedField {
                    name: "Likes 👍".to_string(),
                    value: format_count(&entry.likes),
                    inline: true,
                },
            ],
            footer: EmbedFooter {
                text: FOOTER_TEXT.to_string(),
            },
        }],
    }
}
