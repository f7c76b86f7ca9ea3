//! Environment-sourced configuration, validated once at startup.
//!
//! All settings come from environment variables (`ENV`, `WEBHOOK_URL`,
//! `RSS_FEED_URL`, ...). A value equal to the case-insensitive string
//! `"default"` is treated as unset and falls back to its default.
//! Validation failures are fatal: the binary reports them once and exits
//! with status 1 before doing any other work.
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Execution environment. `Dev` short-circuits webhook delivery to a
/// local log line; `Prod` performs the real POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Dev,
    Prod,
}

impl Env {
    pub fn is_dev(self) -> bool {
        matches!(self, Env::Dev)
    }
}

/// Application configuration, constructed at process start and passed by
/// parameter to every component. There is no ambient global.
///
/// Custom Debug impl masks `webhook_url` — Discord webhook URLs embed a
/// bearer-equivalent token, so they must never reach logs or error output.
#[derive(Clone)]
pub struct Config {
    /// Execution environment (`ENV`): dev or prod.
    pub env: Env,

    /// Webhook endpoint (`WEBHOOK_URL`). Held as a secret; exposed only at
    /// the point of the POST.
    pub webhook_url: SecretString,

    /// Feed to poll (`RSS_FEED_URL`).
    pub rss_feed_url: Url,

    /// Poll interval in seconds (`CHECK_INTERVAL`, >= 30). Reserved for an
    /// external scheduler; the single-pass core does not use it.
    pub check_interval: u64,

    /// Seen-set state file (`DATA_FILE`).
    pub data_file: PathBuf,

    /// Pacing delay between webhook sends (`SEND_DELAY_MS`). A courtesy to
    /// the receiving endpoint, not a correctness requirement.
    pub send_delay: Duration,

    /// Whether a failed delivery still commits the entry's identifier to
    /// the seen set (`MARK_SEEN_ON_FAILURE`). When false, the next poll
    /// retries the entry.
    pub mark_seen_on_failure: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("env", &self.env)
            .field("webhook_url", &"[REDACTED]")
            .field("rss_feed_url", &self.rss_feed_url.as_str())
            .field("check_interval", &self.check_interval)
            .field("data_file", &self.data_file)
            .field("send_delay", &self.send_delay)
            .field("mark_seen_on_failure", &self.mark_seen_on_failure)
            .finish()
    }
}

impl Config {
    pub const DEFAULT_CHECK_INTERVAL: u64 = 60;
    pub const MIN_CHECK_INTERVAL: u64 = 30;
    pub const DEFAULT_DATA_FILE: &'static str = "cache/data.json";
    pub const DEFAULT_SEND_DELAY_MS: u64 = 1000;

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of key/value pairs.
    ///
    /// Factored out so tests can construct configurations without touching
    /// the (process-global, race-prone) environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        // A literal "default" (any case, surrounding whitespace ignored)
        // means "unset" — drop it before lookup so defaults apply.
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(_, v)| !v.trim().eq_ignore_ascii_case("default"))
            .collect();

        let env = match required(&vars, "ENV")?.trim() {
            "dev" => Env::Dev,
            "prod" => Env::Prod,
            other => {
                return Err(ConfigError::Invalid {
                    key: "ENV",
                    reason: format!("expected \"dev\" or \"prod\", got \"{}\"", other),
                })
            }
        };

        let webhook_url = parse_http_url("WEBHOOK_URL", required(&vars, "WEBHOOK_URL")?)?;
        let rss_feed_url = parse_http_url("RSS_FEED_URL", required(&vars, "RSS_FEED_URL")?)?;

        let check_interval = match vars.get("CHECK_INTERVAL") {
            Some(raw) => {
                let n = parse_u64("CHECK_INTERVAL", raw)?;
                if n < Self::MIN_CHECK_INTERVAL {
                    return Err(ConfigError::Invalid {
                        key: "CHECK_INTERVAL",
                        reason: format!("must be >= {}, got {}", Self::MIN_CHECK_INTERVAL, n),
                    });
                }
                n
            }
            None => Self::DEFAULT_CHECK_INTERVAL,
        };

        let data_file = vars
            .get("DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_DATA_FILE));

        let send_delay = Duration::from_millis(match vars.get("SEND_DELAY_MS") {
            Some(raw) => parse_u64("SEND_DELAY_MS", raw)?,
            None => Self::DEFAULT_SEND_DELAY_MS,
        });

        let mark_seen_on_failure = match vars.get("MARK_SEEN_ON_FAILURE") {
            Some(raw) => parse_bool("MARK_SEEN_ON_FAILURE", raw)?,
            None => true,
        };

        Ok(Config {
            env,
            webhook_url: SecretString::from(webhook_url.to_string()),
            rss_feed_url,
            check_interval,
            data_file,
            send_delay,
            mark_seen_on_failure,
        })
    }

    /// The webhook endpoint as a string slice, for the delivery POST.
    pub fn webhook_endpoint(&self) -> &str {
        self.webhook_url.expose_secret()
    }
}

fn required<'a>(
    vars: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    match vars.get(key).map(String::as_str) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parse_http_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("expected an http(s) URL, got scheme \"{}\"", url.scheme()),
        });
    }
    Ok(url)
}

fn parse_u64(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        reason: format!("expected an integer, got \"{}\"", raw),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got \"{}\"", raw),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vars() -> Vec<(String, String)> {
        vec![
            ("ENV".into(), "prod".into()),
            (
                "WEBHOOK_URL".into(),
                "https://discord.com/api/webhooks/1/abc".into(),
            ),
            (
                "RSS_FEED_URL".into(),
                "https://www.youtube.com/feeds/videos.xml?channel_id=UC123".into(),
            ),
        ]
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_vars(base_vars()).unwrap();
        assert_eq!(config.env, Env::Prod);
        assert_eq!(config.check_interval, 60);
        assert_eq!(config.data_file, PathBuf::from("cache/data.json"));
        assert_eq!(config.send_delay, Duration::from_millis(1000));
        assert!(config.mark_seen_on_failure);
    }

    #[test]
    fn test_missing_webhook_url_fails() {
        let vars = vec![
            ("ENV".to_string(), "dev".to_string()),
            (
                "RSS_FEED_URL".to_string(),
                "https://example.com/feed".to_string(),
            ),
        ];
        let err = Config::from_vars(vars).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("WEBHOOK_URL")));
    }

    #[test]
    fn test_invalid_env_rejected() {
        let mut vars = base_vars();
        vars[0].1 = "staging".into();
        let err = Config::from_vars(vars).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ENV", .. }));
    }

    #[test]
    fn test_non_http_url_rejected() {
        let mut vars = base_vars();
        vars[1].1 = "ftp://example.com/hook".into();
        let err = Config::from_vars(vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "WEBHOOK_URL",
                ..
            }
        ));
    }

    #[test]
    fn test_default_sentinel_means_unset() {
        let mut vars = base_vars();
        vars.push(("CHECK_INTERVAL".into(), "  DEFAULT ".into()));
        vars.push(("DATA_FILE".into(), "default".into()));
        let config = Config::from_vars(vars).unwrap();
        assert_eq!(config.check_interval, 60);
        assert_eq!(config.data_file, PathBuf::from("cache/data.json"));
    }

    #[test]
    fn test_default_sentinel_on_required_key_fails() {
        let mut vars = base_vars();
        vars[1].1 = "default".into();
        let err = Config::from_vars(vars).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("WEBHOOK_URL")));
    }

    #[test]
    fn test_check_interval_below_minimum_rejected() {
        let mut vars = base_vars();
        vars.push(("CHECK_INTERVAL".into(), "29".into()));
        let err = Config::from_vars(vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "CHECK_INTERVAL",
                ..
            }
        ));
    }

    #[test]
    fn test_check_interval_at_minimum_accepted() {
        let mut vars = base_vars();
        vars.push(("CHECK_INTERVAL".into(), "30".into()));
        let config = Config::from_vars(vars).unwrap();
        assert_eq!(config.check_interval, 30);
    }

    #[test]
    fn test_non_numeric_interval_rejected() {
        let mut vars = base_vars();
        vars.push(("CHECK_INTERVAL".into(), "soon".into()));
        assert!(Config::from_vars(vars).is_err());
    }

    #[test]
    fn test_mark_seen_on_failure_parsing() {
        let mut vars = base_vars();
        vars.push(("MARK_SEEN_ON_FAILURE".into(), "false".into()));
        let config = Config::from_vars(vars).unwrap();
        assert!(!config.mark_seen_on_failure);

        let mut vars = base_vars();
        vars.push(("MARK_SEEN_ON_FAILURE".into(), "maybe".into()));
        assert!(Config::from_vars(vars).is_err());
    }

    #[test]
    fn test_debug_masks_webhook_url() {
        let config = Config::from_vars(base_vars()).unwrap();
        let debug_output = format!("{:?}", config);
        assert!(
            !debug_output.contains("discord.com/api/webhooks"),
            "Debug output should not contain the webhook URL"
        );
        assert!(debug_output.contains("[REDACTED]"));
    }
}
