use crate::config::Config;
use crate::notify::payload::WebhookPayload;
use std::time::Duration;
use thiserror::Error;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from a delivery attempt. The orchestrator logs these and moves
/// on — a failed send never aborts the run, and there are no in-run
/// retries (the entry's fate is governed by the mark-seen policy).
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Webhook request timed out")]
    Timeout,
    #[error("Webhook request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Webhook returned status {0}")]
    HttpStatus(u16),
}

/// Deliver one payload to the configured webhook.
///
/// In the dev environment this is a dry run: the payload is logged
/// locally and no network call happens.
pub async fn deliver(
    client: &reqwest::Client,
    config: &Config,
    payload: &WebhookPayload,
) -> Result<(), NotifyError> {
    if config.env.is_dev() {
        match serde_json::to_string_pretty(payload) {
            Ok(json) => tracing::info!(payload = %json, "Dry run, webhook delivery skipped"),
            Err(e) => tracing::warn!(error = %e, "Dry run, payload not serializable for logging"),
        }
        return Ok(());
    }

    let response = tokio::time::timeout(
        SEND_TIMEOUT,
        client.post(config.webhook_endpoint()).json(payload).send(),
    )
    .await
    .map_err(|_| NotifyError::Timeout)?
    .map_err(NotifyError::Network)?;

    if !response.status().is_success() {
        return Err(NotifyError::HttpStatus(response.status().as_u16()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::payload::build_payload;
    use crate::enrich::NormalizedEntry;
    use chrono::Utc;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(env: &str, webhook: &str) -> Config {
        Config::from_vars(vec![
            ("ENV".to_string(), env.to_string()),
            ("WEBHOOK_URL".to_string(), webhook.to_string()),
            (
                "RSS_FEED_URL".to_string(),
                "https://example.com/feed".to_string(),
            ),
        ])
        .unwrap()
    }

    fn sample_payload() -> WebhookPayload {
        let entry = NormalizedEntry {
            video_id: "v".into(),
            title: "T".into(),
            url: "https://example.com/v".into(),
            published: String::new(),
            updated: String::new(),
            channel_name: "C".into(),
            channel_id: String::new(),
            channel_url: String::new(),
            channel_icon_url: String::new(),
            description: String::new(),
            summary: String::new(),
            thumbnail_maxres: String::new(),
            thumbnail_hq: String::new(),
            views: "1".into(),
            likes: "1".into(),
        };
        build_payload(&entry, Utc::now())
    }

    #[tokio::test]
    async fn test_prod_delivery_posts_json() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = config_for("prod", &format!("{}/hook", mock_server.uri()));
        let client = reqwest::Client::new();

        deliver(&client, &config, &sample_payload()).await.unwrap();
    }

    #[tokio::test]
    async fn test_dev_mode_makes_no_network_call() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&mock_server)
            .await;

        let config = config_for("dev", &format!("{}/hook", mock_server.uri()));
        let client = reqwest::Client::new();

        deliver(&client, &config, &sample_payload()).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_2xx_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let config = config_for("prod", &format!("{}/hook", mock_server.uri()));
        let client = reqwest::Client::new();

        let err = deliver(&client, &config, &sample_payload())
            .await
            .unwrap_err();
        match err {
            NotifyError::HttpStatus(500) => {}
            e => panic!("Expected HttpStatus(500), got {:?}", e),
        }
    }
}
