//! Webhook delivery over HTTP(S)

use super::{DeliveryOutcome, DeliverySink};
use crate::error::RelayError;
use crate::types::NotificationPayload;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Posts the payload as JSON to a single webhook URL
#[derive(Debug, Clone)]
pub struct WebhookClient {
    url: Url,
    client: Client,
}

impl WebhookClient {
    /// Create a client for `url` with a request timeout
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RelayError> {
        let url = Url::parse(url.trim())
            .map_err(|e| RelayError::Config(format!("invalid webhook URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RelayError::Config(format!(
                "webhook URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reminder-flux/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl DeliverySink for WebhookClient {
    fn name(&self) -> &str {
        "webhook"
    }

    fn deliver(&self, payload: &NotificationPayload) -> DeliveryOutcome {
        match self.client.post(self.url.clone()).json(payload).send() {
            Ok(response) => outcome_for_status(response.status()),
            Err(e) => DeliveryOutcome::Failed {
                status: e.status().map(|s| s.as_u16()),
                reason: e.to_string(),
            },
        }
    }
}

/// Map an HTTP status to an outcome; only 2xx counts as delivered
pub fn outcome_for_status(status: StatusCode) -> DeliveryOutcome {
    if status.is_success() {
        DeliveryOutcome::Delivered {
            status: status.as_u16(),
        }
    } else {
        DeliveryOutcome::Failed {
            status: Some(status.as_u16()),
            reason: format!("webhook responded with {status}"),
        }
    }
}
