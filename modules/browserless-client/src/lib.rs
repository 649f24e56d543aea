pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde_json::json;

/// Navigation timeout handed to the browser, in milliseconds.
const NAV_TIMEOUT_MS: u64 = 30_000;

/// Default bound on a wait-for-selector, in milliseconds.
const WAIT_TIMEOUT_MS: u64 = 10_000;

/// What the browser should wait for before the DOM is captured.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// CSS selector that must become present before capture.
    pub wait_for_selector: Option<String>,
    /// Bound on the selector wait, in milliseconds. Defaults to 10s.
    pub wait_timeout_ms: Option<u64>,
}

impl RenderOptions {
    pub fn wait_for(selector: &str) -> Self {
        Self {
            wait_for_selector: Some(selector.to_string()),
            wait_timeout_ms: None,
        }
    }
}

/// Client for a Browserless (headless Chrome) service.
///
/// One instance is the browser-session handle for a crawl lifecycle:
/// constructed once, shared by reference, and dropped (releasing its
/// connection pool) when the lifecycle ends.
pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Fetch fully-rendered HTML for a URL via the /content endpoint,
    /// optionally waiting for a selector to become present first.
    pub async fn render(&self, url: &str, opts: &RenderOptions) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let mut body = json!({
            "url": url,
            "gotoOptions": { "timeout": NAV_TIMEOUT_MS },
        });
        if let Some(ref selector) = opts.wait_for_selector {
            body["waitForSelector"] = json!({
                "selector": selector,
                "timeout": opts.wait_timeout_ms.unwrap_or(WAIT_TIMEOUT_MS),
            });
        }

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }

    /// Fetch rendered HTML with no selector wait.
    pub async fn content(&self, url: &str) -> Result<String> {
        self.render(url, &RenderOptions::default()).await
    }
}
