use crate::client::{FetchError, SkraperClient};
use async_trait::async_trait;
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("skraper-rs/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ClientSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_redirects: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            user_agent: USER_AGENT.to_owned(),
            timeout_secs: 15,
            connect_timeout_secs: 5,
            max_redirects: 10,
        }
    }
}

/// [`SkraperClient`] over a pooled `reqwest` client. Cheap to share behind an `Arc`.
#[derive(Clone, Debug)]
pub struct DefaultSkraperClient {
    client: reqwest::Client,
}

impl DefaultSkraperClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::from_settings(&ClientSettings::default())
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs.max(1)))
            .redirect(Policy::limited(settings.max_redirects))
            .build()?;

        Ok(DefaultSkraperClient { client })
    }

    pub async fn try_fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SkraperClient for DefaultSkraperClient {
    async fn fetch_bytes(&self, url: &str) -> Option<Vec<u8>> {
        match self.try_fetch_bytes(url).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!("unable to fetch {url}: {e}");
                None
            },
        }
    }
}
