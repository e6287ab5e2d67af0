//! Listing page retrieval.
//!
//! [`HttpFetcher`] downloads a source's page and decodes it with the source's
//! declared [`TextEncoding`]. The aggregator only depends on the [`Fetch`]
//! trait so runs can be driven without the network.

use crate::error::FetchError;
use crate::models::{SourceConfig, SourceId, TextEncoding};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Retrieve the decoded markup of a source's listing page.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, source: &SourceConfig) -> Result<String, FetchError>;
}

/// [`Fetch`] implementation backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(source = %source.id, url = %source.url))]
    async fn fetch(&self, source: &SourceConfig) -> Result<String, FetchError> {
        let request_failed = |error: reqwest::Error| FetchError::Request {
            source_id: source.id,
            error,
        };

        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                source_id: source.id,
                status,
            });
        }

        let body = response.bytes().await.map_err(request_failed)?;
        debug!(bytes = body.len(), "Downloaded listing page");

        Ok(decode_body(source.id, &body, source.encoding))
    }
}

/// Decode a response body with the declared encoding.
///
/// Malformed sequences become U+FFFD so extraction still sees the markup
/// structure of a mislabelled page.
pub fn decode_body(source: SourceId, bytes: &[u8], encoding: TextEncoding) -> String {
    let (text, used, had_errors) = encoding.encoding().decode(bytes);
    if had_errors {
        warn!(%source, encoding = used.name(), "Replaced malformed byte sequences while decoding");
    }
    text.into_owned()
}
