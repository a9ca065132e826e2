use std::time::Duration;

use board_logging::{board_debug, board_warn};
use futures_util::StreamExt;
use jobboard_core::JobPosting;
use url::Url;

use crate::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Endpoint returning a JSON array of postings; `page` and `limit` are
    /// appended as query parameters.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/jobs".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Source of job pages. `page` is 1-based and `page_size` is non-zero.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<JobPosting>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPageFetcher {
    settings: FetchSettings,
}

impl ReqwestPageFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| {
                board_warn!("Failed to build http client: {}", err);
                FetchError::from_kind(FailureKind::Network)
            })
    }

    fn page_url(&self, page: u32, page_size: u32) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.settings.base_url).map_err(|err| {
            board_warn!("Invalid feed url {:?}: {}", self.settings.base_url, err);
            FetchError::from_kind(FailureKind::InvalidUrl)
        })?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &page_size.to_string());
        Ok(url)
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::from_kind(FailureKind::TooLarge {
            max_bytes: self.settings.max_bytes,
            actual: Some(actual),
        })
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestPageFetcher {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.page_url(page, page_size)?;
        let client = self.build_client()?;
        board_debug!("Fetching page {} ({} per page) from {}", page, page_size, url);

        let response = client
            .get(url.as_str())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            board_warn!("Page {} returned {}", page, status);
            return Err(FetchError::from_kind(FailureKind::HttpStatus(status.as_u16())));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice::<Vec<JobPosting>>(&body).map_err(|err| {
            board_warn!("Page {} payload is not a posting array: {}", page, err);
            FetchError::from_kind(FailureKind::Parse)
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    board_warn!("Page request failed: {}", err);
    if err.is_timeout() {
        return FetchError::from_kind(FailureKind::Timeout);
    }
    FetchError::from_kind(FailureKind::Network)
}
