use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No API URL configured")]
    NotConfigured,
}

/// Where the raw stock payload comes from.
///
/// The fetch orchestrator only sees this trait; production uses
/// [`HttpSource`], tests substitute scripted sources.
pub trait RecordSource: Send + Sync {
    fn fetch_all(&self) -> impl Future<Output = Result<Value, SourceError>> + Send;
}

/// The spreadsheet-backed web endpoint. Every request asks for the whole
/// sheet with `?todos=true`.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn request_url(&self) -> String {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{sep}todos=true", self.url)
    }
}

impl RecordSource for HttpSource {
    fn fetch_all(&self) -> impl Future<Output = Result<Value, SourceError>> + Send {
        async move {
            if self.url.trim().is_empty() {
                return Err(SourceError::NotConfigured);
            }
            let res = self.client.get(self.request_url()).send().await?;
            let status = res.status();
            if !status.is_success() {
                return Err(SourceError::Status(status.as_u16()));
            }
            let body = res.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_appends_flag() {
        let src = HttpSource::new("https://example.test/exec", Duration::from_secs(5)).unwrap();
        assert_eq!(src.request_url(), "https://example.test/exec?todos=true");
    }

    #[test]
    fn request_url_extends_existing_query() {
        let src = HttpSource::new("https://example.test/exec?hoja=stock", Duration::from_secs(5)).unwrap();
        assert_eq!(src.request_url(), "https://example.test/exec?hoja=stock&todos=true");
    }
}
