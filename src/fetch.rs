use std::time::Instant;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use url::Url;

use crate::config::RequestProfile;
use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedBody {
    /// Decoded using the declared charset; only for `text/html` responses.
    Text(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: StatusCode,
    /// Lowercased `Content-Type`, empty when the header is missing.
    pub content_type: String,
    pub body: FetchedBody,
    pub final_url: Url,
}

impl FetchResult {
    pub fn is_html(&self) -> bool {
        is_html_content_type(&self.content_type)
    }
}

pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.contains("text/html")
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    profile: RequestProfile,
    headers: HeaderMap,
}

impl Fetcher {
    pub fn new(profile: RequestProfile) -> anyhow::Result<Self> {
        let headers = profile.header_map()?;
        Ok(Self { profile, headers })
    }

    /// Performs a single GET, following redirects. The client (and with it
    /// every pooled connection) is dropped before this returns.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let timeout_secs = self.profile.timeout.as_secs();
        let client = reqwest::Client::builder()
            .default_headers(self.headers.clone())
            .timeout(self.profile.timeout)
            .redirect(reqwest::redirect::Policy::limited(self.profile.max_redirects))
            .build()
            .map_err(|err| FetchError::Unexpected(format!("build http client: {err}")))?;

        let started = Instant::now();
        tracing::debug!(url, "fetch start");

        let resp = client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::from_reqwest(err, timeout_secs))?;

        let status = resp.status();
        let final_url = resp.url().clone();
        if !status.is_success() {
            tracing::warn!(url, final_url = %final_url, %status, "upstream returned error status");
            return Err(FetchError::Upstream {
                status,
                url: final_url.to_string(),
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let body = if is_html_content_type(&content_type) {
            FetchedBody::Text(
                resp.text()
                    .await
                    .map_err(|err| FetchError::from_reqwest(err, timeout_secs))?,
            )
        } else {
            FetchedBody::Bytes(
                resp.bytes()
                    .await
                    .map_err(|err| FetchError::from_reqwest(err, timeout_secs))?
                    .to_vec(),
            )
        };

        tracing::info!(
            url,
            final_url = %final_url,
            %status,
            content_type = %content_type,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(FetchResult {
            status,
            content_type,
            body,
            final_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_detection_tolerates_charset_parameter() {
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("text/html"));
        assert!(!is_html_content_type("application/xhtml+xml"));
        assert!(!is_html_content_type("image/png"));
        assert!(!is_html_content_type(""));
    }

    #[tokio::test]
    async fn malformed_url_fails_as_fetch_error_not_panic() {
        let fetcher = Fetcher::new(RequestProfile::default()).unwrap();
        let err = fetcher.fetch("https://not a url").await.unwrap_err();
        assert!(
            matches!(err, FetchError::Unexpected(_) | FetchError::Transport(_)),
            "err={err:?}"
        );
    }
}
