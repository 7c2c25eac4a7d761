use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single upstream fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Terminal non-2xx response after redirects were followed.
    #[error("HTTP error: {status} for url {url}")]
    Upstream { status: StatusCode, url: String },

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// DNS, connect, TLS, body read and redirect failures.
    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Unexpected(String),
}

impl FetchError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            return Self::Timeout { secs: timeout_secs };
        }
        if err.is_builder() {
            return Self::Unexpected(format!("build request: {}", error_chain(&err)));
        }
        Self::Transport(error_chain(&err))
    }
}

/// Failure anywhere in normalize → fetch → transform.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("transform failed: {0:#}")]
    Transform(anyhow::Error),
}

impl PipelineError {
    /// Status the router answers with: upstream statuses are mirrored,
    /// everything else is an internal error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Fetch(FetchError::Upstream { status, .. }) => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Fetch(err @ FetchError::Upstream { .. }) => err.to_string(),
            Self::Fetch(err @ (FetchError::Timeout { .. } | FetchError::Transport(_))) => {
                format!("Request error: {err}")
            }
            Self::Fetch(FetchError::Unexpected(msg)) => format!("Unexpected error: {msg}"),
            Self::Transform(err) => format!("Unexpected error: {err:#}"),
        }
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        if !out.contains(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_mirrored() {
        let err = PipelineError::from(FetchError::Upstream {
            status: StatusCode::NOT_FOUND,
            url: "https://ex.com/missing".to_owned(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.detail(),
            "HTTP error: 404 Not Found for url https://ex.com/missing"
        );
    }

    #[test]
    fn transport_and_timeout_map_to_internal_error() {
        let timeout = PipelineError::from(FetchError::Timeout { secs: 30 });
        assert_eq!(timeout.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(timeout.detail(), "Request error: request timed out after 30s");

        let transport = PipelineError::from(FetchError::Transport("dns error".to_owned()));
        assert_eq!(transport.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(transport.detail(), "Request error: dns error");
    }

    #[test]
    fn transform_failures_are_unexpected() {
        let err = PipelineError::Transform(anyhow::anyhow!("memory limit exceeded"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.detail().starts_with("Unexpected error:"));
    }
}
