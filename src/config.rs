use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

pub const DEFAULT_SERVICE_NAME: &str = "hello-net-backend";
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

const MOBILE_SAFARI_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

const VIEWPORT_CONTENT: &str =
    "width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no";

const MOBILE_CSS: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif !important;
            font-size: 16px !important;
            line-height: 1.5 !important;
            margin: 0 !important;
            padding: 10px !important;
            max-width: 100% !important;
            overflow-x: hidden !important;
        }
        * {
            max-width: 100% !important;
            box-sizing: border-box !important;
        }
        img {
            max-width: 100% !important;
            height: auto !important;
        }
        table {
            width: 100% !important;
            font-size: 14px !important;
        }
        .container, .wrapper, .content {
            max-width: 100% !important;
            padding: 5px !important;
        }
    "#;

/// Outbound identity and limits used for every upstream fetch.
#[derive(Debug, Clone)]
pub struct RequestProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub accept_encoding: String,
    pub connection: String,
    pub upgrade_insecure_requests: String,
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for RequestProfile {
    fn default() -> Self {
        Self {
            user_agent: MOBILE_SAFARI_USER_AGENT.to_owned(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_owned(),
            accept_language: "en-US,en;q=0.5".to_owned(),
            accept_encoding: "gzip, deflate".to_owned(),
            connection: "keep-alive".to_owned(),
            upgrade_insecure_requests: "1".to_owned(),
            timeout: Duration::from_secs(30),
            max_redirects: 20,
        }
    }
}

impl RequestProfile {
    pub fn header_map(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let pairs = [
            (USER_AGENT, &self.user_agent),
            (ACCEPT, &self.accept),
            (ACCEPT_LANGUAGE, &self.accept_language),
            (ACCEPT_ENCODING, &self.accept_encoding),
            (CONNECTION, &self.connection),
            (UPGRADE_INSECURE_REQUESTS, &self.upgrade_insecure_requests),
        ];
        for (name, value) in pairs {
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid {name} header value: {value:?}"))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[derive(Debug, Clone)]
pub struct RewriteConfig {
    pub viewport_content: String,
    pub mobile_css: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            viewport_content: VIEWPORT_CONTENT.to_owned(),
            mobile_css: MOBILE_CSS.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Content longer than this many characters is cut and marked.
    pub max_chars: usize,
    pub truncation_marker: String,
    pub untitled: String,
    pub non_html_title: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_chars: 5000,
            truncation_marker: "...".to_owned(),
            untitled: "Untitled".to_owned(),
            non_html_title: "Non-HTML Content".to_owned(),
        }
    }
}

/// Reads `HELLONET_ALLOWED_ORIGINS` (comma separated), ignoring blank entries.
pub fn allowed_origins_from_env() -> Option<Vec<String>> {
    let raw = std::env::var("HELLONET_ALLOWED_ORIGINS").ok()?;
    let origins = parse_origin_list(&raw);
    if origins.is_empty() {
        return None;
    }
    Some(origins)
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|v| v.trim().trim_end_matches('/'))
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}
