use url::Url;

use crate::config::{ExtractConfig, RequestProfile, RewriteConfig};
use crate::error::PipelineError;
use crate::extract::extract_text_content;
use crate::fetch::{FetchResult, FetchedBody, Fetcher};
use crate::formats::{ExtractRecord, ExtractStatus, PageMetadata};
use crate::metadata::{default_page_metadata, extract_page_metadata};
use crate::normalize::normalize_target_url;
use crate::rewrite::rewrite_for_mobile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyOutcome {
    Html(String),
    /// Non-HTML upstream body, returned byte for byte.
    Passthrough {
        content_type: String,
        body: Vec<u8>,
    },
}

/// normalize → fetch → transform, with all fixed values supplied up front.
#[derive(Debug, Clone)]
pub struct Pipeline {
    fetcher: Fetcher,
    rewrite: RewriteConfig,
    extract: ExtractConfig,
}

impl Pipeline {
    pub fn new(
        profile: RequestProfile,
        rewrite: RewriteConfig,
        extract: ExtractConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(profile)?,
            rewrite,
            extract,
        })
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Self::new(
            RequestProfile::default(),
            RewriteConfig::default(),
            ExtractConfig::default(),
        )
    }

    pub async fn proxy(&self, raw_url: &str) -> Result<ProxyOutcome, PipelineError> {
        let (target, fetched) = self.fetch(raw_url).await?;
        match fetched.body {
            FetchedBody::Text(html) => {
                let base = base_url(&target, &fetched.final_url);
                let rewritten = rewrite_for_mobile(&html, &base, &self.rewrite)
                    .map_err(PipelineError::Transform)?;
                Ok(ProxyOutcome::Html(rewritten))
            }
            FetchedBody::Bytes(body) => Ok(ProxyOutcome::Passthrough {
                content_type: fetched.content_type,
                body,
            }),
        }
    }

    pub async fn extract(&self, raw_url: &str) -> Result<ExtractRecord, PipelineError> {
        let (target, fetched) = self.fetch(raw_url).await?;
        let record = match fetched.body {
            FetchedBody::Text(html) => {
                let extracted = extract_text_content(&html, &self.extract);
                ExtractRecord {
                    url: target,
                    title: extracted.title,
                    content: extracted.content,
                    length: extracted.length,
                    status: ExtractStatus::Success,
                }
            }
            FetchedBody::Bytes(_) => ExtractRecord {
                url: target,
                title: self.extract.non_html_title.clone(),
                content: format!("This is a {} file.", fetched.content_type),
                length: 0,
                status: ExtractStatus::NonHtml,
            },
        };
        Ok(record)
    }

    pub async fn metadata(&self, raw_url: &str) -> Result<PageMetadata, PipelineError> {
        let (target, fetched) = self.fetch(raw_url).await?;
        let base = base_url(&target, &fetched.final_url);
        let extracted_at = chrono::Utc::now().to_rfc3339();
        let metadata = match fetched.body {
            FetchedBody::Text(html) => extract_page_metadata(&html, &base, extracted_at),
            FetchedBody::Bytes(_) => default_page_metadata(&base, extracted_at),
        };
        Ok(metadata)
    }

    async fn fetch(&self, raw_url: &str) -> Result<(String, FetchResult), PipelineError> {
        let target = normalize_target_url(raw_url);
        let fetched = self.fetcher.fetch(&target).await?;
        Ok((target, fetched))
    }
}

/// Links are rebased on the requested URL, not the post-redirect one.
fn base_url(target: &str, final_url: &Url) -> Url {
    Url::parse(target).unwrap_or_else(|_| final_url.clone())
}
