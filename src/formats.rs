use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractStatus {
    Success,
    NonHtml,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractRecord {
    pub url: String,
    pub title: String,
    pub content: String,
    pub length: usize,
    pub status: ExtractStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub url: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub image: String,
    pub site_name: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub locale: String,
    pub favicon: String,
    pub canonical: String,
    pub robots: String,
    pub viewport: String,
    pub charset: String,
    pub language: String,
    pub generator: String,
    pub theme: String,
    pub extracted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchSuggestions {
    pub query: String,
    pub suggestions: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub message: String,
    pub status: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub uptime_secs: u64,
}
