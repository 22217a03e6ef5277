//! Client and response schema for the public ORCID works endpoint.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://pub.orcid.org/v3.0";

/// `GET /{orcid}/works`. Every field is optional; defaults are applied downstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorksResponse {
    #[serde(default)]
    pub group: Vec<WorkGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkGroup {
    #[serde(rename = "work-summary", default)]
    pub work_summary: Vec<WorkSummary>,
}

impl WorkGroup {
    /// ORCID lists one summary per source; the first is the preferred one.
    pub fn primary(&self) -> Option<&WorkSummary> { self.work_summary.first() }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkSummary {
    #[serde(rename = "put-code", default)]
    pub put_code: Option<i64>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "publication-date", default)]
    pub publication_date: Option<PublicationDate>,
    #[serde(default)]
    pub title: Option<WorkTitle>,
    #[serde(default)]
    pub url: Option<Value>,
}

impl WorkSummary {
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref()?.title.as_ref()?.value.as_deref()
    }

    pub fn url_text(&self) -> Option<&str> { self.url.as_ref()?.value.as_deref() }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicationDate {
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub month: Option<Value>,
    #[serde(default)]
    pub day: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkTitle {
    #[serde(default)]
    pub title: Option<Value>,
}

/// ORCID's `{"value": ...}` wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Value {
    #[serde(default)]
    pub value: Option<String>,
}

/// Anything that can produce a researcher's works.
#[async_trait]
pub trait WorksSource: Send + Sync {
    async fn fetch_works(&self, orcid: &str) -> Result<WorksResponse>;
}

/// `0000-0002-5037-0961`: four groups of four, last character may be `X`.
pub fn is_valid_orcid(id: &str) -> bool {
    let groups: Vec<&str> = id.split('-').collect();
    groups.len() == 4
        && groups.iter().enumerate().all(|(i, g)| {
            g.len() == 4
                && g.chars().enumerate().all(|(j, c)| c.is_ascii_digit() || (i == 3 && j == 3 && c == 'X'))
        })
}

pub struct OrcidClient {
    http: reqwest::Client,
    base: Url,
}

impl OrcidClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid ORCID base URL: {base_url}"))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("ec2g-site/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base })
    }

    pub fn works_url(&self, orcid: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("ORCID base URL cannot be a base: {}", self.base))?
            .pop_if_empty()
            .push(orcid)
            .push("works");
        Ok(url)
    }
}

#[async_trait]
impl WorksSource for OrcidClient {
    async fn fetch_works(&self, orcid: &str) -> Result<WorksResponse> {
        if !is_valid_orcid(orcid) { bail!("not an ORCID identifier: {orcid:?}"); }
        let url = self.works_url(orcid)?;
        tracing::debug!(%url, "fetching ORCID works");
        let resp = self.http.get(url.clone()).header(ACCEPT, "application/json").send().await
            .with_context(|| format!("requesting {url}"))?;
        let status = resp.status();
        if !status.is_success() { bail!("HTTP error! status: {status}"); }
        resp.json::<WorksResponse>().await.with_context(|| format!("decoding works from {url}"))
    }
}
