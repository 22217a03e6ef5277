use maud::html;

use crate::orcid::{PublicationDate, Value, WorksResponse, WorksSource};
use crate::render::RenderTarget;

pub const EMPTY_MESSAGE: &str = "No publications found.";
pub const FAILURE_MESSAGE: &str = "Unable to load publications at this time.";
const JOURNAL_ARTICLE: &str = "journal-article";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub put_code: Option<i64>,
    pub title: String,
    pub year: String,
    pub url: Option<String>,
}

impl Publication {
    pub fn markup(&self) -> String {
        html! {
            strong { (self.title) } " (" (self.year) ")"
            @if let Some(url) = &self.url {
                br;
                a href=(url) target="_blank" { "View Publication" }
            }
        }
        .into_string()
    }
}

/// `YYYYMMDD` as a number. Missing month/day count as `01`; a missing year as 0.
/// A key that does not fit is treated as undated.
fn date_key(date: Option<&PublicationDate>) -> u64 {
    let part = |v: Option<&Value>| v.and_then(|v| v.value.as_deref()).and_then(|s| s.trim().parse::<u64>().ok());
    let year = date.and_then(|d| part(d.year.as_ref())).unwrap_or(0);
    let month = date.and_then(|d| part(d.month.as_ref())).unwrap_or(1);
    let day = date.and_then(|d| part(d.day.as_ref())).unwrap_or(1);
    year.checked_mul(10_000)
        .and_then(|k| month.checked_mul(100).and_then(|m| k.checked_add(m)))
        .and_then(|k| k.checked_add(day))
        .unwrap_or(101)
}

/// The `limit` most recent journal articles, newest first.
pub fn journal_articles(works: &WorksResponse, limit: usize) -> Vec<Publication> {
    let mut found: Vec<(u64, Publication)> = works.group.iter()
        .filter_map(|g| g.primary())
        .filter(|s| s.kind.as_deref() == Some(JOURNAL_ARTICLE))
        .map(|s| {
            let date = s.publication_date.as_ref();
            let year = date.and_then(|d| d.year.as_ref()).and_then(|v| v.value.clone()).unwrap_or_default();
            let publication = Publication {
                put_code: s.put_code,
                title: s.title_text().filter(|t| !t.is_empty()).unwrap_or("Untitled").to_string(),
                year,
                url: s.url_text().filter(|u| !u.is_empty()).map(str::to_string),
            };
            (date_key(date), publication)
        })
        .collect();
    found.sort_by(|a, b| b.0.cmp(&a.0));
    found.into_iter().take(limit).map(|(_, p)| p).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered(usize),
    Empty,
    Failed,
}

/// Renders a researcher's latest journal articles into its target.
pub struct PublicationsWidget<T: RenderTarget> {
    target: T,
    orcid: String,
    limit: usize,
    loaded: Vec<Publication>,
}

impl<T: RenderTarget> PublicationsWidget<T> {
    pub fn new(target: T, orcid: impl Into<String>, limit: usize) -> Self {
        Self { target, orcid: orcid.into().trim().to_string(), limit, loaded: Vec::new() }
    }

    pub fn orcid(&self) -> &str { &self.orcid }
    pub fn publications(&self) -> &[Publication] { &self.loaded }
    pub fn target(&self) -> &T { &self.target }

    /// Fetch and render. Failures end up as the fallback message, never as an error.
    pub async fn load(&mut self, source: &dyn WorksSource) -> LoadOutcome {
        match source.fetch_works(&self.orcid).await {
            Ok(works) => {
                self.loaded = journal_articles(&works, self.limit);
                self.display()
            }
            Err(e) => {
                tracing::error!(orcid = %self.orcid, "Error loading ORCID publications: {e:#}");
                self.loaded.clear();
                self.target.set_text(FAILURE_MESSAGE);
                LoadOutcome::Failed
            }
        }
    }

    fn display(&mut self) -> LoadOutcome {
        if self.loaded.is_empty() {
            self.target.set_text(EMPTY_MESSAGE);
            return LoadOutcome::Empty;
        }
        self.target.render_list(self.loaded.iter().map(Publication::markup).collect());
        LoadOutcome::Rendered(self.loaded.len())
    }
}
