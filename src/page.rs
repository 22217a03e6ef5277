use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use scraper::{Html, Selector};

use crate::render::{lock, MemoryTarget, SharedTarget};

pub const CAROUSEL_MOUNT: &str = "news-carousel";
pub const COUNTDOWN_MOUNT: &str = "countdown";
pub const PUBLICATIONS_MOUNT: &str = "publications";
pub const ORCID_MOUNT: &str = "orcid-link";

/// An HTML document and the widget mount points found in it.
#[derive(Debug)]
pub struct Page {
    html: String,
    mounts: BTreeMap<String, SharedTarget>,
    orcid: Option<String>,
}

impl Page {
    pub fn from_html(html: impl Into<String>) -> Result<Self> {
        let html = html.into();
        let (mounts, orcid) = {
            let document = Html::parse_document(&html);
            let present = |css: &str| -> Result<bool> { Ok(document.select(&selector(css)?).next().is_some()) };

            let mut mounts = BTreeMap::new();
            // the carousel can also be marked by class only
            for (id, css) in [
                (CAROUSEL_MOUNT, "#news-carousel, .news-carousel"),
                (COUNTDOWN_MOUNT, "#countdown"),
                (PUBLICATIONS_MOUNT, "#publications"),
            ] {
                if present(css)? {
                    mounts.insert(id.to_string(), MemoryTarget::shared());
                }
            }

            let orcid = document.select(&selector(&format!("#{ORCID_MOUNT}"))?).next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty());
            (mounts, orcid)
        };

        Ok(Self { html, mounts, orcid })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path).with_context(|| format!("reading page: {}", path.display()))?;
        Self::from_html(html)
    }

    /// A page with the given mounts and no markup of its own.
    pub fn with_mounts(mounts: &[&str]) -> Self {
        Self {
            html: String::new(),
            mounts: mounts.iter().map(|m| (m.to_string(), MemoryTarget::shared())).collect(),
            orcid: None,
        }
    }

    pub fn with_orcid(mut self, orcid: impl Into<String>) -> Self {
        self.orcid = Some(orcid.into());
        self
    }

    pub fn html(&self) -> &str { &self.html }
    pub fn set_html(&mut self, html: String) { self.html = html; }

    pub fn mount(&self, id: &str) -> Option<SharedTarget> { self.mounts.get(id).cloned() }
    pub fn has_mount(&self, id: &str) -> bool { self.mounts.contains_key(id) }
    pub fn mount_ids(&self) -> impl Iterator<Item = &str> { self.mounts.keys().map(String::as_str) }

    /// Text of the `orcid-link` element.
    pub fn orcid(&self) -> Option<&str> { self.orcid.as_deref() }

    /// One line per mount with what it currently shows.
    pub fn summary(&self) -> Vec<String> {
        self.mounts.iter().map(|(id, target)| {
            let t = lock(target);
            match t.text() {
                Some(text) => format!("#{id}: {text}"),
                None => format!("#{id}: {} item(s), active {:?}", t.items().len(), t.active_indices()),
            }
        }).collect()
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css}: {e:?}"))
}
