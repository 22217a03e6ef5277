pub mod carousel;
pub mod config;
pub mod content;
pub mod countdown;
pub mod logging;
pub mod orcid;
pub mod page;
pub mod publications;
pub mod render;
pub mod schedule;
pub mod template;
pub mod validator;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::carousel::{Carousel, CarouselHandle, Slide};
    pub use crate::config::SiteConfig;
    pub use crate::content::{ContentRecord, NavLink, NewsItem, Person};
    pub use crate::countdown::{Clock, Countdown, CountdownHandle, CountdownState, SystemClock};
    pub use crate::orcid::{OrcidClient, WorksResponse, WorksSource};
    pub use crate::page::Page;
    pub use crate::publications::{LoadOutcome, Publication, PublicationsWidget};
    pub use crate::render::{MemoryTarget, RenderTarget, SharedTarget};
    pub use crate::{Booted, Site};
}

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::carousel::{Carousel, CarouselHandle};
use crate::config::SiteConfig;
use crate::content::ContentRecord;
use crate::countdown::{parse_deadline, Clock, Countdown, CountdownHandle, SystemClock};
use crate::orcid::{OrcidClient, WorksSource};
use crate::page::{Page, CAROUSEL_MOUNT, COUNTDOWN_MOUNT, PUBLICATIONS_MOUNT};
use crate::publications::{LoadOutcome, PublicationsWidget};
use crate::render::SharedTarget;

/// Widgets activated on a page. Dropping it stops their timers.
#[derive(Default)]
pub struct Booted {
    pub carousel: Option<CarouselHandle<SharedTarget>>,
    pub countdown: Option<CountdownHandle<SharedTarget>>,
    pub publications: Option<LoadOutcome>,
}

/// Library entry point. Owns the config, the content record and the works source,
/// and hands them to each widget explicitly.
pub struct Site {
    config: SiteConfig,
    content: Arc<ContentRecord>,
    works: Arc<dyn WorksSource>,
    clock: Arc<dyn Clock>,
}

impl Site {
    pub fn new(config: SiteConfig, content: ContentRecord) -> Result<Self> {
        let client = OrcidClient::new(&config.orcid.base_url, config.orcid.timeout())
            .context("building ORCID client")?;
        Ok(Self { config, content: Arc::new(content), works: Arc::new(client), clock: Arc::new(SystemClock) })
    }

    pub fn with_works_source(mut self, works: Arc<dyn WorksSource>) -> Self {
        self.works = works;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SiteConfig { &self.config }
    pub fn content(&self) -> &Arc<ContentRecord> { &self.content }
    pub fn works(&self) -> &Arc<dyn WorksSource> { &self.works }

    /// Shared header/footer first, then every widget whose mount exists. A widget
    /// that fails is logged and skipped; the others still start.
    pub async fn boot(&self, page: &mut Page) -> Booted {
        match template::inject(page.html(), &self.content.navigation, &self.config.template) {
            Ok(html) => page.set_html(html),
            Err(e) => tracing::warn!("template injection failed: {e:#}"),
        }

        Booted {
            carousel: isolated("carousel", self.start_carousel(page)),
            countdown: isolated("countdown", self.start_countdown(page)),
            publications: self.load_publications(page).await,
        }
    }

    pub fn start_carousel(&self, page: &Page) -> Result<Option<CarouselHandle<SharedTarget>>> {
        let Some(target) = page.mount(CAROUSEL_MOUNT) else { return Ok(None) };
        let carousel = Carousel::from_content(target, &self.content, self.config.carousel.max_slides);
        tracing::debug!(slides = carousel.len(), "carousel mounted");
        CarouselHandle::start(carousel, self.config.carousel.period()).map(Some)
    }

    pub fn start_countdown(&self, page: &Page) -> Result<Option<CountdownHandle<SharedTarget>>> {
        let Some(target) = page.mount(COUNTDOWN_MOUNT) else { return Ok(None) };
        let deadline = self.countdown_deadline();
        CountdownHandle::start(Countdown::new(target, deadline), self.clock.clone(), self.config.countdown.tick()).map(Some)
    }

    /// The configured target, else the first event's date. `None` if neither parses.
    pub fn countdown_deadline(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let raw = self.config.countdown.target.as_deref()
            .or_else(|| self.content.next_event().map(|e| e.date.as_str()))?;
        let deadline = parse_deadline(raw, self.config.countdown.offset());
        if deadline.is_none() {
            tracing::warn!(date = raw, "unparsable countdown target; treating the event as started");
        }
        deadline
    }

    pub async fn load_publications(&self, page: &Page) -> Option<LoadOutcome> {
        let target = page.mount(PUBLICATIONS_MOUNT)?;
        let Some(orcid) = page.orcid() else {
            tracing::debug!("publications mount without an orcid-link; skipping");
            return None;
        };
        let mut widget = PublicationsWidget::new(target, orcid, self.config.publications.limit);
        Some(widget.load(self.works.as_ref()).await)
    }
}

fn isolated<T>(widget: &str, started: Result<Option<T>>) -> Option<T> {
    match started {
        Ok(None) => {
            tracing::debug!(widget, "no mount point; skipped");
            None
        }
        Ok(Some(w)) => Some(w),
        Err(e) => {
            tracing::warn!(widget, "failed to start: {e:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::CountdownState;
    use crate::publications::tests::{FailingWorks, StubWorks, MIXED};
    use crate::render::lock;

    fn site() -> Site {
        let mut config = SiteConfig::default();
        config.countdown.target = Some("2000-01-01T00:00:00Z".into());
        Site::new(config, ContentRecord::bundled().unwrap()).unwrap()
    }

    const FULL_PAGE: &str = r#"<!DOCTYPE html><html><head></head><body>
        <div class="news-carousel" id="news-carousel"></div>
        <p id="countdown"></p>
        <a id="orcid-link">0000-0002-5037-0961</a>
        <div id="publications"></div>
    </body></html>"#;

    #[tokio::test]
    async fn boots_every_mounted_widget() {
        let site = site().with_works_source(Arc::new(StubWorks(MIXED)));
        let mut page = Page::from_html(FULL_PAGE).unwrap();
        let booted = site.boot(&mut page).await;

        assert!(page.html().contains("<header class=\"site-header\">"));
        let carousel = booted.carousel.as_ref().unwrap();
        assert_eq!(carousel.len(), 4);
        assert_eq!(lock(&page.mount(CAROUSEL_MOUNT).unwrap()).active_indices(), vec![0]);
        assert_eq!(booted.countdown.as_ref().unwrap().state(), CountdownState::Finished);
        assert_eq!(booted.publications, Some(LoadOutcome::Rendered(2)));
    }

    #[tokio::test]
    async fn failing_publications_do_not_block_others() {
        let site = site().with_works_source(Arc::new(FailingWorks));
        let mut page = Page::from_html(FULL_PAGE).unwrap();
        let booted = site.boot(&mut page).await;
        assert_eq!(booted.publications, Some(LoadOutcome::Failed));
        assert!(booted.carousel.is_some());
        assert!(booted.countdown.is_some());
        assert_eq!(
            lock(&page.mount(PUBLICATIONS_MOUNT).unwrap()).text(),
            Some(crate::publications::FAILURE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn page_without_mounts_only_gets_templates() {
        let site = site().with_works_source(Arc::new(FailingWorks));
        let mut page = Page::from_html("<html><body><p>About us</p></body></html>").unwrap();
        let booted = site.boot(&mut page).await;
        assert!(booted.carousel.is_none() && booted.countdown.is_none() && booted.publications.is_none());
        assert!(page.html().contains("<footer class=\"site-footer\">"));
    }

    #[test]
    fn deadline_falls_back_to_first_event() {
        let site = Site::new(SiteConfig::default(), ContentRecord::bundled().unwrap()).unwrap();
        let deadline = site.countdown_deadline().unwrap();
        assert_eq!(deadline.to_rfc3339(), "2025-11-02T20:00:00+00:00");
    }

    #[test]
    fn unparsable_deadline_is_none() {
        let mut config = SiteConfig::default();
        config.countdown.target = Some("soon".into());
        let site = Site::new(config, ContentRecord::default()).unwrap();
        assert!(site.countdown_deadline().is_none());
    }
}
