use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ec2g_site::countdown::STARTED_MESSAGE;
use ec2g_site::prelude::*;

struct NoWorks;

#[async_trait]
impl WorksSource for NoWorks {
    async fn fetch_works(&self, _orcid: &str) -> Result<WorksResponse> { Ok(WorksResponse::default()) }
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> { self.0 }
}

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta name="viewport" content="width=device-width"></head>
<body>
  <div class="news-carousel" id="news-carousel"><div class="news-dots"></div></div>
  <p id="countdown"></p>
  <a id="orcid-link" href="https://orcid.org/0000-0002-5037-0961">0000-0002-5037-0961</a>
  <div id="publications"></div>
</body>
</html>
"#;

fn site(clock_at: &str) -> Site {
    let now = DateTime::parse_from_rfc3339(clock_at).unwrap().with_timezone(&Utc);
    Site::new(SiteConfig::default(), ContentRecord::bundled().unwrap())
        .unwrap()
        .with_works_source(Arc::new(NoWorks))
        .with_clock(Arc::new(FixedClock(now)))
}

#[tokio::test(start_paused = true)]
async fn boot_renders_every_widget() {
    let site = site("2025-11-01T20:00:00Z");
    let mut page = Page::from_html(PAGE).unwrap();
    let booted = site.boot(&mut page).await;

    let html = page.html();
    assert_eq!(html.matches("<header class=\"site-header\">").count(), 1);
    assert!(html.contains("<a href=\"network.html\">Network</a>"));

    let countdown = page.mount("countdown").unwrap();
    assert_eq!(countdown.lock().unwrap().text(), Some("Start in: 1 days, 0 hours, 0 minutes, 0 seconds"));
    assert!(booted.countdown.as_ref().unwrap().is_running());

    let publications = page.mount("publications").unwrap();
    assert_eq!(publications.lock().unwrap().text(), Some("No publications found."));
    assert_eq!(booted.publications, Some(LoadOutcome::Empty));

    let carousel = booted.carousel.as_ref().unwrap();
    assert_eq!(carousel.current(), 0);
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(carousel.current(), 1);
    assert_eq!(page.mount("news-carousel").unwrap().lock().unwrap().active_indices(), vec![1]);
}

#[tokio::test]
async fn event_already_started() {
    let site = site("2026-10-19T12:00:00Z");
    let mut page = Page::with_mounts(&["countdown"]);
    let booted = site.boot(&mut page).await;

    let countdown = booted.countdown.as_ref().unwrap();
    assert_eq!(countdown.state(), CountdownState::Finished);
    assert!(!countdown.is_running());
    assert_eq!(page.mount("countdown").unwrap().lock().unwrap().text(), Some(STARTED_MESSAGE));
    assert!(booted.carousel.is_none());
    assert!(booted.publications.is_none());
}

#[tokio::test]
async fn booting_twice_keeps_one_header() {
    let site = site("2026-10-19T12:00:00Z");
    let mut page = Page::from_html(PAGE).unwrap();
    drop(site.boot(&mut page).await);
    drop(site.boot(&mut page).await);
    assert_eq!(page.html().matches("<header").count(), 1);
    assert_eq!(page.html().matches("<footer").count(), 1);
}
