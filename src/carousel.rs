use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use maud::{html, PreEscaped};

use crate::content::{ContentRecord, NewsItem};
use crate::render::{lock, RenderTarget};
use crate::schedule::{self, TaskHandle};

/// One carousel entry, derived from a news item.
#[derive(Debug, Clone)]
pub struct Slide {
    pub title: String,
    pub image: Option<String>,
    pub content: String,
}

impl From<&NewsItem> for Slide {
    fn from(n: &NewsItem) -> Self {
        Self { title: n.title.clone(), image: n.image.clone(), content: n.content.clone() }
    }
}

impl Slide {
    pub fn markup(&self) -> String {
        html! {
            @if let Some(src) = &self.image {
                img src=(src) alt=(self.title);
            }
            p.text-justify { (PreEscaped(&self.content)) }
        }
        .into_string()
    }
}

/// Shows one slide at a time and wraps around at both ends.
pub struct Carousel<T: RenderTarget> {
    target: T,
    len: usize,
    current: usize,
}

impl<T: RenderTarget> Carousel<T> {
    pub fn new(mut target: T, slides: &[Slide]) -> Self {
        let len = slides.len();
        if len > 0 {
            target.render_list(slides.iter().map(Slide::markup).collect());
        }
        let mut carousel = Self { target, len, current: 0 };
        carousel.show_slide(0);
        carousel
    }

    /// Slides for the `limit` most recent news items.
    pub fn from_content(target: T, content: &ContentRecord, limit: usize) -> Self {
        let slides: Vec<Slide> = content.recent_news(limit).into_iter().map(Slide::from).collect();
        Self::new(target, &slides)
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn current(&self) -> usize { self.current }
    pub fn target(&self) -> &T { &self.target }

    pub fn show_slide(&mut self, idx: usize) {
        if self.len == 0 { return; }
        self.current = idx % self.len;
        for k in 0..self.len {
            self.target.toggle_active(k, k == self.current);
        }
    }

    pub fn next_slide(&mut self) {
        if self.len == 0 { return; }
        self.show_slide((self.current + 1) % self.len);
    }

    pub fn prev_slide(&mut self) {
        if self.len == 0 { return; }
        self.show_slide((self.current + self.len - 1) % self.len);
    }
}

/// A running carousel: the widget plus its auto-advance timer.
///
/// Manual navigation goes through the same `show_slide` as the timer and leaves the
/// timer's schedule untouched.
pub struct CarouselHandle<T: RenderTarget + 'static> {
    inner: Arc<Mutex<Carousel<T>>>,
    auto_advance: Option<TaskHandle>,
}

impl<T: RenderTarget + 'static> CarouselHandle<T> {
    pub fn start(carousel: Carousel<T>, period: Duration) -> Result<Self> {
        let inner = Arc::new(Mutex::new(carousel));
        let ticking = inner.clone();
        let auto_advance = schedule::every(period, move || {
            lock(&ticking).next_slide();
            ControlFlow::Continue(())
        })?;
        Ok(Self { inner, auto_advance: Some(auto_advance) })
    }

    pub fn next_slide(&self) { lock(&self.inner).next_slide() }
    pub fn prev_slide(&self) { lock(&self.inner).prev_slide() }
    pub fn show_slide(&self, idx: usize) { lock(&self.inner).show_slide(idx) }
    pub fn current(&self) -> usize { lock(&self.inner).current() }
    pub fn len(&self) -> usize { lock(&self.inner).len() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn stop_auto_advance(&mut self) {
        if let Some(mut t) = self.auto_advance.take() { t.cancel(); }
    }

    pub fn is_auto_advancing(&self) -> bool { self.auto_advance.as_ref().is_some_and(TaskHandle::is_active) }
}
