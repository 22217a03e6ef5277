use std::fmt;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::render::{lock, RenderTarget};
use crate::schedule::{self, TaskHandle};

pub const STARTED_MESSAGE: &str = "The event has started!";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Counting,
    Finished,
}

/// Time left, split into whole units. Every unit is truncated, never rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    /// `None` once the deadline is reached.
    pub fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let ms = (deadline - now).num_milliseconds();
        if ms <= 0 { return None; }
        let total = ms / 1000;
        Some(Self {
            days: total / 86_400,
            hours: (total / 3_600) % 24,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        })
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Start in: {} days, {} hours, {} minutes, {} seconds", self.days, self.hours, self.minutes, self.seconds)
    }
}

/// Counts down to a deadline and announces the start exactly once.
pub struct Countdown<T: RenderTarget> {
    target: T,
    deadline: Option<DateTime<Utc>>,
    state: CountdownState,
}

impl<T: RenderTarget> Countdown<T> {
    /// A missing deadline (e.g. an unparsable date) means the event counts as started.
    pub fn new(target: T, deadline: Option<DateTime<Utc>>) -> Self {
        Self { target, deadline, state: CountdownState::Counting }
    }

    pub fn state(&self) -> CountdownState { self.state }
    pub fn is_finished(&self) -> bool { self.state == CountdownState::Finished }
    pub fn deadline(&self) -> Option<DateTime<Utc>> { self.deadline }
    pub fn target(&self) -> &T { &self.target }

    pub fn tick(&mut self, now: DateTime<Utc>) -> ControlFlow<()> {
        if self.is_finished() { return ControlFlow::Break(()); }
        match self.deadline.and_then(|d| Remaining::until(d, now)) {
            Some(left) => {
                self.target.set_text(&left.to_string());
                ControlFlow::Continue(())
            }
            None => {
                self.target.set_text(STARTED_MESSAGE);
                self.state = CountdownState::Finished;
                ControlFlow::Break(())
            }
        }
    }
}

/// A running countdown. The timer stops itself on the transition to `Finished`.
pub struct CountdownHandle<T: RenderTarget + 'static> {
    inner: Arc<Mutex<Countdown<T>>>,
    timer: Option<TaskHandle>,
}

impl<T: RenderTarget + 'static> CountdownHandle<T> {
    /// Renders once right away, then every `period`.
    pub fn start(mut countdown: Countdown<T>, clock: Arc<dyn Clock>, period: Duration) -> Result<Self> {
        if countdown.tick(clock.now()).is_break() {
            return Ok(Self { inner: Arc::new(Mutex::new(countdown)), timer: None });
        }
        let inner = Arc::new(Mutex::new(countdown));
        let ticking = inner.clone();
        let timer = schedule::every(period, move || lock(&ticking).tick(clock.now()))?;
        Ok(Self { inner, timer: Some(timer) })
    }

    pub fn state(&self) -> CountdownState { lock(&self.inner).state() }
    pub fn is_running(&self) -> bool { self.timer.as_ref().is_some_and(TaskHandle::is_active) }

    /// Resolves when the countdown reaches its terminal state.
    pub async fn finished(&mut self) {
        if let Some(t) = self.timer.as_mut() { t.wait().await; }
    }
}

/// Parse an event date. RFC 3339 is taken as-is; a naive date-time or bare date is
/// read in `offset`.
pub fn parse_deadline(raw: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) { return Some(dt.with_timezone(&Utc)); }
    let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)))?;
    offset.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc))
}

/// `+HH:MM`, `-HH:MM`, `Z` or `UTC`.
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") { return FixedOffset::east_opt(0); }
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => (1, raw),
    };
    let (h, m) = rest.split_once(':').unwrap_or((rest, "0"));
    let (h, m) = (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?);
    if !(0..24).contains(&h) || !(0..60).contains(&m) { return None; }
    FixedOffset::east_opt(sign * (h * 3600 + m * 60))
}
