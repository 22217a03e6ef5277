use std::ops::ControlFlow;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Handle to a repeating task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TaskHandle {
    handle: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn cancel(&mut self) {
        if let Some(h) = self.handle.take() { h.abort(); }
    }

    pub fn is_active(&self) -> bool { self.handle.as_ref().is_some_and(|h| !h.is_finished()) }

    /// Wait until the task stops by itself (or was cancelled). Returns `false` if a tick panicked.
    pub async fn wait(&mut self) -> bool {
        let outcome = match self.handle.as_mut() {
            Some(h) => h.await,
            None => Ok(()),
        };
        self.handle = None;
        match outcome {
            Err(err) if err.is_panic() => {
                tracing::warn!("repeating task panicked: {err}");
                false
            }
            _ => true,
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) { self.cancel(); }
}

/// Run `tick` every `period`, first after one full period. The task ends when `tick`
/// breaks. Needs a running tokio runtime.
pub fn every<F>(period: Duration, mut tick: F) -> Result<TaskHandle>
where
    F: FnMut() -> ControlFlow<()> + Send + 'static,
{
    let rt = Handle::try_current().context("scheduling a repeating task requires a tokio runtime")?;
    let handle = rt.spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if tick().is_break() { break; }
        }
    });
    Ok(TaskHandle { handle: Some(handle) })
}
