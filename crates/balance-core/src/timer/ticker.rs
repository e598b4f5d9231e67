use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const TICK_BUFFER: usize = 8;

/// Owns a running ticker task. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a task that sends the current time once per `period`, first after
/// one full period. The task ends when the receiver is dropped.
///
/// Must be called from within a tokio runtime.
pub fn spawn_ticker(period: Duration) -> (TickerHandle, mpsc::Receiver<DateTime<Utc>>) {
    let period = period.max(Duration::from_millis(1));
    let (tx, rx) = mpsc::channel(TICK_BUFFER);

    let task = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if tx.send(Utc::now()).await.is_err() {
                tracing::debug!("tick receiver dropped, ticker exiting");
                break;
            }
        }
    });

    (TickerHandle { task }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let started = Instant::now();
        let (_handle, mut rx) = spawn_ticker(Duration::from_secs(60));
        for _ in 0..3 {
            assert!(rx.recv().await.is_some());
        }
        assert!(started.elapsed() >= Duration::from_secs(180));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels() {
        let (handle, mut rx) = spawn_ticker(Duration::from_secs(1));
        assert!(rx.recv().await.is_some());
        drop(handle);
        while rx.recv().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_exits_when_receiver_dropped() {
        let (handle, rx) = spawn_ticker(Duration::from_secs(1));
        drop(rx);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(handle.is_finished());
    }
}
