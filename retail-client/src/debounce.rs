//! Trailing-edge debouncer
//!
//! A background task holds at most one pending input. Every new input
//! replaces it and restarts the timer; when the timer elapses the action
//! is spawned with the latest input. Intermediate inputs never fire.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// How long the idle worker sleeps when nothing is pending
const IDLE_SLEEP_SECS: u64 = 3600;

/// Cancellable timer that collapses bursts of inputs into one action
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    shutdown: CancellationToken,
    window: Duration,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debounce worker on the current tokio runtime.
    ///
    /// `action` runs in its own task once the window elapses after the
    /// last input. A fired action is never cancelled.
    pub fn spawn<F, Fut>(window: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        tokio::spawn(run(window, rx, shutdown.clone(), action));

        Self {
            tx,
            shutdown,
            window,
        }
    }

    /// Start (or restart) the timer with a new input.
    ///
    /// Returns `false` once the debouncer has been cancelled.
    pub fn trigger(&self, input: T) -> bool {
        if self.shutdown.is_cancelled() {
            return false;
        }
        self.tx.send(input).is_ok()
    }

    /// Stop the worker. A pending input is dropped without firing.
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run<T, F, Fut>(
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<T>,
    shutdown: CancellationToken,
    action: F,
) where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut pending: Option<T> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let sleep_until =
            deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(IDLE_SLEEP_SECS));

        tokio::select! {
            _ = shutdown.cancelled() => {
                if pending.is_some() {
                    tracing::debug!("Debouncer cancelled with a pending input");
                }
                break;
            }

            _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                deadline = None;
                if let Some(input) = pending.take() {
                    tokio::spawn(action(input));
                }
            }

            received = rx.recv() => {
                match received {
                    Some(input) => {
                        pending = Some(input);
                        deadline = Some(Instant::now() + window);
                    }
                    None => break,
                }
            }
        }
    }
}
