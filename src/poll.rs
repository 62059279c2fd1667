//! Waiting for remote tasks to reach a terminal status.
//!
//! The loop retrieves, reports the observation, checks the status against the
//! terminal set, and otherwise sleeps for the poll interval. Sleeping is the
//! only suspension point besides the retrieval itself, and both race the
//! cancellation token and the overall deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::errors::{BoxError, Result, TwelveLabsError};
use crate::models::{EmbeddingTask, Task};

pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Statuses after which the service never changes a task again.
pub const DEFAULT_TERMINAL_STATUSES: [&str; 3] = ["ready", "failed", "error"];

/// Anything with a remote status string that can be polled.
pub trait Observable {
    fn status(&self) -> &str;
}

impl Observable for Task {
    fn status(&self) -> &str {
        self.status_str()
    }
}

impl Observable for EmbeddingTask {
    fn status(&self) -> &str {
        self.status.as_str()
    }
}

/// Return value of an observer. An `Err` stops the operation and surfaces as
/// [`TwelveLabsError::Callback`].
pub type ObserverResult = std::result::Result<(), BoxError>;

/// Called with every observation of the polled task.
pub type StatusObserver<T> = Box<dyn FnMut(&T) -> ObserverResult + Send>;

/// What to do when a retrieval after the first one fails.
///
/// The first retrieval always fails fast. Later failures are by default
/// logged and retried after the poll interval, still bounded by the timeout
/// and the cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetrievalErrorPolicy {
    /// Log every failure and retry.
    #[default]
    Retry,
    /// Retry network errors, 429 and 5xx; return anything else.
    RetryTransient,
    /// Return the first failure.
    Abort,
}

/// Polling config for `wait_for_task` and `wait_for_embedding_task`.
pub struct WaitOptions<T = Task> {
    /// Default: 5s. A zero interval means the default.
    pub poll_interval: Duration,
    /// Bounds the whole wait. Default: none.
    pub timeout: Option<Duration>,
    /// Called on each observation, including the first and the terminal one.
    pub on_status: Option<StatusObserver<T>>,
    /// Stops the wait promptly, even in the middle of a sleep.
    pub cancel: Option<CancellationToken>,
    pub on_retrieval_error: RetrievalErrorPolicy,
    /// Default: [`DEFAULT_TERMINAL_STATUSES`].
    pub terminal_statuses: Vec<String>,
}

impl<T> Default for WaitOptions<T> {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            on_status: None,
            cancel: None,
            on_retrieval_error: RetrievalErrorPolicy::default(),
            terminal_statuses: DEFAULT_TERMINAL_STATUSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl<T> WaitOptions<T> {
    pub fn poll_interval(mut self, d: Duration) -> Self {
        self.poll_interval = d;
        self
    }

    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    pub fn on_status(mut self, f: impl FnMut(&T) -> ObserverResult + Send + 'static) -> Self {
        self.on_status = Some(Box::new(f));
        self
    }

    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn on_retrieval_error(mut self, policy: RetrievalErrorPolicy) -> Self {
        self.on_retrieval_error = policy;
        self
    }

    /// Treat an additional status as terminal.
    pub fn terminal_status(mut self, status: impl Into<String>) -> Self {
        self.terminal_statuses.push(status.into());
        self
    }

    fn is_terminal(&self, status: &str) -> bool {
        self.terminal_statuses.iter().any(|s| s == status)
    }
}

/// Poll `fetch` until the observed status is terminal.
///
/// Returns the terminal observation, whatever its status. Errors:
/// - the first retrieval's error, unchanged;
/// - [`TwelveLabsError::Cancelled`] once the token fires;
/// - [`TwelveLabsError::Timeout`] once the deadline passes;
/// - [`TwelveLabsError::Callback`] when the observer rejects an observation;
/// - a later retrieval's error, if the retrieval policy does not retry it.
pub async fn poll_until_terminal<T, F, Fut>(
    task_id: &str,
    mut fetch: F,
    mut opts: WaitOptions<T>,
) -> Result<T>
where
    T: Observable,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let interval = if opts.poll_interval.is_zero() {
        DEFAULT_POLL_INTERVAL
    } else {
        opts.poll_interval
    };
    let timeout = opts.timeout.unwrap_or_default();
    let deadline = opts.timeout.map(|t| Instant::now() + t);
    let cancel = opts.cancel.clone().unwrap_or_else(CancellationToken::new);

    if cancel.is_cancelled() {
        return Err(TwelveLabsError::Cancelled);
    }
    let mut current = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(TwelveLabsError::Cancelled),
        first = fetch() => first?,
    };

    loop {
        tracing::debug!(task_id, status = current.status(), "observed task status");

        if let Some(observer) = opts.on_status.as_mut() {
            observer(&current).map_err(TwelveLabsError::Callback)?;
        }

        if opts.is_terminal(current.status()) {
            return Ok(current);
        }

        current = loop {
            if cancel.is_cancelled() {
                return Err(TwelveLabsError::Cancelled);
            }

            let mut wake = Instant::now() + interval;
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(TwelveLabsError::Timeout(timeout));
                }
                wake = wake.min(deadline);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TwelveLabsError::Cancelled),
                _ = sleep_until(wake) => {}
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(TwelveLabsError::Timeout(timeout));
            }

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TwelveLabsError::Cancelled),
                _ = expiry(deadline) => return Err(TwelveLabsError::Timeout(timeout)),
                fetched = fetch() => fetched,
            };

            match fetched {
                Ok(next) => break next,
                Err(err) if retries(opts.on_retrieval_error, &err) => {
                    tracing::warn!(task_id, error = %err, "task retrieval failed, retrying after interval");
                }
                Err(err) => return Err(err),
            }
        };
    }
}

fn retries(policy: RetrievalErrorPolicy, err: &TwelveLabsError) -> bool {
    match policy {
        RetrievalErrorPolicy::Retry => true,
        RetrievalErrorPolicy::RetryTransient => err.is_transient(),
        RetrievalErrorPolicy::Abort => false,
    }
}

async fn expiry(deadline: Option<Instant>) {
    match deadline {
        Some(d) => sleep_until(d).await,
        None => std::future::pending().await,
    }
}
