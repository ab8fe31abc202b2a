//! Debounced search-as-you-type.
//!
//! Each keystroke restarts the delay; the search only fires after the
//! delay elapses uninterrupted, and firing cancels the previous in-flight
//! search. The search itself is the dual communities + questions fetch
//! under one cancellation token.

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::client::ApiError;
use crate::models::{Community, Question};

/// Restartable delay gate. Queueing a task aborts the previously queued
/// one, whether it is still waiting out its delay or already running.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<AbortHandle>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Queue a task to run after the delay. Returns a handle resolving to
    /// `None` when the task was superseded or cancelled before finishing.
    pub fn queue<Fut>(&mut self, task: Fut) -> JoinHandle<Option<Fut::Output>>
    where
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
        let (handle, registration) = AbortHandle::new_pair();
        self.pending = Some(handle);

        let delay = self.delay;
        tokio::spawn(async move {
            let gated = async move {
                tokio::time::sleep(delay).await;
                task.await
            };
            Abortable::new(gated, registration).await.ok()
        })
    }

    pub fn cancel(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
    }
}

#[derive(Debug, Default)]
pub struct SearchResults {
    pub communities: Vec<Community>,
    pub questions: Vec<Question>,
}

/// Run the dual search fetch under one cancellation token. Returns
/// `Ok(None)` when the search was superseded; failures bubble to the
/// caller for the error channel.
pub async fn search_pair<FC, FQ, FutC, FutQ>(
    registration: AbortRegistration,
    fetch_communities: FC,
    fetch_questions: FQ,
) -> Result<Option<SearchResults>, ApiError>
where
    FC: FnOnce() -> FutC,
    FQ: FnOnce() -> FutQ,
    FutC: Future<Output = Result<Vec<Community>, ApiError>>,
    FutQ: Future<Output = Result<Vec<Question>, ApiError>>,
{
    let both = async {
        let communities = fetch_communities().await?;
        let questions = fetch_questions().await?;
        Ok(SearchResults {
            communities,
            questions,
        })
    };

    match Abortable::new(both, registration).await {
        Err(_aborted) => Ok(None),
        Ok(Ok(results)) => Ok(Some(results)),
        Ok(Err(err)) => Err(err),
    }
}
