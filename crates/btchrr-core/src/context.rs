//! Execution context threaded through every executor call

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{BtchrrError, Result};

/// Cancellation and deadline for one multi-batch run.
///
/// The same context is handed unchanged to every executor call. Cancelling
/// the token or passing the deadline aborts the batches that have not run
/// yet; batches already executed are not undone.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecutionContext {
    /// A context with no deadline that is never cancelled unless asked to
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().timeout(timeout)
    }

    /// Set the deadline to `timeout` from now
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Set an absolute deadline
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// A child context: cancelled with its parent, keeps the parent's
    /// deadline unless `timeout` is sooner.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let own = timeout.map(|t| Instant::now() + t);
        let deadline = match (self.deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn get_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fail if the context is cancelled or its deadline has passed
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(BtchrrError::Cancelled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(BtchrrError::Timeout("deadline exceeded".into()));
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the context is cancelled or expires first
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        let guarded = async {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => Err(BtchrrError::Cancelled),
                res = fut => res,
            }
        };
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .map_err(|_| BtchrrError::Timeout("deadline exceeded".into()))?,
            None => guarded.await,
        }
    }
}
