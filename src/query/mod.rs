//! Query module
//!
//! This module contains the typed query builder, the driver-independent row
//! model, the [`Queryer`] seam the commands run against, and the
//! cancellation-aware [`ExecContext`].

pub mod builder;
pub mod postgres;
pub mod value;

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub use builder::{quote_ident, Query};
pub use postgres::connect;
pub use value::{QueryResult, Row, Value};

/// Anything that can run a catalog query.
///
/// The core borrows a `Queryer` for the duration of a call and never closes
/// or reconfigures it.
#[async_trait]
pub trait Queryer: Send + Sync {
    /// Run `query` and return every row
    async fn query(&self, query: &Query) -> Result<QueryResult>;

    /// Stop whatever statement is running on the server.
    ///
    /// Called after a query future is abandoned on cancellation or timeout.
    async fn cancel(&self) -> Result<()> {
        Ok(())
    }
}

/// Per-call execution settings threaded through every query
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
    strict_patterns: bool,
}

impl ExecContext {
    /// Create a context with no timeout and a fresh cancellation token
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Bound each individual query by `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject patterns with an unterminated quote
    pub fn with_strict_patterns(mut self, strict: bool) -> Self {
        self.strict_patterns = strict;
        self
    }

    /// Token that aborts the current call when cancelled
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether patterns are compiled strictly
    pub fn strict_patterns(&self) -> bool {
        self.strict_patterns
    }

    /// Compile a user pattern according to this context's strictness
    pub fn compile_pattern(&self, pattern: &str) -> Result<crate::pattern::NamePattern> {
        if self.strict_patterns {
            crate::pattern::compile_strict(pattern)
        } else {
            Ok(crate::pattern::compile(pattern))
        }
    }

    /// Run one query, honouring cancellation and the per-query timeout
    pub async fn run(&self, db: &dyn Queryer, query: &Query) -> Result<QueryResult> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        debug!(query = query.label(), params = query.params().len(), "running catalog query");

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            res = with_timeout(self.timeout, db.query(query)) => res,
        };

        // Dropping the future leaves the statement running server-side
        if let Err(Error::Cancelled | Error::Timeout(_)) = &outcome {
            if let Err(e) = db.cancel().await {
                warn!(query = query.label(), error = %e, "failed to cancel server-side query");
            }
        }
        outcome
    }

    /// Run a query expected to return at most one row
    pub async fn run_opt(&self, db: &dyn Queryer, query: &Query) -> Result<Option<Row>> {
        let result = self.run(db, query).await?;
        Ok(result.rows.into_iter().next())
    }

    /// Run a query expected to return exactly one row
    pub async fn run_one(&self, db: &dyn Queryer, query: &Query) -> Result<Row> {
        self.run_opt(db, query).await?.ok_or_else(|| {
            Error::query(query.label(), "query returned no rows")
        })
    }
}

async fn with_timeout<F>(timeout: Option<Duration>, fut: F) -> Result<QueryResult>
where
    F: std::future::Future<Output = Result<QueryResult>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout(limit))?,
        None => fut.await,
    }
}
