//! HTTP request handlers for the REST API.

pub mod account;
pub mod dialog;
pub mod dispatch;
pub mod event;
pub mod template;

use std::future::Future;
use std::time::Duration;

use crate::http::error::AppError;

/// Run `work` under the configured request timeout.
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    what: &str,
    work: impl Future<Output = T>,
) -> Result<T, AppError> {
    tokio::time::timeout(limit, work)
        .await
        .map_err(|_| AppError::Timeout(format!("{what} timed out after {}s", limit.as_secs())))
}
