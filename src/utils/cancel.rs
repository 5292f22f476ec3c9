//! Caller-driven cancellation of store operations.

use std::future::Future;

use crate::error::{AppError, Result};

/// Runs `operation` until it finishes or `signal` resolves.
///
/// When the signal wins, the operation future is dropped. Any open
/// `sqlx::Transaction` inside it is dropped with it, which rolls the
/// transaction back, and [`AppError::Cancelled`] is returned. A signal that
/// is already complete cancels before the operation is polled.
pub async fn cancellable<T, S, F>(signal: S, operation: F) -> Result<T>
where
    S: Future<Output = ()>,
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        () = signal => {
            tracing::info!("operation cancelled by caller");
            Err(AppError::Cancelled)
        }
        result = operation => result,
    }
}
