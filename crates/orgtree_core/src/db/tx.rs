//! Scoped write transactions.
//!
//! # Invariants
//! - The transaction is committed only when the body returns `Ok`.
//! - Every error path rolls back before the error reaches the caller.
//! - `BEGIN IMMEDIATE` takes the write lock up front, so reads made inside the
//!   body see the same snapshot the writes are applied to.

use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::Display;
use std::time::Instant;

/// Runs `body` inside one read-write transaction on `conn`.
///
/// The connection is borrowed shared, so stores holding the same
/// `&Connection` observe the open transaction for the duration of `body`.
///
/// # Errors
/// - Returns the body's error after rolling back.
/// - Returns begin/commit failures converted through `E: From<rusqlite::Error>`.
pub fn with_transaction<T, E, F>(conn: &Connection, operation: &str, body: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error> + Display,
{
    let started_at = Instant::now();
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    match body(&tx) {
        Ok(value) => {
            tx.commit()?;
            debug!(
                "event=tx_commit module=db status=ok operation={} duration_ms={}",
                operation,
                started_at.elapsed().as_millis()
            );
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=tx_rollback module=db status=error operation={} error={}",
                    operation, rollback_err
                );
            }
            warn!(
                "event=tx_rollback module=db status=ok operation={} duration_ms={} cause={}",
                operation,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
