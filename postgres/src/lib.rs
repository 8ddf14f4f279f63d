//! `PostgreSQL` persistence for QuickStay.
//!
//! This crate provides:
//!
//! - [`PostgresBookingStore`]: the [`BookingStore`](quickstay_core::BookingStore)
//!   of record. Double booking is rejected by an `EXCLUDE USING gist`
//!   constraint, so the overlap check and the insert are one atomic statement.
//! - [`PostgresRoomCatalog`]: read access to rooms and hotels, plus the
//!   inserts used for seeding.
//!
//! # Example
//!
//! ```ignore
//! use quickstay_postgres::{connect, migrate, PostgresBookingStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = connect("postgres://localhost/quickstay", 10).await?;
//!     migrate(&pool).await?;
//!     let store = PostgresBookingStore::new(pool);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use quickstay_core::StoreError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

mod bookings;
mod catalog;

pub use bookings::PostgresBookingStore;
pub use catalog::PostgresRoomCatalog;

/// SQLSTATE raised by a violated exclusion constraint.
const EXCLUSION_VIOLATION: &str = "23P01";

/// Open a connection pool.
///
/// # Errors
///
/// Returns [`StoreError::Backend`] if the database is unreachable.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(|e| StoreError::Backend(format!("Failed to connect: {e}")))
}

/// Apply the bundled migrations.
///
/// # Errors
///
/// Returns [`StoreError::Backend`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Backend(format!("Migration failed: {e}")))
}

fn backend(context: &str, error: &sqlx::Error) -> StoreError {
    StoreError::Backend(format!("{context}: {error}"))
}

fn is_exclusion_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION)
    )
}

fn to_i64(value: u64, column: &str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Backend(format!("{column} out of range: {value}")))
}

fn to_u64(value: i64, column: &str) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Backend(format!("{column} is negative: {value}")))
}
