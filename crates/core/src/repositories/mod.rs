//! Database-backed services, one per aggregate.
//!
//! Each service owns a clone of the connection pool. Multi-row state changes run inside a
//! single transaction.

pub mod availability;
pub mod bookings;
pub mod categories;
pub mod chat;
pub mod dashboards;
pub mod payments;
pub mod requests;
pub mod reviews;
pub mod users;

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
