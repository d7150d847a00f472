//! PostgreSQL + PostGIS backend

mod dressmakers;
mod reviews;
mod subscriptions;
mod users;

pub use dressmakers::PostgresDressmakerRepository;
pub use reviews::PostgresReviewRepository;
pub use subscriptions::PostgresSubscriptionRepository;
pub use users::PostgresUserRepository;

use crate::error::Error;

/// Map a write failure, turning unique-key violations into `AlreadyExists`.
pub(crate) fn map_write_error(err: sqlx::Error, entity: &str) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::already_exists(entity),
        _ => Error::Database(err),
    }
}
