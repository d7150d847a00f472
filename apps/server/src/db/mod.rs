//! Database layer - repositories and data access

pub mod firestore;
pub mod layout;
pub mod memory;
pub mod postgres;
pub mod search;
pub mod traits;

pub use memory::MemoryStore;
pub use search::SearchParams;
pub use traits::{DressmakerRepository, ReviewRepository, SubscriptionRepository, UserRepository};

use ::firestore::FirestoreDb;
use sqlx::PgPool;
use std::sync::Arc;

/// One implementation of every repository, chosen at startup.
#[derive(Clone)]
pub struct Repositories {
    pub dressmakers: Arc<dyn DressmakerRepository>,
    pub users: Arc<dyn UserRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            dressmakers: Arc::new(postgres::PostgresDressmakerRepository::new(pool.clone())),
            users: Arc::new(postgres::PostgresUserRepository::new(pool.clone())),
            reviews: Arc::new(postgres::PostgresReviewRepository::new(pool.clone())),
            subscriptions: Arc::new(postgres::PostgresSubscriptionRepository::new(pool)),
        }
    }

    pub fn firestore(db: FirestoreDb) -> Self {
        Self {
            dressmakers: Arc::new(firestore::FirestoreDressmakerRepository::new(db.clone())),
            users: Arc::new(firestore::FirestoreUserRepository::new(db.clone())),
            reviews: Arc::new(firestore::FirestoreReviewRepository::new(db.clone())),
            subscriptions: Arc::new(firestore::FirestoreSubscriptionRepository::new(db)),
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        Self {
            dressmakers: Arc::new(memory::MemoryDressmakerRepository::new(store.clone())),
            users: Arc::new(memory::MemoryUserRepository::new(store.clone())),
            reviews: Arc::new(memory::MemoryReviewRepository::new(store.clone())),
            subscriptions: Arc::new(memory::MemorySubscriptionRepository::new(store)),
        }
    }
}
