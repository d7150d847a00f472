//! Repository traits implemented by every storage backend

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::search::SearchParams,
    models::{Dressmaker, Review, Subscription, User},
    Result,
};

/// Storage for dressmakers
///
/// Implemented by the relational backend (PostGIS) and the document backends
/// (Firestore and the in-process memory store). All must return the same
/// dressmakers in the same order for the same `SearchParams`.
#[async_trait]
pub trait DressmakerRepository: Send + Sync {
    /// Insert a new dressmaker
    ///
    /// # Errors
    /// * `AlreadyExists` - If the email is already registered
    async fn create(&self, dressmaker: &Dressmaker) -> Result<()>;

    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Dressmaker>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Dressmaker>>;

    /// Replace the stored dressmaker with the same id
    ///
    /// # Errors
    /// * `NotFound` - If no dressmaker has this id
    async fn update(&self, dressmaker: &Dressmaker) -> Result<()>;

    /// Run a discovery query
    ///
    /// # Returns
    /// Every matching dressmaker, in a stable order: nearest first for
    /// geographic modes, oldest first otherwise. Pagination is applied by the
    /// caller.
    async fn search(&self, params: &SearchParams) -> Result<Vec<Dressmaker>>;

    /// Distinct service tags across all dressmakers, in first-seen order
    async fn distinct_services(&self) -> Result<Vec<String>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// # Errors
    /// * `AlreadyExists` - If the email is already registered
    async fn create(&self, user: &User) -> Result<()>;

    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn update(&self, user: &User) -> Result<()>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews of one dressmaker, oldest first
    async fn list_for_dressmaker(&self, dressmaker_id: Uuid) -> Result<Vec<Review>>;

    /// Insert a review and recompute the dressmaker's grade atomically
    ///
    /// # Returns
    /// The dressmaker's new grade
    ///
    /// # Errors
    /// * `NotFound` - If the dressmaker does not exist
    async fn add_and_regrade(&self, review: &Review) -> Result<f64>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a subscription and point its dressmaker at it atomically
    ///
    /// Either both writes land or neither does.
    ///
    /// # Errors
    /// * `NotFound` - If the dressmaker does not exist
    async fn create_for_dressmaker(&self, subscription: &Subscription) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>>;

    async fn find_by_gateway_id(&self, gateway_id: &str) -> Result<Option<Subscription>>;

    /// # Errors
    /// * `NotFound` - If no subscription has this id
    async fn update(&self, subscription: &Subscription) -> Result<()>;
}
