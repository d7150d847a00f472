//! Google Cloud Firestore backend
//!
//! Documents use the shared PascalCase layout, keyed by their `ID`. Proximity
//! searches narrow candidates with range filters on
//! `Address.Location.Latitude` / `Address.Location.Longitude`; the exact
//! distance check, keyword matching and ordering run here because Firestore
//! has no spherical or substring predicates. Multi-document writes go through
//! transactions.
//!
//! `FIRESTORE_EMULATOR_HOST` points the client at a local emulator.

mod dressmakers;
mod reviews;
mod subscriptions;
mod users;

pub use dressmakers::FirestoreDressmakerRepository;
pub use reviews::FirestoreReviewRepository;
pub use subscriptions::FirestoreSubscriptionRepository;
pub use users::FirestoreUserRepository;

use anyhow::Context;
use firestore::{FirestoreDb, FirestoreDbOptions};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{config::DatabaseConfig, error::Result};

/// Open a client for the configured project and database.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<FirestoreDb> {
    let project_id = config
        .firestore_project_id
        .clone()
        .context("database.firestore_project_id is not set")?;
    let options = FirestoreDbOptions::new(project_id.clone())
        .with_database_id(config.firestore_database_id.clone());

    let db = FirestoreDb::with_options(options)
        .await
        .with_context(|| format!("failed to connect to Firestore project {project_id}"))?;
    tracing::info!(
        project_id = %project_id,
        database_id = %config.firestore_database_id,
        "Connected to Firestore"
    );
    Ok(db)
}

pub(crate) async fn get_by_id<T>(db: &FirestoreDb, collection: &str, id: Uuid) -> Result<Option<T>>
where
    T: DeserializeOwned + Send,
{
    let doc = db
        .fluent()
        .select()
        .by_id_in(collection)
        .obj::<T>()
        .one(id.to_string())
        .await?;
    Ok(doc)
}

/// First document whose `field` equals `value`.
pub(crate) async fn first_where<T>(
    db: &FirestoreDb,
    collection: &str,
    field: &'static str,
    value: String,
) -> Result<Option<T>>
where
    T: DeserializeOwned + Send,
{
    let docs: Vec<T> = db
        .fluent()
        .select()
        .from(collection)
        .filter(|q| q.for_all([q.field(field).eq(value.clone())]))
        .limit(1)
        .obj()
        .query()
        .await?;
    Ok(docs.into_iter().next())
}

/// Every document whose `field` equals `value`.
pub(crate) async fn all_where<T>(
    db: &FirestoreDb,
    collection: &str,
    field: &'static str,
    value: String,
) -> Result<Vec<T>>
where
    T: DeserializeOwned + Send,
{
    let docs = db
        .fluent()
        .select()
        .from(collection)
        .filter(|q| q.for_all([q.field(field).eq(value.clone())]))
        .obj()
        .query()
        .await?;
    Ok(docs)
}

/// Write `doc` under `id`, replacing any existing document.
pub(crate) async fn put<T>(db: &FirestoreDb, collection: &str, id: Uuid, doc: &T) -> Result<()>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    let _: T = db
        .fluent()
        .update()
        .in_col(collection)
        .document_id(id.to_string())
        .object(doc)
        .execute()
        .await?;
    Ok(())
}

/// Create `doc` under `id`; fails if the id is taken.
pub(crate) async fn insert<T>(db: &FirestoreDb, collection: &str, id: Uuid, doc: &T) -> Result<()>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    let _: T = db
        .fluent()
        .insert()
        .into(collection)
        .document_id(id.to_string())
        .object(doc)
        .execute()
        .await?;
    Ok(())
}
