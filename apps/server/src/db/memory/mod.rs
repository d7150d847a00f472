//! In-process document store
//!
//! Holds the same PascalCase documents as the Firestore backend, as JSON
//! values in insertion order. Queries are conjunctions of equality and
//! numeric range filters on dotted field paths. All collections sit behind a
//! single lock so multi-collection writes are atomic. Nothing is persisted.

mod dressmakers;
mod reviews;
mod subscriptions;
mod users;

pub use dressmakers::MemoryDressmakerRepository;
pub use reviews::MemoryReviewRepository;
pub use subscriptions::MemorySubscriptionRepository;
pub use users::MemoryUserRepository;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, Collections> {
        self.collections.read().await
    }

    pub(crate) async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, Collections> {
        self.collections.write().await
    }
}

#[derive(Default)]
pub(crate) struct Collections {
    pub dressmakers: Collection,
    pub users: Collection,
    pub reviews: Collection,
    pub subscriptions: Collection,
}

/// Documents in insertion order.
#[derive(Default)]
pub(crate) struct Collection {
    docs: Vec<Value>,
}

#[derive(Debug, Clone)]
pub(crate) enum Filter {
    Eq(&'static str, Value),
    Gte(&'static str, f64),
    Lte(&'static str, f64),
}

impl Filter {
    fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::Eq(path, expected) => field(doc, path) == Some(expected),
            Filter::Gte(path, bound) => number(doc, path).is_some_and(|v| v >= *bound),
            Filter::Lte(path, bound) => number(doc, path).is_some_and(|v| v <= *bound),
        }
    }
}

impl Collection {
    pub fn insert(&mut self, doc: Value) {
        self.docs.push(doc);
    }

    pub fn query<'a>(&'a self, filters: &'a [Filter]) -> impl Iterator<Item = &'a Value> + 'a {
        self.docs
            .iter()
            .filter(move |doc| filters.iter().all(|f| f.matches(doc)))
    }

    pub fn first<'a>(&'a self, filters: &'a [Filter]) -> Option<&'a Value> {
        self.query(filters).next()
    }

    pub fn all(&self) -> impl Iterator<Item = &Value> {
        self.docs.iter()
    }

    /// Replace the first document matching `filters`; false when none does.
    pub fn replace(&mut self, filters: &[Filter], doc: Value) -> bool {
        match self
            .docs
            .iter_mut()
            .find(|d| filters.iter().all(|f| f.matches(d)))
        {
            Some(slot) => {
                *slot = doc;
                true
            }
            None => false,
        }
    }
}

pub(crate) fn by_id(id: Uuid) -> [Filter; 1] {
    [Filter::Eq("ID", json!(id))]
}

pub(crate) fn by_email(email: &str) -> [Filter; 1] {
    [Filter::Eq("Email", json!(email))]
}

/// Resolve a dotted field path such as `Address.Location.Latitude`.
pub(crate) fn field<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |value, key| value.get(key))
}

fn number(doc: &Value, path: &str) -> Option<f64> {
    field(doc, path).and_then(Value::as_f64)
}

pub(crate) fn encode<T: Serialize>(record: &T) -> Result<Value> {
    serde_json::to_value(record)
        .map_err(|e| Error::Internal(format!("failed to encode document: {e}")))
}

pub(crate) fn decode<T: DeserializeOwned>(doc: &Value) -> Result<T> {
    serde_json::from_value(doc.clone())
        .map_err(|e| Error::Internal(format!("failed to decode document: {e}")))
}
