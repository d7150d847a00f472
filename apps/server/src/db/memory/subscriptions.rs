use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use super::{by_id, decode, dressmakers, encode, Filter, MemoryStore};
use crate::{
    db::{layout::SubscriptionDoc, traits::SubscriptionRepository},
    error::{Error, Result},
    models::Subscription,
};

fn from_doc(doc: &serde_json::Value) -> Result<Subscription> {
    decode::<SubscriptionDoc>(doc).map(Subscription::from)
}

#[derive(Clone)]
pub struct MemorySubscriptionRepository {
    store: MemoryStore,
}

impl MemorySubscriptionRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SubscriptionRepository for MemorySubscriptionRepository {
    async fn create_for_dressmaker(&self, subscription: &Subscription) -> Result<()> {
        let subscription_doc = encode(&SubscriptionDoc::from(subscription))?;
        let mut collections = self.store.write().await;

        let filter = by_id(subscription.dressmaker_id);
        let mut dressmaker = match collections.dressmakers.first(&filter) {
            Some(doc) => dressmakers::from_doc(doc)?,
            None => return Err(Error::not_found("dressmaker")),
        };
        dressmaker.attach_subscription(subscription.id);
        let dressmaker_doc = dressmakers::to_doc(&dressmaker)?;

        collections.subscriptions.insert(subscription_doc);
        collections.dressmakers.replace(&filter, dressmaker_doc);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>> {
        let collections = self.store.read().await;
        collections
            .subscriptions
            .first(&by_id(id))
            .map(from_doc)
            .transpose()
    }

    async fn find_by_gateway_id(&self, gateway_id: &str) -> Result<Option<Subscription>> {
        let collections = self.store.read().await;
        collections
            .subscriptions
            .first(&[Filter::Eq("GatewayId", json!(gateway_id))])
            .map(from_doc)
            .transpose()
    }

    async fn update(&self, subscription: &Subscription) -> Result<()> {
        let doc = encode(&SubscriptionDoc::from(subscription))?;
        let mut collections = self.store.write().await;
        if collections.subscriptions.replace(&by_id(subscription.id), doc) {
            Ok(())
        } else {
            Err(Error::not_found("subscription"))
        }
    }
}
