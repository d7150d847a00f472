use async_trait::async_trait;
use firestore::{FirestoreConsistencySelector, FirestoreDb};
use uuid::Uuid;

use super::{first_where, get_by_id, put};
use crate::{
    db::{
        layout::{DressmakerDoc, SubscriptionDoc, DRESSMAKERS, SUBSCRIPTIONS},
        traits::SubscriptionRepository,
    },
    error::{Error, Result},
    models::{Dressmaker, Subscription},
};

#[derive(Clone)]
pub struct FirestoreSubscriptionRepository {
    db: FirestoreDb,
}

impl FirestoreSubscriptionRepository {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubscriptionRepository for FirestoreSubscriptionRepository {
    async fn create_for_dressmaker(&self, subscription: &Subscription) -> Result<()> {
        let mut transaction = self.db.begin_transaction().await?;
        let reader = self
            .db
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ));

        let dressmaker: Option<DressmakerDoc> =
            get_by_id(&reader, DRESSMAKERS, subscription.dressmaker_id).await?;
        let Some(dressmaker) = dressmaker else {
            transaction.rollback().await?;
            return Err(Error::not_found("dressmaker"));
        };
        let mut dressmaker = Dressmaker::from(dressmaker);
        dressmaker.attach_subscription(subscription.id);

        self.db
            .fluent()
            .update()
            .in_col(SUBSCRIPTIONS)
            .document_id(subscription.id.to_string())
            .object(&SubscriptionDoc::from(subscription))
            .add_to_transaction(&mut transaction)?;
        self.db
            .fluent()
            .update()
            .in_col(DRESSMAKERS)
            .document_id(dressmaker.id.to_string())
            .object(&DressmakerDoc::from(&dressmaker))
            .add_to_transaction(&mut transaction)?;
        transaction.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>> {
        let doc: Option<SubscriptionDoc> = get_by_id(&self.db, SUBSCRIPTIONS, id).await?;
        Ok(doc.map(Subscription::from))
    }

    async fn find_by_gateway_id(&self, gateway_id: &str) -> Result<Option<Subscription>> {
        let doc: Option<SubscriptionDoc> =
            first_where(&self.db, SUBSCRIPTIONS, "GatewayId", gateway_id.to_string()).await?;
        Ok(doc.map(Subscription::from))
    }

    async fn update(&self, subscription: &Subscription) -> Result<()> {
        if self.find_by_id(subscription.id).await?.is_none() {
            return Err(Error::not_found("subscription"));
        }
        put(
            &self.db,
            SUBSCRIPTIONS,
            subscription.id,
            &SubscriptionDoc::from(subscription),
        )
        .await
    }
}
