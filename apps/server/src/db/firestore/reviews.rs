use async_trait::async_trait;
use firestore::{FirestoreConsistencySelector, FirestoreDb};
use uuid::Uuid;

use super::{all_where, get_by_id};
use crate::{
    db::{
        layout::{DressmakerDoc, ReviewDoc, DRESSMAKERS, REVIEWS},
        traits::ReviewRepository,
    },
    error::{Error, Result},
    models::{average_grade, Dressmaker, Review},
};

#[derive(Clone)]
pub struct FirestoreReviewRepository {
    db: FirestoreDb,
}

impl FirestoreReviewRepository {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewRepository for FirestoreReviewRepository {
    async fn list_for_dressmaker(&self, dressmaker_id: Uuid) -> Result<Vec<Review>> {
        let docs: Vec<ReviewDoc> =
            all_where(&self.db, REVIEWS, "DressmakerID", dressmaker_id.to_string()).await?;
        let mut reviews: Vec<Review> = docs.into_iter().map(Review::from).collect();
        reviews.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(reviews)
    }

    async fn add_and_regrade(&self, review: &Review) -> Result<f64> {
        let mut transaction = self.db.begin_transaction().await?;
        let reader = self
            .db
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ));

        let dressmaker: Option<DressmakerDoc> =
            get_by_id(&reader, DRESSMAKERS, review.dressmaker_id).await?;
        let Some(dressmaker) = dressmaker else {
            transaction.rollback().await?;
            return Err(Error::not_found("dressmaker"));
        };
        let mut dressmaker = Dressmaker::from(dressmaker);

        let existing: Vec<ReviewDoc> = all_where(
            &reader,
            REVIEWS,
            "DressmakerID",
            review.dressmaker_id.to_string(),
        )
        .await?;
        let mut grades: Vec<f64> = existing.iter().map(|r| r.grade).collect();
        grades.push(review.grade);
        let grade = average_grade(&grades);
        dressmaker.set_grade(grade);

        self.db
            .fluent()
            .update()
            .in_col(REVIEWS)
            .document_id(review.id.to_string())
            .object(&ReviewDoc::from(review))
            .add_to_transaction(&mut transaction)?;
        self.db
            .fluent()
            .update()
            .in_col(DRESSMAKERS)
            .document_id(dressmaker.id.to_string())
            .object(&DressmakerDoc::from(&dressmaker))
            .add_to_transaction(&mut transaction)?;
        transaction.commit().await?;

        tracing::debug!(dressmaker_id = %dressmaker.id, grade, "Dressmaker regraded");
        Ok(grade)
    }
}
