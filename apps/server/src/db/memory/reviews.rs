use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use super::{by_id, decode, dressmakers, encode, Filter, MemoryStore};
use crate::{
    db::{layout::ReviewDoc, traits::ReviewRepository},
    error::{Error, Result},
    models::{average_grade, Review},
};

fn of_dressmaker(dressmaker_id: Uuid) -> [Filter; 1] {
    [Filter::Eq("DressmakerID", json!(dressmaker_id))]
}

#[derive(Clone)]
pub struct MemoryReviewRepository {
    store: MemoryStore,
}

impl MemoryReviewRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn list_for_dressmaker(&self, dressmaker_id: Uuid) -> Result<Vec<Review>> {
        let collections = self.store.read().await;
        collections
            .reviews
            .query(&of_dressmaker(dressmaker_id))
            .map(|doc| decode::<ReviewDoc>(doc).map(Review::from))
            .collect()
    }

    async fn add_and_regrade(&self, review: &Review) -> Result<f64> {
        let review_doc = encode(&ReviewDoc::from(review))?;
        let mut collections = self.store.write().await;

        let filter = by_id(review.dressmaker_id);
        let mut dressmaker = match collections.dressmakers.first(&filter) {
            Some(doc) => dressmakers::from_doc(doc)?,
            None => return Err(Error::not_found("dressmaker")),
        };

        let mut grades: Vec<f64> = collections
            .reviews
            .query(&of_dressmaker(review.dressmaker_id))
            .filter_map(|doc| doc.get("Grade").and_then(|g| g.as_f64()))
            .collect();
        grades.push(review.grade);
        let grade = average_grade(&grades);
        dressmaker.set_grade(grade);

        let dressmaker_doc = dressmakers::to_doc(&dressmaker)?;
        collections.reviews.insert(review_doc);
        collections.dressmakers.replace(&filter, dressmaker_doc);
        Ok(grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory::MemoryDressmakerRepository, traits::DressmakerRepository};
    use crate::models::{Address, CreateDressmaker, CreateReview, Dressmaker};
    use costura_geo::Location;

    fn review(dressmaker_id: Uuid, grade: f64) -> Review {
        Review::new(
            dressmaker_id,
            Uuid::new_v4(),
            CreateReview {
                grade,
                comment: "ok".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn regrade_averages_every_review() {
        let store = MemoryStore::new();
        let dressmakers = MemoryDressmakerRepository::new(store.clone());
        let reviews = MemoryReviewRepository::new(store);
        let dm = Dressmaker::new(
            CreateDressmaker {
                email: "dm@x.com".to_string(),
                password: "x".to_string(),
                name: "Dm".to_string(),
                contact: "1".to_string(),
                services: vec!["Costura".to_string()],
                address: Address {
                    city: String::new(),
                    state: String::new(),
                    neighborhood: String::new(),
                    street: String::new(),
                    number: String::new(),
                    location: Location::new(-23.55, -46.63),
                },
            },
            "hash".to_string(),
        );
        dressmakers.create(&dm).await.unwrap();

        assert_eq!(reviews.add_and_regrade(&review(dm.id, 5.0)).await.unwrap(), 5.0);
        assert_eq!(reviews.add_and_regrade(&review(dm.id, 2.0)).await.unwrap(), 4.0);

        let stored = dressmakers.find_by_id(dm.id).await.unwrap().unwrap();
        assert_eq!(stored.grade, 4.0);
        assert_eq!(reviews.list_for_dressmaker(dm.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn review_of_unknown_dressmaker_is_not_stored() {
        let reviews = MemoryReviewRepository::new(MemoryStore::new());
        let ghost = Uuid::new_v4();
        let err = reviews.add_and_regrade(&review(ghost, 3.0)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(reviews.list_for_dressmaker(ghost).await.unwrap().is_empty());
    }
}
