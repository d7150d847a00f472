//! Dressmaker registration, profile, discovery and reviews

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{Principal, PrincipalKind},
    config::Config,
    db::Repositories,
    error::{Error, Result},
    models::{CreateDressmaker, CreateReview, Dressmaker, Review, UpdateDressmaker},
    services::{
        pagination::{paginate, Page, PageRequest},
        password::hash_password,
        search::{resolve_search, DiscoveryQuery},
    },
};

/// A dressmaker together with the reviews left for them.
#[derive(Debug, Clone, Serialize)]
pub struct DressmakerProfile {
    #[serde(flatten)]
    pub dressmaker: Dressmaker,
    pub reviews: Vec<Review>,
}

pub struct DressmakerService {
    config: Arc<Config>,
    repos: Repositories,
}

impl DressmakerService {
    pub fn new(config: Arc<Config>, repos: Repositories) -> Self {
        Self { config, repos }
    }

    pub async fn create(&self, input: CreateDressmaker) -> Result<Dressmaker> {
        input.validate()?;
        input.address.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.repos.dressmakers.exists_by_email(&email).await? {
            return Err(Error::already_exists("dressmaker"));
        }

        let hash = hash_password(&input.password, self.config.auth.bcrypt_cost).await?;
        let dressmaker = Dressmaker::new(input, hash);
        if dressmaker.services.is_empty() {
            return Err(Error::Validation(
                "at least one service is required".to_string(),
            ));
        }

        self.repos.dressmakers.create(&dressmaker).await?;
        tracing::info!(dressmaker_id = %dressmaker.id, "Dressmaker registered");
        Ok(dressmaker)
    }

    pub async fn show(&self, id: Uuid) -> Result<DressmakerProfile> {
        let dressmaker = self.get(id).await?;
        let reviews = self.repos.reviews.list_for_dressmaker(id).await?;
        Ok(DressmakerProfile {
            dressmaker,
            reviews,
        })
    }

    /// Partial profile update; a dressmaker may only update itself.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: UpdateDressmaker,
    ) -> Result<Dressmaker> {
        principal.require(PrincipalKind::Dressmaker)?;
        if principal.subject != id {
            return Err(Error::Forbidden(
                "a dressmaker may only update its own profile".to_string(),
            ));
        }
        if let Some(address) = &input.address {
            address.validate()?;
        }

        let mut dressmaker = self.get(id).await?;
        dressmaker.apply_update(input);
        self.repos.dressmakers.update(&dressmaker).await?;
        Ok(dressmaker)
    }

    pub async fn discover(&self, query: &DiscoveryQuery) -> Result<Page<Dressmaker>> {
        let params = resolve_search(query)?;
        let request = PageRequest::resolve(query.limit, query.page, &self.config.pagination)?;

        let matches = self.repos.dressmakers.search(&params).await?;
        tracing::debug!(
            mode = params.mode(),
            total = matches.len(),
            page = request.page(),
            "Discovery search"
        );
        Ok(paginate(matches, request))
    }

    pub async fn services_catalog(&self) -> Result<Vec<String>> {
        self.repos.dressmakers.distinct_services().await
    }

    /// Record a user's review and regrade the dressmaker.
    pub async fn add_review(
        &self,
        principal: &Principal,
        dressmaker_id: Uuid,
        input: CreateReview,
    ) -> Result<Review> {
        principal.require(PrincipalKind::User)?;
        input.validate()?;
        if input.comment.trim().is_empty() {
            return Err(Error::Validation("comment is required".to_string()));
        }

        let review = Review::new(dressmaker_id, principal.subject, input);
        let grade = self.repos.reviews.add_and_regrade(&review).await?;
        tracing::info!(
            dressmaker_id = %dressmaker_id,
            review_id = %review.id,
            grade,
            "Review recorded"
        );
        Ok(review)
    }

    async fn get(&self, id: Uuid) -> Result<Dressmaker> {
        self.repos
            .dressmakers
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("dressmaker"))
    }
}
