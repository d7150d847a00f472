use async_trait::async_trait;
use firestore::FirestoreDb;
use uuid::Uuid;

use super::{first_where, get_by_id, insert, put};
use crate::{
    db::{
        layout::{
            coordinate_windows, CoordinateWindow, DressmakerDoc, DRESSMAKERS, LATITUDE_FIELD,
            LONGITUDE_FIELD,
        },
        search::SearchParams,
        traits::DressmakerRepository,
    },
    error::{Error, Result},
    models::Dressmaker,
};

#[derive(Clone)]
pub struct FirestoreDressmakerRepository {
    db: FirestoreDb,
}

impl FirestoreDressmakerRepository {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    async fn in_window(&self, window: CoordinateWindow) -> Result<Vec<DressmakerDoc>> {
        let docs = self
            .db
            .fluent()
            .select()
            .from(DRESSMAKERS)
            .filter(move |q| {
                q.for_all([
                    q.field(LATITUDE_FIELD)
                        .greater_than_or_equal(window.min_latitude),
                    q.field(LATITUDE_FIELD)
                        .less_than_or_equal(window.max_latitude),
                    q.field(LONGITUDE_FIELD)
                        .greater_than_or_equal(window.min_longitude),
                    q.field(LONGITUDE_FIELD)
                        .less_than_or_equal(window.max_longitude),
                ])
            })
            .obj()
            .query()
            .await?;
        Ok(docs)
    }

    async fn scan(&self) -> Result<Vec<DressmakerDoc>> {
        let docs = self
            .db
            .fluent()
            .select()
            .from(DRESSMAKERS)
            .obj()
            .query()
            .await?;
        Ok(docs)
    }
}

#[async_trait]
impl DressmakerRepository for FirestoreDressmakerRepository {
    async fn create(&self, dressmaker: &Dressmaker) -> Result<()> {
        if self.exists_by_email(&dressmaker.email).await? {
            return Err(Error::already_exists("dressmaker"));
        }
        insert(
            &self.db,
            DRESSMAKERS,
            dressmaker.id,
            &DressmakerDoc::from(dressmaker),
        )
        .await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Dressmaker>> {
        let doc: Option<DressmakerDoc> =
            first_where(&self.db, DRESSMAKERS, "Email", email.to_string()).await?;
        Ok(doc.map(Dressmaker::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Dressmaker>> {
        let doc: Option<DressmakerDoc> = get_by_id(&self.db, DRESSMAKERS, id).await?;
        Ok(doc.map(Dressmaker::from))
    }

    async fn update(&self, dressmaker: &Dressmaker) -> Result<()> {
        if self.find_by_id(dressmaker.id).await?.is_none() {
            return Err(Error::not_found("dressmaker"));
        }
        put(
            &self.db,
            DRESSMAKERS,
            dressmaker.id,
            &DressmakerDoc::from(dressmaker),
        )
        .await
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<Dressmaker>> {
        let docs = match coordinate_windows(params)? {
            Some(windows) => {
                let mut docs = Vec::new();
                for window in windows {
                    docs.extend(self.in_window(window).await?);
                }
                docs
            }
            None => self.scan().await?,
        };

        let candidates = docs.len();
        let found = params.rank(docs.into_iter().map(Dressmaker::from).collect());
        tracing::debug!(
            mode = params.mode(),
            candidates,
            matched = found.len(),
            "Firestore search"
        );
        Ok(found)
    }

    async fn distinct_services(&self) -> Result<Vec<String>> {
        let mut dressmakers: Vec<Dressmaker> =
            self.scan().await?.into_iter().map(Dressmaker::from).collect();
        dressmakers.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut seen: Vec<String> = Vec::new();
        for service in dressmakers.iter().flat_map(|d| d.services.iter()) {
            let service = service.trim();
            if !service.is_empty() && !seen.iter().any(|s| s == service) {
                seen.push(service.to_string());
            }
        }
        Ok(seen)
    }
}
