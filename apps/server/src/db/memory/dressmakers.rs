use async_trait::async_trait;
use uuid::Uuid;

use super::{by_email, by_id, decode, encode, Filter, MemoryStore};
use crate::{
    db::{
        layout::{coordinate_windows, CoordinateWindow, DressmakerDoc, LATITUDE_FIELD, LONGITUDE_FIELD},
        search::SearchParams,
        traits::DressmakerRepository,
    },
    error::{Error, Result},
    models::Dressmaker,
};

pub(super) fn to_doc(dressmaker: &Dressmaker) -> Result<serde_json::Value> {
    encode(&DressmakerDoc::from(dressmaker))
}

pub(super) fn from_doc(doc: &serde_json::Value) -> Result<Dressmaker> {
    decode::<DressmakerDoc>(doc).map(Dressmaker::from)
}

#[derive(Clone)]
pub struct MemoryDressmakerRepository {
    store: MemoryStore,
}

impl MemoryDressmakerRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

fn window_filters(window: &CoordinateWindow) -> [Filter; 4] {
    [
        Filter::Gte(LATITUDE_FIELD, window.min_latitude),
        Filter::Lte(LATITUDE_FIELD, window.max_latitude),
        Filter::Gte(LONGITUDE_FIELD, window.min_longitude),
        Filter::Lte(LONGITUDE_FIELD, window.max_longitude),
    ]
}

#[async_trait]
impl DressmakerRepository for MemoryDressmakerRepository {
    async fn create(&self, dressmaker: &Dressmaker) -> Result<()> {
        let doc = to_doc(dressmaker)?;
        let mut collections = self.store.write().await;
        if collections
            .dressmakers
            .first(&by_email(&dressmaker.email))
            .is_some()
        {
            return Err(Error::already_exists("dressmaker"));
        }
        collections.dressmakers.insert(doc);
        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let collections = self.store.read().await;
        Ok(collections.dressmakers.first(&by_email(email)).is_some())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Dressmaker>> {
        let collections = self.store.read().await;
        collections
            .dressmakers
            .first(&by_email(email))
            .map(from_doc)
            .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Dressmaker>> {
        let collections = self.store.read().await;
        collections
            .dressmakers
            .first(&by_id(id))
            .map(from_doc)
            .transpose()
    }

    async fn update(&self, dressmaker: &Dressmaker) -> Result<()> {
        let doc = to_doc(dressmaker)?;
        let mut collections = self.store.write().await;
        if collections.dressmakers.replace(&by_id(dressmaker.id), doc) {
            Ok(())
        } else {
            Err(Error::not_found("dressmaker"))
        }
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<Dressmaker>> {
        let windows = coordinate_windows(params)?;

        let candidates = {
            let collections = self.store.read().await;
            match &windows {
                // Windows are disjoint, so no document is collected twice
                Some(windows) => windows
                    .iter()
                    .flat_map(|w| {
                        let filters = window_filters(w);
                        collections
                            .dressmakers
                            .query(&filters)
                            .map(from_doc)
                            .collect::<Vec<_>>()
                    })
                    .collect::<Result<Vec<_>>>()?,
                None => collections
                    .dressmakers
                    .all()
                    .map(from_doc)
                    .collect::<Result<Vec<_>>>()?,
            }
        };

        let found = params.rank(candidates);
        tracing::debug!(mode = params.mode(), matched = found.len(), "Memory search");
        Ok(found)
    }

    async fn distinct_services(&self) -> Result<Vec<String>> {
        let collections = self.store.read().await;
        let mut seen: Vec<String> = Vec::new();
        for doc in collections.dressmakers.all() {
            let services = doc
                .get("Services")
                .and_then(|v| v.as_array())
                .into_iter()
                .flatten()
                .filter_map(|v| v.as_str());
            for service in services {
                let service = service.trim();
                if !service.is_empty() && !seen.iter().any(|s| s == service) {
                    seen.push(service.to_string());
                }
            }
        }
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, CreateDressmaker};
    use costura_geo::Location;

    fn dressmaker(email: &str, lat: f64, lng: f64, services: &[&str]) -> Dressmaker {
        Dressmaker::new(
            CreateDressmaker {
                email: email.to_string(),
                password: "x".to_string(),
                name: "Test".to_string(),
                contact: "123".to_string(),
                services: services.iter().map(|s| s.to_string()).collect(),
                address: Address {
                    city: "São Paulo".to_string(),
                    state: "SP".to_string(),
                    neighborhood: String::new(),
                    street: String::new(),
                    number: String::new(),
                    location: Location::new(lat, lng),
                },
            },
            "hash".to_string(),
        )
    }

    async fn seeded() -> MemoryDressmakerRepository {
        let repo = MemoryDressmakerRepository::new(MemoryStore::new());
        repo.create(&dressmaker("near@x.com", -23.551, -46.631, &["Costura sob medida"]))
            .await
            .unwrap();
        repo.create(&dressmaker("mid@x.com", -23.56, -46.64, &["Bordado"]))
            .await
            .unwrap();
        repo.create(&dressmaker("rio@x.com", -22.9068, -43.1729, &["Costura", "Ajustes"]))
            .await
            .unwrap();
        repo
    }

    #[tokio::test]
    async fn stores_pascal_case_layout() {
        let store = MemoryStore::new();
        let repo = MemoryDressmakerRepository::new(store.clone());
        repo.create(&dressmaker("a@x.com", -23.55, -46.63, &["Bordado"]))
            .await
            .unwrap();

        let collections = store.read().await;
        let doc = collections.dressmakers.all().next().unwrap();
        assert_eq!(doc["Address"]["Location"]["Latitude"], -23.55);
        assert_eq!(doc["Email"], "a@x.com");
        assert!(doc.get("ID").is_some());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = seeded().await;
        let err = repo
            .create(&dressmaker("near@x.com", 0.0, 0.0, &["x"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn proximity_excludes_far_points_and_sorts_nearest_first() {
        let repo = seeded().await;
        let found = repo
            .search(&SearchParams::Proximity {
                center: Location::new(-23.55, -46.63),
                radius_meters: 5_000.0,
            })
            .await
            .unwrap();
        let emails: Vec<_> = found.iter().map(|d| d.email.as_str()).collect();
        assert_eq!(emails, vec!["near@x.com", "mid@x.com"]);
    }

    #[tokio::test]
    async fn same_location_is_ordered_by_id() {
        let repo = MemoryDressmakerRepository::new(MemoryStore::new());
        let mut second = dressmaker("second@x.com", -23.551, -46.631, &["Costura"]);
        second.id = Uuid::from_u128(2);
        let mut first = dressmaker("first@x.com", -23.551, -46.631, &["Costura"]);
        first.id = Uuid::from_u128(1);
        repo.create(&second).await.unwrap();
        repo.create(&first).await.unwrap();

        let found = repo
            .search(&SearchParams::Proximity {
                center: Location::new(-23.55, -46.63),
                radius_meters: 5_000.0,
            })
            .await
            .unwrap();
        let emails: Vec<_> = found.iter().map(|d| d.email.as_str()).collect();
        assert_eq!(emails, vec!["first@x.com", "second@x.com"]);
    }

    #[tokio::test]
    async fn proximity_reaches_across_the_antimeridian() {
        let repo = MemoryDressmakerRepository::new(MemoryStore::new());
        repo.create(&dressmaker("east@x.com", -17.8, 179.97, &["Costura"]))
            .await
            .unwrap();
        repo.create(&dressmaker("west@x.com", -17.8, -179.98, &["Costura"]))
            .await
            .unwrap();
        repo.create(&dressmaker("far@x.com", -17.8, 178.0, &["Costura"]))
            .await
            .unwrap();

        let found = repo
            .search(&SearchParams::Proximity {
                center: Location::new(-17.8, 179.95),
                radius_meters: 20_000.0,
            })
            .await
            .unwrap();
        let emails: Vec<_> = found.iter().map(|d| d.email.as_str()).collect();
        assert_eq!(emails, vec!["east@x.com", "west@x.com"]);
    }

    #[tokio::test]
    async fn combined_requires_radius_and_keywords() {
        let repo = seeded().await;
        let found = repo
            .search(&SearchParams::Combined {
                center: Location::new(-23.55, -46.63),
                radius_meters: 5_000.0,
                keywords: vec!["costura".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "near@x.com");
    }

    #[tokio::test]
    async fn distinct_services_in_first_seen_order() {
        let repo = seeded().await;
        let services = repo.distinct_services().await.unwrap();
        assert_eq!(
            services,
            vec!["Costura sob medida", "Bordado", "Costura", "Ajustes"]
        );
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let repo = seeded().await;
        let ghost = dressmaker("ghost@x.com", 0.0, 0.0, &["x"]);
        assert!(matches!(
            repo.update(&ghost).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }
}
