//! Document layout shared by the document stores
//!
//! Fields are PascalCase, ids are `ID`-suffixed, and coordinates live at
//! `Address.Location.Latitude` / `Address.Location.Longitude` so they can be
//! range-filtered.

use chrono::{DateTime, Utc};
use costura_geo::{BoundingBox, Location};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::search::SearchParams,
    error::Result,
    models::{Address, Dressmaker, Plan, Review, Subscription, SubscriptionStatus, User},
};

pub const DRESSMAKERS: &str = "dressmakers";
pub const USERS: &str = "users";
pub const REVIEWS: &str = "dressmaker_reviews";
pub const SUBSCRIPTIONS: &str = "subscriptions";

pub const LATITUDE_FIELD: &str = "Address.Location.Latitude";
pub const LONGITUDE_FIELD: &str = "Address.Location.Longitude";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationDoc {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressDoc {
    pub city: String,
    pub state: String,
    pub neighborhood: String,
    pub street: String,
    pub number: String,
    pub location: LocationDoc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DressmakerDoc {
    #[serde(rename = "ID")]
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub name: String,
    pub contact: String,
    pub enabled: bool,
    pub grade: f64,
    pub services: Vec<String>,
    pub subscription_id: Option<Uuid>,
    pub address: AddressDoc,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDoc {
    #[serde(rename = "ID")]
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub name: String,
    pub enabled: bool,
    pub location: LocationDoc,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReviewDoc {
    #[serde(rename = "ID")]
    pub id: Uuid,
    #[serde(rename = "DressmakerID")]
    pub dressmaker_id: Uuid,
    #[serde(rename = "UserID")]
    pub user_id: Uuid,
    pub grade: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionDoc {
    #[serde(rename = "ID")]
    pub id: Uuid,
    #[serde(rename = "DressmakerID")]
    pub dressmaker_id: Uuid,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub grace_until: Option<DateTime<Utc>>,
    pub gateway_id: Option<String>,
    #[serde(rename = "PaymentURL")]
    pub payment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Location> for LocationDoc {
    fn from(l: &Location) -> Self {
        Self {
            latitude: l.latitude,
            longitude: l.longitude,
        }
    }
}

impl From<LocationDoc> for Location {
    fn from(l: LocationDoc) -> Self {
        Location::new(l.latitude, l.longitude)
    }
}

impl From<&Dressmaker> for DressmakerDoc {
    fn from(d: &Dressmaker) -> Self {
        Self {
            id: d.id,
            email: d.email.clone(),
            password: d.password_hash.clone(),
            name: d.name.clone(),
            contact: d.contact.clone(),
            enabled: d.enabled,
            grade: d.grade,
            services: d.services.clone(),
            subscription_id: d.subscription_id,
            address: AddressDoc {
                city: d.address.city.clone(),
                state: d.address.state.clone(),
                neighborhood: d.address.neighborhood.clone(),
                street: d.address.street.clone(),
                number: d.address.number.clone(),
                location: (&d.address.location).into(),
            },
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

impl From<DressmakerDoc> for Dressmaker {
    fn from(d: DressmakerDoc) -> Self {
        Self {
            id: d.id,
            email: d.email,
            password_hash: d.password,
            name: d.name,
            contact: d.contact,
            enabled: d.enabled,
            grade: d.grade,
            services: d.services,
            subscription_id: d.subscription_id,
            address: Address {
                city: d.address.city,
                state: d.address.state,
                neighborhood: d.address.neighborhood,
                street: d.address.street,
                number: d.address.number,
                location: d.address.location.into(),
            },
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

impl From<&User> for UserDoc {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            password: u.password_hash.clone(),
            name: u.name.clone(),
            enabled: u.enabled,
            location: (&u.location).into(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

impl From<UserDoc> for User {
    fn from(u: UserDoc) -> Self {
        Self {
            id: u.id,
            email: u.email,
            password_hash: u.password,
            name: u.name,
            enabled: u.enabled,
            location: u.location.into(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

impl From<&Review> for ReviewDoc {
    fn from(r: &Review) -> Self {
        Self {
            id: r.id,
            dressmaker_id: r.dressmaker_id,
            user_id: r.user_id,
            grade: r.grade,
            comment: r.comment.clone(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<ReviewDoc> for Review {
    fn from(r: ReviewDoc) -> Self {
        Self {
            id: r.id,
            dressmaker_id: r.dressmaker_id,
            user_id: r.user_id,
            grade: r.grade,
            comment: r.comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<&Subscription> for SubscriptionDoc {
    fn from(s: &Subscription) -> Self {
        Self {
            id: s.id,
            dressmaker_id: s.dressmaker_id,
            plan: s.plan.clone(),
            status: s.status,
            started_at: s.started_at,
            expires_at: s.expires_at,
            canceled_at: s.canceled_at,
            grace_until: s.grace_until,
            gateway_id: s.gateway_id.clone(),
            payment_url: s.payment_url.clone(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<SubscriptionDoc> for Subscription {
    fn from(s: SubscriptionDoc) -> Self {
        Self {
            id: s.id,
            dressmaker_id: s.dressmaker_id,
            plan: s.plan,
            status: s.status,
            started_at: s.started_at,
            expires_at: s.expires_at,
            canceled_at: s.canceled_at,
            grace_until: s.grace_until,
            gateway_id: s.gateway_id,
            payment_url: s.payment_url,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Inclusive coordinate ranges a document store can filter on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateWindow {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

/// Range pre-filters for a geographic search, one per longitude interval of
/// its bounding box (two across the antimeridian). `None` for modes without
/// an area.
pub fn coordinate_windows(params: &SearchParams) -> Result<Option<Vec<CoordinateWindow>>> {
    let Some((center, radius)) = params.area() else {
        return Ok(None);
    };
    let bbox = BoundingBox::around(center, radius)?;
    Ok(Some(
        bbox.longitude_ranges()
            .into_iter()
            .map(|(min_longitude, max_longitude)| CoordinateWindow {
                min_latitude: bbox.min_latitude,
                max_latitude: bbox.max_latitude,
                min_longitude,
                max_longitude,
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_geographic_modes_have_no_windows() {
        let keyword = SearchParams::Keyword {
            keywords: vec!["costura".to_string()],
        };
        assert!(coordinate_windows(&keyword).unwrap().is_none());
    }

    #[test]
    fn antimeridian_search_splits_into_two_windows() {
        let params = SearchParams::Proximity {
            center: Location::new(-17.8, 179.95),
            radius_meters: 20_000.0,
        };
        let windows = coordinate_windows(&params).unwrap().unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].max_longitude, 180.0);
        assert_eq!(windows[1].min_longitude, -180.0);
    }

    #[test]
    fn dressmaker_document_uses_nested_pascal_case() {
        let doc = DressmakerDoc {
            id: Uuid::nil(),
            email: "a@x.com".to_string(),
            password: "hash".to_string(),
            name: "A".to_string(),
            contact: "1".to_string(),
            enabled: false,
            grade: 0.0,
            services: vec!["Bordado".to_string()],
            subscription_id: None,
            address: AddressDoc {
                city: String::new(),
                state: String::new(),
                neighborhood: String::new(),
                street: String::new(),
                number: String::new(),
                location: LocationDoc {
                    latitude: -23.55,
                    longitude: -46.63,
                },
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["Address"]["Location"]["Latitude"], -23.55);
        assert!(value.get("ID").is_some());
        assert!(value.get("SubscriptionId").is_some());
    }
}
