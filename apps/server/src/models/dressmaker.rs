use chrono::{DateTime, Utc};
use costura_geo::Location;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    pub location: Location,
}

impl Address {
    pub fn validate(&self) -> Result<()> {
        self.location.validate()?;
        Ok(())
    }
}

/// A service provider listed in the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dressmaker {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub contact: String,
    pub enabled: bool,
    pub grade: f64,
    pub services: Vec<String>,
    pub subscription_id: Option<Uuid>,
    pub address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDressmaker {
    #[serde(default)]
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "contact is required"))]
    pub contact: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "at least one service is required"))]
    pub services: Vec<String>,
    pub address: Address,
}

/// Partial update; empty strings and lists leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDressmaker {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub services: Option<Vec<String>>,
    pub address: Option<Address>,
}

impl Dressmaker {
    pub fn new(input: CreateDressmaker, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: input.email.trim().to_lowercase(),
            password_hash,
            name: input.name.trim().to_string(),
            contact: input.contact.trim().to_string(),
            enabled: false,
            grade: 0.0,
            services: normalize_services(input.services),
            subscription_id: None,
            address: input.address,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateDressmaker) {
        if let Some(name) = update.name.filter(|v| !v.trim().is_empty()) {
            self.name = name.trim().to_string();
        }
        if let Some(contact) = update.contact.filter(|v| !v.trim().is_empty()) {
            self.contact = contact.trim().to_string();
        }
        if let Some(services) = update.services {
            let services = normalize_services(services);
            if !services.is_empty() {
                self.services = services;
            }
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        self.touch();
    }

    pub fn enable(&mut self) {
        self.enabled = true;
        self.touch();
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.touch();
    }

    pub fn attach_subscription(&mut self, subscription_id: Uuid) {
        self.subscription_id = Some(subscription_id);
        self.touch();
    }

    pub fn set_grade(&mut self, grade: f64) {
        self.grade = grade;
        self.touch();
    }

    pub fn location(&self) -> &Location {
        &self.address.location
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Trim service tags and drop blank ones, preserving order.
pub fn normalize_services(services: Vec<String>) -> Vec<String> {
    services
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateDressmaker {
        CreateDressmaker {
            email: " Maria@Example.com ".to_string(),
            password: "secret".to_string(),
            name: "Maria".to_string(),
            contact: "+5511999999999".to_string(),
            services: vec![" Costura sob medida ".to_string(), "  ".to_string()],
            address: Address {
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
                neighborhood: "Sé".to_string(),
                street: "Praça da Sé".to_string(),
                number: "1".to_string(),
                location: Location::new(-23.55, -46.63),
            },
        }
    }

    #[test]
    fn new_dressmaker_starts_disabled_without_grade() {
        let dm = Dressmaker::new(input(), "hash".to_string());
        assert!(!dm.enabled);
        assert_eq!(dm.grade, 0.0);
        assert_eq!(dm.email, "maria@example.com");
        assert_eq!(dm.services, vec!["Costura sob medida".to_string()]);
        assert!(dm.subscription_id.is_none());
    }

    #[test]
    fn apply_update_ignores_blank_fields() {
        let mut dm = Dressmaker::new(input(), "hash".to_string());
        dm.apply_update(UpdateDressmaker {
            name: Some("  ".to_string()),
            contact: Some("+5511000000000".to_string()),
            services: Some(vec![]),
            address: None,
        });
        assert_eq!(dm.name, "Maria");
        assert_eq!(dm.contact, "+5511000000000");
        assert_eq!(dm.services.len(), 1);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let dm = Dressmaker::new(input(), "hash".to_string());
        let json = serde_json::to_value(&dm).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["address"]["location"]["latitude"], -23.55);
    }

    #[test]
    fn create_input_reports_missing_fields() {
        let mut bad = input();
        bad.name.clear();
        bad.services.clear();
        let err = crate::Error::from(bad.validate().unwrap_err());
        let message = err.to_string();
        assert!(message.contains("name is required"), "{message}");
        assert!(message.contains("at least one service"), "{message}");
    }
}
