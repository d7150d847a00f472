use axum::body::Bytes;
use serde_json::{json, Value};

/// Converts a JSON value to request body bytes
pub fn to_json_body(value: &Value) -> anyhow::Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

/// Builder for dressmaker registration payloads
pub struct DressmakerBuilder {
    email: String,
    password: String,
    name: String,
    contact: String,
    services: Vec<String>,
    latitude: f64,
    longitude: f64,
}

impl DressmakerBuilder {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: "s3cret".to_string(),
            name: "Ateliê Teste".to_string(),
            contact: "+5511999990000".to_string(),
            services: vec!["Costura sob medida".to_string()],
            latitude: -23.55,
            longitude: -46.63,
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn services(mut self, services: &[&str]) -> Self {
        self.services = services.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    pub fn build(self) -> Value {
        json!({
            "email": self.email,
            "password": self.password,
            "name": self.name,
            "contact": self.contact,
            "services": self.services,
            "address": {
                "city": "São Paulo",
                "state": "SP",
                "neighborhood": "Centro",
                "street": "Rua Direita",
                "number": "100",
                "location": {
                    "latitude": self.latitude,
                    "longitude": self.longitude,
                }
            }
        })
    }
}

pub fn user_payload(email: &str, password: &str) -> Value {
    json!({
        "email": email,
        "password": password,
        "name": "Cliente Teste",
        "location": { "latitude": -23.56, "longitude": -46.64 }
    })
}
