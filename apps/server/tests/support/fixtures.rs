use serde_json::Value;

use super::DressmakerBuilder;

/// Praça da Sé, São Paulo
pub const SE_LAT: f64 = -23.55;
pub const SE_LNG: f64 = -46.63;

/// Dressmakers placed around the city centre: `(email, services, lat, lng)`.
///
/// The first two are within 5 km of Sé, the third about 7 km away and the
/// last in Rio de Janeiro.
pub const CITY_DRESSMAKERS: [(&str, &[&str], f64, f64); 4] = [
    ("se@costura.test", &["Costura sob medida", "Ajustes"], -23.551, -46.634),
    ("liberdade@costura.test", &["Bordado"], -23.559, -46.635),
    ("pinheiros@costura.test", &["Costura", "Bordado à mão"], -23.567, -46.70),
    ("rio@costura.test", &["Costura"], -22.90, -43.17),
];

pub fn city_dressmakers() -> Vec<Value> {
    CITY_DRESSMAKERS
        .iter()
        .map(|(email, services, lat, lng)| {
            DressmakerBuilder::new(*email)
                .services(services)
                .at(*lat, *lng)
                .build()
        })
        .collect()
}
