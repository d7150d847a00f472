//! Discovery query parsing: raw query string -> `SearchParams`

use costura_geo::Location;
use serde::Deserialize;

use crate::{
    db::search::{split_keywords, SearchParams},
    error::{Error, Result},
};

/// Query string of `GET /dressmakers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(alias = "distance")]
    pub max_distance: Option<f64>,
    pub services: Option<String>,
    pub limit: Option<usize>,
    pub page: Option<usize>,
}

/// Absent and zero both mean "not given".
fn given(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Pick the search mode for a discovery query.
///
/// Geographic filtering needs all of `latitude`, `longitude` and
/// `max_distance`. Supplying only some of them is rejected rather than
/// silently ignored.
pub fn resolve_search(query: &DiscoveryQuery) -> Result<SearchParams> {
    let keywords = query
        .services
        .as_deref()
        .map(split_keywords)
        .unwrap_or_default();

    let latitude = given(query.latitude);
    let longitude = given(query.longitude);
    let radius = given(query.max_distance);

    let area = match (latitude, longitude, radius) {
        (None, None, None) => None,
        (Some(lat), Some(lng), Some(radius)) => {
            if !radius.is_finite() || radius < 0.0 {
                return Err(Error::Validation(
                    "max_distance must be a non-negative number of meters".to_string(),
                ));
            }
            Some((Location::checked(lat, lng)?, radius))
        }
        _ => {
            let missing: Vec<&str> = [
                ("latitude", latitude),
                ("longitude", longitude),
                ("max_distance", radius),
            ]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect();
            return Err(Error::Validation(format!(
                "proximity search needs latitude, longitude and max_distance; missing {}",
                missing.join(", ")
            )));
        }
    };

    Ok(match (area, keywords.is_empty()) {
        (None, true) => SearchParams::Unfiltered,
        (None, false) => SearchParams::Keyword { keywords },
        (Some((center, radius_meters)), true) => SearchParams::Proximity {
            center,
            radius_meters,
        },
        (Some((center, radius_meters)), false) => SearchParams::Combined {
            center,
            radius_meters,
            keywords,
        },
    })
}
