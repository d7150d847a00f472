use crate::error::{Error, Result};

/// Latitude bound accepted for stored locations.
///
/// Tighter than the WGS84 limit: nothing is listed at the poles, where a
/// single degree of longitude shrinks to a few meters.
pub const MAX_LATITUDE: f64 = 85.0;

pub const MAX_LONGITUDE: f64 = 180.0;

/// A WGS84 point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a location, rejecting coordinates outside the accepted range.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self> {
        let location = Self::new(latitude, longitude);
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(Error::NotFinite);
        }
        if !(-MAX_LATITUDE..=MAX_LATITUDE).contains(&self.latitude) {
            return Err(Error::LatitudeOutOfRange {
                value: self.latitude,
                max: MAX_LATITUDE,
            });
        }
        if !(-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude) {
            return Err(Error::LongitudeOutOfRange {
                value: self.longitude,
                max: MAX_LONGITUDE,
            });
        }
        Ok(())
    }

    /// Distance to `other` in meters.
    pub fn distance_to(&self, other: &Location) -> f64 {
        crate::haversine_distance(self, other)
    }
}
