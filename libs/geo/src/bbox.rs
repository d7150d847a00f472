use crate::distance::EARTH_RADIUS_METERS;
use crate::error::{Error, Result};
use crate::location::Location;

/// Padding in degrees (about a millimeter) absorbing floating-point rounding
/// at the box edges.
const EDGE_PADDING_DEGREES: f64 = 1e-8;

/// Lat/lng rectangle enclosing every point within a radius of a center.
///
/// Containment is necessary, not sufficient: corners of the box lie farther
/// than the radius, so callers still apply an exact distance check.
///
/// The bounds are exact on the sphere for any radius:
/// - latitude spans `center ± r/R`;
/// - longitude spans `center ± asin(sin(r/R) / cos(lat))`, the widest
///   meridian offset reachable within the radius.
///
/// When the circle covers a pole, every longitude is reachable and the box
/// spans the full `[-180, 180]` range. When the span crosses the
/// antimeridian, `min_longitude > max_longitude` and the box is the union of
/// `[min_longitude, 180]` and `[-180, max_longitude]`; see
/// [`BoundingBox::longitude_ranges`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn around(center: &Location, radius_meters: f64) -> Result<Self> {
        if !radius_meters.is_finite() || radius_meters < 0.0 {
            return Err(Error::InvalidRadius(radius_meters));
        }
        if !center.latitude.is_finite() || !center.longitude.is_finite() {
            return Err(Error::NotFinite);
        }

        let angular = radius_meters / EARTH_RADIUS_METERS;
        let lat_delta = angular.to_degrees() + EDGE_PADDING_DEGREES;
        let min_latitude = center.latitude - lat_delta;
        let max_latitude = center.latitude + lat_delta;

        if min_latitude <= -90.0 || max_latitude >= 90.0 {
            return Ok(Self {
                min_latitude: min_latitude.max(-90.0),
                max_latitude: max_latitude.min(90.0),
                min_longitude: -180.0,
                max_longitude: 180.0,
            });
        }

        // Below the pole case the angular radius is under 90° and the ratio
        // stays under 1; the guard covers rounding at the boundary.
        let ratio = angular.sin() / center.latitude.to_radians().cos();
        if ratio >= 1.0 {
            return Ok(Self {
                min_latitude,
                max_latitude,
                min_longitude: -180.0,
                max_longitude: 180.0,
            });
        }
        let lng_delta = ratio.asin().to_degrees() + EDGE_PADDING_DEGREES;

        let mut min_longitude = center.longitude - lng_delta;
        let mut max_longitude = center.longitude + lng_delta;
        if min_longitude < -180.0 {
            min_longitude += 360.0;
        }
        if max_longitude > 180.0 {
            max_longitude -= 360.0;
        }

        Ok(Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        })
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.min_longitude > self.max_longitude
    }

    /// Disjoint `(min, max)` longitude intervals covered by the box: one, or
    /// two when it crosses the antimeridian.
    pub fn longitude_ranges(&self) -> Vec<(f64, f64)> {
        if self.crosses_antimeridian() {
            vec![(self.min_longitude, 180.0), (-180.0, self.max_longitude)]
        } else {
            vec![(self.min_longitude, self.max_longitude)]
        }
    }

    pub fn contains(&self, point: &Location) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && self
                .longitude_ranges()
                .iter()
                .any(|(min, max)| (*min..=*max).contains(&point.longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haversine_distance;

    #[test]
    fn zero_radius_is_degenerate_box() {
        let c = Location::new(-23.55, -46.63);
        let bbox = BoundingBox::around(&c, 0.0).unwrap();
        assert!((bbox.min_latitude - c.latitude).abs() < 1e-6);
        assert!((bbox.max_longitude - c.longitude).abs() < 1e-6);
        assert!(bbox.contains(&c));
    }

    #[test]
    fn longitude_span_widens_away_from_equator() {
        let equator = BoundingBox::around(&Location::new(0.0, 0.0), 10_000.0).unwrap();
        let south = BoundingBox::around(&Location::new(-60.0, 0.0), 10_000.0).unwrap();
        let eq_span = equator.max_longitude - equator.min_longitude;
        let south_span = south.max_longitude - south.min_longitude;
        // cos(60°) = 0.5
        assert!((south_span / eq_span - 2.0).abs() < 1e-4);
    }

    #[test]
    fn rejects_negative_radius() {
        let c = Location::new(0.0, 0.0);
        assert_eq!(
            BoundingBox::around(&c, -1.0).unwrap_err(),
            Error::InvalidRadius(-1.0)
        );
    }

    #[test]
    fn excludes_point_outside_latitude_band() {
        let c = Location::new(-23.55, -46.63);
        let bbox = BoundingBox::around(&c, 5_000.0).unwrap();
        assert!(!bbox.contains(&Location::new(-23.70, -46.63)));
    }

    #[test]
    fn wide_radius_keeps_the_widest_reachable_longitude() {
        let center = Location::new(60.0, 10.0);
        let bbox = BoundingBox::around(&center, 500_000.0).unwrap();
        // Just under 500 km away, past the `Δlat / cos(lat)` estimate of 18.9932°
        let edge = Location::new(60.655, 18.9937);
        assert!(haversine_distance(&center, &edge) < 500_000.0);
        assert!(bbox.contains(&edge));
    }

    #[test]
    fn wraps_across_the_antimeridian() {
        let center = Location::new(-17.8, 179.95);
        let bbox = BoundingBox::around(&center, 20_000.0).unwrap();
        assert!(bbox.crosses_antimeridian());
        assert_eq!(bbox.longitude_ranges().len(), 2);

        let across = Location::new(-17.8, -179.98);
        assert!(haversine_distance(&center, &across) < 20_000.0);
        assert!(bbox.contains(&across));
        assert!(!bbox.contains(&Location::new(-17.8, 0.0)));
    }

    #[test]
    fn circle_over_a_pole_spans_every_longitude() {
        let bbox = BoundingBox::around(&Location::new(84.0, 0.0), 1_000_000.0).unwrap();
        assert_eq!(bbox.max_latitude, 90.0);
        assert_eq!(bbox.longitude_ranges(), vec![(-180.0, 180.0)]);
        assert!(bbox.contains(&Location::new(88.0, 170.0)));
    }

    #[test]
    fn radius_beyond_a_hemisphere_covers_the_globe() {
        let bbox = BoundingBox::around(&Location::new(0.0, 0.0), 12_000_000.0).unwrap();
        assert_eq!(bbox.min_latitude, -90.0);
        assert_eq!(bbox.max_latitude, 90.0);
        assert!(bbox.contains(&Location::new(-80.0, 179.0)));
    }
}
