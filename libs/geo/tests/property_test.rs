//! Property-based tests using QuickCheck

use costura_geo::{haversine_distance, BoundingBox, Location, EARTH_RADIUS_METERS};
use quickcheck::{QuickCheck, TestResult};

/// Map an arbitrary float into `[-bound, bound]`, discarding non-finite input.
fn squash(value: f64, bound: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    Some((value % bound).clamp(-bound, bound))
}

/// Property: haversine distance is symmetric
#[test]
fn prop_distance_symmetric() {
    fn prop(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> TestResult {
        let (Some(lat1), Some(lng1), Some(lat2), Some(lng2)) = (
            squash(lat1, 85.0),
            squash(lng1, 180.0),
            squash(lat2, 85.0),
            squash(lng2, 180.0),
        ) else {
            return TestResult::discard();
        };

        let a = Location::new(lat1, lng1);
        let b = Location::new(lat2, lng2);
        let ab = haversine_distance(&a, &b);
        let ba = haversine_distance(&b, &a);
        TestResult::from_bool((ab - ba).abs() < 1e-6)
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(f64, f64, f64, f64) -> TestResult);
}

/// Property: distance from a point to itself is zero
#[test]
fn prop_distance_identity() {
    fn prop(lat: f64, lng: f64) -> TestResult {
        let (Some(lat), Some(lng)) = (squash(lat, 85.0), squash(lng, 180.0)) else {
            return TestResult::discard();
        };
        let p = Location::new(lat, lng);
        TestResult::from_bool(haversine_distance(&p, &p) == 0.0)
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(f64, f64) -> TestResult);
}

/// Wrap a longitude in degrees into `[-180, 180]`.
fn normalize_longitude(lng: f64) -> f64 {
    (lng + 540.0).rem_euclid(360.0) - 180.0
}

/// Destination `fraction * radius` meters from `center` along `bearing`.
fn destination(center: &Location, radius: f64, bearing: f64, fraction: f64) -> Location {
    let delta = fraction * radius / EARTH_RADIUS_METERS;
    let lat1 = center.latitude.to_radians();
    let lng1 = center.longitude.to_radians();
    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos()).asin();
    let lng2 = lng1
        + (bearing.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());
    Location::new(lat2.to_degrees(), normalize_longitude(lng2.to_degrees()))
}

/// Property: every point within the radius lies inside the bounding box,
/// including continental radii, high latitudes and the antimeridian
#[test]
fn prop_bounding_box_contains_points_within_radius() {
    fn prop(lat: f64, lng: f64, radius: u32, bearing: f64, fraction: f64) -> TestResult {
        let (Some(lat), Some(lng), Some(bearing), Some(fraction)) = (
            squash(lat, 85.0),
            squash(lng, 180.0),
            squash(bearing, std::f64::consts::PI),
            squash(fraction, 1.0),
        ) else {
            return TestResult::discard();
        };
        let radius = f64::from(radius % 5_000_000 + 1);
        let center = Location::new(lat, lng);
        let point = destination(&center, radius, bearing, fraction.abs());

        if !point.latitude.is_finite() || haversine_distance(&center, &point) > radius {
            return TestResult::discard();
        }

        let bbox = BoundingBox::around(&center, radius).unwrap();
        TestResult::from_bool(bbox.contains(&point))
    }

    QuickCheck::new()
        .tests(1000)
        .quickcheck(prop as fn(f64, f64, u32, f64, f64) -> TestResult);
}

/// Property: points on the tangent meridian at the full radius stay inside
#[test]
fn prop_bounding_box_reaches_the_widest_longitude() {
    fn prop(lat: f64, lng: f64, radius: u32) -> TestResult {
        let (Some(lat), Some(lng)) = (squash(lat, 80.0), squash(lng, 180.0)) else {
            return TestResult::discard();
        };
        let radius = f64::from(radius % 2_000_000 + 1);
        let center = Location::new(lat, lng);
        let bbox = BoundingBox::around(&center, radius).unwrap();

        // The easternmost point of the circle lies where the great circle from
        // the center meets its meridian at a right angle.
        let d = radius / EARTH_RADIUS_METERS;
        let lat1 = lat.to_radians();
        let ratio = d.sin() / lat1.cos();
        if ratio >= 1.0 {
            return TestResult::discard();
        }
        let tangent_lat = (lat1.sin() / d.cos()).asin();
        if !tangent_lat.is_finite() {
            return TestResult::discard();
        }
        let tangent = Location::new(
            tangent_lat.to_degrees(),
            normalize_longitude(lng + ratio.asin().to_degrees()),
        );
        TestResult::from_bool(bbox.contains(&tangent))
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(f64, f64, u32) -> TestResult);
}
