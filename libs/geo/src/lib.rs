//! Geo-math used by proximity search.
//!
//! Stores that can run spherical queries natively (PostGIS) do not need this
//! crate. Stores that cannot (document collections) narrow candidates with a
//! [`BoundingBox`] and then keep only those within [`haversine_distance`].

#![forbid(unsafe_code)]

mod bbox;
mod distance;
mod error;
mod location;

pub use bbox::BoundingBox;
pub use distance::{haversine_distance, EARTH_RADIUS_METERS};
pub use error::{Error, Result};
pub use location::{Location, MAX_LATITUDE, MAX_LONGITUDE};
