use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("latitude must be between -{max} and {max}, got {value}")]
    LatitudeOutOfRange { value: f64, max: f64 },

    #[error("longitude must be between -{max} and {max}, got {value}")]
    LongitudeOutOfRange { value: f64, max: f64 },

    #[error("coordinates must be finite numbers")]
    NotFinite,

    #[error("radius must be a non-negative number of meters, got {0}")]
    InvalidRadius(f64),
}
