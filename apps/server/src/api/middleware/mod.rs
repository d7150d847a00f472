//! Middleware stack for the API

pub mod layers;
pub mod request_id;
pub mod security;

pub use layers::{body_limit, compression, cors};
pub use request_id::request_id_middleware;
pub use security::security_headers_middleware;
