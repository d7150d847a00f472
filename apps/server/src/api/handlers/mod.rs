//! Request handlers for API endpoints
//!
//! Handlers extract and validate input, call one service operation and wrap
//! the result in the response envelope.

pub mod dressmakers;
pub mod otp;
pub mod subscriptions;
pub mod users;

use serde::Serialize;

/// `{"data": ...}` envelope for single entities.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
