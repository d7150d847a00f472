//! Application services: the operations behind each route

pub mod auth;
pub mod dressmaker;
pub mod otp;
pub mod pagination;
pub mod password;
pub mod search;
pub mod subscription;
pub mod user;

pub use auth::{AuthService, Credentials, Session};
pub use dressmaker::{DressmakerProfile, DressmakerService};
pub use otp::{OtpService, SendCode, VerifyCode};
pub use pagination::{paginate, Page, PageRequest, PaginationInfo};
pub use search::{resolve_search, DiscoveryQuery};
pub use subscription::{SubscriptionService, WebhookOutcome};
pub use user::UserService;
