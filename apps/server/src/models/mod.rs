//! Domain models for the marketplace

pub mod dressmaker;
pub mod review;
pub mod subscription;
pub mod user;

pub use dressmaker::{normalize_services, Address, CreateDressmaker, Dressmaker, UpdateDressmaker};
pub use review::{average_grade, CreateReview, Review};
pub use subscription::{
    CreateSubscription, Periodicity, Plan, PlanBuilder, PlanName, Price, Subscription,
    SubscriptionStatus,
};
pub use user::{CreateUser, User};
