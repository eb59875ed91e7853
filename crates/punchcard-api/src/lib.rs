// punchcard-api: Async Rust client for the punchcard loyalty service API

pub mod auth;
pub mod client;
pub mod error;
pub mod redemptions;
pub mod rewards;
pub mod transport;
pub mod types;
pub mod users;

pub use client::ApiClient;
pub use error::Error;
pub use types::{
    CustomerProfileResponse, RedemptionResponse, RedemptionSubmission, RedemptionWireKind,
    RewardResponse,
};
