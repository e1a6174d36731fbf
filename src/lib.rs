pub mod config;
pub mod direction;
pub mod exchange;
pub mod identity;
pub mod models;
pub mod time_sync;
pub mod tracker;

pub use direction::infer_direction;
pub use identity::{identity_of, IdentityError, PositionId};
pub use models::*;
pub use tracker::PositionTracker;
