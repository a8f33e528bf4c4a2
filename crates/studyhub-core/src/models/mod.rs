//! Data models for the application
//!
//! Wire-facing structures organized by domain. Each sub-module pairs the
//! entity with its request DTOs. All ids pass through the [`id`] boundary
//! and are canonical strings client-side.

mod channel;
mod invitation;
mod membership;
mod note;
mod organization;
mod task;
mod topic;
mod upload;
mod user;

pub mod id;

// Re-export all models for convenient imports
pub use channel::*;
pub use invitation::*;
pub use membership::*;
pub use note::*;
pub use organization::*;
pub use task::*;
pub use topic::*;
pub use upload::*;
pub use user::*;
