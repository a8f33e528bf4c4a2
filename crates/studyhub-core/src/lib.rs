//! StudyHub Core Library
//!
//! This crate provides the domain models, error taxonomy, client
//! configuration, and local state stores shared by all StudyHub components.

pub mod config;
pub mod error;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, FieldError};
pub use store::{RatingStore, Session, SessionStore, StoreError, TaskStore};
