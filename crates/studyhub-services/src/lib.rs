//! StudyHub client services
//!
//! The two page orchestrators (workspace, dashboard), the auth/profile
//! facades, and the cascade report shared by both delete flows. All backend
//! interaction goes through `studyhub_api_client::ApiClient`; local state is
//! a cache invalidated by re-fetch after every mutation.

pub mod cascade;
pub mod dashboard;
pub mod profile;
pub mod session;
pub mod workspace;

pub use cascade::{CascadeAction, CascadeReport, CascadeStep, StepOutcome};
pub use dashboard::Dashboard;
pub use profile::{ProfileService, UsageStats};
pub use session::SessionManager;
pub use workspace::{derive_title, Workspace};
