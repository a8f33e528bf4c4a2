use serde::{Deserialize, Serialize};

/// Ad hoc per-organization task kept only on this machine. Never sent to the
/// backend; persisted by [`crate::store::TaskStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTask {
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>,
}
