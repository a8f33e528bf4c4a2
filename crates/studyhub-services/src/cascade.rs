//! Per-step records for the client-side delete cascades.
//!
//! Cascades are best-effort and non-transactional: a failed step is logged
//! and the cascade continues, and the top-level delete is attempted
//! regardless. The report makes partial cleanup visible to the caller
//! instead of disappearing into the log.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeAction {
    DeleteNote,
    DeleteTopic,
    DeleteChannel,
    DeleteMembership,
    DeleteOrganization,
}

impl std::fmt::Display for CascadeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CascadeAction::DeleteNote => "delete note",
            CascadeAction::DeleteTopic => "delete topic",
            CascadeAction::DeleteChannel => "delete channel",
            CascadeAction::DeleteMembership => "delete membership",
            CascadeAction::DeleteOrganization => "delete organization",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "error")]
pub enum StepOutcome {
    Ok,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct CascadeStep {
    pub action: CascadeAction,
    /// Id of the entity the step targeted.
    pub target: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CascadeReport {
    pub steps: Vec<CascadeStep>,
}

impl CascadeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one step. Failures are logged and kept; the cascade goes on.
    pub fn record<T, E: std::fmt::Display>(
        &mut self,
        action: CascadeAction,
        target: &str,
        result: &Result<T, E>,
    ) {
        let outcome = match result {
            Ok(_) => StepOutcome::Ok,
            Err(e) => {
                tracing::warn!(%action, target, error = %e, "cascade step failed, continuing");
                StepOutcome::Failed(e.to_string())
            }
        };
        self.steps.push(CascadeStep {
            action,
            target: target.to_string(),
            outcome,
        });
    }

    pub fn succeeded(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Ok)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.steps.len() - self.succeeded()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}
