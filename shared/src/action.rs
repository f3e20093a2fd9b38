use serde::{Deserialize, Serialize};

use crate::model::{ActionId, CaseId, CaseStatus};

/// One-click row operations offered in the table's action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuickAction {
    InProgress,
    Waiting,
    Resolved,
    OnHold,
}

impl QuickAction {
    pub const ALL: [Self; 4] = [Self::InProgress, Self::Waiting, Self::Resolved, Self::OnHold];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Waiting => "waiting",
            Self::Resolved => "resolved",
            Self::OnHold => "on_hold",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "Set In Progress",
            Self::Waiting => "Set Waiting on Customer",
            Self::Resolved => "Set Resolved",
            Self::OnHold => "Set On Hold",
        }
    }

    #[must_use]
    pub fn target_status(self) -> CaseStatus {
        match self {
            Self::InProgress => CaseStatus::InProgress,
            Self::Waiting => CaseStatus::WaitingOnCustomer,
            Self::Resolved => CaseStatus::Resolved,
            Self::OnHold => CaseStatus::OnHold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl ActionState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub id: ActionId,
    pub case_id: CaseId,
    pub action: QuickAction,
    pub state: ActionState,
}

impl PendingAction {
    #[must_use]
    pub fn new(case_id: CaseId, action: QuickAction) -> Self {
        Self {
            id: ActionId::generate(),
            case_id,
            action,
            state: ActionState::Idle,
        }
    }

    #[must_use]
    pub fn target_status(&self) -> CaseStatus {
        self.action.target_status()
    }

    /// Idle → Submitting. Returns false from any other state.
    pub fn submit(&mut self) -> bool {
        self.transition(ActionState::Idle, ActionState::Submitting)
    }

    pub fn mark_succeeded(&mut self) -> bool {
        self.transition(ActionState::Submitting, ActionState::Succeeded)
    }

    pub fn mark_failed(&mut self) -> bool {
        self.transition(ActionState::Submitting, ActionState::Failed)
    }

    fn transition(&mut self, from: ActionState, to: ActionState) -> bool {
        if self.state != from {
            return false;
        }
        self.state = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_map_to_target_statuses() {
        let cases = [
            ("in_progress", "In Progress"),
            ("waiting", "Waiting on customer"),
            ("resolved", "Resolved"),
            ("on_hold", "On Hold"),
        ];
        for (name, status) in cases {
            let action = QuickAction::from_name(name).unwrap();
            assert_eq!(action.target_status().as_str(), status);
            assert_eq!(action.name(), name);
        }
    }

    #[test]
    fn unknown_names_are_not_actions() {
        assert_eq!(QuickAction::from_name("delete"), None);
        assert_eq!(QuickAction::from_name("Resolved"), None);
        assert_eq!(QuickAction::from_name(""), None);
    }

    #[test]
    fn lifecycle_idle_submitting_succeeded() {
        let mut pending = PendingAction::new(CaseId::new("a0B"), QuickAction::Resolved);
        assert_eq!(pending.state, ActionState::Idle);
        assert!(!pending.mark_succeeded());

        assert!(pending.submit());
        assert_eq!(pending.state, ActionState::Submitting);
        assert!(!pending.submit());

        assert!(pending.mark_succeeded());
        assert!(pending.state.is_terminal());
        assert!(!pending.mark_failed());
    }

    #[test]
    fn lifecycle_submitting_failed() {
        let mut pending = PendingAction::new(CaseId::new("a0B"), QuickAction::OnHold);
        pending.submit();
        assert!(pending.mark_failed());
        assert_eq!(pending.state, ActionState::Failed);
        assert_eq!(pending.target_status(), CaseStatus::OnHold);
    }
}
