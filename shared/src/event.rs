use crate::capabilities::{PermissionsResult, RecordsResult, StatusUpdateResult};
use crate::model::{ActionId, CaseId};

/// Why a record load was issued. Decides busy state and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReason {
    Initial,
    ViewModeChanged,
    Reload,
    AfterAction,
}

impl LoadReason {
    #[must_use]
    pub const fn marks_busy(self) -> bool {
        !matches!(self, Self::Initial)
    }

    #[must_use]
    pub const fn notifies_success(self) -> bool {
        matches!(self, Self::ViewModeChanged | Self::Reload)
    }
}

/// User intents carry raw UI values; they are validated in `update`.
#[derive(Debug, Clone, Default)]
pub enum Event {
    #[default]
    Noop,

    Started,

    ViewModeChanged {
        value: String,
    },
    SearchChanged {
        text: String,
    },
    PriorityFilterChanged {
        value: String,
    },
    StatusFilterChanged {
        value: String,
    },
    SortRequested {
        field: String,
        direction: String,
    },
    RowActionInvoked {
        action: String,
        case_id: String,
    },
    ReloadRequested,

    DismissToast,
    DismissError,

    // Capability responses (boxed to keep the enum small)
    PermissionsLoaded(Box<PermissionsResult>),
    RecordsLoaded {
        generation: u64,
        reason: LoadReason,
        result: Box<RecordsResult>,
    },
    StatusUpdated {
        action_id: ActionId,
        case_id: CaseId,
        result: Box<StatusUpdateResult>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Started => "started",
            Self::ViewModeChanged { .. } => "view_mode_changed",
            Self::SearchChanged { .. } => "search_changed",
            Self::PriorityFilterChanged { .. } => "priority_filter_changed",
            Self::StatusFilterChanged { .. } => "status_filter_changed",
            Self::SortRequested { .. } => "sort_requested",
            Self::RowActionInvoked { .. } => "row_action_invoked",
            Self::ReloadRequested => "reload_requested",
            Self::DismissToast => "dismiss_toast",
            Self::DismissError => "dismiss_error",
            Self::PermissionsLoaded(_) => "permissions_loaded",
            Self::RecordsLoaded { .. } => "records_loaded",
            Self::StatusUpdated { .. } => "status_updated",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::ViewModeChanged { .. }
                | Self::SearchChanged { .. }
                | Self::PriorityFilterChanged { .. }
                | Self::StatusFilterChanged { .. }
                | Self::SortRequested { .. }
                | Self::RowActionInvoked { .. }
                | Self::ReloadRequested
                | Self::DismissToast
                | Self::DismissError
        )
    }
}
