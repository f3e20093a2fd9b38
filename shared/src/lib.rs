// lib.rs - Support case list core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod action;
pub mod capabilities;
pub mod columns;
pub mod event;
pub mod model;
pub mod reducer;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use action::{ActionState, PendingAction, QuickAction};
pub use app::App;
pub use capabilities::{
    BackendError, CaseServiceOperation, CaseServiceOutput, Capabilities, Effect, UserPermissions,
};
pub use event::{Event, LoadReason};
pub use model::{
    normalize, ActionId, CaseId, CaseStatus, ContactId, ContactRef, DisplayCaseRecord, Model,
    Priority, RawCaseRecord, UnixTimeMs, ViewMode, ViewState,
};
pub use reducer::{PriorityFilter, SortDirection, SortField, SortSpec, StatusFilter};

pub const CASE_RECORD_PATH: &str = "/lightning/r/Support_Case__c";
pub const CONTACT_RECORD_PATH: &str = "/lightning/r/Contact";
pub const NO_CONTACT_LABEL: &str = "No Contact";

pub const MY_CASES_TITLE: &str = "My Support Cases";
pub const ALL_CASES_TITLE: &str = "All Support Cases";
pub const NO_RECORDS_MESSAGE: &str = "No cases found.";
pub const NO_MATCHES_MESSAGE: &str = "No cases match the current filters.";

pub const SUCCESS_TITLE: &str = "Success";
pub const REFRESHED_MESSAGE: &str = "Case list refreshed";
pub const REFRESH_FAILED_TITLE: &str = "Error refreshing data";
pub const ACTION_FAILED_TITLE: &str = "Error updating case";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";
pub const LOAD_FAILED_MESSAGE: &str = "Unable to load support cases.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    PermissionFetch,
    DataFetch,
    ActionUpdate,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PermissionFetch => "PERMISSION_FETCH_ERROR",
            Self::DataFetch => "DATA_FETCH_ERROR",
            Self::ActionUpdate => "ACTION_UPDATE_ERROR",
        }
    }

    /// A missing permission answer will not fix itself on retry; the rest
    /// clear on the next successful request.
    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::PermissionFetch => ErrorSeverity::Permanent,
            Self::DataFetch | Self::ActionUpdate => ErrorSeverity::Transient,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::DataFetch | ErrorKind::ActionUpdate => self.message.clone(),
            ErrorKind::PermissionFetch => {
                "Unable to check your permissions. Showing your own cases only.".into()
            }
        }
    }

    /// Error stored after a failed record load.
    #[must_use]
    pub fn data_fetch(error: &BackendError) -> Self {
        Self::new(
            ErrorKind::DataFetch,
            error.backend_message().unwrap_or(LOAD_FAILED_MESSAGE),
        )
        .with_internal(error.to_string())
    }

    #[must_use]
    pub fn permission_fetch(error: &BackendError) -> Self {
        Self::new(ErrorKind::PermissionFetch, "permission check failed")
            .with_internal(error.to_string())
    }

    #[must_use]
    pub fn action_update(error: &BackendError, case_id: &CaseId) -> Self {
        Self::new(ErrorKind::ActionUpdate, notification_message(error))
            .with_internal(error.to_string())
            .with_context("case_id", case_id.as_str())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

/// Text for a failure notification: the backend's own message when it sent one.
#[must_use]
pub fn notification_message(error: &BackendError) -> String {
    error
        .backend_message()
        .unwrap_or(UNKNOWN_ERROR_MESSAGE)
        .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub title: String,
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            duration_ms: kind.default_duration_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub message: String,
    pub is_transient: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_transient: e.severity == ErrorSeverity::Transient,
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub title: String,
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            title: t.title.clone(),
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ViewModel {
    pub card_title: String,
    pub show_view_mode_selector: bool,
    pub view_mode: String,
    pub view_mode_options: Vec<columns::SelectOption>,

    pub search_text: String,
    pub priority_filter: String,
    pub priority_options: Vec<columns::SelectOption>,
    pub status_filter: String,
    pub status_options: Vec<columns::SelectOption>,
    pub sorted_by: String,
    pub sort_direction: String,

    pub columns: Vec<columns::ColumnView>,
    pub rows: Vec<DisplayCaseRecord>,
    pub has_data: bool,
    pub empty_message: Option<String>,

    pub is_loading: bool,
    pub error: Option<UserFacingError>,
    pub toast: Option<ToastView>,
}

pub mod app {
    use tracing::{debug, info, warn};

    use super::*;
    use crate::capabilities::{PermissionsResult, RecordsResult, StatusUpdateResult};

    #[derive(Default)]
    pub struct App;

    impl App {
        /// Issues the query selected by the current view mode.
        fn load_records(reason: LoadReason, model: &mut Model, caps: &Capabilities) {
            let generation = model.next_load_generation();
            let all = model.view.shows_all_records();
            if reason.marks_busy() {
                model.view.is_loading = true;
            }

            info!(generation, all, ?reason, "loading case records");
            caps.case_service.fetch_records(all, move |result| Event::RecordsLoaded {
                generation,
                reason,
                result: Box::new(result),
            });
        }

        fn handle_permissions(result: PermissionsResult, model: &mut Model, caps: &Capabilities) {
            let showed_all = model.view.shows_all_records();

            match result {
                Ok(UserPermissions { is_manager }) => {
                    model.view.set_manager(is_manager);
                    info!(is_manager, "permissions resolved");
                }
                Err(e) => {
                    // Fail closed: the all-records view stays out of reach.
                    model.view.set_manager(false);
                    let error = AppError::permission_fetch(&e);
                    warn!(%error, "continuing as non-manager");
                }
            }

            if showed_all && !model.view.shows_all_records() {
                Self::load_records(LoadReason::ViewModeChanged, model, caps);
            }
        }

        fn handle_records_loaded(
            generation: u64,
            reason: LoadReason,
            result: RecordsResult,
            model: &mut Model,
        ) {
            if !model.is_current_load(generation) {
                debug!(
                    generation,
                    latest = model.load_generation,
                    "dropping stale record load"
                );
                return;
            }

            if reason.marks_busy() {
                model.view.is_loading = false;
            }

            match result {
                Ok(records) => {
                    model.replace_records(&records);
                    info!(
                        count = model.records.len(),
                        visible = model.visible.len(),
                        ?reason,
                        "case records loaded"
                    );
                    if reason.notifies_success() {
                        model.show_toast(SUCCESS_TITLE, REFRESHED_MESSAGE, ToastKind::Success);
                    }
                }
                Err(e) => {
                    warn!(error = %e, ?reason, "case record load failed");
                    if reason.marks_busy() {
                        model.show_toast(REFRESH_FAILED_TITLE, notification_message(&e), ToastKind::Error);
                    }
                    model.fail_load(AppError::data_fetch(&e));
                }
            }
        }

        fn submit_action(action: QuickAction, case_id: CaseId, model: &mut Model, caps: &Capabilities) {
            let mut pending = PendingAction::new(case_id, action);
            pending.submit();

            let action_id = pending.id.clone();
            let case_id = pending.case_id.clone();
            let new_status = pending.target_status();

            model.view.is_loading = true;
            info!(%action_id, %case_id, status = %new_status, "submitting quick action");

            let callback_action_id = action_id.clone();
            let callback_case_id = case_id.clone();
            caps.case_service.update_status(case_id, new_status, move |result| Event::StatusUpdated {
                action_id: callback_action_id,
                case_id: callback_case_id,
                result: Box::new(result),
            });

            model.actions.insert(action_id, pending);
        }

        fn handle_status_updated(
            action_id: &ActionId,
            case_id: &CaseId,
            result: StatusUpdateResult,
            model: &mut Model,
            caps: &Capabilities,
        ) {
            // Cleared on every terminal state, success or failure.
            model.view.is_loading = false;

            let pending = model.actions.get_mut(action_id);
            if pending.is_none() {
                warn!(%action_id, %case_id, "status update for unknown action");
            }

            match result {
                Ok(()) => {
                    let message = match pending {
                        Some(p) => {
                            p.mark_succeeded();
                            format!("Case status updated to {}", p.target_status())
                        }
                        None => "Case status updated".to_string(),
                    };
                    info!(%action_id, %case_id, "quick action succeeded");
                    model.show_toast(SUCCESS_TITLE, message, ToastKind::Success);

                    Self::load_records(LoadReason::AfterAction, model, caps);
                }
                Err(e) => {
                    if let Some(p) = pending {
                        p.mark_failed();
                    }
                    let error = AppError::action_update(&e, case_id);
                    warn!(%action_id, %error, "quick action failed");
                    model.show_toast(ACTION_FAILED_TITLE, error.message, ToastKind::Error);
                }
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            if event.is_user_initiated() {
                debug!(event = event.name(), "user action");
            }

            match event {
                Event::Noop => {}

                Event::Started => {
                    caps.case_service
                        .fetch_permissions(|result| Event::PermissionsLoaded(Box::new(result)));
                    Self::load_records(LoadReason::Initial, model, caps);
                    caps.render.render();
                }

                Event::PermissionsLoaded(result) => {
                    Self::handle_permissions(*result, model, caps);
                    caps.render.render();
                }

                Event::ViewModeChanged { value } => {
                    let Some(mode) = ViewMode::from_value(&value) else {
                        debug!(%value, "ignoring unknown view mode");
                        return;
                    };
                    if !model.view.set_view_mode(mode) {
                        debug!("all-records view requires manager permission");
                        caps.render.render();
                        return;
                    }
                    Self::load_records(LoadReason::ViewModeChanged, model, caps);
                    caps.render.render();
                }

                Event::SearchChanged { text } => {
                    model.view.set_search_text(&text);
                    model.apply_filters();
                    caps.render.render();
                }

                Event::PriorityFilterChanged { value } => {
                    let Some(filter) = PriorityFilter::from_value(&value) else {
                        debug!(%value, "ignoring unknown priority filter");
                        return;
                    };
                    model.view.priority_filter = filter;
                    model.apply_filters();
                    caps.render.render();
                }

                Event::StatusFilterChanged { value } => {
                    let Some(filter) = StatusFilter::from_value(&value) else {
                        debug!(%value, "ignoring unknown status filter");
                        return;
                    };
                    model.view.status_filter = filter;
                    model.apply_filters();
                    caps.render.render();
                }

                Event::SortRequested { field, direction } => {
                    let (Some(field), Some(direction)) = (
                        SortField::from_field_name(&field),
                        SortDirection::from_value(&direction),
                    ) else {
                        debug!(%field, %direction, "ignoring sort on unknown field or direction");
                        return;
                    };
                    model.view.sort = SortSpec { field, direction };
                    model.apply_sort();
                    caps.render.render();
                }

                Event::RowActionInvoked { action, case_id } => {
                    let Some(quick_action) = QuickAction::from_name(&action) else {
                        debug!(%action, "ignoring unknown row action");
                        return;
                    };
                    if case_id.trim().is_empty() {
                        debug!(%action, "ignoring row action without a case id");
                        return;
                    }
                    Self::submit_action(quick_action, CaseId::new(case_id), model, caps);
                    caps.render.render();
                }

                Event::StatusUpdated {
                    action_id,
                    case_id,
                    result,
                } => {
                    Self::handle_status_updated(&action_id, &case_id, *result, model, caps);
                    caps.render.render();
                }

                Event::ReloadRequested => {
                    Self::load_records(LoadReason::Reload, model, caps);
                    caps.render.render();
                }

                Event::RecordsLoaded {
                    generation,
                    reason,
                    result,
                } => {
                    Self::handle_records_loaded(generation, reason, *result, model);
                    caps.render.render();
                }

                Event::DismissToast => {
                    model.clear_toast();
                    caps.render.render();
                }

                Event::DismissError => {
                    model.view.last_error = None;
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let view = &model.view;

            ViewModel {
                card_title: model.card_title().to_string(),
                show_view_mode_selector: view.is_manager,
                view_mode: view.view_mode.as_value().to_string(),
                view_mode_options: columns::view_mode_options(),

                search_text: view.search_text.clone(),
                priority_filter: view.priority_filter.as_value().to_string(),
                priority_options: columns::priority_options(),
                status_filter: view.status_filter.as_value().to_string(),
                status_options: columns::status_options(),
                sorted_by: view.sort.field.column_field().to_string(),
                sort_direction: view.sort.direction.as_value().to_string(),

                columns: columns::case_columns(),
                rows: model.visible.clone(),
                has_data: model.has_data(),
                empty_message: model.empty_state_message().map(str::to_string),

                is_loading: view.is_loading,
                error: view.last_error.as_ref().map(UserFacingError::from),
                toast: model.active_toast.as_ref().map(ToastView::from),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_tests {
        use super::*;

        #[test]
        fn test_app_error_new() {
            let error = AppError::new(ErrorKind::DataFetch, "Test message");

            assert_eq!(error.kind, ErrorKind::DataFetch);
            assert_eq!(error.severity, ErrorSeverity::Transient);
            assert_eq!(error.message, "Test message");
            assert!(error.internal_message.is_none());
        }

        #[test]
        fn test_app_error_with_context() {
            let error = AppError::new(ErrorKind::ActionUpdate, "Failed")
                .with_context("case_id", "a0B1")
                .with_internal("socket closed");

            assert_eq!(error.context.get("case_id"), Some(&"a0B1".to_string()));
            assert_eq!(error.to_string(), "[ACTION_UPDATE_ERROR] Failed (internal: socket closed)");
        }

        #[test]
        fn test_data_fetch_prefers_backend_message() {
            let error = AppError::data_fetch(&BackendError::rejected("Too many query rows"));
            assert_eq!(error.user_facing_message(), "Too many query rows");

            let error = AppError::data_fetch(&BackendError::unavailable("offline"));
            assert_eq!(error.user_facing_message(), LOAD_FAILED_MESSAGE);
            assert_eq!(error.internal_message.as_deref(), Some("backend unavailable: offline"));
        }

        #[test]
        fn test_user_facing_error_projection() {
            let error = AppError::permission_fetch(&BackendError::unavailable("timeout"));
            let facing = UserFacingError::from(&error);
            assert_eq!(facing.error_code, "PERMISSION_FETCH_ERROR");
            assert!(!facing.is_transient);
            assert_eq!(
                facing.message,
                "Unable to check your permissions. Showing your own cases only."
            );
        }

        #[test]
        fn test_action_update_carries_case_context() {
            let error = AppError::action_update(&BackendError::rejected("Record is locked"), &CaseId::new("a0B7"));
            assert_eq!(error.message, "Record is locked");
            assert_eq!(error.context.get("case_id").map(String::as_str), Some("a0B7"));
            assert_eq!(error.severity, ErrorSeverity::Transient);
        }

        #[test]
        fn test_notification_message_falls_back() {
            assert_eq!(notification_message(&BackendError::rejected("Locked")), "Locked");
            assert_eq!(
                notification_message(&BackendError::Rejected { message: None }),
                "Unknown error"
            );
        }
    }

    mod toast_tests {
        use super::*;

        #[test]
        fn test_toast_message_new() {
            let toast = ToastMessage::new("Success", "Case list refreshed", ToastKind::Success);

            assert_eq!(toast.title, "Success");
            assert_eq!(toast.kind, ToastKind::Success);
            assert_eq!(toast.duration_ms, 2000);
        }

        #[test]
        fn test_toast_view_copies_fields() {
            let toast = ToastMessage::new("Error updating case", "Locked", ToastKind::Error);
            let view = ToastView::from(&toast);
            assert_eq!(view.message, "Locked");
            assert_eq!(view.duration_ms, 5000);
        }
    }

    mod model_tests {
        use super::*;

        #[test]
        fn test_model_default() {
            let model = Model::default();

            assert_eq!(model.view.view_mode, ViewMode::Mine);
            assert_eq!(model.view.sort, SortSpec::default());
            assert_eq!(model.view.sort.field, SortField::CreatedDate);
            assert_eq!(model.view.sort.direction, SortDirection::Descending);
            assert_eq!(model.view.priority_filter, PriorityFilter::All);
            assert_eq!(model.view.status_filter, StatusFilter::All);
            assert!(model.view.search_text.is_empty());
            assert!(!model.view.is_manager);
            assert!(!model.view.is_loading);
            assert!(model.records.is_empty());
        }

        #[test]
        fn test_model_show_and_clear_toast() {
            let mut model = Model::default();

            model.show_toast("Success", "Test message", ToastKind::Success);
            let toast = model.active_toast.as_ref().unwrap();
            assert_eq!(toast.message, "Test message");

            model.clear_toast();
            assert!(model.active_toast.is_none());
        }
    }
}
