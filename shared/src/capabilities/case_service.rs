use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{CaseId, CaseStatus, RawCaseRecord};

/// Remote procedures the support case list depends on. The shell owns the
/// transport; the core only describes what it wants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CaseServiceOperation {
    FetchMyRecords,
    FetchAllRecords,
    FetchPermissions,
    UpdateStatus {
        case_id: CaseId,
        new_status: CaseStatus,
    },
}

impl CaseServiceOperation {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FetchMyRecords => "fetch_my_records",
            Self::FetchAllRecords => "fetch_all_records",
            Self::FetchPermissions => "fetch_permissions",
            Self::UpdateStatus { .. } => "update_status",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserPermissions {
    pub is_manager: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CaseServiceOutput {
    Records(Vec<RawCaseRecord>),
    Permissions(UserPermissions),
    StatusUpdated,
    Failed(BackendError),
}

impl Operation for CaseServiceOperation {
    type Output = CaseServiceOutput;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum BackendError {
    #[error("request rejected by the server{}", rejection_suffix(.message))]
    Rejected { message: Option<String> },

    #[error("backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("unexpected response to {operation}")]
    UnexpectedResponse { operation: String },
}

fn rejection_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl BackendError {
    /// Builds a rejection from the platform error body (`{"message": "..."}`).
    /// Bodies that are not JSON, or carry no message, become a rejection
    /// without a message.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());
        Self::Rejected { message }
    }

    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// The message the backend attached to the failure, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => message.as_deref(),
            Self::Unavailable { .. } | Self::UnexpectedResponse { .. } => None,
        }
    }

    fn unexpected(operation: &CaseServiceOperation) -> Self {
        Self::UnexpectedResponse {
            operation: operation.name().to_string(),
        }
    }
}

impl CaseServiceOutput {
    fn into_records(self, operation: &CaseServiceOperation) -> Result<Vec<RawCaseRecord>, BackendError> {
        match self {
            Self::Records(records) => Ok(records),
            Self::Failed(e) => Err(e),
            Self::Permissions(_) | Self::StatusUpdated => Err(BackendError::unexpected(operation)),
        }
    }

    fn into_permissions(self, operation: &CaseServiceOperation) -> Result<UserPermissions, BackendError> {
        match self {
            Self::Permissions(permissions) => Ok(permissions),
            Self::Failed(e) => Err(e),
            Self::Records(_) | Self::StatusUpdated => Err(BackendError::unexpected(operation)),
        }
    }

    fn into_status_updated(self, operation: &CaseServiceOperation) -> Result<(), BackendError> {
        match self {
            Self::StatusUpdated => Ok(()),
            Self::Failed(e) => Err(e),
            Self::Records(_) | Self::Permissions(_) => Err(BackendError::unexpected(operation)),
        }
    }
}

pub type RecordsResult = Result<Vec<RawCaseRecord>, BackendError>;
pub type PermissionsResult = Result<UserPermissions, BackendError>;
pub type StatusUpdateResult = Result<(), BackendError>;

pub struct CaseService<E> {
    context: CapabilityContext<CaseServiceOperation, E>,
}

impl<E> Clone for CaseService<E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for CaseService<Ev> {
    type Operation = CaseServiceOperation;
    type MappedSelf<MappedEv> = CaseService<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        CaseService::new(self.context.map_event(f))
    }
}

impl<E> CaseService<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<CaseServiceOperation, E>) -> Self {
        Self { context }
    }

    /// `all == false` fetches the caller's own records.
    pub fn fetch_records<F>(&self, all: bool, callback: F)
    where
        F: FnOnce(RecordsResult) -> E + Send + 'static,
    {
        let operation = if all {
            CaseServiceOperation::FetchAllRecords
        } else {
            CaseServiceOperation::FetchMyRecords
        };
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context.request_from_shell(operation.clone()).await;
            context.update_app(callback(output.into_records(&operation)));
        });
    }

    pub fn fetch_permissions<F>(&self, callback: F)
    where
        F: FnOnce(PermissionsResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let operation = CaseServiceOperation::FetchPermissions;
            let output = context.request_from_shell(operation.clone()).await;
            context.update_app(callback(output.into_permissions(&operation)));
        });
    }

    pub fn update_status<F>(&self, case_id: CaseId, new_status: CaseStatus, callback: F)
    where
        F: FnOnce(StatusUpdateResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let operation = CaseServiceOperation::UpdateStatus { case_id, new_status };
            let output = context.request_from_shell(operation.clone()).await;
            context.update_app(callback(output.into_status_updated(&operation)));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_body_extracts_platform_message() {
        let err = BackendError::from_body(br#"{"message":"Insufficient access rights"}"#);
        assert_eq!(err.backend_message(), Some("Insufficient access rights"));
    }

    #[test]
    fn from_body_tolerates_garbage() {
        let err = BackendError::from_body(b"<html>502</html>");
        assert_eq!(err, BackendError::Rejected { message: None });
        assert_eq!(err.backend_message(), None);

        let blank = BackendError::from_body(br#"{"message":"   "}"#);
        assert_eq!(blank.backend_message(), None);
    }

    #[test]
    fn unavailable_has_no_backend_message() {
        let err = BackendError::unavailable("socket closed");
        assert_eq!(err.backend_message(), None);
        assert_eq!(err.to_string(), "backend unavailable: socket closed");
    }

    #[test]
    fn rejected_display_includes_message_when_present() {
        assert_eq!(
            BackendError::rejected("locked").to_string(),
            "request rejected by the server: locked"
        );
        assert_eq!(
            BackendError::Rejected { message: None }.to_string(),
            "request rejected by the server"
        );
    }

    #[test]
    fn mismatched_output_is_reported() {
        let op = CaseServiceOperation::FetchPermissions;
        let result = CaseServiceOutput::StatusUpdated.into_permissions(&op);
        assert_eq!(
            result,
            Err(BackendError::UnexpectedResponse {
                operation: "fetch_permissions".into()
            })
        );
    }

    #[test]
    fn failed_output_passes_error_through() {
        let op = CaseServiceOperation::FetchMyRecords;
        let result = CaseServiceOutput::Failed(BackendError::rejected("nope")).into_records(&op);
        assert_eq!(result, Err(BackendError::rejected("nope")));
    }
}
