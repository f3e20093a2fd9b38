use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::action::PendingAction;
use crate::reducer::{self, PriorityFilter, SortSpec, StatusFilter};
use crate::{
    AppError, ToastKind, ToastMessage, ALL_CASES_TITLE, CASE_RECORD_PATH, CONTACT_RECORD_PATH,
    MY_CASES_TITLE, NO_CONTACT_LABEL,
};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(CaseId);
typed_id!(ContactId);
typed_id!(ActionId);

impl ActionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Explicit timestamp unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixTimeMs(pub i64);

impl UnixTimeMs {
    pub fn parse_rfc3339(text: &str) -> Result<Self, time::error::Parse> {
        let parsed = OffsetDateTime::parse(text, &Rfc3339)?;
        let millis = parsed.unix_timestamp_nanos() / 1_000_000;
        // OffsetDateTime's range fits in i64 milliseconds.
        Ok(Self(millis as i64))
    }

    #[must_use]
    pub fn to_rfc3339(self) -> Option<String> {
        let nanos = i128::from(self.0) * 1_000_000;
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .ok()?
            .format(&Rfc3339)
            .ok()
    }
}

/// `CreatedDate` travels as an RFC 3339 string; blank means absent. A value
/// that does not parse is dropped so one bad row cannot sink the whole set.
mod created_date {
    use super::UnixTimeMs;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::warn;

    pub fn serialize<S: Serializer>(value: &Option<UnixTimeMs>, s: S) -> Result<S::Ok, S::Error> {
        match value.and_then(UnixTimeMs::to_rfc3339) {
            Some(text) => s.serialize_some(&text),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<UnixTimeMs>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => match UnixTimeMs::parse_rfc3339(text) {
                Ok(parsed) => Ok(Some(parsed)),
                Err(e) => {
                    warn!(value = text, error = %e, "ignoring unparseable CreatedDate");
                    Ok(None)
                }
            },
        }
    }
}

// --- Picklists ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    Medium,
    Low,
    /// A picklist value this component does not know about.
    Other(String),
}

impl Priority {
    pub const KNOWN: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Parses one of the known picklist values; anything else is `None`.
    #[must_use]
    pub fn parse_known(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Other(value) => value,
        }
    }

    #[must_use]
    pub fn style_tag(&self) -> &'static str {
        match self {
            Self::High => "slds-text-color_error slds-text-title_bold",
            Self::Medium => "slds-text-color_warning",
            Self::Low => "slds-text-color_success",
            Self::Other(_) => "",
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Self::parse_known(&value).unwrap_or(Self::Other(value))
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Other(v) => v,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CaseStatus {
    New,
    Open,
    InProgress,
    WaitingOnCustomer,
    Resolved,
    OnHold,
    Other(String),
}

impl CaseStatus {
    pub const KNOWN: [Self; 6] = [
        Self::New,
        Self::Open,
        Self::InProgress,
        Self::WaitingOnCustomer,
        Self::OnHold,
        Self::Resolved,
    ];

    #[must_use]
    pub fn parse_known(value: &str) -> Option<Self> {
        match value {
            "New" => Some(Self::New),
            "Open" => Some(Self::Open),
            "In Progress" => Some(Self::InProgress),
            "Waiting on customer" => Some(Self::WaitingOnCustomer),
            "Resolved" => Some(Self::Resolved),
            "On Hold" => Some(Self::OnHold),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "New",
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::WaitingOnCustomer => "Waiting on customer",
            Self::Resolved => "Resolved",
            Self::OnHold => "On Hold",
            Self::Other(value) => value,
        }
    }

    #[must_use]
    pub fn style_tag(&self) -> &'static str {
        match self {
            Self::New | Self::OnHold => "slds-text-color_weak",
            Self::Open => "slds-text-color_default",
            Self::InProgress => "slds-text-color_warning",
            Self::WaitingOnCustomer => "slds-text-color_error",
            Self::Resolved => "slds-text-color_success",
            Self::Other(_) => "",
        }
    }
}

impl From<String> for CaseStatus {
    fn from(value: String) -> Self {
        Self::parse_known(&value).unwrap_or(Self::Other(value))
    }
}

impl From<CaseStatus> for String {
    fn from(value: CaseStatus) -> Self {
        match value {
            CaseStatus::Other(v) => v,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Records ---

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactRef {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
}

/// A support case exactly as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCaseRecord {
    #[serde(rename = "Id")]
    pub id: CaseId,
    #[serde(rename = "Case_Number__c", default)]
    pub case_number: Option<String>,
    #[serde(rename = "Subject__c", default)]
    pub subject: Option<String>,
    #[serde(rename = "Priority__c", default)]
    pub priority: Option<Priority>,
    #[serde(rename = "Status__c", default)]
    pub status: Option<CaseStatus>,
    #[serde(rename = "CreatedDate", default, with = "created_date")]
    pub created_at: Option<UnixTimeMs>,
    #[serde(rename = "Contact__c", default)]
    pub contact_id: Option<ContactId>,
    #[serde(rename = "Contact__r", default)]
    pub contact: Option<ContactRef>,
}

impl RawCaseRecord {
    #[must_use]
    pub fn contact_name(&self) -> Option<&str> {
        self.contact
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

/// A raw record plus everything the table needs to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayCaseRecord {
    #[serde(flatten)]
    pub record: RawCaseRecord,
    pub case_link: String,
    pub contact_link: Option<String>,
    pub contact_display_name: String,
    pub priority_style_tag: &'static str,
    pub status_style_tag: &'static str,
}

impl DisplayCaseRecord {
    #[must_use]
    pub fn id(&self) -> &CaseId {
        &self.record.id
    }
}

#[must_use]
pub fn case_link(id: &CaseId) -> String {
    format!("{CASE_RECORD_PATH}/{id}/view")
}

#[must_use]
pub fn contact_link(id: &ContactId) -> String {
    format!("{CONTACT_RECORD_PATH}/{id}/view")
}

#[must_use]
pub fn normalize(raw: &RawCaseRecord) -> DisplayCaseRecord {
    DisplayCaseRecord {
        case_link: case_link(&raw.id),
        contact_link: raw.contact_id.as_ref().map(contact_link),
        contact_display_name: raw.contact_name().unwrap_or(NO_CONTACT_LABEL).to_string(),
        priority_style_tag: raw.priority.as_ref().map_or("", Priority::style_tag),
        status_style_tag: raw.status.as_ref().map_or("", CaseStatus::style_tag),
        record: raw.clone(),
    }
}

impl From<&RawCaseRecord> for DisplayCaseRecord {
    fn from(raw: &RawCaseRecord) -> Self {
        normalize(raw)
    }
}

// --- View state ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ViewMode {
    #[default]
    Mine,
    All,
}

impl ViewMode {
    /// Selector values as the UI sends them.
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "my" => Some(Self::Mine),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_value(self) -> &'static str {
        match self {
            Self::Mine => "my",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    /// Always lowercase.
    pub search_text: String,
    pub priority_filter: PriorityFilter,
    pub status_filter: StatusFilter,
    pub sort: SortSpec,
    pub view_mode: ViewMode,
    pub is_manager: bool,
    pub is_loading: bool,
    pub last_error: Option<AppError>,
}

impl ViewState {
    pub fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_lowercase();
    }

    /// Returns false when the request was refused: only managers may see all
    /// records.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        if mode == ViewMode::All && !self.is_manager {
            self.view_mode = ViewMode::Mine;
            return false;
        }
        self.view_mode = mode;
        true
    }

    pub fn set_manager(&mut self, is_manager: bool) {
        self.is_manager = is_manager;
        if !is_manager {
            self.view_mode = ViewMode::Mine;
        }
    }

    #[must_use]
    pub fn shows_all_records(&self) -> bool {
        self.is_manager && self.view_mode == ViewMode::All
    }
}

// --- Model ---

#[derive(Debug, Default)]
pub struct Model {
    pub view: ViewState,
    /// Authoritative set from the last successful load.
    pub records: Vec<DisplayCaseRecord>,
    /// Rows currently shown, in display order.
    pub visible: Vec<DisplayCaseRecord>,
    pub load_generation: u64,
    pub actions: HashMap<ActionId, PendingAction>,
    pub active_toast: Option<ToastMessage>,
}

impl Model {
    pub fn replace_records(&mut self, raw: &[RawCaseRecord]) {
        self.records = raw.iter().map(normalize).collect();
        self.view.last_error = None;
        self.prune_settled_actions();
        self.apply_filters();
    }

    /// Settled actions are only kept until fresh records replace what they
    /// changed; in-flight ones stay.
    pub fn prune_settled_actions(&mut self) {
        self.actions.retain(|_, action| !action.state.is_terminal());
    }

    /// Fail-empty: nothing stale stays on screen after a failed load.
    pub fn fail_load(&mut self, error: AppError) {
        self.records.clear();
        self.visible.clear();
        self.view.last_error = Some(error);
    }

    pub fn apply_filters(&mut self) {
        self.visible = reducer::apply_filters(&self.records, &self.view);
    }

    pub fn apply_sort(&mut self) {
        self.visible = reducer::sort_records(&self.visible, self.view.sort);
    }

    pub fn next_load_generation(&mut self) -> u64 {
        self.load_generation += 1;
        self.load_generation
    }

    #[must_use]
    pub fn is_current_load(&self, generation: u64) -> bool {
        generation == self.load_generation
    }

    pub fn show_toast(&mut self, title: impl Into<String>, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(title, message, kind));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    #[must_use]
    pub fn empty_state_message(&self) -> Option<&'static str> {
        reducer::empty_state_message(self.records.len(), self.visible.len())
    }

    #[must_use]
    pub fn card_title(&self) -> &'static str {
        if self.view.shows_all_records() {
            ALL_CASES_TITLE
        } else {
            MY_CASES_TITLE
        }
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.visible.is_empty()
    }
}
