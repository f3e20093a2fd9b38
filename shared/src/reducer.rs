//! Filter and sort over normalized case records.
//!
//! Filtering and sorting are deliberately separate steps: a filter change
//! recomputes the candidate rows in authoritative order, and sorting only
//! happens when the user asks for it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::model::{CaseStatus, DisplayCaseRecord, Priority, UnixTimeMs, ViewState};
use crate::{NO_MATCHES_MESSAGE, NO_RECORDS_MESSAGE};

pub const FILTER_ALL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    /// `None` for values outside the picklist; callers ignore those.
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        if value == FILTER_ALL {
            return Some(Self::All);
        }
        Priority::parse_known(value).map(Self::Only)
    }

    #[must_use]
    pub fn as_value(&self) -> &str {
        match self {
            Self::All => FILTER_ALL,
            Self::Only(p) => p.as_str(),
        }
    }

    #[must_use]
    pub fn matches(&self, priority: Option<&Priority>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => priority == Some(wanted),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(CaseStatus),
}

impl StatusFilter {
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        if value == FILTER_ALL {
            return Some(Self::All);
        }
        CaseStatus::parse_known(value).map(Self::Only)
    }

    #[must_use]
    pub fn as_value(&self) -> &str {
        match self {
            Self::All => FILTER_ALL,
            Self::Only(s) => s.as_str(),
        }
    }

    #[must_use]
    pub fn matches(&self, status: Option<&CaseStatus>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => status == Some(wanted),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortField {
    CaseNumber,
    Subject,
    Priority,
    Status,
    #[default]
    CreatedDate,
    Contact,
}

/// Every name the table may report for a sortable column. The first entry
/// for each field is the `field` its column publishes.
///
/// The link columns sort by what they display: the case number column by case
/// number and the contact column by contact name, never by the link or id text.
const FIELD_NAMES: &[(&str, SortField)] = &[
    ("case_link", SortField::CaseNumber),
    ("caseUrl", SortField::CaseNumber),
    ("caseNumber", SortField::CaseNumber),
    ("Case_Number__c", SortField::CaseNumber),
    ("Subject__c", SortField::Subject),
    ("subject", SortField::Subject),
    ("Priority__c", SortField::Priority),
    ("priority", SortField::Priority),
    ("Status__c", SortField::Status),
    ("status", SortField::Status),
    ("CreatedDate", SortField::CreatedDate),
    ("createdAt", SortField::CreatedDate),
    ("contact_link", SortField::Contact),
    ("contactUrl", SortField::Contact),
    ("contactName", SortField::Contact),
    ("contact", SortField::Contact),
];

enum Accessor {
    Text(fn(&DisplayCaseRecord) -> &str),
    Time(fn(&DisplayCaseRecord) -> Option<UnixTimeMs>),
}

fn case_number_key(r: &DisplayCaseRecord) -> &str {
    r.record.case_number.as_deref().unwrap_or_default()
}

fn subject_key(r: &DisplayCaseRecord) -> &str {
    r.record.subject.as_deref().unwrap_or_default()
}

fn priority_key(r: &DisplayCaseRecord) -> &str {
    r.record.priority.as_ref().map_or("", Priority::as_str)
}

fn status_key(r: &DisplayCaseRecord) -> &str {
    r.record.status.as_ref().map_or("", CaseStatus::as_str)
}

fn created_key(r: &DisplayCaseRecord) -> Option<UnixTimeMs> {
    r.record.created_at
}

fn contact_key(r: &DisplayCaseRecord) -> &str {
    &r.contact_display_name
}

impl SortField {
    #[must_use]
    pub fn from_field_name(name: &str) -> Option<Self> {
        FIELD_NAMES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, field)| *field)
    }

    /// The column field name the table uses for this field.
    #[must_use]
    pub fn column_field(self) -> &'static str {
        FIELD_NAMES
            .iter()
            .find(|(_, field)| *field == self)
            .map_or("", |(name, _)| name)
    }

    fn accessor(self) -> Accessor {
        match self {
            Self::CaseNumber => Accessor::Text(case_number_key),
            Self::Subject => Accessor::Text(subject_key),
            Self::Priority => Accessor::Text(priority_key),
            Self::Status => Accessor::Text(status_key),
            Self::CreatedDate => Accessor::Time(created_key),
            Self::Contact => Accessor::Text(contact_key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_value(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

#[must_use]
pub fn matches_search(record: &DisplayCaseRecord, search_text: &str) -> bool {
    if search_text.is_empty() {
        return true;
    }
    let hit = |value: Option<&str>| value.is_some_and(|v| v.to_lowercase().contains(search_text));

    hit(record.record.case_number.as_deref())
        || hit(record.record.subject.as_deref())
        || hit(Some(&record.contact_display_name))
}

#[must_use]
pub fn passes_filters(record: &DisplayCaseRecord, state: &ViewState) -> bool {
    matches_search(record, &state.search_text)
        && state.priority_filter.matches(record.record.priority.as_ref())
        && state.status_filter.matches(record.record.status.as_ref())
}

#[must_use]
pub fn apply_filters(records: &[DisplayCaseRecord], state: &ViewState) -> Vec<DisplayCaseRecord> {
    records
        .iter()
        .filter(|r| passes_filters(r, state))
        .cloned()
        .collect()
}

/// Stable sort of an owned copy; `rows` is left untouched.
#[must_use]
pub fn sort_records(rows: &[DisplayCaseRecord], sort: SortSpec) -> Vec<DisplayCaseRecord> {
    let mut sorted = rows.to_vec();
    match sort.field.accessor() {
        Accessor::Text(key) => {
            sorted.sort_by(|a, b| sort.direction.apply(key(a).cmp(key(b))));
        }
        Accessor::Time(key) => {
            sorted.sort_by(|a, b| sort.direction.apply(key(a).cmp(&key(b))));
        }
    }
    sorted
}

#[must_use]
pub fn empty_state_message(total: usize, visible: usize) -> Option<&'static str> {
    if visible > 0 {
        None
    } else if total == 0 {
        Some(NO_RECORDS_MESSAGE)
    } else {
        Some(NO_MATCHES_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{normalize, CaseId, RawCaseRecord};

    fn record(id: &str, subject: &str, priority: &str, status: &str) -> DisplayCaseRecord {
        normalize(&RawCaseRecord {
            id: CaseId::new(id),
            case_number: Some(format!("CN-{id}")),
            subject: Some(subject.into()),
            priority: Some(Priority::from(priority.to_string())),
            status: Some(CaseStatus::from(status.to_string())),
            created_at: None,
            contact_id: None,
            contact: None,
        })
    }

    fn sample() -> Vec<DisplayCaseRecord> {
        vec![
            record("1", "Printer issue", "High", "Open"),
            record("2", "Login fail", "Low", "New"),
        ]
    }

    fn ids(rows: &[DisplayCaseRecord]) -> Vec<&str> {
        rows.iter().map(|r| r.id().as_str()).collect()
    }

    #[test]
    fn search_matches_subject_case_insensitively() {
        let mut state = ViewState::default();
        state.set_search_text("printer");

        let rows = apply_filters(&sample(), &state);
        assert_eq!(ids(&rows), vec!["1"]);
    }

    #[test]
    fn search_matches_case_number_and_contact_placeholder() {
        let mut state = ViewState::default();
        state.set_search_text("cn-2");
        assert_eq!(ids(&apply_filters(&sample(), &state)), vec!["2"]);

        state.set_search_text("no contact");
        assert_eq!(apply_filters(&sample(), &state).len(), 2);
    }

    #[test]
    fn missing_fields_never_match_search() {
        let mut bare = record("3", "", "High", "Open");
        bare.record.subject = None;
        bare.record.case_number = None;

        let mut state = ViewState::default();
        state.set_search_text("cn-3");
        assert!(apply_filters(&[bare], &state).is_empty());
    }

    #[test]
    fn priority_filter_without_matches_gives_filter_message() {
        let state = ViewState {
            priority_filter: PriorityFilter::from_value("Medium").unwrap(),
            ..ViewState::default()
        };
        let records = sample();
        let rows = apply_filters(&records, &state);

        assert!(rows.is_empty());
        assert_eq!(
            empty_state_message(records.len(), rows.len()),
            Some("No cases match the current filters.")
        );
    }

    #[test]
    fn filters_are_conjunctive() {
        let records = vec![
            record("1", "Printer jam", "High", "Open"),
            record("2", "Printer toner", "Low", "Open"),
            record("3", "Printer offline", "High", "Resolved"),
        ];
        let mut state = ViewState {
            priority_filter: PriorityFilter::Only(Priority::High),
            status_filter: StatusFilter::Only(CaseStatus::Open),
            ..ViewState::default()
        };
        state.set_search_text("printer");

        assert_eq!(ids(&apply_filters(&records, &state)), vec!["1"]);
    }

    #[test]
    fn empty_set_gives_no_records_message() {
        assert_eq!(empty_state_message(0, 0), Some("No cases found."));
        assert_eq!(empty_state_message(3, 1), None);
    }

    #[test]
    fn filter_values_outside_picklist_are_rejected() {
        assert_eq!(PriorityFilter::from_value("All"), Some(PriorityFilter::All));
        assert_eq!(PriorityFilter::from_value("Urgent"), None);
        assert_eq!(
            StatusFilter::from_value("Waiting on customer"),
            Some(StatusFilter::Only(CaseStatus::WaitingOnCustomer))
        );
        assert_eq!(StatusFilter::from_value("Closed"), None);
    }

    #[test]
    fn sort_by_subject_both_directions() {
        let records = vec![
            record("1", "b", "High", "Open"),
            record("2", "a", "High", "Open"),
            record("3", "c", "High", "Open"),
        ];
        let asc = sort_records(
            &records,
            SortSpec {
                field: SortField::Subject,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(ids(&asc), vec!["2", "1", "3"]);

        let desc = sort_records(
            &records,
            SortSpec {
                field: SortField::Subject,
                direction: SortDirection::Descending,
            },
        );
        assert_eq!(ids(&desc), vec!["3", "1", "2"]);
    }

    #[test]
    fn sort_treats_missing_values_as_empty() {
        let mut blank = record("1", "x", "High", "Open");
        blank.record.subject = None;
        let records = vec![record("2", "a", "High", "Open"), blank];

        let asc = sort_records(
            &records,
            SortSpec {
                field: SortField::Subject,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(ids(&asc), vec!["1", "2"]);
    }

    #[test]
    fn sort_by_created_date_is_chronological() {
        let mut old = record("old", "s", "High", "Open");
        old.record.created_at = Some(UnixTimeMs(1_000));
        let mut new = record("new", "s", "High", "Open");
        new.record.created_at = Some(UnixTimeMs(2_000));
        let undated = record("undated", "s", "High", "Open");

        let rows = sort_records(&[old, undated, new], SortSpec::default());
        assert_eq!(ids(&rows), vec!["new", "old", "undated"]);
    }

    #[test]
    fn priority_sorts_lexicographically() {
        let records = vec![
            record("1", "s", "Medium", "Open"),
            record("2", "s", "High", "Open"),
            record("3", "s", "Low", "Open"),
        ];
        let rows = sort_records(
            &records,
            SortSpec {
                field: SortField::Priority,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(ids(&rows), vec!["2", "3", "1"]);
    }

    #[test]
    fn field_names_resolve_to_typed_fields() {
        assert_eq!(SortField::from_field_name("caseUrl"), Some(SortField::CaseNumber));
        assert_eq!(SortField::from_field_name("CreatedDate"), Some(SortField::CreatedDate));
        assert_eq!(SortField::from_field_name("contactUrl"), Some(SortField::Contact));
        assert_eq!(SortField::from_field_name("Description__c"), None);
        assert_eq!(SortField::from_field_name("case_link"), Some(SortField::CaseNumber));
        assert_eq!(SortField::Contact.column_field(), "contact_link");
        assert_eq!(SortField::CaseNumber.column_field(), "case_link");
        assert_eq!(SortField::Subject.column_field(), "Subject__c");
    }

    #[test]
    fn direction_values() {
        assert_eq!(SortDirection::from_value("asc"), Some(SortDirection::Ascending));
        assert_eq!(SortDirection::from_value("DESC"), None);
        assert_eq!(SortDirection::Descending.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortDirection::Descending.apply(Ordering::Equal), Ordering::Equal);
    }
}
