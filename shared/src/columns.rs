use serde::Serialize;

use crate::action::QuickAction;
use crate::model::{CaseStatus, Priority, ViewMode};
use crate::reducer::FILTER_ALL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Url,
    Text,
    Date,
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowActionView {
    pub label: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub label: &'static str,
    /// Row field holding the cell value.
    pub field: Option<&'static str>,
    /// Row field holding the link label, for `Url` columns.
    pub label_field: Option<&'static str>,
    /// Row field holding the cell style tag.
    pub style_field: Option<&'static str>,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub wrap_text: bool,
    pub row_actions: Vec<RowActionView>,
}

impl ColumnView {
    const fn data(label: &'static str, field: &'static str, kind: ColumnKind) -> Self {
        Self {
            label,
            field: Some(field),
            label_field: None,
            style_field: None,
            kind,
            sortable: true,
            wrap_text: false,
            row_actions: Vec::new(),
        }
    }
}

#[must_use]
pub fn case_columns() -> Vec<ColumnView> {
    vec![
        ColumnView {
            label_field: Some("Case_Number__c"),
            ..ColumnView::data("Case Number", "case_link", ColumnKind::Url)
        },
        ColumnView {
            wrap_text: true,
            ..ColumnView::data("Subject", "Subject__c", ColumnKind::Text)
        },
        ColumnView {
            style_field: Some("priority_style_tag"),
            ..ColumnView::data("Priority", "Priority__c", ColumnKind::Text)
        },
        ColumnView {
            style_field: Some("status_style_tag"),
            ..ColumnView::data("Status", "Status__c", ColumnKind::Text)
        },
        ColumnView::data("Created Date", "CreatedDate", ColumnKind::Date),
        ColumnView {
            label_field: Some("contact_display_name"),
            ..ColumnView::data("Contact", "contact_link", ColumnKind::Url)
        },
        ColumnView {
            label: "Quick Actions",
            field: None,
            label_field: None,
            style_field: None,
            kind: ColumnKind::Action,
            sortable: false,
            wrap_text: false,
            row_actions: QuickAction::ALL
                .iter()
                .map(|a| RowActionView {
                    label: a.label(),
                    name: a.name(),
                })
                .collect(),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[must_use]
pub fn view_mode_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("My Cases", ViewMode::Mine.as_value()),
        SelectOption::new("All Cases", ViewMode::All.as_value()),
    ]
}

#[must_use]
pub fn priority_options() -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("All Priorities", FILTER_ALL))
        .chain(
            Priority::KNOWN
                .iter()
                .map(|p| SelectOption::new(p.as_str(), p.as_str())),
        )
        .collect()
}

#[must_use]
pub fn status_options() -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("All Statuses", FILTER_ALL))
        .chain(CaseStatus::KNOWN.iter().map(|s| {
            // Picklist value keeps the platform's casing; the label is title case.
            let label = match s {
                CaseStatus::WaitingOnCustomer => "Waiting on Customer",
                other => other.as_str(),
            };
            SelectOption::new(label, s.as_str())
        }))
        .collect()
}
