//! Task model shared by the server and the board client.
//!
//! Status values travel over the wire in their underscore form
//! (`In_Progress`) and are shown with spaces (`In Progress`). The serde
//! mapping on [`Status`] is the only place the two forms meet; everything
//! above the wire works with the enum and its [`Status::label`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::FieldError;

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Store-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    /// Wraps a raw integer id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A string did not name any variant of a task enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Feature or refactoring work.
    Development,
    /// Test writing or QA.
    Testing,
    /// Defect fixing.
    Bugs,
}

impl Category {
    /// Every category, in board order.
    pub const ALL: [Self; 3] = [Self::Development, Self::Testing, Self::Bugs];

    /// Display label (identical to the wire name).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::Testing => "Testing",
            Self::Bugs => "Bugs",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

/// Urgency of a task. Priorities carry no transition constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Needs attention first.
    High,
    /// Normal urgency.
    Medium,
    /// Can wait.
    Low,
}

impl Priority {
    /// Every priority, in board column order.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Display label (identical to the wire name).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

/// Workflow state of a task.
///
/// Serialized with underscores (`In_Progress`); the spaced display form is
/// also accepted when deserializing so that clients posting labels work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Being worked on.
    #[serde(rename = "In_Progress", alias = "In Progress")]
    InProgress,
    /// Waiting for review.
    #[serde(rename = "In_Review", alias = "In Review")]
    InReview,
    /// Parked.
    #[serde(rename = "On_Hold", alias = "On Hold")]
    OnHold,
    /// Done. Can still be reopened.
    Completed,
}

impl Status {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::InProgress,
        Self::InReview,
        Self::OnHold,
        Self::Completed,
    ];

    /// Persisted form, e.g. `In_Progress`.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::InProgress => "In_Progress",
            Self::InReview => "In_Review",
            Self::OnHold => "On_Hold",
            Self::Completed => "Completed",
        }
    }

    /// Display form, e.g. `In Progress`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::InReview => "In Review",
            Self::OnHold => "On Hold",
            Self::Completed => "Completed",
        }
    }

    /// Parses the persisted (underscore) form only.
    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.wire_name() == s)
    }

    /// Parses the display (spaced) form only.
    #[must_use]
    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.label() == s)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = UnknownVariant;

    /// Accepts either form, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|st| {
                st.label().eq_ignore_ascii_case(s) || st.wire_name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Structured task description. Always present; any part may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Description {
    /// One-line summary.
    pub summary: String,
    /// Longer free text.
    pub details: String,
    /// Ordered acceptance criteria.
    pub acceptance_criteria: Vec<String>,
    /// Free-form notes.
    pub notes: String,
}

/// Partial description update; present parts replace the stored ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DescriptionPatch {
    /// New summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// New details text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Replacement criteria list; the whole list is swapped, not merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<Vec<String>>,
    /// New notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Description {
    fn apply(&mut self, patch: &DescriptionPatch) {
        if let Some(summary) = &patch.summary {
            self.summary.clone_from(summary);
        }
        if let Some(details) = &patch.details {
            self.details.clone_from(details);
        }
        if let Some(criteria) = &patch.acceptance_criteria {
            self.acceptance_criteria.clone_from(criteria);
        }
        if let Some(notes) = &patch.notes {
            self.notes.clone_from(notes);
        }
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned id, immutable.
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Kind of work.
    pub category: Category,
    /// Urgency.
    pub priority: Priority,
    /// Workflow state.
    pub status: Status,
    /// Due date (no time of day).
    #[serde(with = "due_date")]
    pub duedate: NaiveDate,
    /// Structured description.
    pub description: Description,
}

impl Task {
    /// Applies a partial update in place. `patch.id` is ignored; callers
    /// validate it against the path id first.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(duedate) = patch.duedate {
            self.duedate = duedate;
        }
        if let Some(description) = &patch.description {
            self.description.apply(description);
        }
    }

    /// Returns a copy with the patch applied.
    #[must_use]
    pub fn patched(&self, patch: &TaskPatch) -> Self {
        let mut task = self.clone();
        task.apply(patch);
        task
    }
}

/// Body of a create request: every task field except the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTask {
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    #[serde(with = "due_date")]
    pub duedate: NaiveDate,
    pub description: Description,
}

impl NewTask {
    /// Checks the constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut fields = Vec::new();
        check_title(&self.title, &mut fields);
        ValidationError::from_fields(fields)
    }

    /// Builds the stored task once the store has picked an id.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            category: self.category,
            priority: self.priority,
            status: self.status,
            duedate: self.duedate,
            description: self.description,
        }
    }
}

/// Body of an update request. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    /// Tolerated when it repeats the path id; anything else is rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "due_date::option"
    )]
    pub duedate: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<DescriptionPatch>,
}

impl TaskPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// A patch that only changes the priority.
    #[must_use]
    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    /// True when the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.duedate.is_none()
            && self.description.is_none()
    }

    /// Validates the patch for the task addressed by `path_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the body names a different id or the
    /// new title is empty or too long.
    pub fn validate(&self, path_id: TaskId) -> Result<(), ValidationError> {
        let mut fields = Vec::new();
        if let Some(id) = self.id.filter(|id| *id != path_id) {
            fields.push(FieldError::new(
                "id",
                format!("id is immutable (path id {path_id}, body id {id})"),
            ));
        }
        if let Some(title) = &self.title {
            check_title(title, &mut fields);
        }
        ValidationError::from_fields(fields)
    }
}

fn check_title(title: &str, fields: &mut Vec<FieldError>) {
    if title.trim().is_empty() {
        fields.push(FieldError::new("title", "title should not be empty"));
    } else if title.chars().count() > MAX_TASK_TITLE_LENGTH {
        fields.push(FieldError::new(
            "title",
            format!("title too long (max {MAX_TASK_TITLE_LENGTH} characters)"),
        ));
    }
}

/// One or more fields of a request body were rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_fields(.fields))]
pub struct ValidationError {
    /// The rejected fields, in check order.
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// A validation error for a single field.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError::new(field, message)],
        }
    }

    fn from_fields(fields: Vec<FieldError>) -> Result<(), Self> {
        if fields.is_empty() {
            Ok(())
        } else {
            Err(Self { fields })
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Serde adapter for due dates.
///
/// Writes `YYYY-MM-DD`. Reads either that or an RFC 3339 timestamp, keeping
/// only the calendar date.
pub mod due_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    /// Parses a due date from either accepted form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }

    /// Serializes as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    /// Deserializes from either accepted form.
    ///
    /// # Errors
    ///
    /// Fails when the string is not a valid date.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| invalid(&raw))
    }

    fn invalid<E: serde::de::Error>(raw: &str) -> E {
        E::custom(format!("invalid date `{raw}`, expected YYYY-MM-DD"))
    }

    /// Same adapter for optional fields.
    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        /// # Errors
        ///
        /// Propagates serializer errors.
        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// # Errors
        ///
        /// Fails when a present string is not a valid date.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).ok_or_else(|| super::invalid(&raw)))
                .transpose()
        }
    }
}
