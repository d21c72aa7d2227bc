//! Parsers for the one-line prompts of the board.
//!
//! - create: `title; category; priority; status; due; summary` (all but the
//!   title optional, positional)
//! - edit: `field=value; field=value` with fields `title`, `category`,
//!   `priority`, `status`, `due`, `summary`, `details`, `notes`, `criteria`
//!   (criteria items separated by `|`)
//! - date range: `YYYY-MM-DD..YYYY-MM-DD`, or empty to clear

use chrono::NaiveDate;
use taskboard_proto::task::{UnknownVariant, due_date};
use taskboard_proto::{Category, Description, DescriptionPatch, NewTask, Priority, Status, TaskPatch};

/// Hint shown while the create prompt is open.
pub const CREATE_HINT: &str = "title; category; priority; status; YYYY-MM-DD; summary";

/// Hint shown while the edit prompt is open.
pub const EDIT_HINT: &str = "field=value; ... (title category priority status due summary details notes criteria)";

/// Hint shown while the date range prompt is open.
pub const RANGE_HINT: &str = "YYYY-MM-DD..YYYY-MM-DD (empty clears)";

/// A prompt line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("title is required")]
    MissingTitle,

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariant),

    #[error("invalid date `{0}` (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("expected field=value, got `{0}`")]
    MissingValue(String),

    #[error("nothing to change")]
    EmptyPatch,

    #[error("expected FROM..TO")]
    InvalidRange,
}

/// Parses the create prompt. Omitted fields default to Development, Medium,
/// In Progress and `today`.
///
/// # Errors
///
/// [`PromptError`] for a missing title or an unparseable field.
pub fn parse_new_task(input: &str, today: NaiveDate) -> Result<NewTask, PromptError> {
    let mut parts = input.split(';').map(str::trim);
    let title = parts.next().unwrap_or_default();
    if title.is_empty() {
        return Err(PromptError::MissingTitle);
    }
    let mut next = || parts.next().filter(|p| !p.is_empty());

    let category = next().map(str::parse).transpose()?.unwrap_or(Category::Development);
    let priority = next().map(str::parse).transpose()?.unwrap_or(Priority::Medium);
    let status = next().map(str::parse).transpose()?.unwrap_or(Status::InProgress);
    let duedate = next().map(parse_date).transpose()?.unwrap_or(today);
    let summary = next().unwrap_or_default().to_string();

    Ok(NewTask {
        title: title.to_string(),
        category,
        priority,
        status,
        duedate,
        description: Description {
            summary,
            ..Description::default()
        },
    })
}

/// Parses the edit prompt.
///
/// # Errors
///
/// [`PromptError`] for an unknown field, a pair without `=`, a bad value or
/// a line that changes nothing.
pub fn parse_patch(input: &str) -> Result<TaskPatch, PromptError> {
    let mut patch = TaskPatch::default();
    let mut description = DescriptionPatch::default();
    let mut touched_description = false;

    for pair in input.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((field, value)) = pair.split_once('=') else {
            return Err(PromptError::MissingValue(pair.to_string()));
        };
        let value = value.trim();
        match field.trim().to_ascii_lowercase().as_str() {
            "title" => patch.title = Some(value.to_string()),
            "category" => patch.category = Some(value.parse()?),
            "priority" => patch.priority = Some(value.parse()?),
            "status" => patch.status = Some(value.parse()?),
            "due" | "duedate" => patch.duedate = Some(parse_date(value)?),
            "summary" => {
                description.summary = Some(value.to_string());
                touched_description = true;
            }
            "details" => {
                description.details = Some(value.to_string());
                touched_description = true;
            }
            "notes" => {
                description.notes = Some(value.to_string());
                touched_description = true;
            }
            "criteria" => {
                description.acceptance_criteria = Some(
                    value
                        .split('|')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
                touched_description = true;
            }
            other => return Err(PromptError::UnknownField(other.to_string())),
        }
    }

    if touched_description {
        patch.description = Some(description);
    }
    if patch.is_empty() {
        return Err(PromptError::EmptyPatch);
    }
    Ok(patch)
}

/// Parses the date range prompt. `Ok(None)` clears the range.
///
/// # Errors
///
/// [`PromptError::InvalidRange`] without a `..` separator, or
/// [`PromptError::InvalidDate`] for either end.
pub fn parse_date_range(input: &str) -> Result<Option<(NaiveDate, NaiveDate)>, PromptError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let (from, to) = input.split_once("..").ok_or(PromptError::InvalidRange)?;
    Ok(Some((parse_date(from)?, parse_date(to)?)))
}

fn parse_date(raw: &str) -> Result<NaiveDate, PromptError> {
    due_date::parse(raw).ok_or_else(|| PromptError::InvalidDate(raw.trim().to_string()))
}
