/*
Task rules: validation, search and ordering.
Module was independently written from HTTP / Axum for testing
*/

use serde::Deserialize;
use serde_json::Value;

use crate::models::{Task, TaskInput, TaskStatus};

pub const TITLE_RULE: &str = "Title is required and must be at least 2 characters.";
pub const STATUS_RULE: &str = "Status must be \"pending\" or \"done\".";

// Input that passed validation.
//     title is kept exactly as sent; only its trimmed length is checked
#[derive(Debug, Clone)]
pub struct ValidTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

// List query: GET /api/tasks?q=&status=&sort=
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub q: Option<String>,
    pub status: Option<String>,
    // Accepted for API compatibility; ordering is always newest first.
    pub sort: Option<String>,
}

// Empty strings count as "not given", same as an absent query parameter.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// Length as a browser counts it (UTF-16 code units), so the client-side
// check and this one agree on astral characters such as emoji.
fn display_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Check the title and status rules shared by create and update.
///
/// Returns every violated rule, in a fixed order, so callers can join them
/// into one message. A title that is not a JSON string breaks the title rule;
/// a status that is not a string breaks the status rule unless it is `null`.
pub fn validate(input: &TaskInput) -> Result<ValidTask, Vec<String>> {
    let mut errors = Vec::new();

    let title = input
        .title
        .as_ref()
        .and_then(Value::as_str)
        .filter(|t| display_len(t.trim()) >= 2);
    if title.is_none() {
        errors.push(TITLE_RULE.to_string());
    }

    let status = match &input.status {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) if raw.is_empty() => None,
        Some(Value::String(raw)) => match raw.parse::<TaskStatus>() {
            Ok(s) => Some(s),
            Err(()) => {
                errors.push(STATUS_RULE.to_string());
                None
            }
        },
        Some(_) => {
            errors.push(STATUS_RULE.to_string());
            None
        }
    };

    match title {
        Some(title) if errors.is_empty() => Ok(ValidTask {
            title: title.to_string(),
            description: input.description.clone(),
            status,
        }),
        _ => Err(errors),
    }
}

// Case-insensitive substring match on title or description.
pub fn matches_query(task: &Task, query: &str) -> bool {
    let query = query.to_lowercase();
    task.title.to_lowercase().contains(&query) || task.description.to_lowercase().contains(&query)
}

/// Apply the search and status filters, then order newest first.
///
/// Rules:
/// - `q` keeps tasks whose title or description contains it (any case)
/// - `status` keeps tasks whose status is exactly that value
/// - ties on `createdAt` keep their stored order
pub fn filter_and_sort(tasks: Vec<Task>, filter: &TaskFilter) -> Vec<Task> {
    let q = non_empty(filter.q.as_deref());
    let status = non_empty(filter.status.as_deref());

    let mut out: Vec<Task> = tasks
        .into_iter()
        .filter(|t| q.is_none_or(|q| matches_query(t, q)))
        .filter(|t| status.is_none_or(|s| t.status.as_str() == s))
        .collect();

    sort_newest_first(&mut out);
    out
}

pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
