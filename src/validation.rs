//! Input validation run before any store access.

use crate::error::{AppError, AppResult};
use crate::types::{CreateLabelInput, CreateTaskInput, UpdateTaskInput};

pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
pub const LABEL_NAME_MAX_CHARS: usize = 50;
pub const DEFAULT_LABEL_COLOR: &str = "#6B7280";

/// Trim and check a task title.
pub fn title(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field("title"));
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::invalid_value("title", "Title is too long"));
    }
    Ok(trimmed.to_string())
}

/// Trim a description; blank collapses to `None`.
pub fn description(raw: Option<&str>) -> AppResult<Option<String>> {
    let Some(trimmed) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(AppError::invalid_value(
            "description",
            "Description is too long",
        ));
    }
    Ok(Some(trimmed.to_string()))
}

/// Drop duplicate label ids, keeping first occurrence order.
fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Normalise a create request.
pub fn create_task(input: &CreateTaskInput) -> AppResult<CreateTaskInput> {
    Ok(CreateTaskInput {
        title: title(&input.title)?,
        description: description(input.description.as_deref())?,
        status: input.status,
        priority: input.priority,
        due_date: input.due_date,
        label_ids: dedup_ids(&input.label_ids),
    })
}

/// Normalise a partial update. Only provided fields are checked.
pub fn update_task(input: &UpdateTaskInput) -> AppResult<UpdateTaskInput> {
    let title = match &input.title {
        Some(t) => Some(title(t)?),
        None => None,
    };
    let description = match &input.description {
        Some(d) => Some(description(d.as_deref())?),
        None => None,
    };
    Ok(UpdateTaskInput {
        title,
        description,
        status: input.status,
        priority: input.priority,
        due_date: input.due_date,
        label_ids: input.label_ids.as_deref().map(dedup_ids),
    })
}

/// Labels are stored trimmed and lowercased; colour defaults to grey.
pub fn create_label(input: &CreateLabelInput) -> AppResult<CreateLabelInput> {
    let name = input.name.trim().to_lowercase();
    if name.is_empty() {
        return Err(AppError::missing_field("name"));
    }
    if name.chars().count() > LABEL_NAME_MAX_CHARS {
        return Err(AppError::invalid_value("name", "Name is too long"));
    }
    let color = input
        .color
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_LABEL_COLOR)
        .to_string();
    Ok(CreateLabelInput {
        name,
        color: Some(color),
    })
}
