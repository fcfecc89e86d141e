use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

pub const DIFFICULTIES: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];
pub const ASSIGNMENT_STATUSES: [&str; 3] = ["Not Started", "In Progress", "Completed"];
pub const ATTEMPT_STATUSES: [&str; 3] = ["Submitted", "Under Review", "Graded"];

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_description(description: Option<&str>) -> Result<(), AppError> {
    if let Some(desc) = description
        && desc.chars().count() > 4000
    {
        return Err(AppError::Validation(
            "Description must be at most 4000 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_difficulty(difficulty: &str) -> Result<(), AppError> {
    validate_one_of(difficulty, &DIFFICULTIES, "Difficulty")
}

pub fn validate_assignment_status(status: &str) -> Result<(), AppError> {
    validate_one_of(status, &ASSIGNMENT_STATUSES, "Status")
}

pub fn validate_attempt_status(status: &str) -> Result<(), AppError> {
    validate_one_of(status, &ATTEMPT_STATUSES, "Status")
}

pub fn validate_score(score: Option<i32>) -> Result<(), AppError> {
    if let Some(score) = score
        && !(0..=100).contains(&score)
    {
        return Err(AppError::Validation("Score must be 0-100".into()));
    }
    Ok(())
}

pub fn validate_feedback(feedback: Option<&str>) -> Result<(), AppError> {
    if let Some(fb) = feedback
        && fb.chars().count() > 4000
    {
        return Err(AppError::Validation(
            "Feedback must be at most 4000 characters".into(),
        ));
    }
    Ok(())
}

fn validate_one_of(value: &str, allowed: &[&str], label: &str) -> Result<(), AppError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{label} must be one of: {}",
            allowed.join(", ")
        )))
    }
}
