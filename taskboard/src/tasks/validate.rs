//! Create-time checks for task input.

use taskboard_proto::task::{NewTask, TaskDetails};

use super::ValidationError;

/// Checks a task input before it is stored.
///
/// The title must contain something other than whitespace and be at most `max_title_len` characters.
/// Kind references (`repoLink`, `assetUrl`, `documentRef`) must contain
/// something other than whitespace, as must every target audience entry.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_new_task(input: &NewTask, max_title_len: usize) -> Result<(), ValidationError> {
    if input.title.trim().is_empty() {
        return Err(ValidationError::TitleEmpty);
    }
    if input.title.chars().count() > max_title_len {
        return Err(ValidationError::TitleTooLong { max: max_title_len });
    }

    let kind = input.details.kind();
    match &input.details {
        TaskDetails::Development { repo_link, .. } => require(repo_link, kind, "repoLink"),
        TaskDetails::Design { asset_url, .. } => require(asset_url, kind, "assetUrl"),
        TaskDetails::Documentation {
            document_ref,
            target_audience,
        } => {
            require(document_ref, kind, "documentRef")?;
            match target_audience.iter().position(|a| a.trim().is_empty()) {
                Some(index) => Err(ValidationError::EmptyAudience { index }),
                None => Ok(()),
            }
        }
    }
}

fn require(
    value: &str,
    kind: taskboard_proto::task::TaskKind,
    field: &'static str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { kind, field })
    } else {
        Ok(())
    }
}
