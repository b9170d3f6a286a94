use itertools::Itertools;
use thiserror::Error;

use crate::model::Id;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name: This field may not be blank.")]
    BlankName,
    #[error("students: Invalid pk \"{0}\" - object does not exist.")]
    UnknownStudent(Id),
    #[error("{0}: This field may not be null.")]
    NullField(&'static str),
}

/// Unwraps a field of a partial update: absent stays `None`, `null` is an error.
pub fn non_null<T>(field: &'static str, value: Option<Option<T>>) -> Result<Option<T>, ValidationError> {
    value.map(|v| v.ok_or(ValidationError::NullField(field))).transpose()
}

/// Trims surrounding whitespace and rejects blank names.
pub fn normalize_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// Drops repeated ids, keeping the first occurrence.
pub fn unique_ids(ids: Vec<Id>) -> Vec<Id> {
    ids.into_iter().unique().collect()
}
