use itertools::Itertools;
use thiserror::Error;

use crate::model::Id;

pub const DEFAULT_MAX_STUDENTS_PER_COURSE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentError {
    #[error("Course is full. Maximum number of students: {max}")]
    LimitExceeded {
        course_id: Id,
        attempted: usize,
        max: usize,
    },
}

/// Upper bound on the number of students a single course may hold.
///
/// Stores call [`EnrollmentPolicy::check`] with the post-mutation count after
/// every change to a course's student set and before committing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentPolicy {
    max_students_per_course: usize,
}

impl Default for EnrollmentPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STUDENTS_PER_COURSE)
    }
}

impl EnrollmentPolicy {
    pub fn new(max_students_per_course: usize) -> Self {
        Self {
            max_students_per_course,
        }
    }

    pub fn max_students_per_course(&self) -> usize {
        self.max_students_per_course
    }

    /// Accepts `count` up to and including the maximum.
    pub fn check(&self, course_id: Id, count: usize) -> Result<(), EnrollmentError> {
        if count > self.max_students_per_course {
            log::warn!(
                "Rejected enrollment change for course {}: {} students exceeds limit of {}",
                course_id,
                count,
                self.max_students_per_course
            );
            return Err(EnrollmentError::LimitExceeded {
                course_id,
                attempted: count,
                max: self.max_students_per_course,
            });
        }
        Ok(())
    }
}

/// A mutation of a course's student set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentChange {
    Add(Vec<Id>),
    Remove(Id),
    Clear,
    /// Replace the set. Students already enrolled keep their position.
    Set(Vec<Id>),
}

impl EnrollmentChange {
    /// Students that must exist for the change to be valid.
    pub fn student_ids(&self) -> &[Id] {
        match self {
            EnrollmentChange::Add(ids) | EnrollmentChange::Set(ids) => ids,
            EnrollmentChange::Remove(_) | EnrollmentChange::Clear => &[],
        }
    }

    /// Resulting enrollment, in order, without duplicates.
    pub fn apply(&self, current: &[Id]) -> Vec<Id> {
        match self {
            EnrollmentChange::Add(ids) => current.iter().chain(ids.iter()).copied().unique().collect(),
            EnrollmentChange::Remove(id) => current.iter().copied().filter(|s| s != id).collect(),
            EnrollmentChange::Clear => Vec::new(),
            EnrollmentChange::Set(ids) => current
                .iter()
                .filter(|s| ids.contains(s))
                .chain(ids.iter())
                .copied()
                .unique()
                .collect(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            EnrollmentChange::Add(_) => "add",
            EnrollmentChange::Remove(_) => "remove",
            EnrollmentChange::Clear => "clear",
            EnrollmentChange::Set(_) => "set",
        }
    }
}
