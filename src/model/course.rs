use crate::logic::validate::{non_null, ValidationError};
use crate::model::{double_option, Id};
use serde::{Deserialize, Serialize};

/// A course and the ids of its enrolled students, in enrollment order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: Id,
    pub name: String,
    pub students: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewCourse {
    pub name: String,
    #[serde(default)]
    pub students: Vec<Id>,
}

/// Body of `PUT /courses/{id}/`. Omitting `students` keeps the current enrollment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseUpdate {
    pub name: String,
    #[serde(default, deserialize_with = "double_option")]
    pub students: Option<Option<Vec<Id>>>,
}

/// Body of `PATCH /courses/{id}/`. Fields may be omitted but not null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoursePatch {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub students: Option<Option<Vec<Id>>>,
}

/// Changes applied by the store; `students`, when present, replaces the whole
/// enrollment set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseChanges {
    pub name: Option<String>,
    pub students: Option<Vec<Id>>,
}

impl TryFrom<CourseUpdate> for CourseChanges {
    type Error = ValidationError;

    fn try_from(update: CourseUpdate) -> Result<Self, Self::Error> {
        Ok(Self {
            name: Some(update.name),
            students: non_null("students", update.students)?,
        })
    }
}

impl TryFrom<CoursePatch> for CourseChanges {
    type Error = ValidationError;

    fn try_from(patch: CoursePatch) -> Result<Self, Self::Error> {
        Ok(Self {
            name: non_null("name", patch.name)?,
            students: non_null("students", patch.students)?,
        })
    }
}

/// Body of `POST /courses/{id}/students/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnrollmentRequest {
    pub students: Vec<Id>,
}
