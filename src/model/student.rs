use crate::logic::validate::{non_null, ValidationError};
use crate::model::{double_option, Id};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Id,
    pub name: String,
    pub birth_date: Option<NaiveDate>, // serialized as YYYY-MM-DD
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewStudent {
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

/// Body of `PUT /students/{id}/`: name is required, an absent birth date is left as is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentUpdate {
    pub name: String,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<NaiveDate>>,
}

/// Body of `PATCH /students/{id}/`. `birth_date` may be null to clear it,
/// `name` may not.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StudentPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<NaiveDate>>,
}

/// Field-level changes applied by the store. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
}

impl From<StudentUpdate> for StudentChanges {
    fn from(update: StudentUpdate) -> Self {
        Self {
            name: Some(update.name),
            birth_date: update.birth_date,
        }
    }
}

impl TryFrom<StudentPatch> for StudentChanges {
    type Error = ValidationError;

    fn try_from(patch: StudentPatch) -> Result<Self, Self::Error> {
        Ok(Self {
            name: non_null("name", patch.name)?,
            birth_date: patch.birth_date,
        })
    }
}

impl Student {
    pub fn apply(&mut self, changes: StudentChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(birth_date) = changes.birth_date {
            self.birth_date = birth_date;
        }
    }
}
