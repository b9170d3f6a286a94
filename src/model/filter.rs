use crate::model::{Course, Id, Student};
use serde::Deserialize;

/// Exact-match filter taken from the `id` and `name` query parameters.
/// Both are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListFilter {
    pub id: Option<Id>,
    pub name: Option<String>,
}

impl ListFilter {
    pub fn matches(&self, id: Id, name: &str) -> bool {
        self.id.map_or(true, |wanted| wanted == id)
            && self.name.as_deref().map_or(true, |wanted| wanted == name)
    }

    pub fn matches_course(&self, course: &Course) -> bool {
        self.matches(course.id, &course.name)
    }

    pub fn matches_student(&self, student: &Student) -> bool {
        self.matches(student.id, &student.name)
    }
}
