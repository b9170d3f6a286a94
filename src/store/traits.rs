use crate::logic::enrollment::{EnrollmentChange, EnrollmentPolicy};
use crate::model::{Course, CourseChanges, Id, ListFilter, NewCourse, NewStudent, Student, StudentChanges};
use anyhow::Result;

#[async_trait::async_trait]
pub trait StudentStore: Send + Sync {
    async fn create_student(&self, student: NewStudent) -> Result<Student>;
    async fn get_student(&self, id: Id) -> Result<Option<Student>>;
    /// Students matching the filter, ordered by id
    async fn list_students(&self, filter: &ListFilter) -> Result<Vec<Student>>;
    async fn update_student(&self, id: Id, changes: StudentChanges) -> Result<Option<Student>>;
    /// Delete a student and drop it from every course it is enrolled in
    async fn delete_student(&self, id: Id) -> Result<bool>;
}

/// Course persistence. Operations that touch the student set run the
/// enrollment check before committing.
#[async_trait::async_trait]
pub trait CourseStore: Send + Sync {
    async fn create_course(&self, course: NewCourse) -> Result<Course>;
    async fn get_course(&self, id: Id) -> Result<Option<Course>>;
    /// Courses matching the filter, ordered by id
    async fn list_courses(&self, filter: &ListFilter) -> Result<Vec<Course>>;
    async fn update_course(&self, id: Id, changes: CourseChanges) -> Result<Option<Course>>;
    /// Delete a course and its enrollments; students are kept
    async fn delete_course(&self, id: Id) -> Result<bool>;
}

/// Result of an enrollment change. `changed` is false when the request left
/// the set as it was, e.g. removing a student who was not enrolled.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentUpdate {
    pub course: Course,
    pub changed: bool,
}

#[async_trait::async_trait]
pub trait EnrollmentStore: Send + Sync {
    fn enrollment_policy(&self) -> EnrollmentPolicy;

    /// Apply a change to a course's student set. Returns `Ok(None)` when the
    /// course does not exist. Fails with `EnrollmentError` when the resulting
    /// set would exceed the policy limit, leaving the previous set in place.
    async fn change_enrollment(&self, course_id: Id, change: EnrollmentChange) -> Result<Option<EnrollmentUpdate>>;

    /// Enrolled students in enrollment order, or `None` for an unknown course
    async fn course_students(&self, course_id: Id) -> Result<Option<Vec<Student>>>;

    async fn add_students(&self, course_id: Id, student_ids: Vec<Id>) -> Result<Option<EnrollmentUpdate>> {
        self.change_enrollment(course_id, EnrollmentChange::Add(student_ids)).await
    }

    async fn remove_student(&self, course_id: Id, student_id: Id) -> Result<Option<EnrollmentUpdate>> {
        self.change_enrollment(course_id, EnrollmentChange::Remove(student_id)).await
    }

    async fn clear_students(&self, course_id: Id) -> Result<Option<EnrollmentUpdate>> {
        self.change_enrollment(course_id, EnrollmentChange::Clear).await
    }

    async fn set_students(&self, course_id: Id, student_ids: Vec<Id>) -> Result<Option<EnrollmentUpdate>> {
        self.change_enrollment(course_id, EnrollmentChange::Set(student_ids)).await
    }
}

pub trait Store: StudentStore + CourseStore + EnrollmentStore + Send + Sync {}
