use anyhow::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::logic::enrollment::{EnrollmentChange, EnrollmentPolicy};
use crate::logic::validate::ValidationError;
use crate::model::{Course, CourseChanges, Id, ListFilter, NewCourse, NewStudent, Student, StudentChanges};
use crate::store::traits::{CourseStore, EnrollmentStore, EnrollmentUpdate, Store, StudentStore};

#[derive(Debug)]
struct Tables {
    students: BTreeMap<Id, Student>,
    courses: BTreeMap<Id, Course>,
    next_student_id: Id,
    next_course_id: Id,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            students: BTreeMap::new(),
            courses: BTreeMap::new(),
            next_student_id: 1,
            next_course_id: 1,
        }
    }
}

impl Tables {
    fn ensure_students_exist(&self, ids: &[Id]) -> Result<(), ValidationError> {
        match ids.iter().find(|id| !self.students.contains_key(*id)) {
            Some(missing) => Err(ValidationError::UnknownStudent(*missing)),
            None => Ok(()),
        }
    }

    /// Computes the new student set and runs the policy; nothing is written
    /// unless both succeed.
    fn enrollment_after(
        &self,
        policy: &EnrollmentPolicy,
        course_id: Id,
        current: &[Id],
        change: &EnrollmentChange,
    ) -> Result<Vec<Id>> {
        self.ensure_students_exist(change.student_ids())?;
        let next = change.apply(current);
        policy.check(course_id, next.len())?;
        Ok(next)
    }
}

/// In-process store. A single write lock covers each mutation together with
/// its enrollment check.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    policy: EnrollmentPolicy,
}

impl MemoryStore {
    pub fn new(policy: EnrollmentPolicy) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            policy,
        }
    }
}

#[async_trait::async_trait]
impl StudentStore for MemoryStore {
    async fn create_student(&self, student: NewStudent) -> Result<Student> {
        let mut tables = self.tables.write();
        let student = Student {
            id: tables.next_student_id,
            name: student.name,
            birth_date: student.birth_date,
        };
        tables.next_student_id += 1;
        tables.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn get_student(&self, id: Id) -> Result<Option<Student>> {
        Ok(self.tables.read().students.get(&id).cloned())
    }

    async fn list_students(&self, filter: &ListFilter) -> Result<Vec<Student>> {
        let tables = self.tables.read();
        Ok(tables
            .students
            .values()
            .filter(|student| filter.matches_student(student))
            .cloned()
            .collect())
    }

    async fn update_student(&self, id: Id, changes: StudentChanges) -> Result<Option<Student>> {
        let mut tables = self.tables.write();
        let Some(student) = tables.students.get_mut(&id) else {
            return Ok(None);
        };
        student.apply(changes);
        Ok(Some(student.clone()))
    }

    async fn delete_student(&self, id: Id) -> Result<bool> {
        let mut tables = self.tables.write();
        if tables.students.remove(&id).is_none() {
            return Ok(false);
        }
        for course in tables.courses.values_mut() {
            course.students.retain(|student_id| *student_id != id);
        }
        Ok(true)
    }
}

#[async_trait::async_trait]
impl CourseStore for MemoryStore {
    async fn create_course(&self, course: NewCourse) -> Result<Course> {
        let mut tables = self.tables.write();
        let id = tables.next_course_id;
        let students =
            tables.enrollment_after(&self.policy, id, &[], &EnrollmentChange::Set(course.students))?;

        let course = Course {
            id,
            name: course.name,
            students,
        };
        tables.next_course_id += 1;
        tables.courses.insert(id, course.clone());
        Ok(course)
    }

    async fn get_course(&self, id: Id) -> Result<Option<Course>> {
        Ok(self.tables.read().courses.get(&id).cloned())
    }

    async fn list_courses(&self, filter: &ListFilter) -> Result<Vec<Course>> {
        let tables = self.tables.read();
        Ok(tables
            .courses
            .values()
            .filter(|course| filter.matches_course(course))
            .cloned()
            .collect())
    }

    async fn update_course(&self, id: Id, changes: CourseChanges) -> Result<Option<Course>> {
        let mut tables = self.tables.write();
        let Some(current) = tables.courses.get(&id) else {
            return Ok(None);
        };

        let students = match changes.students {
            Some(ids) => tables.enrollment_after(&self.policy, id, &current.students, &EnrollmentChange::Set(ids))?,
            None => current.students.clone(),
        };

        let Some(course) = tables.courses.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            course.name = name;
        }
        course.students = students;
        Ok(Some(course.clone()))
    }

    async fn delete_course(&self, id: Id) -> Result<bool> {
        Ok(self.tables.write().courses.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl EnrollmentStore for MemoryStore {
    fn enrollment_policy(&self) -> EnrollmentPolicy {
        self.policy
    }

    async fn change_enrollment(&self, course_id: Id, change: EnrollmentChange) -> Result<Option<EnrollmentUpdate>> {
        let mut tables = self.tables.write();
        let Some(current) = tables.courses.get(&course_id) else {
            return Ok(None);
        };
        let students = tables.enrollment_after(&self.policy, course_id, &current.students, &change)?;
        let changed = students != current.students;

        let Some(course) = tables.courses.get_mut(&course_id) else {
            return Ok(None);
        };
        course.students = students;
        log::info!(
            "Enrollment {} on course {}: {} students",
            change.describe(),
            course_id,
            course.students.len()
        );
        Ok(Some(EnrollmentUpdate {
            course: course.clone(),
            changed,
        }))
    }

    async fn course_students(&self, course_id: Id) -> Result<Option<Vec<Student>>> {
        let tables = self.tables.read();
        let Some(course) = tables.courses.get(&course_id) else {
            return Ok(None);
        };
        Ok(Some(
            course
                .students
                .iter()
                .filter_map(|id| tables.students.get(id).cloned())
                .collect(),
        ))
    }
}

impl Store for MemoryStore {}
