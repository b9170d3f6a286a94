use crate::model::{Id, NewCourse, NewStudent};
use crate::store::traits::Store;
use anyhow::Result;
use chrono::NaiveDate;

const STUDENTS: &[(&str, Option<(i32, u32, u32)>)] = &[
    ("Alice Johnson", Some((2001, 4, 12))),
    ("Boris Petrov", Some((2000, 11, 3))),
    ("Chen Wei", None),
    ("Dana Scully", Some((2002, 1, 23))),
    ("Emeka Obi", Some((1999, 7, 30))),
    ("Fatima Zahra", None),
];

const COURSES: &[&str] = &["Linear Algebra", "Operating Systems", "Databases"];

/// Insert a few students and courses for local demos.
///
/// Courses are filled round-robin and never beyond the store's enrollment limit.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    let mut student_ids: Vec<Id> = Vec::new();
    for (name, birth_date) in STUDENTS {
        let student = store
            .create_student(NewStudent {
                name: name.to_string(),
                birth_date: birth_date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            })
            .await?;
        student_ids.push(student.id);
    }

    let capacity = store.enrollment_policy().max_students_per_course();
    for (index, name) in COURSES.iter().enumerate() {
        let students: Vec<Id> = student_ids
            .iter()
            .skip(index)
            .step_by(2)
            .take(capacity)
            .copied()
            .collect();

        let course = store
            .create_course(NewCourse {
                name: name.to_string(),
                students,
            })
            .await?;
        log::info!(
            "Seeded course {} ({}) with {} students",
            course.id,
            course.name,
            course.students.len()
        );
    }

    Ok(())
}
