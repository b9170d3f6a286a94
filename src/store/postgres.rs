use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool, Row};
use std::collections::HashMap;

use crate::logic::enrollment::{EnrollmentChange, EnrollmentPolicy};
use crate::logic::validate::ValidationError;
use crate::model::{Course, CourseChanges, Id, ListFilter, NewCourse, NewStudent, Student, StudentChanges};
use crate::store::traits::{CourseStore, EnrollmentStore, EnrollmentUpdate, Store, StudentStore};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    policy: EnrollmentPolicy,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32, policy: EnrollmentPolicy) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool, policy })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

fn student_from_row(row: &sqlx::postgres::PgRow) -> Student {
    Student {
        id: row.get("id"),
        name: row.get("name"),
        birth_date: row.get("birth_date"),
    }
}

async fn fetch_course(conn: &mut PgConnection, id: Id) -> Result<Option<Course>> {
    let row = sqlx::query("SELECT id, name FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to fetch course")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let students: Vec<Id> = sqlx::query_scalar(
        "SELECT student_id FROM course_students WHERE course_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .context("Failed to fetch course students")?;

    Ok(Some(Course {
        id: row.get("id"),
        name: row.get("name"),
        students,
    }))
}

/// Takes a row lock on the course so concurrent enrollment changes serialize.
async fn lock_course(conn: &mut PgConnection, id: Id) -> Result<bool> {
    let row = sqlx::query("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to lock course")?;
    Ok(row.is_some())
}

/// Share-locks the referenced students until the transaction ends, so a
/// concurrent delete waits instead of racing the insert.
async fn ensure_students_exist(conn: &mut PgConnection, ids: &[Id]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let found: Vec<Id> = sqlx::query_scalar("SELECT id FROM students WHERE id = ANY($1) FOR SHARE")
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to look up students")?;

    if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
        return Err(ValidationError::UnknownStudent(*missing).into());
    }
    Ok(())
}

/// Writes the change inside the caller's transaction, then counts the result
/// and runs the policy. The caller commits only if this returns `Ok`.
///
/// Returns the number of enrollment rows inserted or deleted.
async fn apply_enrollment_change(
    conn: &mut PgConnection,
    policy: &EnrollmentPolicy,
    course_id: Id,
    change: &EnrollmentChange,
) -> Result<u64> {
    ensure_students_exist(conn, change.student_ids()).await?;

    let affected = match change {
        EnrollmentChange::Add(ids) => insert_enrollments(conn, course_id, ids).await?,
        EnrollmentChange::Remove(student_id) => {
            sqlx::query("DELETE FROM course_students WHERE course_id = $1 AND student_id = $2")
                .bind(course_id)
                .bind(student_id)
                .execute(&mut *conn)
                .await
                .context("Failed to remove enrollment")?
                .rows_affected()
        }
        EnrollmentChange::Clear => {
            sqlx::query("DELETE FROM course_students WHERE course_id = $1")
                .bind(course_id)
                .execute(&mut *conn)
                .await
                .context("Failed to clear enrollments")?
                .rows_affected()
        }
        EnrollmentChange::Set(ids) => {
            let removed = sqlx::query("DELETE FROM course_students WHERE course_id = $1 AND student_id <> ALL($2)")
                .bind(course_id)
                .bind(ids)
                .execute(&mut *conn)
                .await
                .context("Failed to replace enrollments")?
                .rows_affected();
            removed + insert_enrollments(conn, course_id, ids).await?
        }
    };

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_students WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(&mut *conn)
        .await
        .context("Failed to count enrollments")?;

    policy.check(course_id, count as usize)?;
    Ok(affected)
}

async fn insert_enrollments(conn: &mut PgConnection, course_id: Id, ids: &[Id]) -> Result<u64> {
    let mut inserted = 0;
    for student_id in ids {
        let result = sqlx::query(
            r#"
            INSERT INTO course_students (course_id, student_id)
            VALUES ($1, $2)
            ON CONFLICT (course_id, student_id) DO NOTHING
            "#,
        )
        .bind(course_id)
        .bind(student_id)
        .execute(&mut *conn)
        .await
        .context("Failed to insert enrollment")?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

#[async_trait::async_trait]
impl StudentStore for PostgresStore {
    async fn create_student(&self, student: NewStudent) -> Result<Student> {
        let row = sqlx::query(
            "INSERT INTO students (name, birth_date) VALUES ($1, $2) RETURNING id, name, birth_date",
        )
        .bind(&student.name)
        .bind(student.birth_date)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create student")?;

        Ok(student_from_row(&row))
    }

    async fn get_student(&self, id: Id) -> Result<Option<Student>> {
        let row = sqlx::query("SELECT id, name, birth_date FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch student")?;

        Ok(row.as_ref().map(student_from_row))
    }

    async fn list_students(&self, filter: &ListFilter) -> Result<Vec<Student>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, birth_date
            FROM students
            WHERE ($1::BIGINT IS NULL OR id = $1)
              AND ($2::TEXT IS NULL OR name = $2)
            ORDER BY id
            "#,
        )
        .bind(filter.id)
        .bind(filter.name.as_deref())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list students")?;

        Ok(rows.iter().map(student_from_row).collect())
    }

    async fn update_student(&self, id: Id, changes: StudentChanges) -> Result<Option<Student>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query("SELECT id, name, birth_date FROM students WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to fetch student")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut student = student_from_row(&row);
        student.apply(changes);

        sqlx::query("UPDATE students SET name = $2, birth_date = $3 WHERE id = $1")
            .bind(id)
            .bind(&student.name)
            .bind(student.birth_date)
            .execute(&mut *tx)
            .await
            .context("Failed to update student")?;

        tx.commit().await.context("Failed to commit student update")?;
        Ok(Some(student))
    }

    async fn delete_student(&self, id: Id) -> Result<bool> {
        // course_students rows go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete student")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl CourseStore for PostgresStore {
    async fn create_course(&self, course: NewCourse) -> Result<Course> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let id: Id = sqlx::query_scalar("INSERT INTO courses (name) VALUES ($1) RETURNING id")
            .bind(&course.name)
            .fetch_one(&mut *tx)
            .await
            .context("Failed to create course")?;

        apply_enrollment_change(&mut tx, &self.policy, id, &EnrollmentChange::Set(course.students)).await?;

        let created = fetch_course(&mut tx, id)
            .await?
            .context("Course missing right after insert")?;

        tx.commit().await.context("Failed to commit course creation")?;
        Ok(created)
    }

    async fn get_course(&self, id: Id) -> Result<Option<Course>> {
        let mut conn = self.pool.acquire().await.context("Failed to acquire connection")?;
        fetch_course(&mut conn, id).await
    }

    async fn list_courses(&self, filter: &ListFilter) -> Result<Vec<Course>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name
            FROM courses
            WHERE ($1::BIGINT IS NULL OR id = $1)
              AND ($2::TEXT IS NULL OR name = $2)
            ORDER BY id
            "#,
        )
        .bind(filter.id)
        .bind(filter.name.as_deref())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list courses")?;

        let course_ids: Vec<Id> = rows.iter().map(|row| row.get("id")).collect();

        let enrollment_rows = sqlx::query(
            r#"
            SELECT course_id, student_id
            FROM course_students
            WHERE course_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&course_ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list course students")?;

        let mut students_by_course: HashMap<Id, Vec<Id>> = HashMap::new();
        for row in enrollment_rows {
            students_by_course
                .entry(row.get("course_id"))
                .or_default()
                .push(row.get("student_id"));
        }

        let courses = rows
            .into_iter()
            .map(|row| {
                let id: Id = row.get("id");
                Course {
                    id,
                    name: row.get("name"),
                    students: students_by_course.remove(&id).unwrap_or_default(),
                }
            })
            .collect();

        Ok(courses)
    }

    async fn update_course(&self, id: Id, changes: CourseChanges) -> Result<Option<Course>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        if !lock_course(&mut tx, id).await? {
            return Ok(None);
        }

        if let Some(name) = &changes.name {
            sqlx::query("UPDATE courses SET name = $2 WHERE id = $1")
                .bind(id)
                .bind(name)
                .execute(&mut *tx)
                .await
                .context("Failed to update course")?;
        }

        if let Some(students) = changes.students {
            apply_enrollment_change(&mut tx, &self.policy, id, &EnrollmentChange::Set(students)).await?;
        }

        let updated = fetch_course(&mut tx, id).await?;
        tx.commit().await.context("Failed to commit course update")?;
        Ok(updated)
    }

    async fn delete_course(&self, id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete course")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl EnrollmentStore for PostgresStore {
    fn enrollment_policy(&self) -> EnrollmentPolicy {
        self.policy
    }

    async fn change_enrollment(&self, course_id: Id, change: EnrollmentChange) -> Result<Option<EnrollmentUpdate>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        if !lock_course(&mut tx, course_id).await? {
            return Ok(None);
        }

        // Dropping the transaction on error rolls the change back
        let affected = apply_enrollment_change(&mut tx, &self.policy, course_id, &change).await?;

        let course = fetch_course(&mut tx, course_id).await?;
        tx.commit().await.context("Failed to commit enrollment change")?;

        Ok(course.map(|course| {
            log::info!(
                "Enrollment {} on course {}: {} students",
                change.describe(),
                course_id,
                course.students.len()
            );
            EnrollmentUpdate {
                course,
                changed: affected > 0,
            }
        }))
    }

    async fn course_students(&self, course_id: Id) -> Result<Option<Vec<Student>>> {
        let mut conn = self.pool.acquire().await.context("Failed to acquire connection")?;

        if fetch_course(&mut conn, course_id).await?.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.birth_date
            FROM course_students cs
            JOIN students s ON s.id = cs.student_id
            WHERE cs.course_id = $1
            ORDER BY cs.id
            "#,
        )
        .bind(course_id)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to fetch course students")?;

        Ok(Some(rows.iter().map(student_from_row).collect()))
    }
}

impl Store for PostgresStore {}
