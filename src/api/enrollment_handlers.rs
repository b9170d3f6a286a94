use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};

use crate::api::handlers::{json_body, not_found, store_error, AppState, ErrorResponse};
use crate::logic::unique_ids;
use crate::model::{Course, EnrollmentRequest, Id, Student};
use crate::store::traits::Store;

/// Students of a course as full objects, in enrollment order
pub async fn list_course_students<S: Store>(
    State(store): State<AppState<S>>,
    Path(course_id): Path<Id>,
) -> Result<Json<Vec<Student>>, (StatusCode, Json<ErrorResponse>)> {
    match store.course_students(course_id).await {
        Ok(Some(students)) => Ok(Json(students)),
        Ok(None) => Err(not_found("Course not found")),
        Err(e) => Err(store_error(e)),
    }
}

pub async fn add_course_students<S: Store>(
    State(store): State<AppState<S>>,
    Path(course_id): Path<Id>,
    body: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> Result<Json<Course>, (StatusCode, Json<ErrorResponse>)> {
    let request = json_body(body)?;
    match store.add_students(course_id, unique_ids(request.students)).await {
        Ok(Some(update)) => Ok(Json(update.course)),
        Ok(None) => Err(not_found("Course not found")),
        Err(e) => Err(store_error(e)),
    }
}

pub async fn clear_course_students<S: Store>(
    State(store): State<AppState<S>>,
    Path(course_id): Path<Id>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match store.clear_students(course_id).await {
        Ok(Some(_)) => Ok(StatusCode::NO_CONTENT),
        Ok(None) => Err(not_found("Course not found")),
        Err(e) => Err(store_error(e)),
    }
}

pub async fn remove_course_student<S: Store>(
    State(store): State<AppState<S>>,
    Path((course_id, student_id)): Path<(Id, Id)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match store.remove_student(course_id, student_id).await {
        Ok(Some(update)) if update.changed => Ok(StatusCode::NO_CONTENT),
        Ok(Some(_)) => Err(not_found("Student is not enrolled in this course")),
        Ok(None) => Err(not_found("Course not found")),
        Err(e) => Err(store_error(e)),
    }
}
