use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::logic::{normalize_name, unique_ids, EnrollmentError, ValidationError};
use crate::model::{Course, CourseChanges, CoursePatch, CourseUpdate, Id, ListFilter, NewCourse};
use crate::store::traits::Store;

pub type AppState<S> = Arc<S>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

pub(crate) fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

pub(crate) fn not_found(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message)))
}

/// Maps a store failure to a response: rule violations are the caller's
/// fault (400), anything else is ours (500).
pub(crate) fn store_error(e: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    if let Some(err) = e.downcast_ref::<EnrollmentError>() {
        return bad_request(&err.to_string());
    }
    if let Some(err) = e.downcast_ref::<ValidationError>() {
        return bad_request(&err.to_string());
    }

    log::error!("Store operation failed: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(&e.to_string())),
    )
}

pub(crate) fn json_body<T>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, (StatusCode, Json<ErrorResponse>)> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(bad_request(&rejection.body_text())),
    }
}

pub(crate) fn list_filter(
    query: Result<Query<ListFilter>, QueryRejection>,
) -> Result<ListFilter, (StatusCode, Json<ErrorResponse>)> {
    match query {
        Ok(Query(filter)) => Ok(filter),
        Err(rejection) => Err(bad_request(&rejection.body_text())),
    }
}

fn validate_changes<T>(body: T) -> Result<CourseChanges, (StatusCode, Json<ErrorResponse>)>
where
    CourseChanges: TryFrom<T, Error = ValidationError>,
{
    let mut changes = CourseChanges::try_from(body).map_err(|e| bad_request(&e.to_string()))?;
    if let Some(name) = &changes.name {
        changes.name = Some(normalize_name(name).map_err(|e| bad_request(&e.to_string()))?);
    }
    changes.students = changes.students.map(unique_ids);
    Ok(changes)
}

// Course handlers
pub async fn list_courses<S: Store>(
    State(store): State<AppState<S>>,
    query: Result<Query<ListFilter>, QueryRejection>,
) -> Result<Json<Vec<Course>>, (StatusCode, Json<ErrorResponse>)> {
    let filter = list_filter(query)?;
    match store.list_courses(&filter).await {
        Ok(courses) => Ok(Json(courses)),
        Err(e) => Err(store_error(e)),
    }
}

pub async fn create_course<S: Store>(
    State(store): State<AppState<S>>,
    body: Result<Json<NewCourse>, JsonRejection>,
) -> Result<(StatusCode, Json<Course>), (StatusCode, Json<ErrorResponse>)> {
    let new_course = json_body(body)?;
    let name = normalize_name(&new_course.name).map_err(|e| bad_request(&e.to_string()))?;
    let new_course = NewCourse {
        name,
        students: unique_ids(new_course.students),
    };

    match store.create_course(new_course).await {
        Ok(course) => {
            log::info!("Created course {} ({})", course.id, course.name);
            Ok((StatusCode::CREATED, Json(course)))
        }
        Err(e) => Err(store_error(e)),
    }
}

pub async fn get_course<S: Store>(
    State(store): State<AppState<S>>,
    Path(course_id): Path<Id>,
) -> Result<Json<Course>, (StatusCode, Json<ErrorResponse>)> {
    match store.get_course(course_id).await {
        Ok(Some(course)) => Ok(Json(course)),
        Ok(None) => Err(not_found("Course not found")),
        Err(e) => Err(store_error(e)),
    }
}

pub async fn update_course<S: Store>(
    State(store): State<AppState<S>>,
    Path(course_id): Path<Id>,
    body: Result<Json<CourseUpdate>, JsonRejection>,
) -> Result<Json<Course>, (StatusCode, Json<ErrorResponse>)> {
    let changes = validate_changes(json_body(body)?)?;
    apply_course_changes(&*store, course_id, changes).await
}

pub async fn partial_update_course<S: Store>(
    State(store): State<AppState<S>>,
    Path(course_id): Path<Id>,
    body: Result<Json<CoursePatch>, JsonRejection>,
) -> Result<Json<Course>, (StatusCode, Json<ErrorResponse>)> {
    let changes = validate_changes(json_body(body)?)?;
    apply_course_changes(&*store, course_id, changes).await
}

async fn apply_course_changes<S: Store>(
    store: &S,
    course_id: Id,
    changes: CourseChanges,
) -> Result<Json<Course>, (StatusCode, Json<ErrorResponse>)> {
    match store.update_course(course_id, changes).await {
        Ok(Some(course)) => {
            log::info!("Updated course {}", course.id);
            Ok(Json(course))
        }
        Ok(None) => Err(not_found("Course not found")),
        Err(e) => Err(store_error(e)),
    }
}

pub async fn delete_course<S: Store>(
    State(store): State<AppState<S>>,
    Path(course_id): Path<Id>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match store.delete_course(course_id).await {
        Ok(true) => {
            log::info!("Deleted course {}", course_id);
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(not_found("Course not found")),
        Err(e) => Err(store_error(e)),
    }
}
