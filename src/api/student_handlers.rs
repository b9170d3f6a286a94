use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};

use crate::api::handlers::{bad_request, json_body, list_filter, not_found, store_error, AppState, ErrorResponse};
use crate::logic::normalize_name;
use crate::model::{Id, ListFilter, NewStudent, Student, StudentChanges, StudentPatch, StudentUpdate};
use crate::store::traits::Store;

fn validate_changes(mut changes: StudentChanges) -> Result<StudentChanges, (StatusCode, Json<ErrorResponse>)> {
    if let Some(name) = &changes.name {
        changes.name = Some(normalize_name(name).map_err(|e| bad_request(&e.to_string()))?);
    }
    Ok(changes)
}

pub async fn list_students<S: Store>(
    State(store): State<AppState<S>>,
    query: Result<Query<ListFilter>, QueryRejection>,
) -> Result<Json<Vec<Student>>, (StatusCode, Json<ErrorResponse>)> {
    let filter = list_filter(query)?;
    match store.list_students(&filter).await {
        Ok(students) => Ok(Json(students)),
        Err(e) => Err(store_error(e)),
    }
}

pub async fn create_student<S: Store>(
    State(store): State<AppState<S>>,
    body: Result<Json<NewStudent>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), (StatusCode, Json<ErrorResponse>)> {
    let new_student = json_body(body)?;
    let name = normalize_name(&new_student.name).map_err(|e| bad_request(&e.to_string()))?;

    match store
        .create_student(NewStudent {
            name,
            birth_date: new_student.birth_date,
        })
        .await
    {
        Ok(student) => {
            log::info!("Created student {} ({})", student.id, student.name);
            Ok((StatusCode::CREATED, Json(student)))
        }
        Err(e) => Err(store_error(e)),
    }
}

pub async fn get_student<S: Store>(
    State(store): State<AppState<S>>,
    Path(student_id): Path<Id>,
) -> Result<Json<Student>, (StatusCode, Json<ErrorResponse>)> {
    match store.get_student(student_id).await {
        Ok(Some(student)) => Ok(Json(student)),
        Ok(None) => Err(not_found("Student not found")),
        Err(e) => Err(store_error(e)),
    }
}

pub async fn update_student<S: Store>(
    State(store): State<AppState<S>>,
    Path(student_id): Path<Id>,
    body: Result<Json<StudentUpdate>, JsonRejection>,
) -> Result<Json<Student>, (StatusCode, Json<ErrorResponse>)> {
    let changes = validate_changes(json_body(body)?.into())?;
    apply_student_changes(&*store, student_id, changes).await
}

pub async fn partial_update_student<S: Store>(
    State(store): State<AppState<S>>,
    Path(student_id): Path<Id>,
    body: Result<Json<StudentPatch>, JsonRejection>,
) -> Result<Json<Student>, (StatusCode, Json<ErrorResponse>)> {
    let changes = StudentChanges::try_from(json_body(body)?).map_err(|e| bad_request(&e.to_string()))?;
    let changes = validate_changes(changes)?;
    apply_student_changes(&*store, student_id, changes).await
}

async fn apply_student_changes<S: Store>(
    store: &S,
    student_id: Id,
    changes: StudentChanges,
) -> Result<Json<Student>, (StatusCode, Json<ErrorResponse>)> {
    match store.update_student(student_id, changes).await {
        Ok(Some(student)) => Ok(Json(student)),
        Ok(None) => Err(not_found("Student not found")),
        Err(e) => Err(store_error(e)),
    }
}

pub async fn delete_student<S: Store>(
    State(store): State<AppState<S>>,
    Path(student_id): Path<Id>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match store.delete_student(student_id).await {
        Ok(true) => {
            log::info!("Deleted student {}", student_id);
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(not_found("Student not found")),
        Err(e) => Err(store_error(e)),
    }
}
