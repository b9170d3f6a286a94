mod common;

use common::spawn_app;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_student_crud() {
    let app = spawn_app(20).await;

    let response = app
        .client
        .post("/api/v1/students/", json!({"name": "Grace Hopper", "birth_date": "1906-12-09"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["birth_date"], "1906-12-09");
    let path = format!("/api/v1/students/{}/", created["id"]);

    let response = app
        .client
        .put(&path, json!({"name": "Rear Admiral Hopper"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["name"], "Rear Admiral Hopper");
    assert_eq!(updated["birth_date"], "1906-12-09");

    let response = app.client.patch(&path, json!({"birth_date": null})).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let patched: Value = response.json().await.unwrap();
    assert_eq!(patched["birth_date"], Value::Null);
    assert_eq!(patched["name"], "Rear Admiral Hopper");

    let response = app.client.delete(&path).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.client.get(&path).await.unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_null_name_is_rejected_on_patch() {
    let app = spawn_app(20).await;
    let student = app.make_students(1).await.remove(0);
    let path = format!("/api/v1/students/{}/", student.id);

    let response = app.client.patch(&path, json!({"name": null})).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "name: This field may not be null.");

    let fetched: Value = app.client.get(&path).await.unwrap().json().await.unwrap();
    assert_eq!(fetched["name"], student.name.as_str());
}

#[tokio::test]
async fn test_student_without_birth_date() {
    let app = spawn_app(20).await;
    let response = app
        .client
        .post("/api/v1/students/", json!({"name": "Anonymous"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["birth_date"], Value::Null);
}

#[tokio::test]
async fn test_invalid_birth_date_is_rejected() {
    let app = spawn_app(20).await;
    let response = app
        .client
        .post("/api/v1/students/", json!({"name": "Nobody", "birth_date": "not-a-date"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_filter_students_by_name() {
    let app = spawn_app(20).await;
    let students = app.make_students(4).await;

    let response = app
        .client
        .get_with_query("/api/v1/students/", &[("name", students[2].name.clone())])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let data: Vec<Value> = response.json().await.unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], students[2].id);
}

#[tokio::test]
async fn test_deleting_student_unenrolls_but_keeps_course() {
    let app = spawn_app(20).await;
    let students = app.make_students(2).await;
    let course = app.make_courses(1, &students).await.remove(0);

    let response = app
        .client
        .delete(&format!("/api/v1/students/{}/", students[0].id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let data: Value = app
        .client
        .get(&format!("/api/v1/courses/{}/", course.id))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(data["students"], json!([students[1].id]));
}

#[tokio::test]
async fn test_deleting_course_keeps_students() {
    let app = spawn_app(20).await;
    let students = app.make_students(2).await;
    let course = app.make_courses(1, &students).await.remove(0);

    let response = app
        .client
        .delete(&format!("/api/v1/courses/{}/", course.id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let listed: Vec<Value> = app
        .client
        .get("/api/v1/students/")
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}
