#![allow(dead_code)]

use courses_api::routes::create_router;
use courses_api::store::traits::{CourseStore, StudentStore};
use courses_api::{Course, EnrollmentPolicy, Id, MemoryStore, NewCourse, NewStudent, Store, Student};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;

// Test client wrapper for making API calls
pub struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    pub async fn put(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .put(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    pub async fn patch(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .patch(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    pub async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
    }

    pub async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .delete(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }
}

/// A server on an ephemeral port. The store handle is shared so tests can
/// arrange data without going through HTTP.
pub struct TestApp<S: Store = MemoryStore> {
    pub client: TestClient,
    pub store: Arc<S>,
}

pub async fn spawn_app(max_students_per_course: usize) -> TestApp {
    spawn_app_with(MemoryStore::new(EnrollmentPolicy::new(max_students_per_course))).await
}

pub async fn spawn_app_with<S: Store + 'static>(store: S) -> TestApp<S> {
    let store = Arc::new(store);
    let app = create_router().with_state(store.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        client: TestClient::new(format!("http://{}", address)),
        store,
    }
}

impl<S: Store> TestApp<S> {
    pub async fn make_students(&self, quantity: usize) -> Vec<Student> {
        let mut students = Vec::with_capacity(quantity);
        for i in 0..quantity {
            let student = self
                .store
                .create_student(NewStudent {
                    name: format!("Student {}", i + 1),
                    birth_date: None,
                })
                .await
                .unwrap();
            students.push(student);
        }
        students
    }

    pub async fn make_courses(&self, quantity: usize, students: &[Student]) -> Vec<Course> {
        let student_ids: Vec<Id> = students.iter().map(|s| s.id).collect();
        let mut courses = Vec::with_capacity(quantity);
        for i in 0..quantity {
            let course = self
                .store
                .create_course(NewCourse {
                    name: format!("Course {}", i + 1),
                    students: student_ids.clone(),
                })
                .await
                .unwrap();
            courses.push(course);
        }
        courses
    }

    pub async fn make_course(&self) -> Course {
        self.make_courses(1, &[]).await.remove(0)
    }
}
