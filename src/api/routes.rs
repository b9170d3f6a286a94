use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::{enrollment_handlers, handlers, student_handlers};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Courses
        .route("/api/v1/courses/", get(handlers::list_courses::<S>))
        .route("/api/v1/courses/", post(handlers::create_course::<S>))
        .route("/api/v1/courses/:course_id/", get(handlers::get_course::<S>))
        .route("/api/v1/courses/:course_id/", put(handlers::update_course::<S>))
        .route(
            "/api/v1/courses/:course_id/",
            patch(handlers::partial_update_course::<S>),
        )
        .route("/api/v1/courses/:course_id/", delete(handlers::delete_course::<S>))
        // Enrollment of a single course
        .route(
            "/api/v1/courses/:course_id/students/",
            get(enrollment_handlers::list_course_students::<S>),
        )
        .route(
            "/api/v1/courses/:course_id/students/",
            post(enrollment_handlers::add_course_students::<S>),
        )
        .route(
            "/api/v1/courses/:course_id/students/",
            delete(enrollment_handlers::clear_course_students::<S>),
        )
        .route(
            "/api/v1/courses/:course_id/students/:student_id/",
            delete(enrollment_handlers::remove_course_student::<S>),
        )
        // Students
        .route("/api/v1/students/", get(student_handlers::list_students::<S>))
        .route("/api/v1/students/", post(student_handlers::create_student::<S>))
        .route(
            "/api/v1/students/:student_id/",
            get(student_handlers::get_student::<S>),
        )
        .route(
            "/api/v1/students/:student_id/",
            put(student_handlers::update_student::<S>),
        )
        .route(
            "/api/v1/students/:student_id/",
            patch(student_handlers::partial_update_student::<S>),
        )
        .route(
            "/api/v1/students/:student_id/",
            delete(student_handlers::delete_student::<S>),
        )
}
