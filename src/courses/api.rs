//! REST API handlers for the course server
//!
//! Every endpoint answers `200 OK`; lookups and validation failures are
//! reported as descriptive JSON strings rather than error statuses.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::model::Course;
use super::server::AppState;
use crate::utils::error::CourseError;

/// Payload of `GET /`
pub const WELCOME_PAGE: &str = "<h1>Welcome to the Course API</h1>";

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_home))
        .route("/courses", get(get_all_courses).delete(delete_all_courses))
        .route("/course", post(create_one_course))
        .route(
            "/course/{id}",
            get(get_one_course)
                .put(update_one_course)
                .delete(delete_one_course),
        )
        .with_state(state)
}

/// Decode a course body, falling back to an empty record on malformed JSON
fn decode_course(body: &[u8]) -> Course {
    match serde_json::from_slice(body) {
        Ok(course) => course,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed course payload");
            Course::default()
        }
    }
}

fn message(text: impl Into<String>) -> Response {
    Json(text.into()).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

async fn serve_home() -> Html<&'static str> {
    Html(WELCOME_PAGE)
}

async fn get_all_courses(State(state): State<AppState>) -> Json<Vec<Course>> {
    tracing::debug!("Get all courses");
    Json(state.store.list().await)
}

async fn get_one_course(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    tracing::debug!(id = %id, "Get one course");

    match state.store.get(&id).await {
        Some(course) => Json(course).into_response(),
        None => message(format!("No course found for CourseId: {id}")),
    }
}

async fn create_one_course(State(state): State<AppState>, body: Bytes) -> Response {
    if body.is_empty() {
        return message(CourseError::NoData.to_string());
    }

    match state.store.create(decode_course(&body)).await {
        Ok(course) => {
            tracing::info!(id = %course.course_id, name = %course.course_name, "Create one course");
            let location = format!("/course/{}", course.course_id);
            (
                [(header::LOCATION, location)],
                Json(format!("Course: {} has been created", course.course_name)),
            )
                .into_response()
        }
        Err(e) => {
            tracing::info!(error = %e, "Course rejected");
            message(e.to_string())
        }
    }
}

async fn update_one_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    match state.store.update(&id, decode_course(&body)).await {
        Ok(_) => {
            tracing::info!(id = %id, "Update one course");
            message("Course has been updated")
        }
        Err(e) => message(e.to_string()),
    }
}

async fn delete_one_course(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.delete(&id).await {
        Ok(_) => {
            tracing::info!(id = %id, "Delete one course");
            message(format!("Course id: {id} has been deleted"))
        }
        Err(e) => message(e.to_string()),
    }
}

async fn delete_all_courses(State(state): State<AppState>) -> Json<&'static str> {
    let removed = state.store.clear().await;
    tracing::info!(removed = removed, "Delete all courses");
    Json("All the courses have been deleted")
}

// ============================================================================
// Tests
// ============================================================================
