//! HTTP surface of the Course Library API.

pub mod catalog;
pub mod courses;
pub mod dto;

use std::sync::Arc;

use axum::Router;
use axum::extract::RawPathParams;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use courselib_errors::{ProblemDetails, finalize};
use courselib_pipeline::{ProblemContext, ProblemFormat, RequestScope, ValidationProblem};
use http::StatusCode;

use self::catalog::CourseCatalog;

#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Arc<CourseCatalog>,
}

/// Failures of the course routes that are answered with a problem body.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationProblem),
    NotFound { detail: String, scope: RequestScope },
}

impl ApiError {
    #[must_use]
    pub fn not_found(ctx: &ProblemContext, detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
            scope: ctx.scope().clone(),
        }
    }
}

impl From<ValidationProblem> for ApiError {
    fn from(problem: ValidationProblem) -> Self {
        Self::Validation(problem)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(problem) => problem.into_response(),
            Self::NotFound { detail, scope } => {
                tracing::debug!(path = scope.path.as_str(), %detail, "Resource not found");
                let problem = finalize(
                    ProblemDetails::new(StatusCode::NOT_FOUND, "Not Found", detail),
                    &scope.path,
                    scope.trace_id,
                );
                ProblemFormat::negotiate(scope.accept.as_deref()).render(&problem)
            }
        }
    }
}

/// Raw value of a route segment, left unparsed so the binder can report it.
fn path_value<'a>(params: &'a RawPathParams, name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[must_use]
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/authors/{authorId}/courses",
            post(courses::create_course),
        )
        .route(
            "/api/authors/{authorId}/courses/{courseId}",
            get(courses::get_course).patch(courses::update_course),
        )
}
