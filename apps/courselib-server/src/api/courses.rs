//! Course routes of an author.
//!
//! Route values and bodies are bound through [`ActionBinder`] so that an
//! unparseable author id is reported as an input problem (400) even when the
//! body also breaks a rule, while a well-formed request that breaks a rule
//! is a validation problem (422). Bodies may be JSON or XML; any other
//! `Content-Type` is answered 415.

use axum::body::Bytes;
use axum::extract::{RawPathParams, State};
use axum::response::Response;
use courselib_errors::ProblemDetails;
use courselib_pipeline::{ActionBinder, ProblemContext};
use http::{HeaderValue, StatusCode, header};
use uuid::Uuid;

use super::dto::{CourseDto, CourseForCreationDto, CourseForUpdateDto, CoursePatchDto};
use super::{ApiError, AppState, path_value};

const AUTHOR_ID: &str = "authorId";
const COURSE_ID: &str = "courseId";

/// Create a course for an author
#[utoipa::path(
    post,
    path = "/api/authors/{authorId}/courses",
    tag = "courses",
    params(("authorId" = Uuid, Path, description = "Id of the author")),
    request_body = CourseForCreationDto,
    responses(
        (status = 201, description = "Course created", body = CourseDto),
        (status = 400, description = "Input could not be bound", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 404, description = "Unknown author", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 415, description = "Body is neither JSON nor XML", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 422, description = "Course breaks a validation rule", body = ProblemDetails, content_type = "application/problem+json")
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    ctx: ProblemContext,
    params: RawPathParams,
    body: Bytes,
) -> Result<Response, ApiError> {
    let mut binder = ActionBinder::new(2);
    let author_id = binder.bind_value::<Uuid>(AUTHOR_ID, path_value(&params, AUTHOR_ID));
    let course = binder.bind_body::<CourseForCreationDto>(
        "course",
        ctx.scope().content_type.as_deref(),
        &body,
    );
    if let Some(course) = &course {
        binder.validate(course);
    }
    let (author_id, course) = ctx.finish(binder, author_id.zip(course))?;

    if !state.catalog.author_exists(author_id) {
        return Err(ApiError::not_found(&ctx, format!("Author {author_id} was not found.")));
    }
    let created = state
        .catalog
        .add_course(author_id, course.title, course.description);
    tracing::info!(%author_id, course_id = %created.id, "Course created");

    let location = format!("/api/authors/{author_id}/courses/{}", created.id);
    let mut response = ctx
        .negotiator()
        .respond(StatusCode::CREATED, "course", &CourseDto::from(created));
    if response.status() == StatusCode::CREATED
        && let Ok(value) = HeaderValue::from_str(&location)
    {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

/// Get one course of an author
#[utoipa::path(
    get,
    path = "/api/authors/{authorId}/courses/{courseId}",
    tag = "courses",
    params(
        ("authorId" = Uuid, Path, description = "Id of the author"),
        ("courseId" = Uuid, Path, description = "Id of the course")
    ),
    responses(
        (status = 200, description = "The course", body = CourseDto),
        (status = 400, description = "Malformed id", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 404, description = "Unknown course", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 406, description = "No acceptable output format")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    ctx: ProblemContext,
    params: RawPathParams,
) -> Result<Response, ApiError> {
    let mut binder = ActionBinder::new(2);
    let author_id = binder.bind_value::<Uuid>(AUTHOR_ID, path_value(&params, AUTHOR_ID));
    let course_id = binder.bind_value::<Uuid>(COURSE_ID, path_value(&params, COURSE_ID));
    let (author_id, course_id) = ctx.finish(binder, author_id.zip(course_id))?;

    let Some(course) = state.catalog.course_for_author(author_id, course_id) else {
        return Err(ApiError::not_found(
            &ctx,
            format!("Course {course_id} of author {author_id} was not found."),
        ));
    };
    Ok(ctx
        .negotiator()
        .respond(StatusCode::OK, "course", &CourseDto::from(course)))
}

/// Partially update a course
///
/// The patch is applied to the stored course and the result validated before
/// it is saved; rule failures are reported as 422.
#[utoipa::path(
    patch,
    path = "/api/authors/{authorId}/courses/{courseId}",
    tag = "courses",
    params(
        ("authorId" = Uuid, Path, description = "Id of the author"),
        ("courseId" = Uuid, Path, description = "Id of the course")
    ),
    request_body = CoursePatchDto,
    responses(
        (status = 204, description = "Course updated"),
        (status = 400, description = "Input could not be bound", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 404, description = "Unknown course", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 415, description = "Body is neither JSON nor XML", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 422, description = "Patched course breaks a validation rule", body = ProblemDetails, content_type = "application/problem+json")
    )
)]
pub async fn update_course(
    State(state): State<AppState>,
    ctx: ProblemContext,
    params: RawPathParams,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let mut binder = ActionBinder::new(3);
    let author_id = binder.bind_value::<Uuid>(AUTHOR_ID, path_value(&params, AUTHOR_ID));
    let course_id = binder.bind_value::<Uuid>(COURSE_ID, path_value(&params, COURSE_ID));
    let patch =
        binder.bind_body::<CoursePatchDto>("patch", ctx.scope().content_type.as_deref(), &body);
    let ((author_id, course_id), patch) =
        ctx.finish(binder, author_id.zip(course_id).zip(patch))?;

    let Some(mut course) = state.catalog.course_for_author(author_id, course_id) else {
        return Err(ApiError::not_found(
            &ctx,
            format!("Course {course_id} of author {author_id} was not found."),
        ));
    };

    let update = CourseForUpdateDto::patched(&course, patch);
    ctx.validate(&update)?;

    course.title = update.title;
    course.description = update.description;
    state.catalog.update_course(course);
    tracing::info!(%author_id, %course_id, "Course updated");
    Ok(StatusCode::NO_CONTENT)
}
