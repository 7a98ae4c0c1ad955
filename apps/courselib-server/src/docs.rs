//! OpenAPI document of the API, served as JSON.

use axum::routing::get;
use axum::{Json, Router};
use courselib_errors::ProblemDetails;
use utoipa::OpenApi;
use utoipa::openapi::{ContactBuilder, InfoBuilder, LicenseBuilder};

use crate::api::dto::{CourseDto, CourseForCreationDto, CoursePatchDto};
use crate::api::{AppState, courses};
use crate::config::DocsConfig;

pub const OPENAPI_PATH: &str = "/swagger/v1/swagger.json";

#[derive(OpenApi)]
#[openapi(
    paths(courses::create_course, courses::get_course, courses::update_course),
    components(schemas(CourseDto, CourseForCreationDto, CoursePatchDto, ProblemDetails)),
    tags((name = "courses", description = "Courses of an author"))
)]
struct ApiDoc;

/// Generated document with its metadata taken from `config`.
#[must_use]
pub fn openapi(config: &DocsConfig) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    let has_contact = config.contact_name.is_some()
        || config.contact_email.is_some()
        || config.contact_url.is_some();
    let contact = has_contact.then(|| {
        ContactBuilder::new()
            .name(config.contact_name.clone())
            .email(config.contact_email.clone())
            .url(config.contact_url.clone())
            .build()
    });
    let license = LicenseBuilder::new()
        .name(config.license_name.clone())
        .url(config.license_url.clone())
        .build();

    doc.info = InfoBuilder::new()
        .title(config.title.clone())
        .version(config.version.clone())
        .description(Some(config.description.clone()))
        .contact(contact)
        .license(Some(license))
        .build();
    doc
}

#[must_use]
pub fn router(config: &DocsConfig) -> Router<AppState> {
    let doc = openapi(config);
    Router::new().route(
        OPENAPI_PATH,
        get(move || {
            let doc = doc.clone();
            async move { Json(doc) }
        }),
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn info_defaults() {
        let doc = openapi(&DocsConfig::default());
        assert_eq!(doc.info.title, "Course Library API");
        assert_eq!(doc.info.version, "v1");
        assert_eq!(
            doc.info.description.as_deref(),
            Some("Through this API you can access authors and their books.")
        );
        assert_eq!(
            doc.info.license.as_ref().map(|l| l.name.as_str()),
            Some("MIT License")
        );
        assert!(doc.info.contact.is_none());
    }

    #[test]
    fn documents_course_routes_and_problem_schema() {
        let doc = openapi(&DocsConfig::default());
        assert!(
            doc.paths
                .paths
                .contains_key("/api/authors/{authorId}/courses/{courseId}")
        );
        let schemas = doc.components.map(|c| c.schemas).unwrap_or_default();
        assert!(schemas.contains_key("ProblemDetails"));
        assert!(schemas.contains_key("CourseForCreationDto"));
    }
}
