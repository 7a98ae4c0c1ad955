//! Maps a failed validation state to a problem response.
//!
//! Two categories exist:
//! - input errors (400): at least one declared action argument could not be
//!   bound at all, i.e. it was missing or malformed;
//! - validation errors (422): every input was present and parseable and only
//!   business rules failed. Only this category exposes field-level `errors`.
//!
//! A body no input formatter can read never reaches either category and is
//! answered 415 instead.

use axum::response::{IntoResponse, Response};
use http::StatusCode;

use courselib_errors::{APPLICATION_PROBLEM_JSON, APPLICATION_PROBLEM_XML, ProblemDetails};

use crate::context::RequestContext;
use crate::model_state::ModelState;
use crate::negotiation::ProblemFormat;

/// Default problem type for semantic validation failures.
pub const VALIDATION_PROBLEM_TYPE: &str = "https://courselibrary.com/modelvalidationproblem";

/// Problem type for input errors (400 Bad Request).
pub const INPUT_PROBLEM_TYPE: &str = "https://tools.ietf.org/html/rfc7231#section-6.5.1";

/// Problem type for bodies in a media type nothing reads (415).
pub const UNSUPPORTED_MEDIA_TYPE_TYPE: &str = "https://tools.ietf.org/html/rfc7231#section-6.5.13";

pub const UNSUPPORTED_MEDIA_TYPE_TITLE: &str = "Unsupported Media Type";
pub const VALIDATION_PROBLEM_TITLE: &str = "One or more validation errors occurred.";
pub const INPUT_PROBLEM_TITLE: &str = "One or more errors on input occurred.";
pub const PROBLEM_DETAIL: &str = "See the errors field for details.";

/// Content types a validation problem may be written as, in preference order.
pub const PROBLEM_CONTENT_TYPES: [&str; 2] = [APPLICATION_PROBLEM_JSON, APPLICATION_PROBLEM_XML];

/// A translated validation failure, ready to be written to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ValidationProblem {
    problem: ProblemDetails,
    format: ProblemFormat,
}

impl ValidationProblem {
    fn new(problem: ProblemDetails) -> Self {
        Self {
            problem,
            format: ProblemFormat::Json,
        }
    }

    #[must_use]
    pub fn problem(&self) -> &ProblemDetails {
        &self.problem
    }

    #[must_use]
    pub fn into_problem(self) -> ProblemDetails {
        self.problem
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.problem.status
    }

    #[must_use]
    pub fn format(&self) -> ProblemFormat {
        self.format
    }

    /// Problem for a body whose `Content-Type` is empty or not JSON or XML.
    pub fn unsupported_media_type(content_type: &str, request: &RequestContext<'_>) -> Self {
        let detail = if content_type.is_empty() {
            "A Content-Type header is required for a request body.".to_owned()
        } else {
            format!("Content type '{content_type}' is not supported.")
        };
        tracing::debug!(content_type, path = request.path, "Unsupported request body");

        let problem = ProblemDetails::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UNSUPPORTED_MEDIA_TYPE_TITLE,
            detail,
        )
        .with_type(UNSUPPORTED_MEDIA_TYPE_TYPE)
        .with_instance(request.path);
        Self::new(match request.trace_id {
            Some(trace_id) => problem.with_trace_id(trace_id),
            None => problem,
        })
    }

    /// Pick JSON or XML for the given `Accept` header value.
    pub fn negotiate(mut self, accept: Option<&str>) -> Self {
        self.format = ProblemFormat::negotiate(accept);
        self
    }
}

impl IntoResponse for ValidationProblem {
    fn into_response(self) -> Response {
        self.format.render(&self.problem)
    }
}

/// Turns a validation state snapshot into a [`ValidationProblem`].
///
/// Holds only configuration; `translate` is a pure function of its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationProblemTranslator {
    validation_problem_type: String,
}

impl Default for ValidationProblemTranslator {
    fn default() -> Self {
        Self::new(VALIDATION_PROBLEM_TYPE)
    }
}

impl ValidationProblemTranslator {
    #[must_use]
    pub fn new(validation_problem_type: impl Into<String>) -> Self {
        Self {
            validation_problem_type: validation_problem_type.into(),
        }
    }

    #[must_use]
    pub fn validation_problem_type(&self) -> &str {
        &self.validation_problem_type
    }

    /// Callers must only invoke this for a state with at least one error.
    pub fn translate(&self, state: &ModelState, request: &RequestContext<'_>) -> ValidationProblem {
        let semantic = state.error_count() > 0 && request.binding.all_arguments_bound();

        let problem = if semantic {
            base_problem(StatusCode::UNPROCESSABLE_ENTITY, VALIDATION_PROBLEM_TITLE, request)
                .with_type(self.validation_problem_type.as_str())
                .with_errors(state.field_errors())
        } else {
            base_problem(StatusCode::BAD_REQUEST, INPUT_PROBLEM_TITLE, request)
                .with_type(INPUT_PROBLEM_TYPE)
        };

        tracing::debug!(
            status = problem.status.as_u16(),
            errors = state.error_count(),
            path = request.path,
            binding = ?request.binding,
            "Model validation failed"
        );

        ValidationProblem::new(problem)
    }
}

fn base_problem(status: StatusCode, title: &str, request: &RequestContext<'_>) -> ProblemDetails {
    let problem = ProblemDetails::new(status, title, PROBLEM_DETAIL).with_instance(request.path);
    match request.trace_id {
        Some(trace_id) => problem.with_trace_id(trace_id),
        None => problem,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::context::BindingContext;

    const PATH: &str = "/api/authors/d28888e9-2ba9-473a-a40f-e38cb54f9b35/courses";

    fn binding(bound: usize, declared: usize) -> BindingContext {
        BindingContext::BindingTime {
            bound_arguments: bound,
            declared_parameters: declared,
        }
    }

    fn title_state() -> ModelState {
        let mut state = ModelState::new();
        state.add_error("title", "Title must not be empty");
        state
    }

    #[test]
    fn all_arguments_bound_yields_422_with_errors() {
        let translator = ValidationProblemTranslator::default();
        let out = translator.translate(&title_state(), &RequestContext::new(PATH, binding(2, 2)));

        let p = out.problem();
        assert_eq!(out.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(p.title, VALIDATION_PROBLEM_TITLE);
        assert_eq!(p.type_url, VALIDATION_PROBLEM_TYPE);
        assert_eq!(p.detail, PROBLEM_DETAIL);
        assert_eq!(p.instance, PATH);
        let errors = p.errors.as_ref().unwrap();
        assert_eq!(errors["title"], vec!["Title must not be empty"]);
    }

    #[test]
    fn unbound_argument_yields_400_without_field_errors() {
        let mut state = ModelState::new();
        state.add_error("title", "missing field `title` at line 1 column 2");

        let translator = ValidationProblemTranslator::default();
        let out = translator.translate(&state, &RequestContext::new(PATH, binding(1, 2)));

        let p = out.problem();
        assert_eq!(out.status(), StatusCode::BAD_REQUEST);
        assert_eq!(p.title, INPUT_PROBLEM_TITLE);
        assert_eq!(p.type_url, INPUT_PROBLEM_TYPE);
        assert_eq!(p.detail, PROBLEM_DETAIL);
        assert_eq!(p.instance, PATH);
        assert!(p.errors.is_none());
    }

    #[test]
    fn post_construction_is_always_semantic() {
        let translator = ValidationProblemTranslator::default();
        let out = translator.translate(
            &title_state(),
            &RequestContext::new(PATH, BindingContext::PostConstruction),
        );
        assert_eq!(out.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(out.problem().errors.is_some());
    }

    #[test]
    fn empty_state_never_reports_validation_category() {
        let translator = ValidationProblemTranslator::default();
        let out = translator.translate(
            &ModelState::new(),
            &RequestContext::new(PATH, BindingContext::PostConstruction),
        );
        assert_eq!(out.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn configured_type_is_used_for_validation_problems() {
        let translator = ValidationProblemTranslator::new("https://example.test/invalid");
        let out = translator.translate(&title_state(), &RequestContext::new(PATH, binding(1, 1)));
        assert_eq!(out.problem().type_url, "https://example.test/invalid");
    }

    #[test]
    fn trace_id_is_carried_over() {
        let translator = ValidationProblemTranslator::default();
        let ctx = RequestContext::new(PATH, binding(0, 1)).with_trace_id(Some("req-9"));
        let out = translator.translate(&title_state(), &ctx);
        assert_eq!(out.problem().trace_id.as_deref(), Some("req-9"));
    }

    #[test]
    fn translation_is_idempotent() {
        let translator = ValidationProblemTranslator::default();
        let mut state = title_state();
        state.add_error("description", "Description is too long");
        let ctx = RequestContext::new(PATH, binding(2, 2)).with_trace_id(Some("t"));

        let first = translator.translate(&state, &ctx);
        let second = translator.translate(&state, &ctx);
        assert_eq!(first, second);
        assert_eq!(
            first.problem().to_json_vec().unwrap(),
            second.problem().to_json_vec().unwrap()
        );
    }

    #[test]
    fn problem_advertises_json_and_xml() {
        let translator = ValidationProblemTranslator::default();
        let out = translator.translate(&title_state(), &RequestContext::new(PATH, binding(1, 1)));
        assert_eq!(
            PROBLEM_CONTENT_TYPES,
            ["application/problem+json", "application/problem+xml"]
        );
        assert_eq!(out.format(), ProblemFormat::Json);
        assert_eq!(
            out.negotiate(Some("application/xml")).format(),
            ProblemFormat::Xml
        );
    }

    #[test]
    fn unsupported_media_type_names_the_content_type() {
        let ctx = RequestContext::new(PATH, binding(1, 2)).with_trace_id(Some("req-3"));
        let out = ValidationProblem::unsupported_media_type("text/plain", &ctx);
        let p = out.problem();
        assert_eq!(out.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(p.type_url, UNSUPPORTED_MEDIA_TYPE_TYPE);
        assert_eq!(p.detail, "Content type 'text/plain' is not supported.");
        assert_eq!(p.instance, PATH);
        assert_eq!(p.trace_id.as_deref(), Some("req-3"));
        assert!(p.errors.is_none());

        let missing = ValidationProblem::unsupported_media_type("", &ctx);
        assert!(missing.problem().detail.contains("Content-Type header is required"));
    }
}
