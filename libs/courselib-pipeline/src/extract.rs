//! Axum extractors that run binding and validation through the pipeline.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use http::{Extensions, HeaderMap, StatusCode, Uri, header};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::binding::ActionBinder;
use crate::context::{BindingContext, RequestScope};
use crate::model_state::ModelState;
use crate::negotiation::OutputFormat;
use crate::pipeline::Pipeline;
use crate::translator::{ValidationProblem, ValidationProblemTranslator};
use crate::validate::Validate;

/// Model state key used by [`ValidatedBody`] for its single body argument.
pub const BODY_PARAMETER: &str = "body";

const TRACE_HEADERS: [&str; 3] = ["x-request-id", "x-trace-id", "traceparent"];

/// Correlation id from the request headers. A header that is not valid
/// text is skipped in favour of the next one.
#[must_use]
pub fn extract_trace_id(headers: &HeaderMap) -> Option<String> {
    TRACE_HEADERS
        .iter()
        .find_map(|name| header_text(headers, *name))
}

fn header_text(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

fn capture_scope(uri: &Uri, headers: &HeaderMap) -> RequestScope {
    RequestScope {
        path: uri.path().to_owned(),
        trace_id: extract_trace_id(headers),
        accept: header_text(headers, header::ACCEPT),
        content_type: header_text(headers, header::CONTENT_TYPE),
    }
}

fn pipeline_from(extensions: &Extensions) -> Arc<Pipeline> {
    extensions.get::<Arc<Pipeline>>().cloned().unwrap_or_else(|| {
        tracing::debug!("No pipeline installed on the router; using defaults");
        Arc::new(Pipeline::default())
    })
}

/// Request facts plus the pipeline, for handlers that bind several
/// arguments or validate a model they built themselves.
#[derive(Debug, Clone)]
pub struct ProblemContext {
    scope: RequestScope,
    pipeline: Arc<Pipeline>,
}

impl ProblemContext {
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            scope: capture_scope(&parts.uri, &parts.headers),
            pipeline: pipeline_from(&parts.extensions),
        }
    }

    #[must_use]
    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    #[must_use]
    pub fn translator(&self) -> &ValidationProblemTranslator {
        self.pipeline.translator()
    }

    /// # Errors
    /// See [`ActionBinder::finish`].
    pub fn finish<T>(&self, binder: ActionBinder, args: Option<T>) -> Result<T, ValidationProblem> {
        binder.finish(args, self.translator(), &self.scope)
    }

    /// Validate an object constructed inside the handler. Failures are
    /// always reported as semantic validation problems.
    ///
    /// # Errors
    /// Returns a 422 [`ValidationProblem`] when any rule fails.
    pub fn validate<T: Validate + ?Sized>(&self, model: &T) -> Result<(), ValidationProblem> {
        let mut state = ModelState::new();
        model.validate(&mut state);
        if state.is_valid() {
            return Ok(());
        }
        Err(self
            .translator()
            .translate(&state, &self.scope.context(BindingContext::PostConstruction))
            .negotiate(self.scope.accept.as_deref()))
    }

    #[must_use]
    pub fn negotiator(&self) -> Negotiator {
        Negotiator {
            accept: self.scope.accept.clone(),
            return_http_not_acceptable: self.pipeline.return_http_not_acceptable(),
        }
    }
}

impl<S> FromRequestParts<S> for ProblemContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// Output negotiation for success bodies.
#[derive(Debug, Clone, Default)]
pub struct Negotiator {
    accept: Option<String>,
    return_http_not_acceptable: bool,
}

impl Negotiator {
    /// Write `value` as JSON or XML per the client's `Accept` header, or
    /// answer 406 with an empty body when neither is acceptable.
    #[must_use]
    pub fn respond<T: Serialize>(&self, status: StatusCode, root: &str, value: &T) -> Response {
        match OutputFormat::negotiate(self.accept.as_deref(), self.return_http_not_acceptable) {
            Some(format) => format.render(status, root, value),
            None => {
                tracing::debug!(accept = ?self.accept, "No acceptable output format");
                StatusCode::NOT_ACCEPTABLE.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for Negotiator
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ProblemContext::from_parts(parts).negotiator())
    }
}

/// JSON or XML body bound and validated as the action's only argument.
///
/// Rejects with a 415 problem when the `Content-Type` is neither JSON nor
/// XML, a 400 problem when the body cannot be read or parsed and a 422
/// problem when it parses but fails [`Validate`].
#[derive(Debug, Clone)]
pub struct ValidatedBody<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationProblem;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = ProblemContext {
            scope: capture_scope(req.uri(), req.headers()),
            pipeline: pipeline_from(req.extensions()),
        };
        let mut binder = ActionBinder::new(1);

        let value = match Bytes::from_request(req, state).await {
            Ok(bytes) => {
                binder.bind_body::<T>(BODY_PARAMETER, ctx.scope.content_type.as_deref(), &bytes)
            }
            Err(rejection) => {
                binder.reject(BODY_PARAMETER, rejection.body_text());
                None
            }
        };
        if let Some(model) = &value {
            binder.validate(model);
        }

        ctx.finish(binder, value).map(Self)
    }
}
