//! Terminal handling of unhandled runtime faults.
//!
//! Two kinds of fault reach this layer: handler panics (through
//! `CatchPanicLayer::custom`) and handlers returning [`Fault`]. In production
//! both become the same opaque 500; in development the response carries the
//! fault detail.

use std::any::Any;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{StatusCode, header};
use tower_http::catch_panic::ResponseForPanic;

use crate::config::Environment;

/// Body of every production fault response.
pub const FAULT_MESSAGE: &str = "An unexpected fault happened. Try again later.";

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Opaque handler failure. Anything convertible into `anyhow::Error` can be
/// returned from a handler with `?`.
#[derive(Debug)]
pub struct Fault(anyhow::Error);

impl Fault {
    #[must_use]
    pub fn error(&self) -> &anyhow::Error {
        &self.0
    }
}

impl<E> From<E> for Fault
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Marker left on a fault response so [`fault_middleware`] can rewrite it.
#[derive(Debug, Clone)]
struct FaultReport(Arc<anyhow::Error>);

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        let mut resp = production_response();
        resp.extensions_mut().insert(FaultReport(Arc::new(self.0)));
        resp
    }
}

fn production_response() -> Response {
    text_response(FAULT_MESSAGE.to_owned())
}

fn text_response(body: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)],
        body,
    )
        .into_response()
}

/// Converts faults into 500 responses according to the deployment mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultResponder {
    environment: Environment,
}

impl FaultResponder {
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub fn respond_to_error(&self, error: &anyhow::Error, path: &str) -> Response {
        tracing::error!(error = %format!("{error:#}"), path, "Unhandled fault");
        if self.environment.is_diagnostic() {
            text_response(format!(
                "An unhandled fault occurred while processing {path}.\n\n{error:#}\n\n{}\n",
                error.backtrace()
            ))
        } else {
            production_response()
        }
    }

    #[must_use]
    pub fn respond_to_panic(&self, message: &str) -> Response {
        tracing::error!(panic = message, "Handler panicked");
        if self.environment.is_diagnostic() {
            text_response(format!(
                "An unhandled panic occurred while processing the request.\n\npanic: {message}\n"
            ))
        } else {
            production_response()
        }
    }
}

impl ResponseForPanic for FaultResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        self.respond_to_panic(&panic_message(err.as_ref()))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Rewrites responses produced by [`Fault`] for the configured mode.
pub async fn fault_middleware(
    State(responder): State<FaultResponder>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;
    let report = response.extensions_mut().remove::<FaultReport>();
    match report {
        Some(FaultReport(error)) => responder.respond_to_error(&error, &path),
        None => response,
    }
}
