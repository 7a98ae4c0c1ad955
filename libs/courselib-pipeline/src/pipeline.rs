//! Assembly of the request pipeline around an axum router.
//!
//! Layer order, outermost first:
//! catch panic -> set request id -> propagate request id -> trace
//! -> fault rewriting -> pipeline extension -> router

use std::sync::Arc;

use axum::{Extension, Router, middleware};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Environment, PipelineConfig};
use crate::fault::{FaultResponder, fault_middleware};
use crate::translator::ValidationProblemTranslator;

/// Shared, immutable pipeline state. Installed once per router as an
/// `Arc<Pipeline>` request extension and read by the extractors.
#[derive(Debug, Clone)]
pub struct Pipeline {
    translator: ValidationProblemTranslator,
    faults: FaultResponder,
    return_http_not_acceptable: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&PipelineConfig::default(), Environment::default())
    }
}

impl Pipeline {
    #[must_use]
    pub fn new(config: &PipelineConfig, environment: Environment) -> Self {
        Self {
            translator: ValidationProblemTranslator::new(config.validation_problem_type.as_str()),
            faults: FaultResponder::new(environment),
            return_http_not_acceptable: config.return_http_not_acceptable,
        }
    }

    #[must_use]
    pub fn translator(&self) -> &ValidationProblemTranslator {
        &self.translator
    }

    #[must_use]
    pub fn fault_responder(&self) -> FaultResponder {
        self.faults
    }

    #[must_use]
    pub fn return_http_not_acceptable(&self) -> bool {
        self.return_http_not_acceptable
    }

    /// Wrap every route currently registered on `router`.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let faults = self.faults;
        tracing::info!(
            environment = ?faults.environment(),
            validation_problem_type = self.translator.validation_problem_type(),
            return_http_not_acceptable = self.return_http_not_acceptable,
            "Installing request pipeline"
        );
        router
            .layer(Extension(Arc::new(self)))
            .layer(middleware::from_fn_with_state(faults, fault_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(CatchPanicLayer::custom(faults))
    }
}
