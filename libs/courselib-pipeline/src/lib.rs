//! Request pipeline for the Course Library API
//!
//! - model binding of action arguments ([`ActionBinder`], [`ValidatedBody`])
//! - translation of failed validation into problem responses
//!   ([`ValidationProblemTranslator`]): 400 for unparseable input, 422 for
//!   business-rule failures
//! - terminal fault handling ([`FaultResponder`])
//! - `Accept` negotiation for problem and success bodies
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod binding;
pub mod config;
pub mod context;
pub mod extract;
pub mod fault;
pub mod model_state;
pub mod negotiation;
pub mod pipeline;
pub mod translator;
pub mod validate;

pub use binding::ActionBinder;
pub use config::{Environment, PipelineConfig};
pub use context::{BindingContext, RequestContext, RequestScope};
pub use extract::{Negotiator, ProblemContext, ValidatedBody};
pub use fault::{FAULT_MESSAGE, Fault, FaultResponder};
pub use model_state::{ModelError, ModelState, ModelStateEntry};
pub use negotiation::{BodyFormat, OutputFormat, ProblemFormat};
pub use pipeline::Pipeline;
pub use translator::{ValidationProblem, ValidationProblemTranslator};
pub use validate::Validate;

pub use courselib_errors::{APPLICATION_PROBLEM_JSON, APPLICATION_PROBLEM_XML, ProblemDetails};
