//! Core error types for the Course Library API
//!
//! This crate provides pure data types for error responses, with no dependencies
//! on HTTP frameworks unless the `axum` feature is enabled. It includes:
//! - RFC 7807 Problem Details (`ProblemDetails`)
//! - JSON and XML renderings of a problem
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod problem;

// Re-export commonly used types
pub use problem::{
    ABOUT_BLANK, APPLICATION_PROBLEM_JSON, APPLICATION_PROBLEM_XML, FieldErrors,
    PROBLEM_XML_NAMESPACE, ProblemDetails, ProblemRenderError,
};

/// Helper to attach instance and `trace_id` to a problem
///
/// This is a convenience function for enriching problems with
/// request-specific context before returning them as HTTP responses.
pub fn finalize(mut p: ProblemDetails, instance: &str, trace_id: Option<String>) -> ProblemDetails {
    p = p.with_instance(instance);
    if let Some(tid) = trace_id {
        p = p.with_trace_id(tid);
    }
    p
}
