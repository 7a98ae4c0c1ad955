//! Course Library API server: course routes, OpenAPI document, configuration
//! and logging, assembled on top of the request pipeline.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod docs;
pub mod logging;
pub mod shutdown;

use std::sync::Arc;

use axum::Router;
use courselib_pipeline::Pipeline;

use crate::api::AppState;
use crate::api::catalog::CourseCatalog;
use crate::config::AppConfig;

/// Full application router with a fresh demo catalog.
#[must_use]
pub fn build_router(config: &AppConfig) -> Router {
    build_router_with_catalog(config, Arc::new(CourseCatalog::with_demo_authors()))
}

#[must_use]
pub fn build_router_with_catalog(config: &AppConfig, catalog: Arc<CourseCatalog>) -> Router {
    let router = Router::new()
        .merge(api::router())
        .merge(docs::router(&config.docs))
        .with_state(AppState { catalog });
    Pipeline::new(&config.pipeline, config.environment).apply(router)
}
