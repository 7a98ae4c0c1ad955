#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Course routes through the full application router.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use courselib_server::api::catalog::{CourseCatalog, DEMO_AUTHOR_ID};
use courselib_server::api::dto::{TITLE_EQUALS_DESCRIPTION, TITLE_REQUIRED, TITLE_TOO_LONG};
use courselib_server::config::AppConfig;
use courselib_server::docs::OPENAPI_PATH;
use courselib_server::{build_router, build_router_with_catalog};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> Router {
    build_router(&AppConfig::default())
}

fn courses_uri(author: impl std::fmt::Display) -> String {
    format!("/api/authors/{author}/courses")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn read_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn create_course_returns_201_with_location() {
    let resp = app()
        .oneshot(post_json(
            &courses_uri(DEMO_AUTHOR_ID),
            &json!({ "title": "Rust", "description": "Ownership and borrowing" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
        .unwrap();
    let body = read_json(resp).await;
    assert_eq!(body["title"], "Rust");
    assert_eq!(body["authorId"], DEMO_AUTHOR_ID.to_string());
    assert_eq!(
        location,
        format!("{}/{}", courses_uri(DEMO_AUTHOR_ID), body["id"].as_str().unwrap())
    );
}

#[tokio::test]
async fn xml_course_is_created() {
    let resp = app()
        .oneshot(
            Request::post(courses_uri(DEMO_AUTHOR_ID))
                .header(header::CONTENT_TYPE, "application/xml")
                .body(Body::from(
                    "<CourseForCreationDto><Title>Rust</Title></CourseForCreationDto>",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key(header::LOCATION));
    let body = read_json(resp).await;
    assert_eq!(body["title"], "Rust");
    assert!(body.get("description").is_none());
}

#[tokio::test]
async fn json_sent_as_plain_text_is_415() {
    let resp = app()
        .oneshot(
            Request::post(courses_uri(DEMO_AUTHOR_ID))
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from(json!({ "title": "Rust" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    let body = read_json(resp).await;
    assert_eq!(body["title"], "Unsupported Media Type");
    assert_eq!(body["instance"], courses_uri(DEMO_AUTHOR_ID));
}

#[tokio::test]
async fn created_course_skips_a_refused_json_for_xml() {
    let mut req = post_json(&courses_uri(DEMO_AUTHOR_ID), &json!({ "title": "Rust" }));
    req.headers_mut().insert(
        header::ACCEPT,
        "application/json;q=0, */*;q=0.5".parse().unwrap(),
    );
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(
        resp.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .starts_with("application/xml")
    );
    assert!(read_text(resp).await.contains("<title>Rust</title>"));
}

#[tokio::test]
async fn missing_title_is_an_input_error() {
    let resp = app()
        .oneshot(post_json(
            &courses_uri(DEMO_AUTHOR_ID),
            &json!({ "description": "No title" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = read_json(resp).await;
    assert_eq!(body["title"], "One or more errors on input occurred.");
    assert_eq!(body["detail"], "See the errors field for details.");
    assert_eq!(body["instance"], courses_uri(DEMO_AUTHOR_ID));
}

#[tokio::test]
async fn empty_title_is_a_validation_error() {
    let resp = app()
        .oneshot(post_json(
            &courses_uri(DEMO_AUTHOR_ID),
            &json!({ "title": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(resp).await;
    assert_eq!(body["type"], "https://courselibrary.com/modelvalidationproblem");
    assert_eq!(body["title"], "One or more validation errors occurred.");
    assert_eq!(body["errors"], json!({ "title": [TITLE_REQUIRED] }));
}

#[tokio::test]
async fn title_equal_to_description_is_reported_on_the_model() {
    let resp = app()
        .oneshot(post_json(
            &courses_uri(DEMO_AUTHOR_ID),
            &json!({ "title": "Same", "description": "Same" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(resp).await;
    assert_eq!(
        body["errors"],
        json!({ "CourseForCreationDto": [TITLE_EQUALS_DESCRIPTION] })
    );
}

#[tokio::test]
async fn malformed_author_id_wins_over_rule_failures() {
    let resp = app()
        .oneshot(post_json(&courses_uri("42"), &json!({ "title": "" })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = read_json(resp).await;
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn unknown_author_is_404_problem() {
    let author = Uuid::new_v4();
    let resp = app()
        .oneshot(post_json(&courses_uri(author), &json!({ "title": "Rust" })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    let body = read_json(resp).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["instance"], courses_uri(author));
}

#[tokio::test]
async fn get_course_negotiates_xml() {
    let catalog = Arc::new(CourseCatalog::with_demo_authors());
    let course = catalog.add_course(DEMO_AUTHOR_ID, "Rust".to_owned(), None);
    let router = build_router_with_catalog(&AppConfig::default(), Arc::clone(&catalog));

    let resp = router
        .oneshot(
            Request::get(format!("{}/{}", courses_uri(DEMO_AUTHOR_ID), course.id))
                .header(header::ACCEPT, "application/xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let xml = read_text(resp).await;
    assert!(xml.starts_with("<course>"));
    assert!(xml.contains("<title>Rust</title>"));
    assert!(xml.contains(&course.id.to_string()));
}

#[tokio::test]
async fn get_course_with_unsupported_accept_is_406() {
    let catalog = Arc::new(CourseCatalog::with_demo_authors());
    let course = catalog.add_course(DEMO_AUTHOR_ID, "Rust".to_owned(), None);
    let router = build_router_with_catalog(&AppConfig::default(), Arc::clone(&catalog));

    let resp = router
        .oneshot(
            Request::get(format!("{}/{}", courses_uri(DEMO_AUTHOR_ID), course.id))
                .header(header::ACCEPT, "text/csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn unsupported_accept_is_ignored_when_negotiation_is_lenient() {
    let mut config = AppConfig::default();
    config.pipeline.return_http_not_acceptable = false;
    let catalog = Arc::new(CourseCatalog::with_demo_authors());
    let course = catalog.add_course(DEMO_AUTHOR_ID, "Rust".to_owned(), None);
    let router = build_router_with_catalog(&config, Arc::clone(&catalog));

    let resp = router
        .oneshot(
            Request::get(format!("{}/{}", courses_uri(DEMO_AUTHOR_ID), course.id))
                .header(header::ACCEPT, "text/csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["title"], "Rust");
}

#[tokio::test]
async fn missing_course_is_404_problem_with_trace_id() {
    let uri = format!("{}/{}", courses_uri(DEMO_AUTHOR_ID), Uuid::new_v4());
    let resp = app()
        .oneshot(
            Request::get(&uri)
                .header("x-request-id", "trace-7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = read_json(resp).await;
    assert_eq!(body["instance"], uri);
    assert_eq!(body["traceId"], "trace-7");
}

#[tokio::test]
async fn patch_validates_the_patched_course() {
    let catalog = Arc::new(CourseCatalog::with_demo_authors());
    let course = catalog.add_course(
        DEMO_AUTHOR_ID,
        "Rust".to_owned(),
        Some("Systems".to_owned()),
    );
    let router = build_router_with_catalog(&AppConfig::default(), Arc::clone(&catalog));
    let uri = format!("{}/{}", courses_uri(DEMO_AUTHOR_ID), course.id);

    let too_long = router
        .clone()
        .oneshot(
            Request::patch(&uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "title": "x".repeat(101) }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(too_long.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        read_json(too_long).await["errors"],
        json!({ "title": [TITLE_TOO_LONG] })
    );

    let ok = router
        .oneshot(
            Request::patch(&uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "title": "Rust 2024" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::NO_CONTENT);

    let stored = catalog.course_for_author(DEMO_AUTHOR_ID, course.id).unwrap();
    assert_eq!(stored.title, "Rust 2024");
    assert_eq!(stored.description.as_deref(), Some("Systems"));
}

#[tokio::test]
async fn problem_xml_for_validation_failure() {
    let mut req = post_json(&courses_uri(DEMO_AUTHOR_ID), &json!({ "title": "" }));
    req.headers_mut()
        .insert(header::ACCEPT, "application/problem+xml".parse().unwrap());
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+xml"
    );
    let xml = read_text(resp).await;
    assert!(xml.contains("<title>One or more validation errors occurred.</title>"));
}

#[tokio::test]
async fn patch_accepts_an_xml_body() {
    let catalog = Arc::new(CourseCatalog::with_demo_authors());
    let course = catalog.add_course(DEMO_AUTHOR_ID, "Rust".to_owned(), None);
    let router = build_router_with_catalog(&AppConfig::default(), Arc::clone(&catalog));

    let resp = router
        .oneshot(
            Request::patch(format!("{}/{}", courses_uri(DEMO_AUTHOR_ID), course.id))
                .header(header::CONTENT_TYPE, "text/xml")
                .body(Body::from("<CoursePatchDto><Description>Async</Description></CoursePatchDto>"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let stored = catalog.course_for_author(DEMO_AUTHOR_ID, course.id).unwrap();
    assert_eq!(stored.title, "Rust");
    assert_eq!(stored.description.as_deref(), Some("Async"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let resp = app()
        .oneshot(Request::get(OPENAPI_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let doc = read_json(resp).await;
    assert_eq!(doc["info"]["title"], "Course Library API");
    assert_eq!(doc["info"]["version"], "v1");
    assert_eq!(doc["info"]["license"]["name"], "MIT License");
    assert!(doc["paths"]["/api/authors/{authorId}/courses"]["post"].is_object());
}
