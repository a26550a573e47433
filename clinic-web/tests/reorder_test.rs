mod common;

use axum::http::StatusCode;
use clinic_web::models::Collection;
use common::{FakeCatalog, FakeSessions, body_json, put_json, test_app};
use std::sync::Arc;
use tower::util::ServiceExt;

#[tokio::test]
async fn reorder_persists_positional_ranks() {
    let catalog = Arc::new(FakeCatalog::new());
    let app = test_app(Arc::new(FakeSessions::authenticated()), catalog.clone());

    let response = app
        .oneshot(put_json(
            "/api/price-categories/reorder",
            r#"{"orderedIds": ["a", "b", "c"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    assert_eq!(catalog.rank_of(Collection::PriceCategories, "a"), Some(1));
    assert_eq!(catalog.rank_of(Collection::PriceCategories, "b"), Some(2));
    assert_eq!(catalog.rank_of(Collection::PriceCategories, "c"), Some(3));
}

#[tokio::test]
async fn reorder_is_idempotent() {
    let catalog = Arc::new(FakeCatalog::new());
    let app = test_app(Arc::new(FakeSessions::authenticated()), catalog.clone());

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(put_json(
                "/api/services/reorder",
                r#"{"orderedIds": ["x", "y"]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(catalog.rank_of(Collection::Services, "x"), Some(1));
    assert_eq!(catalog.rank_of(Collection::Services, "y"), Some(2));
    assert_eq!(catalog.write_count(), 2);
}

#[tokio::test]
async fn non_sequence_body_is_rejected_without_writes() {
    for uri in ["/api/price-categories/reorder", "/api/services/reorder"] {
        let catalog = Arc::new(FakeCatalog::new());
        let app = test_app(Arc::new(FakeSessions::authenticated()), catalog.clone());

        let response = app
            .oneshot(put_json(uri, r#"{"orderedIds": "abc"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(catalog.write_count(), 0, "uri: {}", uri);
    }
}

#[tokio::test]
async fn services_reorder_maps_malformed_json_to_bad_request() {
    // The only endpoint where a JSON parse failure is a 400 rather than 500.
    let catalog = Arc::new(FakeCatalog::new());
    let app = test_app(Arc::new(FakeSessions::authenticated()), catalog.clone());

    let response = app
        .oneshot(put_json("/api/services/reorder", "not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(catalog.write_count(), 0);
}

#[tokio::test]
async fn price_categories_reorder_maps_malformed_json_to_internal_error() {
    // Shape violations get a 400 here, but a body that fails to parse at all
    // falls through as an unexpected exception.
    let catalog = Arc::new(FakeCatalog::new());
    let app = test_app(Arc::new(FakeSessions::authenticated()), catalog.clone());

    let response = app
        .oneshot(put_json("/api/price-categories/reorder", "not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(catalog.write_count(), 0);
}

#[tokio::test]
async fn service_categories_maps_every_failure_to_internal_error() {
    // This endpoint never answers 400: even a parse failure surfaces as 500.
    let catalog = Arc::new(FakeCatalog::new());
    let app = test_app(Arc::new(FakeSessions::authenticated()), catalog.clone());

    let response = app
        .oneshot(put_json("/api/service-categories/reorder", "not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(catalog.write_count(), 0);
}

#[tokio::test]
async fn gated_endpoints_reject_missing_sessions_without_writes() {
    for uri in ["/api/price-categories/reorder", "/api/services/reorder"] {
        let catalog = Arc::new(FakeCatalog::new());
        let app = test_app(Arc::new(FakeSessions::anonymous()), catalog.clone());

        let response = app
            .oneshot(put_json(uri, r#"{"orderedIds": ["a"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {}", uri);
        let body = body_json(response).await;
        assert!(body["error"].is_string(), "uri: {}", uri);
        assert_eq!(catalog.write_count(), 0, "uri: {}", uri);
    }
}

#[tokio::test]
async fn service_categories_reorder_skips_the_session_check() {
    // Inherited inconsistency: this endpoint's two siblings require a
    // session, this one does not.
    let catalog = Arc::new(FakeCatalog::new());
    let app = test_app(Arc::new(FakeSessions::anonymous()), catalog.clone());

    let response = app
        .oneshot(put_json(
            "/api/service-categories/reorder",
            r#"{"orderedIds": ["a", "b"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(catalog.rank_of(Collection::ServiceCategories, "a"), Some(1));
    assert_eq!(catalog.rank_of(Collection::ServiceCategories, "b"), Some(2));
}

#[tokio::test]
async fn services_reorder_reports_success_despite_failed_update() {
    // Documented (possibly undesired) behavior: the services endpoint waits
    // for the whole batch but swallows individual failures, so a stale rank
    // can hide behind a success response.
    let catalog = Arc::new(FakeCatalog::failing_for(&["b"]));
    let app = test_app(Arc::new(FakeSessions::authenticated()), catalog.clone());

    let response = app
        .oneshot(put_json(
            "/api/services/reorder",
            r#"{"orderedIds": ["a", "b", "c"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    assert_eq!(catalog.rank_of(Collection::Services, "a"), Some(1));
    assert_eq!(catalog.rank_of(Collection::Services, "b"), None);
    assert_eq!(catalog.rank_of(Collection::Services, "c"), Some(3));
}

#[tokio::test]
async fn price_categories_reorder_fails_loudly_on_failed_update() {
    let catalog = Arc::new(FakeCatalog::failing_for(&["b"]));
    let app = test_app(Arc::new(FakeSessions::authenticated()), catalog.clone());

    let response = app
        .oneshot(put_json(
            "/api/price-categories/reorder",
            r#"{"orderedIds": ["a", "b", "c"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(catalog.rank_of(Collection::PriceCategories, "b"), None);
}
