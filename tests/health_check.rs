mod common;

use actix_web::{test, App};
use advocate_server::routes;
use chrono::DateTime;
use common::test_state;

#[actix_web::test]
async fn test_health_check() {
    let (state, _) = test_state();
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    // Send request
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    // Assert response
    assert!(resp.status().is_success());

    // Parse response body
    let body = test::read_body(resp).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    // Verify response format
    assert_eq!(json["status"], "healthy");
    assert!(DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let (state, _) = test_state();
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::get().uri("/argument-analysis/simulate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
