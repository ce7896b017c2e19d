mod common;

use actix_web::{test, App};
use advocate_server::auth::{PlainTokenCodec, TokenCodec};
use advocate_server::db::{Role, Store};
use advocate_server::routes;
use common::{sign_up, test_state};
use serde_json::{json, Value};

#[actix_web::test]
async fn test_upsert_is_idempotent_per_district() {
    let (state, store) = test_state();
    let admin = sign_up(&state, "admin@example.com", Role::Admin).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    for rate in [50000, 50000, 62000] {
        let resp = test::TestRequest::post()
            .uri("/admin/circle-rates")
            .insert_header(admin.bearer())
            .set_json(json!({"state": "MH", "district": "Pune", "circleRate": rate}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["circleRate"], rate as f64);
        assert_eq!(body["createdBy"], admin.user_id.to_string());
    }

    let rates = store.list_circle_rates(None).await.unwrap();
    assert_eq!(rates.len(), 1);
    assert_eq!(rates[0].circle_rate, 62000.0);
}

#[actix_web::test]
async fn test_list_orders_and_filters_by_state() {
    let (state, _) = test_state();
    let admin = sign_up(&state, "admin@example.com", Role::Admin).await;
    let user = sign_up(&state, "user@example.com", Role::User).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    for (st, district, rate) in [("MH", "Pune", 50000), ("KA", "Mysuru", 30000), ("MH", "Nagpur", 40000)] {
        let resp = test::TestRequest::post()
            .uri("/admin/circle-rates")
            .insert_header(admin.bearer())
            .set_json(json!({"state": st, "district": district, "circleRate": rate}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);
    }

    let resp = test::TestRequest::get()
        .uri("/admin/circle-rates")
        .insert_header(user.bearer())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let districts: Vec<&str> = body["rates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["district"].as_str().unwrap())
        .collect();
    assert_eq!(districts, vec!["Mysuru", "Nagpur", "Pune"]);

    let resp = test::TestRequest::get()
        .uri("/admin/circle-rates?state=MH")
        .insert_header(user.bearer())
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["rates"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_invalid_rates_are_rejected() {
    let (state, store) = test_state();
    let admin = sign_up(&state, "admin@example.com", Role::Admin).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    for body in [
        json!({"state": "", "district": "Pune", "circleRate": 100}),
        json!({"state": "MH", "district": "Pune", "circleRate": 0}),
        json!({"state": "MH", "district": "Pune", "circleRate": -10}),
        json!({"state": "MH", "district": "Pune"}),
    ] {
        let resp = test::TestRequest::post()
            .uri("/admin/circle-rates")
            .insert_header(admin.bearer())
            .set_json(body)
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 400);
    }
    assert!(store.list_circle_rates(None).await.unwrap().is_empty());
}

/// Registration, login and circle-rate upsert end to end.
#[test_log::test(actix_web::test)]
async fn test_admin_onboarding_scenario() {
    let (state, store) = test_state();
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "lawyer@x.com", "password": "pw", "role": "lawyer"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);

    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "admin@x.com", "password": "pw", "role": "admin"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 201);
    let registered: Value = test::read_body_json(resp).await;

    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "admin@x.com", "password": "pw", "role": "admin"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 409);

    let resp = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "admin@x.com", "password": "pw"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let login: Value = test::read_body_json(resp).await;
    let token = login["token"].as_str().unwrap().to_string();

    let payload = PlainTokenCodec.decode(&token).unwrap();
    assert_eq!(payload.user_id.to_string(), registered["userId"].as_str().unwrap());
    assert_eq!(payload.role, Role::Admin);

    for rate in [50000, 55000] {
        let resp = test::TestRequest::post()
            .uri("/admin/circle-rates")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"state": "MH", "district": "Pune", "circleRate": rate}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);
    }

    let resp = test::TestRequest::get()
        .uri("/admin/circle-rates")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(resp).await;
    let rates = body["rates"].as_array().unwrap();
    assert_eq!(rates.len(), 1);
    assert_eq!(rates[0]["circleRate"], 55000.0);

    assert_eq!(store.user_count().await, 1);
}
