mod common;

use actix_web::{test, web, App};
use advocate_server::db::{MemoryStore, Role, Store};
use advocate_server::error::{AppError, DeliveryError};
use advocate_server::notifications::{Channel, Notifier};
use advocate_server::responder::CannedResponder;
use advocate_server::{routes, AppState, Result, Settings};
use async_trait::async_trait;
use common::{sign_up, test_state};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[actix_web::test]
async fn test_subscription_update_and_dashboard() {
    let (state, store) = test_state();
    let admin = sign_up(&state, "admin@example.com", Role::Admin).await;
    let lawyer = sign_up(&state, "lawyer@example.com", Role::Lawyer).await;
    sign_up(&state, "client1@example.com", Role::User).await;
    sign_up(&state, "client2@example.com", Role::User).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let resp = test::TestRequest::post()
        .uri("/admin/subscriptions")
        .insert_header(admin.bearer())
        .set_json(json!({"userId": lawyer.user_id, "planId": "lawyer-pro", "discountPercent": 20}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["planId"], "lawyer-pro");
    assert_eq!(body["amountCharged"], 3999.2);

    let stored = store.get_user_by_id(lawyer.user_id).await.unwrap().unwrap();
    assert_eq!(stored.subscription_plan, "lawyer-pro");
    assert!(stored.subscription_expires_at.is_some());

    let resp = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(admin.bearer())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let stats: Value = test::read_body_json(resp).await;
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["totalLawyers"], 1);
    assert_eq!(stats["activeSubscriptions"], 1);
    assert_eq!(stats["documentsGenerated"], 0);
    assert_eq!(stats["revenueThisMonth"], 3999.2);
    assert!(stats["topTemplates"].as_array().unwrap().is_empty());

    let resp = test::TestRequest::get()
        .uri("/admin/subscriptions/plans")
        .insert_header(admin.bearer())
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(resp).await;
    let ids: Vec<&str> = body["plans"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["free", "lawyer-basic", "lawyer-pro", "enterprise"]);
}

#[actix_web::test]
async fn test_subscription_update_rejects_bad_requests() {
    let (state, _) = test_state();
    let admin = sign_up(&state, "admin@example.com", Role::Admin).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let cases = [
        (json!({"userId": admin.user_id, "planId": "platinum"}), 400),
        (json!({"userId": admin.user_id, "planId": "lawyer-basic", "discountPercent": 120}), 400),
        (json!({"userId": admin.user_id, "planId": "lawyer-basic", "discountPercent": -1}), 400),
        (json!({"userId": uuid::Uuid::new_v4(), "planId": "lawyer-basic"}), 404),
    ];
    for (body, status) in cases {
        let resp = test::TestRequest::post()
            .uri("/admin/subscriptions")
            .insert_header(admin.bearer())
            .set_json(body)
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), status);
    }
}

#[actix_web::test]
async fn test_malkiyat_rate_resolution() {
    let (state, _) = test_state();
    let admin = sign_up(&state, "admin@example.com", Role::Admin).await;
    let lawyer = sign_up(&state, "lawyer@example.com", Role::Lawyer).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let resp = test::TestRequest::post()
        .uri("/admin/circle-rates")
        .insert_header(admin.bearer())
        .set_json(json!({"state": "MH", "district": "Pune", "circleRate": 62000}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    let cases = [
        (json!({"landArea": 2, "state": "MH", "district": "Pune"}), 62000.0, 131440.0),
        (json!({"landArea": 1, "state": "MH", "district": "Nagpur"}), 50000.0, 53000.0),
        (json!({"landArea": 1, "state": "MH", "district": "Pune", "circleRate": 10000}), 10000.0, 10600.0),
    ];
    for (body, rate, total) in cases {
        let resp = test::TestRequest::post()
            .uri("/documents/malkiyat")
            .insert_header(lawyer.bearer())
            .set_json(body)
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);
        let calc: Value = test::read_body_json(resp).await;
        assert_eq!(calc["circleRate"], rate);
        assert_eq!(calc["totalCharges"], total);
    }

    for body in [
        json!({"landArea": 0, "state": "MH", "district": "Pune"}),
        json!({"landArea": 1, "state": "MH", "district": "Pune", "circleRate": 0}),
        json!({"landArea": 1e305, "state": "MH", "district": "Nagpur"}),
        json!({"landArea": 1e200, "state": "MH", "district": "Pune", "circleRate": 1e200}),
    ] {
        let resp = test::TestRequest::post()
            .uri("/documents/malkiyat")
            .insert_header(lawyer.bearer())
            .set_json(body)
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 400);
    }
}

#[actix_web::test]
async fn test_ocr_validates_image_and_type() {
    let (state, _) = test_state();
    let lawyer = sign_up(&state, "lawyer@example.com", Role::Lawyer).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let resp = test::TestRequest::post()
        .uri("/documents/ocr")
        .insert_header(lawyer.bearer())
        .set_json(json!({"imageBase64": "aGVsbG8=", "documentType": "land_record"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["extractedData"]["surveyNumber"], "123/1A");
    assert_eq!(body["confidence"], 0.95);

    for body in [
        json!({"imageBase64": "", "documentType": "pan"}),
        json!({"imageBase64": "%%%", "documentType": "pan"}),
        json!({"imageBase64": "aGVsbG8=", "documentType": "passport"}),
    ] {
        let resp = test::TestRequest::post()
            .uri("/documents/ocr")
            .insert_header(lawyer.bearer())
            .set_json(body)
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 400);
    }
}

#[actix_web::test]
async fn test_argument_tools() {
    let (state, _) = test_state();
    let lawyer = sign_up(&state, "lawyer@example.com", Role::Lawyer).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let resp = test::TestRequest::post()
        .uri("/arguments/analyze-judge")
        .insert_header(lawyer.bearer())
        .set_json(json!({"judgeId": "J-17", "caseType": "criminal"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["judgeName"], "Hon'ble Justice J-17");
    assert!(!body["suggestedStrategy"].as_str().unwrap().is_empty());

    let resp = test::TestRequest::post()
        .uri("/arguments/analyze-judge")
        .insert_header(lawyer.bearer())
        .set_json(json!({"judgeId": " ", "caseType": "criminal"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);

    let resp = test::TestRequest::post()
        .uri("/arguments/simulate")
        .insert_header(lawyer.bearer())
        .set_json(json!({"argument": "The confession was obtained under duress", "judgeProfile": "liberal"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["score"], 8.0);

    let resp = test::TestRequest::post()
        .uri("/arguments/simulate")
        .insert_header(lawyer.bearer())
        .set_json(json!({"argument": ""}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_win_prediction() {
    let (state, _) = test_state();
    let lawyer = sign_up(&state, "lawyer@example.com", Role::Lawyer).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let resp = test::TestRequest::post()
        .uri("/predictor/win-chance")
        .insert_header(lawyer.bearer())
        .set_json(json!({"caseType": "civil", "evidenceStrength": 0.7, "precedentSupport": 0.5}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["winProbability"], 0.7);
    assert!(!body["recommendedActions"].as_array().unwrap().is_empty());

    let resp = test::TestRequest::post()
        .uri("/predictor/win-chance")
        .insert_header(lawyer.bearer())
        .set_json(json!({"evidenceStrength": 1.0, "precedentSupport": 1.0}))
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["winProbability"], 0.95);

    let resp = test::TestRequest::post()
        .uri("/predictor/win-chance")
        .insert_header(lawyer.bearer())
        .set_json(json!({"evidenceStrength": 1.5, "precedentSupport": 0.5}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_ecourt_cases_and_drafts() {
    let (state, store) = test_state();
    let admin = sign_up(&state, "admin@example.com", Role::Admin).await;
    let lawyer = sign_up(&state, "lawyer@example.com", Role::Lawyer).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let resp = test::TestRequest::get()
        .uri("/ecourt/cases?crnNumber=MH-99")
        .insert_header(lawyer.bearer())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let cases = body["cases"].as_array().unwrap();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0]["id"], "MH-99-1");
    assert_eq!(cases[0]["nextHearingDate"], "2024-02-15");

    let resp = test::TestRequest::post()
        .uri("/documents/templates")
        .insert_header(admin.bearer())
        .set_json(json!({"name": "Bail Application", "type": "application", "content": "Body"}))
        .send_request(&app)
        .await;
    let template: Value = test::read_body_json(resp).await;
    let template_id = template["id"].as_i64().unwrap();

    let resp = test::TestRequest::post()
        .uri("/ecourt/drafts")
        .insert_header(lawyer.bearer())
        .set_json(json!({
            "caseId": "CRL.A. 123/2024",
            "draftType": "application",
            "manualInput": "The applicant was arrested on 1 January.",
            "templateId": template_id
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let draft: Value = test::read_body_json(resp).await;
    assert!(draft["id"].as_str().unwrap().starts_with("draft_"));
    assert_eq!(draft["caseId"], "CRL.A. 123/2024");
    assert!(draft["content"].as_str().unwrap().contains("arrested on 1 January"));

    let resp = test::TestRequest::post()
        .uri("/ecourt/drafts")
        .insert_header(lawyer.bearer())
        .set_json(json!({"caseId": "CRL.A. 123/2024", "draftType": "application", "templateId": 999}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 404);

    let resp = test::TestRequest::post()
        .uri("/ecourt/drafts")
        .insert_header(lawyer.bearer())
        .set_json(json!({"caseId": "", "draftType": "application"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);

    assert_eq!(store.count_generations().await.unwrap(), 1);
    let top = store.top_templates(3).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].name, "Bail Application");
    assert_eq!(top[0].usage, 1);

    let resp = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(admin.bearer())
        .send_request(&app)
        .await;
    let stats: Value = test::read_body_json(resp).await;
    assert_eq!(stats["documentsGenerated"], 1);
    assert_eq!(stats["topTemplates"][0]["name"], "Bail Application");
}

#[actix_web::test]
async fn test_cases_default_to_callers_crn() {
    let (state, store) = test_state();
    let lawyer = sign_up(&state, "lawyer@example.com", Role::Lawyer).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let crn = store
        .get_user_by_id(lawyer.user_id)
        .await
        .unwrap()
        .and_then(|u| u.crn_number)
        .unwrap();

    let resp = test::TestRequest::get()
        .uri("/ecourt/cases")
        .insert_header(lawyer.bearer())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["cases"][0]["id"], format!("{}-1", crn));
}

/// Records every delivery; optionally fails them all.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, Channel)>>,
    fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, message: &str, channel: Channel) -> Result<String> {
        if self.fail {
            return Err(AppError::DeliveryError(DeliveryError::Rejected(503)));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((recipient.to_string(), message.to_string(), channel));
        Ok(format!("msg-{}", sent.len()))
    }
}

fn state_with_notifier(notifier: Arc<RecordingNotifier>) -> web::Data<AppState> {
    web::Data::new(AppState::from_parts(
        Settings::for_tests().unwrap(),
        Arc::new(MemoryStore::new()),
        Arc::new(CannedResponder),
        notifier,
    ))
}

#[actix_web::test]
async fn test_notifications_are_delivered_once() {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = state_with_notifier(notifier.clone());
    let lawyer = sign_up(&state, "lawyer@example.com", Role::Lawyer).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let resp = test::TestRequest::post()
        .uri("/notifications/send")
        .insert_header(lawyer.bearer())
        .set_json(json!({"recipientId": "client-42", "message": "Hearing at 11am", "type": "whatsapp", "urgent": true}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"success": true, "messageId": "msg-1"}));

    for body in [
        json!({"recipientId": "", "message": "Hearing at 11am", "type": "sms"}),
        json!({"recipientId": "client-42", "message": "Hearing at 11am", "type": "pigeon"}),
    ] {
        let resp = test::TestRequest::post()
            .uri("/notifications/send")
            .insert_header(lawyer.bearer())
            .set_json(body)
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 400);
    }

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(
        *sent,
        vec![("client-42".to_string(), "Hearing at 11am".to_string(), Channel::Whatsapp)]
    );
}

#[actix_web::test]
async fn test_gateway_failure_is_bad_gateway() {
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..Default::default()
    });
    let state = state_with_notifier(notifier);
    let admin = sign_up(&state, "admin@example.com", Role::Admin).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let resp = test::TestRequest::post()
        .uri("/notifications/send")
        .insert_header(admin.bearer())
        .set_json(json!({"recipientId": "client-42", "message": "Reminder", "type": "email"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 502);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "delivery_error");
}
