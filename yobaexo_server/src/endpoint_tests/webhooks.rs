use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json;
use yobaexo_payment_engine::{
    db_types::{OrderId, PaymentStatus},
    helpers::calculate_hmac,
    PaymentRecordStore,
};

use super::helpers::*;
use crate::middleware::RAZORPAY_SIGNATURE_HEADER;

#[actix_web::test]
async fn capture_completes_a_tracked_payment() {
    let (app, db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    track_order(&app, &token, "order_W1", 50_000).await;

    let reply = send(&app, webhook_request(&captured_event("order_W1", "pay_W1", 50_000))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, r#"{"success":true}"#);

    let record = db.find_by_order(&OrderId::from("order_W1")).await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Completed);
    assert_eq!(record.payment_id.as_deref(), Some("pay_W1"));
    assert_eq!(record.details["payment_method"], "upi");
    assert_eq!(record.details["vpa"], "fan@okbank");
    assert!(record.details.contains_key("captured_at"));
}

#[actix_web::test]
async fn capture_for_an_unknown_order_creates_nothing() {
    let (app, db) = TestApp::new().await.start().await;
    let reply = send(&app, webhook_request(&captured_event("order_ghost", "pay_ghost", 100))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({"success": true}));
    assert!(db.find_by_order(&OrderId::from("order_ghost")).await.unwrap().is_none());
    assert!(db.find_by_payment("pay_ghost").await.unwrap().is_none());
}

#[actix_web::test]
async fn failure_is_recorded() {
    let (app, db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    track_order(&app, &token, "order_W2", 100).await;
    let event = json!({
        "event": "payment.failed",
        "payload": { "payment": { "entity": {
            "id": "pay_W2",
            "order_id": "order_W2",
            "amount": 100,
            "currency": "INR",
            "error_description": "Payment was declined by the bank"
        }}}
    });
    let reply = send(&app, webhook_request(&event)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let record = db.find_by_order(&OrderId::from("order_W2")).await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("Payment was declined by the bank"));
    assert!(record.error_timestamp.is_some());
    assert!(record.details.contains_key("failed_at"));
}

#[actix_web::test]
async fn late_failures_do_not_undo_a_completed_payment() {
    let (app, db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    track_order(&app, &token, "order_W3", 100).await;
    send(&app, webhook_request(&captured_event("order_W3", "pay_W3", 100))).await;
    let event = json!({
        "event": "payment.failed",
        "payload": { "payment": { "id": "pay_W3b", "order_id": "order_W3", "reason": "late failure" } }
    });
    assert_eq!(send(&app, webhook_request(&event)).await.status, StatusCode::OK);
    let record = db.find_by_order(&OrderId::from("order_W3")).await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Completed);
    assert_eq!(record.payment_id.as_deref(), Some("pay_W3"));
    assert_eq!(record.details["failure_reason"], "late failure");
}

#[actix_web::test]
async fn authorization_and_order_paid() {
    let (app, db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    track_order(&app, &token, "order_W4", 2_500).await;
    let event = json!({
        "event": "payment.authorized",
        "payload": { "payment": { "entity": { "id": "pay_W4", "order_id": "order_W4", "amount": 2500 } } }
    });
    send(&app, webhook_request(&event)).await;
    let record = db.find_by_order(&OrderId::from("order_W4")).await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Authorized);
    assert!(record.details.contains_key("authorized_at"));

    let event = json!({
        "event": "order.paid",
        "payload": { "order": { "entity": { "id": "order_W4", "amount": 2500, "currency": "INR", "status": "paid" } } }
    });
    send(&app, webhook_request(&event)).await;
    let record = db.find_by_order(&OrderId::from("order_W4")).await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Completed);
    assert!(record.details.contains_key("order_paid_at"));
}

#[actix_web::test]
async fn unknown_events_are_acknowledged() {
    let (app, _db) = TestApp::new().await.start().await;
    let event = json!({"event": "refund.processed", "payload": {"refund": {"entity": {"id": "rfnd_1"}}}});
    let reply = send(&app, webhook_request(&event)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, r#"{"success":true}"#);
}

#[actix_web::test]
async fn malformed_events_are_rejected() {
    let (app, _db) = TestApp::new().await.start().await;
    let event = json!({"event": "payment.captured", "payload": {"payment": {"id": "pay_1"}}});
    let reply = send(&app, webhook_request(&event)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["error"].is_string());
}

#[actix_web::test]
async fn missing_signature_is_rejected() {
    let (app, db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    track_order(&app, &token, "order_S1", 100).await;
    let req = TestRequest::post()
        .uri("/api/payment-webhook")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(captured_event("order_S1", "pay_S1", 100).to_string());
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, r#"{"error":"Missing signature"}"#);
    let record = db.find_by_order(&OrderId::from("order_S1")).await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Initiated);
}

#[actix_web::test]
async fn bad_signature_is_rejected() {
    let (app, db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    track_order(&app, &token, "order_S2", 100).await;
    // Signed with the checkout secret instead of the webhook secret
    let body = captured_event("order_S2", "pay_S2", 100).to_string();
    let forged = calculate_hmac(KEY_SECRET, body.as_bytes());
    let req = TestRequest::post()
        .uri("/api/payment-webhook")
        .insert_header(("Content-Type", "application/json"))
        .insert_header((RAZORPAY_SIGNATURE_HEADER, forged))
        .set_payload(body);
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, r#"{"error":"Invalid signature"}"#);
    // CORS headers are still applied to the rejection
    assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));
    let record = db.find_by_order(&OrderId::from("order_S2")).await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Initiated);
}

#[actix_web::test]
async fn tampered_body_is_rejected() {
    let (app, _db) = TestApp::new().await.start().await;
    let original = captured_event("order_S3", "pay_S3", 100).to_string();
    let signature = calculate_hmac(WEBHOOK_SECRET, original.as_bytes());
    let tampered = original.replace("100", "1");
    let req = TestRequest::post()
        .uri("/api/payment-webhook")
        .insert_header(("Content-Type", "application/json"))
        .insert_header((RAZORPAY_SIGNATURE_HEADER, signature))
        .set_payload(tampered);
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn permissive_mode_processes_unsigned_webhooks() {
    let (app, db) = TestApp::new().await.without_signature_checks().start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    track_order(&app, &token, "order_S4", 100).await;
    let req = TestRequest::post()
        .uri("/api/payment-webhook")
        .insert_header(("Content-Type", "application/json"))
        .insert_header((RAZORPAY_SIGNATURE_HEADER, "deadbeef"))
        .set_payload(captured_event("order_S4", "pay_S4", 100).to_string());
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    let record = db.find_by_order(&OrderId::from("order_S4")).await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Completed);
}
