use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json;
use yobaexo_payment_engine::{
    db_types::{LicenseStatus, MinorUnits, OrderId, PaymentStatus},
    GatewayError,
    GatewayOrder,
    GatewayOrderStatus,
    PaymentRecordStore,
    UserManagement,
};

use super::helpers::*;

#[actix_web::test]
async fn create_order() {
    let mut test_app = TestApp::new().await;
    test_app
        .gateway
        .expect_create_order()
        .withf(|order| {
            order.amount == MinorUnits::from(49_900) && order.currency == "INR" && order.notes.contains_key("userId")
        })
        .times(1)
        .returning(|order| {
            Ok(GatewayOrder {
                id: OrderId::from("order_NkV2s3b2Xz"),
                amount: order.amount,
                currency: order.currency,
                receipt: Some(order.receipt),
                status: GatewayOrderStatus::Created,
            })
        });
    let (app, _db) = test_app.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post().uri("/api/create-order").insert_header(bearer(&token)).set_json(json!({"amount": 499}));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json(),
        json!({
            "success": true,
            "order_id": "order_NkV2s3b2Xz",
            "amount": 49_900,
            "currency": "INR",
            "key_id": KEY_ID
        })
    );
}

#[actix_web::test]
async fn create_order_validation() {
    // No gateway expectations: the gateway must not be called
    let (app, _db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post().uri("/api/create-order").insert_header(bearer(&token)).set_json(json!({}));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, r#"{"error":"Amount is required"}"#);

    let req =
        TestRequest::post().uri("/api/create-order").insert_header(bearer(&token)).set_json(json!({"amount": 0.5}));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, r#"{"error":"Minimum amount should be ₹1"}"#);

    let req = TestRequest::post().uri("/api/create-order").set_json(json!({"amount": 100}));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_order_gateway_failure() {
    let mut test_app = TestApp::new().await;
    test_app
        .gateway
        .expect_create_order()
        .returning(|_| Err(GatewayError::Unavailable("connection refused".into())));
    let (app, _db) = test_app.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    let req =
        TestRequest::post().uri("/api/create-order").insert_header(bearer(&token)).set_json(json!({"amount": 100}));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(reply.json()["error"].is_string());
}

#[actix_web::test]
async fn tracking_twice_keeps_one_record() {
    let (app, db) = TestApp::new().await.start().await;
    let (uid, token) = register(&app, "Asha", "asha@example.com").await;
    let body = json!({"order_id": "order_T1", "amount": 50000, "plan_id": "pro", "plan_name": "Pro"});
    let req = TestRequest::post().uri("/api/track-payment").insert_header(bearer(&token)).set_json(&body);
    let first = send(&app, req).await;
    assert_eq!(first.status, StatusCode::OK);
    let first = first.json();
    assert_eq!(first["message"], "Payment tracked successfully");
    assert_eq!(first["status"], "initiated");

    let mut body = body;
    body["status"] = json!("created");
    let req = TestRequest::post().uri("/api/track-payment").insert_header(bearer(&token)).set_json(&body);
    let second = send(&app, req).await.json();
    assert_eq!(second["status"], "created");
    assert_eq!(second["payment_id"], first["payment_id"]);

    let record = db.find_by_order(&OrderId::from("order_T1")).await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Created);
    assert_eq!(record.plan_name.as_deref(), Some("Pro"));
    assert_eq!(db.count_payments_for_user(&uid).await.unwrap(), 1);
}

#[actix_web::test]
async fn tracking_requires_order_and_amount() {
    let (app, db) = TestApp::new().await.start().await;
    let (uid, token) = register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post()
        .uri("/api/track-payment")
        .insert_header(bearer(&token))
        .set_json(json!({"order_id": "order_T2"}));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let req = TestRequest::post()
        .uri("/api/track-payment")
        .insert_header(bearer(&token))
        .set_json(json!({"order_id": "order_T2", "amount": 100, "status": "paid-ish"}));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    for amount in [0, -500] {
        let req = TestRequest::post()
            .uri("/api/track-payment")
            .insert_header(bearer(&token))
            .set_json(json!({"order_id": "order_T2", "amount": amount}));
        let reply = send(&app, req).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body, r#"{"error":"order_id and amount are required"}"#);
    }
    assert_eq!(db.count_payments_for_user(&uid).await.unwrap(), 0);
}

#[actix_web::test]
async fn failed_payment_is_reported_back() {
    let (app, _db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post()
        .uri("/api/track-payment")
        .insert_header(bearer(&token))
        .set_json(json!({"order_id": "order_F1", "amount": 50000}));
    assert_eq!(send(&app, req).await.status, StatusCode::OK);

    let req = TestRequest::put().uri("/api/track-payment").insert_header(bearer(&token)).set_json(json!({
        "order_id": "order_F1",
        "payment_id": "pay_F1",
        "status": "failed",
        "error_message": "insufficient funds",
        "payment_details": {"method": "card"}
    }));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["message"], "Payment status updated successfully");
    assert_eq!(reply.json()["status"], "failed");

    let reply = send(&app, TestRequest::get().uri("/api/track-payment?order_id=order_F1")).await;
    assert_eq!(reply.status, StatusCode::OK);
    let json = reply.json();
    assert_eq!(json["success"], true);
    assert_eq!(json["payment"]["status"], "failed");
    assert_eq!(json["payment"]["error_message"], "insufficient funds");
    assert_eq!(json["payment"]["details"]["payment_details"], json!({"method": "card"}));

    // The payment id now finds the same record
    let reply = send(&app, TestRequest::get().uri("/api/track-payment?payment_id=pay_F1")).await;
    assert_eq!(reply.json()["payment"]["order_id"], "order_F1");
}

#[actix_web::test]
async fn resent_payment_details_replace_the_previous_blob() {
    let (app, db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    track_order(&app, &token, "order_D1", 500).await;
    let first = json!({"method": "card", "bank": null, "card": {"last4": "1111", "network": "Visa"}});
    let req = TestRequest::put().uri("/api/track-payment").insert_header(bearer(&token)).set_json(json!({
        "order_id": "order_D1",
        "status": "processing",
        "payment_details": first,
        "license_details": {"tier": "basic"}
    }));
    assert_eq!(send(&app, req).await.status, StatusCode::OK);
    let record = db.find_by_order(&OrderId::from("order_D1")).await.unwrap().unwrap();
    assert_eq!(record.details["payment_details"], first);

    let second = json!({"method": "upi", "card": {"last4": "2222"}});
    let req = TestRequest::put()
        .uri("/api/track-payment")
        .insert_header(bearer(&token))
        .set_json(json!({"order_id": "order_D1", "status": "processing", "payment_details": second}));
    assert_eq!(send(&app, req).await.status, StatusCode::OK);
    let record = db.find_by_order(&OrderId::from("order_D1")).await.unwrap().unwrap();
    assert_eq!(record.details["payment_details"], second);
    assert_eq!(record.details["license_details"], json!({"tier": "basic"}));
}

#[actix_web::test]
async fn updates_fall_back_to_the_payment_id() {
    let (app, db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post()
        .uri("/api/track-payment")
        .insert_header(bearer(&token))
        .set_json(json!({"order_id": "order_P1", "amount": 100}));
    send(&app, req).await;
    let req = TestRequest::put()
        .uri("/api/track-payment")
        .insert_header(bearer(&token))
        .set_json(json!({"order_id": "order_P1", "payment_id": "pay_P1", "status": "processing"}));
    assert_eq!(send(&app, req).await.status, StatusCode::OK);
    let req = TestRequest::put()
        .uri("/api/track-payment")
        .insert_header(bearer(&token))
        .set_json(json!({"order_id": "order_wrong", "payment_id": "pay_P1", "status": "cancelled"}));
    assert_eq!(send(&app, req).await.status, StatusCode::OK);
    let record = db.find_by_order(&OrderId::from("order_P1")).await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Cancelled);
}

#[actix_web::test]
async fn unknown_payments() {
    let (app, _db) = TestApp::new().await.start().await;
    let (_, token) = register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::put()
        .uri("/api/track-payment")
        .insert_header(bearer(&token))
        .set_json(json!({"order_id": "order_nope", "status": "failed"}));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, r#"{"error":"Payment not found"}"#);

    let reply = send(&app, TestRequest::get().uri("/api/track-payment?order_id=order_nope")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = send(&app, TestRequest::get().uri("/api/track-payment")).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn verified_payment_activates_licence() {
    let mut test_app = TestApp::new().await;
    test_app
        .gateway
        .expect_fetch_order()
        .withf(|id| id.as_str() == "order_V500")
        .returning(|_| Ok(gateway_order("order_V500", 500, GatewayOrderStatus::Paid)));
    let (app, db) = test_app.start().await;
    let (uid, token) = register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post().uri("/api/verify-payment").insert_header(bearer(&token)).set_json(json!({
        "order_id": "order_V500",
        "payment_id": "pay_V500",
        "signature": checkout_signature("order_V500", "pay_V500"),
        "amount": 500,
        "currency": "INR"
    }));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    let json = reply.json();
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Payment verified and recorded successfully");
    assert_eq!(json["orderDetails"]["status"], "completed");
    assert_eq!(json["orderDetails"]["order_id"], "order_V500");
    assert_eq!(json["orderDetails"]["payment_id"], "pay_V500");
    assert_eq!(json["orderDetails"]["amount"], 500);
    assert_eq!(json["orderDetails"]["currency"], "INR");

    let user = db.fetch_user(&uid).await.unwrap().unwrap();
    assert_eq!(user.license_status, LicenseStatus::Active);
    let record = db.find_by_order(&OrderId::from("order_V500")).await.unwrap().unwrap();
    assert_eq!(json["paymentId"], record.id);
    assert_eq!(record.user_id.as_deref(), Some(uid.as_str()));
    assert_eq!(record.details["license_details"]["license_status"], "active");
}

#[actix_web::test]
async fn verification_is_idempotent() {
    let mut test_app = TestApp::new().await;
    test_app
        .gateway
        .expect_fetch_order()
        .times(2)
        .returning(|_| Ok(gateway_order("order_I1", 19_900, GatewayOrderStatus::Paid)));
    let (app, db) = test_app.start().await;
    let (uid, token) = register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post()
        .uri("/api/track-payment")
        .insert_header(bearer(&token))
        .set_json(json!({"order_id": "order_I1", "amount": 19_900}));
    send(&app, req).await;
    let body = json!({
        "order_id": "order_I1",
        "payment_id": "pay_I1",
        "signature": checkout_signature("order_I1", "pay_I1")
    });
    let req = TestRequest::post().uri("/api/verify-payment").insert_header(bearer(&token)).set_json(&body);
    let first = send(&app, req).await.json();
    let req = TestRequest::post().uri("/api/verify-payment").insert_header(bearer(&token)).set_json(&body);
    let second = send(&app, req).await;
    assert_eq!(second.status, StatusCode::OK);
    let second = second.json();
    assert_eq!(first["paymentId"], second["paymentId"]);
    assert_eq!(second["orderDetails"]["status"], "completed");
    assert_eq!(db.count_payments_for_user(&uid).await.unwrap(), 1);
    let user = db.fetch_user(&uid).await.unwrap().unwrap();
    assert_eq!(user.license_status, LicenseStatus::Active);
}

#[actix_web::test]
async fn unpaid_orders_are_not_verified() {
    let mut test_app = TestApp::new().await;
    test_app
        .gateway
        .expect_fetch_order()
        .returning(|_| Ok(gateway_order("order_U1", 500, GatewayOrderStatus::Attempted)));
    let (app, db) = test_app.start().await;
    let (uid, token) = register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post().uri("/api/verify-payment").insert_header(bearer(&token)).set_json(json!({
        "order_id": "order_U1",
        "payment_id": "pay_U1",
        "signature": checkout_signature("order_U1", "pay_U1")
    }));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, r#"{"error":"Order not found or not paid"}"#);
    assert!(db.find_by_order(&OrderId::from("order_U1")).await.unwrap().is_none());
    let user = db.fetch_user(&uid).await.unwrap().unwrap();
    assert_eq!(user.license_status, LicenseStatus::Free);
}

#[actix_web::test]
async fn rejected_verification_leaves_tracked_record_alone() {
    let mut test_app = TestApp::new().await;
    test_app
        .gateway
        .expect_fetch_order()
        .times(1)
        .returning(|_| Ok(gateway_order("order_R1", 500, GatewayOrderStatus::Attempted)));
    let (app, db) = test_app.start().await;
    let (uid, token) = register(&app, "Asha", "asha@example.com").await;
    track_order(&app, &token, "order_R1", 500).await;
    let before = db.find_by_order(&OrderId::from("order_R1")).await.unwrap().unwrap();
    assert_eq!(before.status, PaymentStatus::Initiated);

    // Not paid yet
    let req = TestRequest::post().uri("/api/verify-payment").insert_header(bearer(&token)).set_json(json!({
        "order_id": "order_R1",
        "payment_id": "pay_R1",
        "signature": checkout_signature("order_R1", "pay_R1")
    }));
    assert_eq!(send(&app, req).await.status, StatusCode::BAD_REQUEST);
    // Bad signature
    let req = TestRequest::post().uri("/api/verify-payment").insert_header(bearer(&token)).set_json(json!({
        "order_id": "order_R1",
        "payment_id": "pay_R1",
        "signature": checkout_signature("order_R1", "pay_other")
    }));
    assert_eq!(send(&app, req).await.status, StatusCode::BAD_REQUEST);

    let after = db.find_by_order(&OrderId::from("order_R1")).await.unwrap().unwrap();
    assert_eq!(after.status, PaymentStatus::Initiated);
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(after.payment_id, None);
    assert_eq!(db.fetch_user(&uid).await.unwrap().unwrap().license_status, LicenseStatus::Free);
}

#[actix_web::test]
async fn forged_checkout_signatures_are_rejected() {
    // The gateway is never consulted when the signature is wrong
    let (app, db) = TestApp::new().await.start().await;
    let (uid, token) = register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post().uri("/api/verify-payment").insert_header(bearer(&token)).set_json(json!({
        "order_id": "order_X1",
        "payment_id": "pay_X1",
        "signature": checkout_signature("order_X1", "pay_X2")
    }));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(db.find_by_order(&OrderId::from("order_X1")).await.unwrap().is_none());
    assert_eq!(db.fetch_user(&uid).await.unwrap().unwrap().license_status, LicenseStatus::Free);

    let req = TestRequest::post()
        .uri("/api/verify-payment")
        .insert_header(bearer(&token))
        .set_json(json!({"order_id": "order_X1", "payment_id": "pay_X1"}));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, r#"{"error":"order_id, payment_id, and signature are required"}"#);
}

#[actix_web::test]
async fn payment_history_is_paged_per_user() {
    let (app, _db) = TestApp::new().await.start().await;
    let (_, asha) = register(&app, "Asha", "asha@example.com").await;
    let (_, ravi) = register(&app, "Ravi", "ravi@example.com").await;
    for i in 1..=3 {
        let req = TestRequest::post()
            .uri("/api/track-payment")
            .insert_header(bearer(&asha))
            .set_json(json!({"order_id": format!("order_A{i}"), "amount": 100 * i}));
        assert_eq!(send(&app, req).await.status, StatusCode::OK);
    }
    let req = TestRequest::post()
        .uri("/api/track-payment")
        .insert_header(bearer(&ravi))
        .set_json(json!({"order_id": "order_R1", "amount": 100}));
    send(&app, req).await;

    let req = TestRequest::get().uri("/api/payment-history?page=1&limit=2").insert_header(bearer(&asha));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    let json = reply.json();
    assert_eq!(json["success"], true);
    assert_eq!(json["payments"].as_array().unwrap().len(), 2);
    assert_eq!(
        json["pagination"],
        json!({
            "currentPage": 1,
            "totalPages": 2,
            "totalPayments": 3,
            "hasNextPage": true,
            "hasPreviousPage": false
        })
    );

    let req = TestRequest::get().uri("/api/payment-history?page=2&limit=two").insert_header(bearer(&asha));
    let json = send(&app, req).await.json();
    assert_eq!(json["payments"].as_array().unwrap().len(), 0);
    assert_eq!(json["pagination"]["totalPages"], 1);
    assert_eq!(json["pagination"]["hasPreviousPage"], true);

    let req = TestRequest::get().uri("/api/payment-history").insert_header(bearer(&ravi));
    let json = send(&app, req).await.json();
    let payments = json["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["order_id"], "order_R1");
}
