use actix_web::{http::StatusCode, test::TestRequest};
use chrono::Utc;
use serde_json::json;
use yobaexo_payment_engine::db_types::{LicenseStatus, UserAccount};

use super::helpers::*;
use crate::{auth::TokenIssuer, config::AuthConfig};

#[actix_web::test]
async fn register_and_login() {
    let (app, _db) = TestApp::new().await.start().await;
    let (uid, token) = register(&app, "Asha", "asha@example.com").await;
    let claims = TokenIssuer::new(&AuthConfig::new(JWT_SECRET)).validate(&token).unwrap();
    assert_eq!(claims.uid, uid);
    assert_eq!(claims.email, "asha@example.com");

    let req = TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "asha@example.com", "password": "correct horse battery staple" }));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    let json = reply.json();
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["user"]["uid"], uid.as_str());
    assert_eq!(json["user"]["name"], "Asha");
    assert_eq!(json["user"]["licenseStatus"], "free");
    assert!(json["user"]["createdAt"].is_string());
    assert!(json["token"].is_string());
}

#[actix_web::test]
async fn registration_response() {
    let (app, _db) = TestApp::new().await.start().await;
    let req = TestRequest::post()
        .uri("/api/register")
        .set_json(json!({ "name": "Ravi", "email": "ravi@example.com", "password": "hunter22" }));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let json = reply.json();
    assert_eq!(json["message"], "User registered successfully");
    assert_eq!(json["user"]["email"], "ravi@example.com");
    assert_eq!(json["user"]["licenseStatus"], "free");
    assert!(json["user"].get("createdAt").is_none());
}

#[actix_web::test]
async fn duplicate_email_is_rejected() {
    let (app, _db) = TestApp::new().await.start().await;
    register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post()
        .uri("/api/register")
        .set_json(json!({ "name": "Impostor", "email": "asha@example.com", "password": "hunter22" }));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, r#"{"error":"Email already exists"}"#);
}

#[actix_web::test]
async fn registration_requires_all_fields() {
    let (app, _db) = TestApp::new().await.start().await;
    let req = TestRequest::post().uri("/api/register").set_json(json!({ "email": "x@example.com" }));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["error"].is_string());
}

#[actix_web::test]
async fn wrong_password() {
    let (app, _db) = TestApp::new().await.start().await;
    register(&app, "Asha", "asha@example.com").await;
    let req = TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "asha@example.com", "password": "not the password" }));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body, r#"{"error":"Invalid email or password"}"#);
}

#[actix_web::test]
async fn unknown_user_cannot_login() {
    let (app, _db) = TestApp::new().await.start().await;
    let req = TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "nobody@example.com", "password": "whatever" }));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn malformed_json_body() {
    let (app, _db) = TestApp::new().await.start().await;
    let req = TestRequest::post()
        .uri("/api/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json");
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let error = reply.json()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Could not read request body"), "was: {error}");
}

#[actix_web::test]
async fn protected_routes_need_a_token() {
    let (app, _db) = TestApp::new().await.start().await;
    let reply = send(&app, TestRequest::get().uri("/api/payment-history")).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert!(reply.json()["error"].is_string());

    let req = TestRequest::get().uri("/api/payment-history").insert_header(("Authorization", "Basic YWJjOmRlZg=="));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let req = TestRequest::get().uri("/api/payment-history").insert_header(bearer("not.a.token"));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn tokens_signed_with_another_secret_are_rejected() {
    let (app, _db) = TestApp::new().await.start().await;
    let (uid, _) = register(&app, "Asha", "asha@example.com").await;
    let forged = TokenIssuer::new(&AuthConfig::new("some other secret"))
        .issue_token(
            &UserAccount {
                uid,
                name: "Asha".into(),
                email: "asha@example.com".into(),
                license_status: LicenseStatus::Free,
                email_verified: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            None,
        )
        .unwrap();
    let req = TestRequest::get().uri("/api/payment-history").insert_header(bearer(&forged));
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}
