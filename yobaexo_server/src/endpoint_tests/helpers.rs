use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use log::*;
use serde_json::{json, Value};
use yobaexo_common::Secret;
use yobaexo_payment_engine::{
    db_types::{MinorUnits, OrderId},
    helpers::calculate_hmac,
    test_utils::prepare_env::memory_database,
    AccountApi,
    AuthApi,
    CheckoutKeys,
    GatewayOrder,
    GatewayOrderStatus,
    PaymentFlowApi,
    SqliteDatabase,
};

use super::mocks::{MockCatalog, MockGateway, MockMailer};
use crate::{
    auth::TokenIssuer,
    config::AuthConfig,
    middleware::{CorsMiddlewareFactory, RAZORPAY_SIGNATURE_HEADER},
    server::configure_routes,
};

// Test-only secrets. DO NOT re-use these anywhere.
pub const KEY_ID: &str = "rzp_test_1DP5mmOlF5G5ag";
pub const KEY_SECRET: &str = "thisisthecheckoutsecretfortests";
pub const WEBHOOK_SECRET: &str = "thisisthewebhooksecretfortests";
pub const JWT_SECRET: &str = "thisisthejwtsecretfortests";

/// An app wired like the real server, but backed by an in-memory database and mocked vendor clients. Set
/// expectations on the mocks before calling [`TestApp::start`].
pub struct TestApp {
    pub db: SqliteDatabase,
    pub gateway: MockGateway,
    pub catalog: MockCatalog,
    pub mailer: MockMailer,
    pub enforce_signatures: bool,
}

impl TestApp {
    pub async fn new() -> Self {
        let _ = env_logger::try_init();
        Self {
            db: memory_database().await,
            gateway: MockGateway::new(),
            catalog: MockCatalog::new(),
            mailer: MockMailer::new(),
            enforce_signatures: true,
        }
    }

    pub fn without_signature_checks(mut self) -> Self {
        self.enforce_signatures = false;
        self
    }

    /// Returns the running service and a handle on its database.
    pub async fn start(
        self,
    ) -> (impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>, SqliteDatabase)
    {
        let Self { db, gateway, catalog, mailer, enforce_signatures } = self;
        let keys = CheckoutKeys::new(KEY_ID, Secret::new(KEY_SECRET.to_string()));
        let app = App::new()
            .wrap(CorsMiddlewareFactory::new())
            .app_data(web::Data::new(PaymentFlowApi::new(db.clone(), gateway, keys)))
            .app_data(web::Data::new(AccountApi::new(db.clone())))
            .app_data(web::Data::new(AuthApi::new(db.clone()).with_hash_cost(4)))
            .app_data(web::Data::new(TokenIssuer::new(&AuthConfig::new(JWT_SECRET))))
            .app_data(web::Data::new(catalog))
            .app_data(web::Data::new(mailer))
            .configure(|cfg| {
                configure_routes::<SqliteDatabase, MockGateway, MockCatalog, MockMailer>(
                    cfg,
                    Secret::new(WEBHOOK_SECRET.to_string()),
                    enforce_signatures,
                )
            });
        (test::init_service(app).await, db)
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {}", self.body))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send<S, B>(app: &S, req: TestRequest) -> Reply
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let headers = res.headers().clone();
    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body).into_owned();
    debug!("Response: {status} {body}");
    Reply { status, headers, body }
}

/// Registers a new user and returns their id and session token.
pub async fn register<S, B>(app: &S, name: &str, email: &str) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = TestRequest::post()
        .uri("/api/register")
        .set_json(json!({ "name": name, "email": email, "password": "correct horse battery staple" }));
    let reply = send(app, req).await;
    assert_eq!(reply.status, StatusCode::CREATED, "Registration failed: {}", reply.body);
    let json = reply.json();
    let uid = json["user"]["uid"].as_str().expect("No uid in response").to_string();
    let token = json["token"].as_str().expect("No token in response").to_string();
    (uid, token)
}

/// Starts tracking an order for the token's owner, with the default `initiated` status.
pub async fn track_order<S, B>(app: &S, token: &str, order_id: &str, amount: i64)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = TestRequest::post()
        .uri("/api/track-payment")
        .insert_header(bearer(token))
        .set_json(json!({ "order_id": order_id, "amount": amount }));
    let reply = send(app, req).await;
    assert_eq!(reply.status, StatusCode::OK, "Tracking failed: {}", reply.body);
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// The signature the hosted checkout hands the client after a successful payment.
pub fn checkout_signature(order_id: &str, payment_id: &str) -> String {
    calculate_hmac(KEY_SECRET, format!("{order_id}|{payment_id}").as_bytes())
}

pub fn webhook_request(body: &Value) -> TestRequest {
    let body = body.to_string();
    let signature = calculate_hmac(WEBHOOK_SECRET, body.as_bytes());
    TestRequest::post()
        .uri("/api/payment-webhook")
        .insert_header(("Content-Type", "application/json"))
        .insert_header((RAZORPAY_SIGNATURE_HEADER, signature))
        .set_payload(body)
}

pub fn gateway_order(order_id: &str, amount: i64, status: GatewayOrderStatus) -> GatewayOrder {
    GatewayOrder {
        id: OrderId::from(order_id),
        amount: MinorUnits::from(amount),
        currency: "INR".to_string(),
        receipt: Some(format!("receipt_{order_id}")),
        status,
    }
}

pub fn captured_event(order_id: &str, payment_id: &str, amount: i64) -> Value {
    json!({
        "entity": "event",
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "id": payment_id,
                    "entity": "payment",
                    "amount": amount,
                    "currency": "INR",
                    "status": "captured",
                    "order_id": order_id,
                    "method": "upi",
                    "vpa": "fan@okbank"
                }
            }
        }
    })
}
