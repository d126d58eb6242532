//! Webhook signature middleware for Actix Web.
//!
//! The payment gateway signs every webhook with HMAC-SHA256 over the raw request body, keyed with the webhook secret
//! configured in its dashboard. The hex digest arrives in the `X-Razorpay-Signature` header.
//!
//! When enforcement is on, requests with a missing or wrong signature are rejected with a 400 before they reach the
//! handler. When it is off, mismatches are logged and the request proceeds.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    ResponseError,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use yobaexo_common::Secret;
use yobaexo_payment_engine::helpers::verify_webhook_signature;

use crate::errors::ServerError;

pub const RAZORPAY_SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

pub struct HmacMiddlewareFactory {
    hmac_header: String,
    key: Secret<String>,
    // If false, bad signatures are logged but the call is allowed through
    enforce: bool,
}

impl HmacMiddlewareFactory {
    pub fn new(hmac_header: &str, key: Secret<String>, enforce: bool) -> Self {
        HmacMiddlewareFactory { hmac_header: hmac_header.into(), key, enforce }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B>>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService {
            hmac_header: self.hmac_header.clone(),
            key: self.key.clone(),
            enforce: self.enforce,
            service: Rc::new(service),
        }))
    }
}

pub struct HmacMiddlewareService<S> {
    hmac_header: String,
    key: Secret<String>,
    enforce: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.key.reveal().clone();
        let hmac_header = self.hmac_header.clone();
        let enforce = self.enforce;
        Box::pin(async move {
            trace!("🔐️ Checking webhook signature");
            let data = match req.extract::<web::Bytes>().await {
                Ok(data) => data,
                Err(e) => {
                    warn!("🔐️ Failed to extract request data: {e:?}");
                    let err = ServerError::InvalidRequestBody(e.to_string());
                    return Ok(req.into_response(err.error_response()).map_into_right_body());
                },
            };
            let signature = req.headers().get(&hmac_header).and_then(|v| v.to_str().ok()).map(str::to_string);
            let rejection = match signature {
                None => Some(ServerError::MissingWebhookSignature),
                Some(sig) if !verify_webhook_signature(data.as_ref(), &sig, &secret) => {
                    Some(ServerError::InvalidWebhookSignature)
                },
                Some(_) => None,
            };
            match rejection {
                None => trace!("🔐️ Webhook signature check ✅️"),
                Some(err) if enforce => {
                    warn!("🔐️ {err} on webhook from {:?}. Denying access.", req.connection_info().peer_addr());
                    return Ok(req.into_response(err.error_response()).map_into_right_body());
                },
                Some(err) => warn!("🔐️ {err} on webhook, but signature checks are disabled. Allowing request."),
            }
            req.set_payload(bytes_to_payload(data));
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
