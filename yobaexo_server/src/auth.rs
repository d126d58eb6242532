//! Session tokens.
//!
//! Login and registration issue an HS256 JWT carrying the user's id and email. Protected routes take a [`JwtClaims`]
//! argument, which extracts and validates the `Authorization: Bearer <token>` header. The [`TokenIssuer`] must be
//! registered as app data for the extractor to work.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use chrono::Duration;
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
    UntrustedToken,
};
use log::*;
use serde::{Deserialize, Serialize};
use yobaexo_payment_engine::db_types::UserAccount;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub const DEFAULT_TOKEN_VALIDITY_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub uid: String,
    pub email: String,
}

pub struct TokenIssuer {
    key: Hs256Key,
    time_options: TimeOptions,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let key = Hs256Key::new(config.jwt_secret.reveal().as_bytes());
        Self { key, time_options: TimeOptions::default() }
    }

    /// Issue a new access token for the given user. The caller is responsible for having authenticated the user.
    pub fn issue_token(&self, user: &UserAccount, duration: Option<Duration>) -> Result<String, ServerError> {
        let claims = JwtClaims { uid: user.uid.clone(), email: user.email.clone() };
        let duration = duration.unwrap_or_else(|| Duration::hours(DEFAULT_TOKEN_VALIDITY_HOURS));
        let claims = Claims::new(claims).set_duration_and_issuance(&self.time_options, duration);
        let header = Header::empty().with_token_type("JWT");
        Hs256.token(&header, &claims, &self.key).map_err(|e| ServerError::CouldNotIssueAccessToken(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let untrusted = UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let token = Hs256
            .validator::<JwtClaims>(&self.key)
            .validate(&untrusted)
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        token.claims().validate_expiration(&self.time_options).map_err(|e| AuthError::ValidationError(e.to_string()))?;
        Ok(token.claims().custom.clone())
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::PoorlyFormattedToken("Expected 'Bearer <token>'".to_string())),
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(issuer) = req.app_data::<web::Data<TokenIssuer>>() else {
            error!("🔐️ No TokenIssuer is registered with the app. Protected routes cannot be authorised.");
            return ready(Err(ServerError::ConfigurationError("Token issuer is missing".to_string())));
        };
        let result = bearer_token(req).and_then(|token| issuer.validate(token)).map_err(|e| {
            debug!("🔐️ Rejected request to {}. {e}", req.path());
            ServerError::from(e)
        });
        ready(result)
    }
}
