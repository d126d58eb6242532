use std::{env, io::Write};

use emailjs_tools::EmailJsConfig;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use razorpay_tools::RazorpayConfig;
use serde_json::json;
use tempfile::NamedTempFile;
use yobaexo_common::{helpers::parse_boolean_flag, Secret};
use yobaexo_payment_engine::CheckoutKeys;
use youtube_tools::YoutubeConfig;

use crate::errors::ServerError;

const DEFAULT_YOBA_HOST: &str = "127.0.0.1";
const DEFAULT_YOBA_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/yobaexo.db";
const RANDOM_JWT_SECRET_LENGTH: usize = 48;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub razorpay: RazorpayConfig,
    /// When false, webhooks with a missing or bad signature are logged and processed anyway. **DANGER**
    pub webhook_signature_checks: bool,
    pub youtube: YoutubeConfig,
    pub emailjs: EmailJsConfig,
}

impl ServerConfig {
    /// Reads the configuration from the environment. The payment gateway keys are required; everything else has a
    /// default, or disables the feature that needs it.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let host = env::var("YOBA_HOST").ok().unwrap_or_else(|| DEFAULT_YOBA_HOST.into());
        let port = env::var("YOBA_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for YOBA_PORT. {e} Using the default, {DEFAULT_YOBA_PORT}, \
                         instead."
                    );
                    DEFAULT_YOBA_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_YOBA_PORT);
        let database_url = env::var("YOBA_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ YOBA_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the authentication configuration. {e}. Reverting to the default configuration.");
            AuthConfig::default()
        });
        let razorpay =
            RazorpayConfig::try_from_env().map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
        let webhook_signature_checks = parse_boolean_flag(env::var("YOBA_WEBHOOK_SIGNATURE_CHECKS").ok(), true);
        if !webhook_signature_checks {
            warn!(
                "🚨️ Webhook signature checks are disabled. Anyone who can reach this server can change payment \
                 records. Do not run production like this."
            );
        }
        Ok(Self {
            host,
            port,
            database_url,
            auth,
            razorpay,
            webhook_signature_checks,
            youtube: YoutubeConfig::from_env(),
            emailjs: EmailJsConfig::from_env(),
        })
    }

    pub fn checkout_keys(&self) -> CheckoutKeys {
        CheckoutKeys::new(self.razorpay.key_id.clone(), self.razorpay.key_secret.clone())
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC key used to sign and verify session tokens.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. DO NOT operate \
             on production like this since every session token is invalidated when the server restarts. 🚨️🚨️🚨️"
        );
        let secret = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RANDOM_JWT_SECRET_LENGTH)
            .map(char::from)
            .collect::<String>();
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({ "jwt_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production instance, \
                         you are doing it wrong! Set the YOBA_JWT_SECRET environment variable instead. 🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
                }
            },
            None => warn!("🪛️ Could not create a temporary file to store the JWT secret."),
        }
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { jwt_secret: Secret::new(secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("YOBA_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [YOBA_JWT_SECRET]")))?;
        let secret = Secret::new(secret);
        if secret.is_blank() {
            return Err(ServerError::ConfigurationError("YOBA_JWT_SECRET is empty".to_string()));
        }
        Ok(Self { jwt_secret: secret })
    }
}
