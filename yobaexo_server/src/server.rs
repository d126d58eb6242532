use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use emailjs_tools::EmailJsApi;
use log::*;
use razorpay_tools::RazorpayApi;
use yobaexo_common::Secret;
use yobaexo_payment_engine::{
    AccountApi,
    AuthApi,
    LicensingDatabase,
    PaymentFlowApi,
    PaymentGateway,
    SqliteDatabase,
};
use youtube_tools::YoutubeApi;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    integrations::{ContactMailer, RazorpayGateway, VideoCatalog},
    middleware::{CorsMiddlewareFactory, HmacMiddlewareFactory, RAZORPAY_SIGNATURE_HEADER},
    routes::{
        health,
        ChannelVideosRoute,
        CreateOrderRoute,
        LoginRoute,
        PaymentHistoryRoute,
        PaymentStatusRoute,
        PaymentWebhookRoute,
        PlaylistVideosRoute,
        PlaylistsRoute,
        RegisterRoute,
        SearchVideosRoute,
        SendEmailRoute,
        TrackPaymentRoute,
        UpdateTrackedPaymentRoute,
        VerifyPaymentRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🗃️ Database ready at {}", config.database_url);
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let razorpay =
        RazorpayApi::new(config.razorpay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let youtube = YoutubeApi::new(config.youtube.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let emailjs = EmailJsApi::new(config.emailjs.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let gateway = RazorpayGateway::new(razorpay.clone());
        let payments_api = PaymentFlowApi::new(db.clone(), gateway, config.checkout_keys());
        let accounts_api = AccountApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let webhook_secret = config.razorpay.webhook_secret.clone();
        let enforce = config.webhook_signature_checks;
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %r").log_target("yobaexo::access_log"))
            .wrap(CorsMiddlewareFactory::new())
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(youtube.clone()))
            .app_data(web::Data::new(emailjs.clone()))
            .configure(|cfg| {
                configure_routes::<SqliteDatabase, RazorpayGateway, YoutubeApi, EmailJsApi>(
                    cfg,
                    webhook_secret,
                    enforce,
                )
            })
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// Registers every route, plus the JSON and query-string error handlers.
///
/// The caller provides the app data the handlers need: a `PaymentFlowApi<B, G>`, an `AccountApi<B>`, an
/// `AuthApi<B>`, a [`TokenIssuer`], a `V` and an `M`. The webhook route is wrapped in the signature check.
pub fn configure_routes<B, G, V, M>(cfg: &mut web::ServiceConfig, webhook_secret: Secret<String>, enforce: bool)
where
    B: LicensingDatabase + 'static,
    G: PaymentGateway + 'static,
    V: VideoCatalog + 'static,
    M: ContactMailer + 'static,
{
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
    let query_config =
        web::QueryConfig::default().error_handler(|err, _req| ServerError::InvalidQuery(err.to_string()).into());
    let webhook_scope = web::scope("/payment-webhook")
        .wrap(HmacMiddlewareFactory::new(RAZORPAY_SIGNATURE_HEADER, webhook_secret, enforce))
        .service(PaymentWebhookRoute::<B, G>::new());
    let api_scope = web::scope("/api")
        .service(RegisterRoute::<B>::new())
        .service(LoginRoute::<B>::new())
        .service(CreateOrderRoute::<B, G>::new())
        .service(VerifyPaymentRoute::<B, G>::new())
        .service(PaymentHistoryRoute::<B>::new())
        .service(TrackPaymentRoute::<B, G>::new())
        .service(UpdateTrackedPaymentRoute::<B, G>::new())
        .service(PaymentStatusRoute::<B, G>::new())
        .service(webhook_scope)
        .service(ChannelVideosRoute::<V>::new())
        .service(SearchVideosRoute::<V>::new())
        .service(PlaylistsRoute::<V>::new())
        .service(PlaylistVideosRoute::<V>::new())
        .service(SendEmailRoute::<M>::new());
    cfg.app_data(json_config).app_data(query_config).service(health).service(api_scope);
}
