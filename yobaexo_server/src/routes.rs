//! Request handler definitions
//!
//! Define each route and its handler here. Handlers stay thin: they extract the request, call into the engine or a
//! vendor client, and shape the response. Anything longer belongs in the engine.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here is async, and the only CPU-heavy work (password
//! hashing) is moved onto the blocking pool by the engine.
use actix_web::{
    get,
    http::header::{CACHE_CONTROL, EXPIRES, PRAGMA},
    web,
    HttpResponse,
    HttpResponseBuilder,
    Responder,
};
use emailjs_tools::ContactMessage;
use log::*;
use serde_json::json;
use yobaexo_payment_engine::{
    db_types::Pagination,
    payment_objects::{
        CreateOrderRequest,
        PaymentLookup,
        TrackPaymentRequest,
        TrackPaymentUpdateRequest,
        VerifyPaymentRequest,
    },
    webhooks::WebhookEvent,
    AccountApi,
    AuthApi,
    LicensingDatabase,
    LoginRequest,
    PaymentFlowApi,
    PaymentGateway,
    PaymentRecordStore,
    RegisterRequest,
    UserManagement,
};
use youtube_tools::{DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_RESULTS, MAX_PAGE_SIZE};

use crate::{
    auth::{JwtClaims, TokenIssuer},
    data_objects::{
        AuthResponse,
        ContactRequest,
        CreateOrderResponse,
        HistoryQuery,
        PaymentHistoryResponse,
        PaymentStatusResponse,
        PlaylistListResponse,
        SendEmailResponse,
        TrackPaymentResponse,
        UserSummary,
        VerifyPaymentResponse,
        VideoListResponse,
        YoutubeQuery,
    },
    errors::ServerError,
    integrations::{ContactMailer, VideoCatalog},
};

/// Playlist videos are fetched page by page, so this endpoint may ask for more than one page's worth.
const MAX_PLAYLIST_VIDEOS: u32 = 500;

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

fn uncached() -> HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    builder
        .insert_header((CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
        .insert_header((PRAGMA, "no-cache"))
        .insert_header((EXPIRES, "0"));
    builder
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/register" impl UserManagement);
/// Creates a new account and returns a session token for it. New accounts start on the free licence.
pub async fn register<B: UserManagement>(
    body: web::Json<RegisterRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received registration request");
    let user = api.register(body.into_inner()).await?;
    let token = signer.issue_token(&user, None)?;
    info!("💻️ Registered user {}", user.uid);
    let response = AuthResponse {
        message: "User registered successfully".to_string(),
        user: UserSummary {
            uid: user.uid,
            name: user.name,
            email: user.email,
            license_status: user.license_status,
            created_at: None,
        },
        token,
    };
    Ok(HttpResponse::Created().json(response))
}

route!(login => Post "/login" impl UserManagement);
pub async fn login<B: UserManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received login request");
    let user = api.login(body.into_inner()).await?;
    let token = signer.issue_token(&user, None)?;
    debug!("💻️ Issued access token for {}", user.uid);
    let response = AuthResponse {
        message: "Login successful".to_string(),
        user: UserSummary {
            uid: user.uid,
            name: user.name,
            email: user.email,
            license_status: user.license_status,
            created_at: Some(user.created_at),
        },
        token,
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(create_order => Post "/create-order" impl LicensingDatabase, PaymentGateway);
pub async fn create_order<B: LicensingDatabase, G: PaymentGateway>(
    claims: JwtClaims,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received create order request from {}", claims.uid);
    let order = api.create_order(&claims.uid, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CreateOrderResponse { success: true, order }))
}

route!(verify_payment => Post "/verify-payment" impl LicensingDatabase, PaymentGateway);
/// Confirms a checkout callback. The signature must match and the gateway must report the order as paid before
/// anything is recorded. On success the payment is marked completed and the caller's licence is activated.
pub async fn verify_payment<B: LicensingDatabase, G: PaymentGateway>(
    claims: JwtClaims,
    body: web::Json<VerifyPaymentRequest>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received payment verification from {}", claims.uid);
    let verified = api.verify_payment(&claims.uid, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(VerifyPaymentResponse::from(verified)))
}

route!(payment_history => Get "/payment-history" impl PaymentRecordStore);
pub async fn payment_history<B: PaymentRecordStore>(
    claims: JwtClaims,
    query: web::Query<HistoryQuery>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let page = Pagination::from_query(query.page.as_deref(), query.limit.as_deref());
    trace!("💻️ Fetching payment history for {} ({page:?})", claims.uid);
    let history = api.payment_history(&claims.uid, page).await?;
    Ok(HttpResponse::Ok().json(PaymentHistoryResponse { success: true, history }))
}

route!(track_payment => Post "/track-payment" impl LicensingDatabase, PaymentGateway);
pub async fn track_payment<B: LicensingDatabase, G: PaymentGateway>(
    claims: JwtClaims,
    body: web::Json<TrackPaymentRequest>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let record = api.track_payment(&claims.uid, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TrackPaymentResponse::new("Payment tracked successfully", &record)))
}

route!(update_tracked_payment => Put "/track-payment" impl LicensingDatabase, PaymentGateway);
pub async fn update_tracked_payment<B: LicensingDatabase, G: PaymentGateway>(
    claims: JwtClaims,
    body: web::Json<TrackPaymentUpdateRequest>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Payment status update from {}", claims.uid);
    let record = api.update_tracked_payment(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TrackPaymentResponse::new("Payment status updated successfully", &record)))
}

route!(payment_status => Get "/track-payment" impl LicensingDatabase, PaymentGateway);
pub async fn payment_status<B: LicensingDatabase, G: PaymentGateway>(
    query: web::Query<PaymentLookup>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let payment = api.fetch_payment_status(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PaymentStatusResponse { success: true, payment }))
}

route!(payment_webhook => Post "" impl LicensingDatabase, PaymentGateway);
/// Gateway notifications. The signature has already been checked by the HMAC middleware by the time this runs.
/// Events for orders we are not tracking, and event types we do not act on, are acknowledged with a 200.
pub async fn payment_webhook<B: LicensingDatabase, G: PaymentGateway>(
    body: web::Bytes,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let event = WebhookEvent::from_json(body.as_ref()).map_err(|e| {
        warn!("🪝️ Could not parse webhook body. {e}");
        ServerError::ValidationError(e.to_string())
    })?;
    debug!("🪝️ Received webhook {}", event.name());
    api.process_webhook(event).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

//----------------------------------------------   YouTube  ----------------------------------------------------
route!(channel_videos => Get "/youtube/channel-videos" impl VideoCatalog);
pub async fn channel_videos<V: VideoCatalog>(
    query: web::Query<YoutubeQuery>,
    api: web::Data<V>,
) -> Result<HttpResponse, ServerError> {
    let max_results = query.max_results(DEFAULT_MAX_RESULTS, MAX_PAGE_SIZE);
    let videos = api.channel_videos(max_results).await?;
    Ok(uncached().json(VideoListResponse::new(videos, "No videos found for this channel")))
}

route!(search_videos => Get "/youtube/search" impl VideoCatalog);
pub async fn search_videos<V: VideoCatalog>(
    query: web::Query<YoutubeQuery>,
    api: web::Data<V>,
) -> Result<HttpResponse, ServerError> {
    let Some(search) = query.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return Err(ServerError::ValidationError("Query parameter is required".to_string()));
    };
    let max_results = query.max_results(DEFAULT_SEARCH_RESULTS, MAX_PAGE_SIZE);
    let videos = api.search(search, max_results).await?;
    Ok(uncached().json(VideoListResponse::new(videos, "No videos found for the given query").with_query(search)))
}

route!(playlists => Get "/youtube/playlist" impl VideoCatalog);
pub async fn playlists<V: VideoCatalog>(
    query: web::Query<YoutubeQuery>,
    api: web::Data<V>,
) -> Result<HttpResponse, ServerError> {
    let max_results = query.max_results(DEFAULT_MAX_RESULTS, MAX_PAGE_SIZE);
    let playlists = api.playlists(max_results).await?;
    Ok(uncached().json(PlaylistListResponse::new(playlists)))
}

route!(playlist_videos => Get "/youtube/playlist-videos" impl VideoCatalog);
pub async fn playlist_videos<V: VideoCatalog>(
    query: web::Query<YoutubeQuery>,
    api: web::Data<V>,
) -> Result<HttpResponse, ServerError> {
    let Some(playlist_id) = query.playlist_id.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
        return Err(ServerError::ValidationError("Playlist ID is required".to_string()));
    };
    let max_results = query.max_results(DEFAULT_MAX_RESULTS, MAX_PLAYLIST_VIDEOS);
    let result = api.playlist_videos(playlist_id, max_results).await?;
    let response = VideoListResponse::new(result.videos, "No videos found in this playlist")
        .with_playlist_title(result.playlist_title);
    Ok(uncached().json(response))
}

//----------------------------------------------   Email  ----------------------------------------------------
route!(send_email => Post "/send-email" impl ContactMailer);
pub async fn send_email<M: ContactMailer>(
    body: web::Json<ContactRequest>,
    mailer: web::Data<M>,
) -> Result<HttpResponse, ServerError> {
    let message = ContactMessage::try_from(body.into_inner())?;
    debug!("📧️ Contact form message from {} about '{}'", message.email, message.subject);
    let email_id = mailer.send_contact_message(message).await?;
    Ok(HttpResponse::Ok().json(SendEmailResponse {
        success: true,
        message: "Email sent successfully".to_string(),
        email_id,
    }))
}
