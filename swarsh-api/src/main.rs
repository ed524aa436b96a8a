use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use socketioxide::SocketIo;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;
mod services;
mod socket;

use config::AppConfig;
use socket::notifier::{ConnectionRegistry, Notifier};
use swarsh_shared::clients::db::{create_pool, DbPool};
use swarsh_shared::clients::redis::RedisClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub redis: RedisClient,
    pub registry: Arc<ConnectionRegistry>,
    pub notifier: Notifier,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    swarsh_shared::middleware::init_tracing("swarsh-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics_handle = swarsh_shared::middleware::init_metrics();
    let db = create_pool(&config.database_url);
    let redis = RedisClient::connect(&config.redis_url).await?;

    // Build the Socket.IO layer - the notifier needs io for pushes from REST routes
    let (sio_layer, io) = SocketIo::builder().build_layer();

    let registry = Arc::new(ConnectionRegistry::default());
    let notifier = Notifier::new(io.clone(), registry.clone());

    let state = Arc::new(AppState {
        db,
        config,
        redis,
        registry,
        notifier,
        metrics_handle,
    });

    // Configure the Socket.IO namespace with state via closure
    io.ns("/", {
        let state = state.clone();
        move |socket: socketioxide::extract::SocketRef| {
            let state = state.clone();
            async move {
                socket::handlers::on_connect_with_state(socket, state).await;
            }
        }
    });

    let app = Router::new()
        // Health & metrics
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Auth
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh_token))
        // Profile
        .route("/me", get(routes::profile::get_profile).patch(routes::profile::update_profile))
        .route("/me/preferences", put(routes::profile::update_preferences))
        .route("/me/settings", put(routes::profile::update_settings))
        .route("/users/:id", get(routes::profile::get_public_profile))
        .route("/users/:id/photos", get(routes::photo::list_photos))
        // Photos & discovery
        .route("/photos", post(routes::photo::add_photo))
        .route("/explore", get(routes::photo::explore))
        // Swipes & matches
        .route("/swipe", post(routes::swipe::record_swipe))
        .route("/match", get(routes::matches::list_matches))
        // Pairing
        .route("/invite/generate", post(routes::invite::generate_invite))
        .route("/invite/redeem", post(routes::invite::redeem_invite))
        .route("/pairing/partner", get(routes::invite::get_partner))
        // Messaging
        .route("/message", post(routes::messages::send_message))
        .route("/message/conversation/:other_user_id", get(routes::messages::get_conversation))
        .layer(axum_middleware::from_fn(swarsh_shared::middleware::metrics_middleware))
        .layer(sio_layer)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "swarsh-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
