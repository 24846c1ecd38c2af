//! Microblog is a small social-blogging service: post, follow, read your feed.
#![forbid(unsafe_code)]
#![deny(unused_mut)]

pub mod avatar;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod feed;
pub mod follow;
mod middleware;
pub mod pagination;
pub mod post;
mod router;
pub mod telemetry;
pub mod token;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::http::{Method, StatusCode, header};
use axum::middleware as AxumMiddleware;
use axum::routing::{get, post};
use error::ServerError;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

/// Password of users made by [`test_user`].
#[cfg(test)]
pub const TEST_PASSWORD: &str = "StRong_PaÂ§$W0rD";

/// MUST NEVER be used in production.
#[cfg(test)]
pub fn test_state(pool: sqlx::SqlitePool) -> AppState {
    let config = Arc::new(config::Configuration::default());
    AppState {
        token: token::TokenManager::new(&config.name, &config.secret_key),
        avatar: avatar::AvatarResolver::new(&config.avatar.service),
        db: database::Database::from_pool(pool),
        pwd: Arc::new(crypto::test_manager()),
        metrics: None,
        config,
    }
}

/// Register `username` with [`TEST_PASSWORD`] and return it with a token.
#[cfg(test)]
pub async fn test_user(state: &AppState, username: &str) -> (user::User, String) {
    let mut conn = state.db.acquire().await.unwrap();
    let user = user::User::builder()
        .username(username)
        .email(format!("{username}@email.com"))
        .create(&mut conn, &state.pwd, TEST_PASSWORD)
        .await
        .unwrap();
    let token = state.token.create(user.id).unwrap();

    (user, token)
}

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub pwd: Arc<crypto::PasswordManager>,
    pub token: token::TokenManager,
    pub avatar: avatar::AvatarResolver,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    let private = Router::new()
        // `GET /index` goes to the caller feed.
        .route("/index", get(router::feed::handler))
        // `POST /posts` goes to `create`.
        .route("/posts", post(router::posts::create))
        .route_layer(AxumMiddleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ));

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        .route("/metrics", get(router::status::metrics))
        .route("/auth/register", post(router::auth::register))
        .route("/auth/login", post(router::auth::login))
        .route("/explore", get(router::posts::explore))
        .merge(private)
        .nest(
            "/users",
            router::users::public().merge(router::users::private(state.clone())),
        )
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    // read configuration file. let it in memory.
    let mut config = config::Configuration::default();
    if let Ok(path) = std::env::var("CONFIG_PATH") {
        config = config.path(path.into());
    }
    let config = config.read()?;

    let db =
        database::Database::new(&config.database.url, config.database.pool_size)
            .await?;

    // execute migrations scripts on start.
    db.migrate().await?;

    let pwd = Arc::new(crypto::PasswordManager::new(Some(config.argon2.clone()))?);
    let token = token::TokenManager::new(&config.name, &config.secret_key);
    let avatar = avatar::AvatarResolver::new(&config.avatar.service);

    Ok(AppState {
        config,
        db,
        pwd,
        token,
        avatar,
        metrics,
    })
}
