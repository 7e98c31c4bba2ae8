use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::config::Config;
use crate::handlers;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    let protected_routes = Router::new()
        // Daily scores
        .route(
            "/api/scores",
            post(handlers::scores::upsert_score).get(handlers::scores::list_scores),
        )
        .route("/api/scores/week", get(handlers::scores::weekly_scores))
        .route("/api/scores/recent", get(handlers::scores::recent_scores))
        .route("/api/scores/feedback", get(handlers::feedback::score_feedback))
        .route("/api/scores/:id", delete(handlers::scores::delete_score))
        // Activity logs
        .route("/api/activity/log", post(handlers::activity::save_activity))
        .route("/api/history", get(handlers::activity::history))
        .route("/api/history/:id", delete(handlers::activity::delete_activity))
        // Views
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/api/feedback", get(handlers::feedback::activity_feedback))
        // Chat
        .route("/api/chat/focus", post(handlers::chat::focus_chat))
        .route("/api/chat/lounge", post(handlers::chat::lounge_chat))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
