//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Templates
        .route("/templates", get(handlers::template::list_templates))
        .route(
            "/templates/names",
            get(handlers::template::list_template_names),
        )
        .route(
            "/templates/reload",
            post(handlers::template::reload_templates),
        )
        .route(
            "/templates/{name}",
            get(handlers::template::get_template)
                .put(handlers::template::put_template)
                .delete(handlers::template::delete_template),
        )
        .route(
            "/templates/{name}/render",
            post(handlers::template::render_template),
        )
        // Accounts
        .route(
            "/accounts",
            get(handlers::account::list_accounts).post(handlers::account::connect_account),
        )
        .route(
            "/accounts/{name}",
            axum::routing::delete(handlers::account::disconnect_account),
        )
        // Dialogs and dispatch
        .route("/dialogs/{handle}", get(handlers::dialog::search_dialog))
        .route(
            "/dispatch/dialog",
            post(handlers::dispatch::dispatch_to_dialog),
        )
        .route(
            "/dispatch/handle",
            post(handlers::dispatch::dispatch_to_handle),
        )
        // Notifications
        .route("/events", get(handlers::event::stream_events))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "transport": state.registry.transport_name(),
        "accounts": state.registry.len().await,
        "templates": state.template_service.names().await.len(),
    }))
}
