use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{ask_handlers, handlers, import_handlers, presales_handlers, user_handlers};

/// Create the main application router with all API endpoints
pub fn create_router(state: AppState) -> Router {
    // Create CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Import
        .route("/api/import", post(import_handlers::import_data))
        // CSD dashboard
        .route("/api/csd/summary", get(handlers::csd_summary))
        .route("/api/csd/call-performance", get(handlers::csd_call_performance))
        .route("/api/csd/status-breakdown", get(handlers::csd_status_breakdown))
        .route("/api/csd/risk-breakdown", get(handlers::csd_risk_breakdown))
        .route("/api/csd/calls", get(handlers::csd_calls))
        .route("/api/csd/inventory", get(handlers::csd_inventory))
        .route("/api/csd/months", get(handlers::csd_months))
        .route("/api/csd/compare", post(handlers::csd_compare))
        .route("/api/csd/calls/export", get(handlers::csd_calls_export))
        .route("/api/csd/inventory/export", get(handlers::csd_inventory_export))
        .route("/api/csd/ask", post(ask_handlers::ask_about_csd))
        .route("/api/csd/analyze", post(ask_handlers::analyze_service_center))
        // Pre-sales dashboard
        .route("/api/presales/summary", get(presales_handlers::presales_summary))
        .route(
            "/api/presales/monthly-performance",
            get(presales_handlers::monthly_performance),
        )
        .route(
            "/api/presales/qualification-trend",
            get(presales_handlers::qualification_trend),
        )
        .route("/api/presales/ms-rr-trend", get(presales_handlers::ms_rr_trend))
        .route("/api/presales/bids", get(presales_handlers::presales_bids))
        .route("/api/presales/months", get(presales_handlers::presales_months))
        .route("/api/presales/compare", post(presales_handlers::presales_compare))
        .route(
            "/api/presales/bids/export",
            get(presales_handlers::presales_bids_export),
        )
        .route("/api/presales/ask", post(ask_handlers::ask_about_bids))
        // User management
        .route("/api/users", get(user_handlers::get_users))
        .route("/api/users/:uid/roles", put(user_handlers::update_user_roles))
        .route("/api/users/:uid/reports", get(user_handlers::get_user_reports))
        // Shared state
        .with_state(state)
        // Uploads are capped at 5MB; leave headroom for multipart framing.
        .layer(DefaultBodyLimit::max(6 * 1024 * 1024))
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
