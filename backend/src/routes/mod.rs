//! Route definitions for the Rider Distribution Management backend

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/products", product_routes())
        .nest("/riders", rider_routes())
        .nest("/batches", batch_routes())
        .nest("/distributions", distribution_routes())
        .nest("/reconciliation", reconciliation_routes())
        .nest("/inventory", inventory_routes())
        .nest("/production", production_routes())
        .nest("/reports", report_routes())
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

/// Rider roster routes
fn rider_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_riders).post(handlers::create_rider))
        .route(
            "/:rider_id",
            get(handlers::get_rider).delete(handlers::delete_rider),
        )
}

/// Batch ledger routes
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches).post(handlers::create_batch))
        .route("/available", get(handlers::list_available_batches))
        .route("/:batch_id", get(handlers::get_batch))
        .route("/:batch_id/reject", post(handlers::warehouse_reject))
        .route("/:batch_id/destroy", post(handlers::destroy_batch))
}

/// Distribution ledger routes
fn distribution_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_distributions).post(handlers::allocate))
        .route("/bulk", post(handlers::allocate_bulk))
        .route("/bundle", post(handlers::allocate_default_bundle))
        .route("/open", get(handlers::list_open_distributions))
        .route("/:distribution_id", get(handlers::get_distribution))
        .route("/:distribution_id/outcome", post(handlers::record_outcome))
        .route("/:distribution_id/correct", put(handlers::admin_correct))
}

/// Reconciliation routes
fn reconciliation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::reconciliation_report))
        .route("/summary", get(handlers::reconciliation_summary))
}

/// Inventory summary routes
fn inventory_routes() -> Router<AppState> {
    Router::new().route("/summary", get(handlers::inventory_summary))
}

/// Production planning routes
fn production_routes() -> Router<AppState> {
    Router::new().route("/needs", get(handlers::production_needs))
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new().route("/daily", get(handlers::daily_report))
}
