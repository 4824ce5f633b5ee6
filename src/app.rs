use axum::{extract::DefaultBodyLimit, Router};
use http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    config::AppConfig,
    database,
    error::Result,
    routes,
    services::{notification_service, InventoryService},
};

#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryService,
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let store = database::create_store(&config.store, &config.aws).await?;
    let notifier = notification_service::load_notifier(config).await;

    let inventory = InventoryService::new(store, notifier);

    Ok(router(inventory, config.server.max_body_size))
}

/// Router with CORS and body limit applied, for an already wired service.
pub fn router(inventory: InventoryService, max_body_size: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    routes::create_router()
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(cors)
        .with_state(AppState { inventory })
}
