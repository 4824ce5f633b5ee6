mod health;
mod items;

use axum::{routing::get, Router};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route(
            "/items",
            get(items::get_items)
                .post(items::create_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
}
