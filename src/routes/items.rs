use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    error::{ApiError, AppError, Operation, WithOperation},
    models::{self, ItemList, ItemLookup, ItemMessage, ItemQuery},
};

type ApiResult<T> = Result<T, ApiError>;

fn selector(
    query: Result<Query<ItemQuery>, QueryRejection>,
    op: Operation,
) -> ApiResult<ItemQuery> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
        .during(op)
}

pub async fn create_item(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let op = Operation::Create;
    let body = models::parse_body(&body).during(op)?;
    let item = state.inventory.create_item(&body).await.during(op)?;

    let payload = ItemMessage {
        message: "Item created successfully",
        item,
    };
    Ok((StatusCode::CREATED, op.headers(), Json(payload)).into_response())
}

pub async fn get_items(
    State(state): State<AppState>,
    query: Result<Query<ItemQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let op = Operation::Read;
    let query = selector(query, op)?;

    if let Some(item_id) = query.selected() {
        let item = state.inventory.get_item(item_id).await.during(op)?;
        return Ok((StatusCode::OK, op.headers(), Json(ItemLookup { item })).into_response());
    }

    let items = state.inventory.list_items().await.during(op)?;
    Ok((StatusCode::OK, op.headers(), Json(ItemList { items })).into_response())
}

pub async fn update_item(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let op = Operation::Update;
    let body = models::parse_body(&body).during(op)?;
    let item = state.inventory.update_item(&body).await.during(op)?;

    let payload = ItemMessage {
        message: "Item updated successfully",
        item,
    };
    Ok((StatusCode::OK, op.headers(), Json(payload)).into_response())
}

pub async fn delete_item(
    State(state): State<AppState>,
    query: Result<Query<ItemQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let op = Operation::Delete;
    let query = selector(query, op)?;
    let item = state
        .inventory
        .delete_item(query.selected())
        .await
        .during(op)?;

    let payload = ItemMessage {
        message: "Item deleted successfully",
        item,
    };
    Ok((StatusCode::OK, op.headers(), Json(payload)).into_response())
}
