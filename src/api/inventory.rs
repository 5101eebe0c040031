//! Inventory handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path},
};
use crate::{
    core::{
        access::{self, Permission},
        inventory::{self, InventoryItemUpdate},
    },
    entities::inventory_item,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list).post(create))
        .route("/inventory/low-stock", get(low_stock))
        .route(
            "/inventory/{inventory_item_id}",
            get(get_by_id).patch(update).delete(delete),
        )
        .route("/inventory/{inventory_item_id}/restock", post(restock))
}

#[derive(Debug, Deserialize)]
struct CreateInventoryItem {
    name: String,
    unit: String,
    available_quantity: f64,
    #[serde(default)]
    min_stock_threshold: f64,
}

#[derive(Debug, Deserialize)]
struct Restock {
    quantity: f64,
}

async fn authorize(state: &AppState, caller: &Caller, restaurant_id: i64) -> Result<()> {
    access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ManageInventory,
    )
    .await?;
    Ok(())
}

async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
) -> Result<Json<Vec<inventory_item::Model>>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(inventory::list_inventory_items(state.db(), restaurant_id).await?))
}

async fn low_stock(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
) -> Result<Json<Vec<inventory_item::Model>>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(inventory::low_stock_items(state.db(), restaurant_id).await?))
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<CreateInventoryItem>,
) -> Result<Json<inventory_item::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let item = inventory::create_inventory_item(
        state.db(),
        restaurant_id,
        &payload.name,
        &payload.unit,
        payload.available_quantity,
        payload.min_stock_threshold,
    )
    .await?;
    Ok(Json(item))
}

async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, inventory_item_id)): Path<(i64, i64)>,
) -> Result<Json<inventory_item::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let item = inventory::get_inventory_item(state.db(), restaurant_id, inventory_item_id).await?;
    Ok(Json(item))
}

async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, inventory_item_id)): Path<(i64, i64)>,
    Json(payload): Json<InventoryItemUpdate>,
) -> Result<Json<inventory_item::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let item =
        inventory::update_inventory_item(state.db(), restaurant_id, inventory_item_id, payload)
            .await?;
    Ok(Json(item))
}

async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, inventory_item_id)): Path<(i64, i64)>,
) -> Result<Json<bool>> {
    authorize(&state, &caller, restaurant_id).await?;
    inventory::delete_inventory_item(state.db(), restaurant_id, inventory_item_id).await?;
    Ok(Json(true))
}

async fn restock(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, inventory_item_id)): Path<(i64, i64)>,
    Json(payload): Json<Restock>,
) -> Result<Json<inventory_item::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let item =
        inventory::restock(state.db(), restaurant_id, inventory_item_id, payload.quantity).await?;
    Ok(Json(item))
}
