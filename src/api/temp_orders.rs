//! Draft order handlers. Every route needs the `orders:take` permission.

use super::{
    AppState, Caller,
    extract::{Json, Path},
};
use crate::{
    core::{
        access::{self, Permission},
        order::OrderDetails,
        temp_order::{self, TempOrderDetails},
    },
    entities::{OrderKind, temp_order as temp_order_entity},
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::{get, post, put},
};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/temp-orders", get(list).post(open))
        .route("/temp-orders/{temp_order_id}", get(get_by_id).delete(discard))
        .route("/temp-orders/{temp_order_id}/items", post(add_item))
        .route(
            "/temp-orders/{temp_order_id}/items/{menu_item_id}",
            put(set_quantity).delete(remove_item),
        )
        .route("/temp-orders/{temp_order_id}/checkout", post(checkout))
}

#[derive(Debug, Deserialize)]
struct OpenTempOrder {
    kind: OrderKind,
    table_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AddItem {
    menu_item_id: i64,
    quantity: i32,
}

#[derive(Debug, Deserialize)]
struct SetQuantity {
    quantity: i32,
}

#[derive(Debug, Deserialize)]
struct Checkout {
    customer_id: Option<i64>,
}

async fn authorize(state: &AppState, caller: &Caller, restaurant_id: i64) -> Result<()> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::TakeOrders)
        .await?;
    Ok(())
}

async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
) -> Result<Json<Vec<temp_order_entity::Model>>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(temp_order::list_temp_orders(state.db(), restaurant_id).await?))
}

async fn open(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<OpenTempOrder>,
) -> Result<Json<temp_order_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let draft =
        temp_order::open_temp_order(state.db(), restaurant_id, payload.kind, payload.table_id)
            .await?;
    Ok(Json(draft))
}

async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, temp_order_id)): Path<(i64, i64)>,
) -> Result<Json<TempOrderDetails>> {
    authorize(&state, &caller, restaurant_id).await?;
    let details =
        temp_order::get_temp_order_details(state.db(), restaurant_id, temp_order_id).await?;
    Ok(Json(details))
}

/// DELETE /temp-orders/{temp_order_id} - stock held by the draft is returned
async fn discard(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, temp_order_id)): Path<(i64, i64)>,
) -> Result<Json<bool>> {
    authorize(&state, &caller, restaurant_id).await?;
    temp_order::discard_temp_order(state.db(), restaurant_id, temp_order_id).await?;
    Ok(Json(true))
}

async fn add_item(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, temp_order_id)): Path<(i64, i64)>,
    Json(payload): Json<AddItem>,
) -> Result<Json<TempOrderDetails>> {
    authorize(&state, &caller, restaurant_id).await?;
    let details = temp_order::add_item(
        state.db(),
        restaurant_id,
        temp_order_id,
        payload.menu_item_id,
        payload.quantity,
    )
    .await?;
    Ok(Json(details))
}

async fn set_quantity(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, temp_order_id, menu_item_id)): Path<(i64, i64, i64)>,
    Json(payload): Json<SetQuantity>,
) -> Result<Json<TempOrderDetails>> {
    authorize(&state, &caller, restaurant_id).await?;
    let details = temp_order::set_item_quantity(
        state.db(),
        restaurant_id,
        temp_order_id,
        menu_item_id,
        payload.quantity,
    )
    .await?;
    Ok(Json(details))
}

async fn remove_item(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, temp_order_id, menu_item_id)): Path<(i64, i64, i64)>,
) -> Result<Json<TempOrderDetails>> {
    authorize(&state, &caller, restaurant_id).await?;
    let details =
        temp_order::remove_item(state.db(), restaurant_id, temp_order_id, menu_item_id).await?;
    Ok(Json(details))
}

/// POST /temp-orders/{temp_order_id}/checkout - turns the draft into a numbered order
async fn checkout(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, temp_order_id)): Path<(i64, i64)>,
    Json(payload): Json<Checkout>,
) -> Result<Json<OrderDetails>> {
    authorize(&state, &caller, restaurant_id).await?;
    let order =
        temp_order::checkout(state.db(), restaurant_id, temp_order_id, payload.customer_id).await?;
    Ok(Json(order))
}
