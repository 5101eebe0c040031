//! Kitchen display handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path},
};
use crate::{
    core::{
        access::{self, Permission},
        kds::{self, KdsTicket},
    },
    entities::KdsStatus,
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
        .route("/kds", get(active))
        .route("/kds/tickets/{kds_order_id}", get(ticket))
        .route("/kds/tickets/{kds_order_id}/accept-all", post(accept_all))
        .route("/kds/tickets/{kds_order_id}/reject-all", post(reject_all))
        .route("/kds/orders/{order_id}", get(ticket_for_order))
        .route("/kds/items/{kds_item_id}", put(set_status))
        .route("/kds/items/{kds_item_id}/accept", post(accept))
        .route("/kds/items/{kds_item_id}/reject", post(reject))
        .route("/kds/items/{kds_item_id}/ready", post(ready))
}

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: KdsStatus,
}

async fn authorize(state: &AppState, caller: &Caller, restaurant_id: i64) -> Result<()> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::ManageKitchen)
        .await?;
    Ok(())
}

/// GET /kds - pending and preparing tickets, oldest first
async fn active(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
) -> Result<Json<Vec<KdsTicket>>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(kds::active_tickets(state.db(), restaurant_id).await?))
}

async fn ticket(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, kds_order_id)): Path<(i64, i64)>,
) -> Result<Json<KdsTicket>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(kds::get_ticket(state.db(), restaurant_id, kds_order_id).await?))
}

async fn ticket_for_order(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, order_id)): Path<(i64, i64)>,
) -> Result<Json<KdsTicket>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(kds::ticket_for_order(state.db(), restaurant_id, order_id).await?))
}

async fn accept_all(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, kds_order_id)): Path<(i64, i64)>,
) -> Result<Json<KdsTicket>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(kds::accept_all(state.db(), restaurant_id, kds_order_id).await?))
}

async fn reject_all(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, kds_order_id)): Path<(i64, i64)>,
) -> Result<Json<KdsTicket>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(kds::reject_all(state.db(), restaurant_id, kds_order_id).await?))
}

async fn set_status(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, kds_item_id)): Path<(i64, i64)>,
    Json(payload): Json<StatusChange>,
) -> Result<Json<KdsTicket>> {
    authorize(&state, &caller, restaurant_id).await?;
    let ticket = kds::set_item_status(state.db(), restaurant_id, kds_item_id, payload.status).await?;
    Ok(Json(ticket))
}

async fn accept(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, kds_item_id)): Path<(i64, i64)>,
) -> Result<Json<KdsTicket>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(kds::accept_item(state.db(), restaurant_id, kds_item_id).await?))
}

async fn reject(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, kds_item_id)): Path<(i64, i64)>,
) -> Result<Json<KdsTicket>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(kds::reject_item(state.db(), restaurant_id, kds_item_id).await?))
}

async fn ready(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, kds_item_id)): Path<(i64, i64)>,
) -> Result<Json<KdsTicket>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(kds::mark_item_ready(state.db(), restaurant_id, kds_item_id).await?))
}
