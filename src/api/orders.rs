//! Order and billing handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        access::{self, Permission},
        order::{self, DiscountRequest, OrderDetails},
    },
    entities::{PayMode, order as order_entity, restaurant},
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list))
        .route("/orders/{order_id}", get(get_by_id).delete(delete))
        .route("/orders/{order_id}/customer", put(attach_customer))
        .route(
            "/orders/{order_id}/discount",
            put(apply_discount).delete(remove_discount),
        )
        .route("/orders/{order_id}/pay", post(pay))
        .route("/orders/{order_id}/unpay", post(unpay))
        .route("/orders/{order_id}/pay-mode", put(change_pay_mode))
}

#[derive(Debug, Deserialize)]
struct OrderFilter {
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct AttachCustomer {
    customer_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Payment {
    pay_mode: PayMode,
}

async fn authorize(
    state: &AppState,
    caller: &Caller,
    restaurant_id: i64,
) -> Result<restaurant::Model> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::ManageBilling)
        .await
}

/// GET /orders?date=YYYY-MM-DD - newest first, optionally limited to one business date
async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<order_entity::Model>>> {
    let restaurant = authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(order::list_orders(state.db(), &restaurant, filter.date).await?))
}

async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, order_id)): Path<(i64, i64)>,
) -> Result<Json<OrderDetails>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(order::get_order_details(state.db(), restaurant_id, order_id).await?))
}

async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, order_id)): Path<(i64, i64)>,
) -> Result<Json<bool>> {
    authorize(&state, &caller, restaurant_id).await?;
    order::delete_order(state.db(), restaurant_id, order_id).await?;
    Ok(Json(true))
}

async fn attach_customer(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, order_id)): Path<(i64, i64)>,
    Json(payload): Json<AttachCustomer>,
) -> Result<Json<order_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let order =
        order::attach_customer(state.db(), restaurant_id, order_id, payload.customer_id).await?;
    Ok(Json(order))
}

async fn apply_discount(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, order_id)): Path<(i64, i64)>,
    Json(payload): Json<DiscountRequest>,
) -> Result<Json<order_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let order =
        order::apply_discount(state.db(), restaurant_id, order_id, payload, Utc::now()).await?;
    Ok(Json(order))
}

async fn remove_discount(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, order_id)): Path<(i64, i64)>,
) -> Result<Json<order_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(order::remove_discount(state.db(), restaurant_id, order_id).await?))
}

async fn pay(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, order_id)): Path<(i64, i64)>,
    Json(payload): Json<Payment>,
) -> Result<Json<order_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let order = order::mark_paid(state.db(), restaurant_id, order_id, payload.pay_mode).await?;
    Ok(Json(order))
}

async fn unpay(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, order_id)): Path<(i64, i64)>,
) -> Result<Json<order_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(order::mark_unpaid(state.db(), restaurant_id, order_id).await?))
}

async fn change_pay_mode(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, order_id)): Path<(i64, i64)>,
    Json(payload): Json<Payment>,
) -> Result<Json<order_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let order =
        order::change_pay_mode(state.db(), restaurant_id, order_id, payload.pay_mode).await?;
    Ok(Json(order))
}
