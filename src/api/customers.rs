//! Customer and loyalty handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        access::{self, Permission},
        loyalty,
    },
    entities::{customer, loyalty_transaction},
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::get,
};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list).post(create))
        .route(
            "/customers/{customer_id}",
            get(get_by_id).patch(update).delete(delete),
        )
        .route("/customers/{customer_id}/loyalty", get(history))
}

#[derive(Debug, Deserialize)]
struct CustomerLookup {
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateCustomer {
    name: String,
    phone: String,
}

#[derive(Debug, Deserialize)]
struct UpdateCustomer {
    name: Option<String>,
    phone: Option<String>,
}

async fn authorize(state: &AppState, caller: &Caller, restaurant_id: i64) -> Result<()> {
    access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ManageCustomers,
    )
    .await?;
    Ok(())
}

/// GET /customers?phone=... - a phone lookup yields at most one customer
async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Query(lookup): Query<CustomerLookup>,
) -> Result<Json<Vec<customer::Model>>> {
    authorize(&state, &caller, restaurant_id).await?;
    let customers = match lookup.phone {
        Some(phone) => loyalty::find_by_phone(state.db(), restaurant_id, &phone)
            .await?
            .into_iter()
            .collect(),
        None => loyalty::list_customers(state.db(), restaurant_id).await?,
    };
    Ok(Json(customers))
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<CreateCustomer>,
) -> Result<Json<customer::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let customer =
        loyalty::create_customer(state.db(), restaurant_id, &payload.name, &payload.phone).await?;
    Ok(Json(customer))
}

async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, customer_id)): Path<(i64, i64)>,
) -> Result<Json<customer::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(loyalty::get_customer(state.db(), restaurant_id, customer_id).await?))
}

async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, customer_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateCustomer>,
) -> Result<Json<customer::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let customer = loyalty::update_customer(
        state.db(),
        restaurant_id,
        customer_id,
        payload.name,
        payload.phone,
    )
    .await?;
    Ok(Json(customer))
}

async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, customer_id)): Path<(i64, i64)>,
) -> Result<Json<bool>> {
    authorize(&state, &caller, restaurant_id).await?;
    loyalty::delete_customer(state.db(), restaurant_id, customer_id).await?;
    Ok(Json(true))
}

async fn history(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, customer_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<loyalty_transaction::Model>>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(loyalty::history(state.db(), restaurant_id, customer_id).await?))
}
