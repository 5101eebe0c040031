//! Dining table handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path},
};
use crate::{
    core::{
        access::{self, Permission},
        table,
    },
    entities::dining_table,
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
        .route("/tables", get(list).post(create))
        .route("/tables/{table_id}", get(get_by_id).patch(update).delete(delete))
}

#[derive(Debug, Deserialize)]
struct CreateTable {
    name: String,
    capacity: i32,
}

#[derive(Debug, Deserialize)]
struct UpdateTable {
    name: Option<String>,
    capacity: Option<i32>,
}

/// GET /tables
async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
) -> Result<Json<Vec<dining_table::Model>>> {
    access::require_member(state.db(), restaurant_id, &caller.user_id).await?;
    Ok(Json(table::list_tables(state.db(), restaurant_id).await?))
}

/// POST /tables
async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<CreateTable>,
) -> Result<Json<dining_table::Model>> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::ManageTables)
        .await?;
    let table = table::create_table(state.db(), restaurant_id, &payload.name, payload.capacity).await?;
    Ok(Json(table))
}

/// GET /tables/{table_id}
async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, table_id)): Path<(i64, i64)>,
) -> Result<Json<dining_table::Model>> {
    access::require_member(state.db(), restaurant_id, &caller.user_id).await?;
    Ok(Json(table::get_table(state.db(), restaurant_id, table_id).await?))
}

/// PATCH /tables/{table_id}
async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, table_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateTable>,
) -> Result<Json<dining_table::Model>> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::ManageTables)
        .await?;
    let table =
        table::update_table(state.db(), restaurant_id, table_id, payload.name, payload.capacity)
            .await?;
    Ok(Json(table))
}

/// DELETE /tables/{table_id} (soft delete)
async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, table_id)): Path<(i64, i64)>,
) -> Result<Json<dining_table::Model>> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::ManageTables)
        .await?;
    Ok(Json(table::delete_table(state.db(), restaurant_id, table_id).await?))
}
