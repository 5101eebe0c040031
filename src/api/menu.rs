//! Menu and recipe handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        access::{self, Permission},
        menu::{self, MenuItemUpdate},
    },
    entities::{menu_item, menu_item_ingredient},
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list).post(create))
        .route(
            "/menu/{menu_item_id}",
            get(get_by_id).patch(update).delete(delete),
        )
        .route("/menu/{menu_item_id}/recipe", get(recipe))
        .route(
            "/menu/{menu_item_id}/recipe/{inventory_item_id}",
            put(set_ingredient).delete(remove_ingredient),
        )
}

#[derive(Debug, Deserialize)]
struct MenuFilter {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateMenuItem {
    name: String,
    category: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct SetIngredient {
    quantity_per_unit: f64,
}

async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Query(filter): Query<MenuFilter>,
) -> Result<Json<Vec<menu_item::Model>>> {
    access::require_member(state.db(), restaurant_id, &caller.user_id).await?;
    let items = menu::list_menu_items(state.db(), restaurant_id, filter.category.as_deref()).await?;
    Ok(Json(items))
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<CreateMenuItem>,
) -> Result<Json<menu_item::Model>> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::ManageMenu)
        .await?;
    let item = menu::create_menu_item(
        state.db(),
        restaurant_id,
        &payload.name,
        &payload.category,
        payload.price,
    )
    .await?;
    Ok(Json(item))
}

async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, menu_item_id)): Path<(i64, i64)>,
) -> Result<Json<menu_item::Model>> {
    access::require_member(state.db(), restaurant_id, &caller.user_id).await?;
    Ok(Json(menu::get_menu_item(state.db(), restaurant_id, menu_item_id).await?))
}

async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, menu_item_id)): Path<(i64, i64)>,
    Json(payload): Json<MenuItemUpdate>,
) -> Result<Json<menu_item::Model>> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::ManageMenu)
        .await?;
    let item = menu::update_menu_item(state.db(), restaurant_id, menu_item_id, payload).await?;
    Ok(Json(item))
}

async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, menu_item_id)): Path<(i64, i64)>,
) -> Result<Json<menu_item::Model>> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::ManageMenu)
        .await?;
    Ok(Json(menu::delete_menu_item(state.db(), restaurant_id, menu_item_id).await?))
}

async fn recipe(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, menu_item_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<menu_item_ingredient::Model>>> {
    access::require_member(state.db(), restaurant_id, &caller.user_id).await?;
    menu::get_menu_item(state.db(), restaurant_id, menu_item_id).await?;
    Ok(Json(menu::get_recipe(state.db(), menu_item_id).await?))
}

async fn set_ingredient(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, menu_item_id, inventory_item_id)): Path<(i64, i64, i64)>,
    Json(payload): Json<SetIngredient>,
) -> Result<Json<menu_item_ingredient::Model>> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::ManageMenu)
        .await?;
    let line = menu::set_ingredient(
        state.db(),
        restaurant_id,
        menu_item_id,
        inventory_item_id,
        payload.quantity_per_unit,
    )
    .await?;
    Ok(Json(line))
}

async fn remove_ingredient(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, menu_item_id, inventory_item_id)): Path<(i64, i64, i64)>,
) -> Result<Json<bool>> {
    access::require_permission(state.db(), restaurant_id, &caller.user_id, Permission::ManageMenu)
        .await?;
    menu::remove_ingredient(state.db(), restaurant_id, menu_item_id, inventory_item_id).await?;
    Ok(Json(true))
}
