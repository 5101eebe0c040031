//! Restaurant handlers: registration, listing, and settings.

use super::{
    AppState, Caller,
    extract::{Json, Path},
};
use crate::{
    core::{
        access::{self, Permission},
        business_hours::BusinessHours,
        restaurant::{self, RestaurantSettings},
    },
    entities::restaurant as restaurant_entity,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/restaurants", get(list).post(create))
        .route("/api/restaurants/{restaurant_id}", get(get_by_id).patch(update))
}

#[derive(Debug, Deserialize)]
struct CreateRestaurant {
    name: String,
    timezone: String,
    opening_time: String,
    closing_time: String,
}

/// A restaurant with its business-hours state right now.
#[derive(Debug, Serialize)]
struct RestaurantView {
    #[serde(flatten)]
    restaurant: restaurant_entity::Model,
    business_date: NaiveDate,
    is_open: bool,
}

impl RestaurantView {
    fn new(restaurant: restaurant_entity::Model) -> Result<Self> {
        let hours = BusinessHours::for_restaurant(&restaurant)?;
        let now = Utc::now();
        Ok(Self {
            business_date: hours.business_date_at(now),
            is_open: hours.is_open_at(now),
            restaurant,
        })
    }
}

/// GET /api/restaurants - restaurants the caller owns or works at
async fn list(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<restaurant_entity::Model>>> {
    Ok(Json(
        restaurant::list_restaurants_for_user(state.db(), &caller.user_id).await?,
    ))
}

/// POST /api/restaurants - the caller becomes the owner
async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateRestaurant>,
) -> Result<Json<RestaurantView>> {
    let restaurant = restaurant::create_restaurant(
        state.db(),
        &payload.name,
        &caller.user_id,
        &payload.timezone,
        &payload.opening_time,
        &payload.closing_time,
    )
    .await?;
    Ok(Json(RestaurantView::new(restaurant)?))
}

/// GET /api/restaurants/{restaurant_id}
async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
) -> Result<Json<RestaurantView>> {
    let restaurant = access::require_member(state.db(), restaurant_id, &caller.user_id).await?;
    Ok(Json(RestaurantView::new(restaurant)?))
}

/// PATCH /api/restaurants/{restaurant_id}
async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<RestaurantSettings>,
) -> Result<Json<RestaurantView>> {
    access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ManageRestaurant,
    )
    .await?;
    let restaurant = restaurant::update_settings(state.db(), restaurant_id, payload).await?;
    Ok(Json(RestaurantView::new(restaurant)?))
}
