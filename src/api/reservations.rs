//! Table reservation handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        access::{self, Permission},
        business_hours::BusinessHours,
        reservation::{self, NewReservation},
    },
    entities::{ReservationStatus, reservation as reservation_entity},
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/reservations", get(list).post(create))
        .route("/reservations/{reservation_id}", get(get_by_id))
        .route("/reservations/{reservation_id}/status", put(update_status))
}

#[derive(Debug, Deserialize)]
struct DateFilter {
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: ReservationStatus,
}

/// GET /reservations?date=YYYY-MM-DD - defaults to the current business date
async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Query(filter): Query<DateFilter>,
) -> Result<Json<Vec<reservation_entity::Model>>> {
    let restaurant = access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ManageReservations,
    )
    .await?;
    let date = match filter.date {
        Some(date) => date,
        None => BusinessHours::for_restaurant(&restaurant)?.current_business_date(),
    };
    Ok(Json(reservation::list_reservations(state.db(), &restaurant, date).await?))
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<NewReservation>,
) -> Result<Json<reservation_entity::Model>> {
    access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ManageReservations,
    )
    .await?;
    let booking =
        reservation::create_reservation(state.db(), restaurant_id, payload, Utc::now()).await?;
    Ok(Json(booking))
}

async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, reservation_id)): Path<(i64, i64)>,
) -> Result<Json<reservation_entity::Model>> {
    access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ManageReservations,
    )
    .await?;
    Ok(Json(
        reservation::get_reservation(state.db(), restaurant_id, reservation_id).await?,
    ))
}

async fn update_status(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, reservation_id)): Path<(i64, i64)>,
    Json(payload): Json<StatusChange>,
) -> Result<Json<reservation_entity::Model>> {
    access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ManageReservations,
    )
    .await?;
    let booking =
        reservation::update_status(state.db(), restaurant_id, reservation_id, payload.status)
            .await?;
    Ok(Json(booking))
}
