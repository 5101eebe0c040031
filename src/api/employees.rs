//! Staff, attendance and payroll handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        access::{self, Permission},
        employee::{self, EmployeeUpdate, NewEmployee, Payroll},
    },
    entities::{attendance, employee as employee_entity},
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list).post(create))
        .route("/employees/{employee_id}", get(get_by_id).patch(update))
        .route("/employees/{employee_id}/deactivate", post(deactivate))
        .route("/employees/{employee_id}/clock-in", post(clock_in))
        .route("/employees/{employee_id}/clock-out", post(clock_out))
        .route("/employees/{employee_id}/attendance", get(attendance))
        .route("/employees/{employee_id}/payroll", get(payroll))
}

#[derive(Debug, Deserialize)]
struct ListFilter {
    #[serde(default)]
    include_inactive: bool,
}

#[derive(Debug, Deserialize)]
struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

async fn authorize(
    state: &AppState,
    caller: &Caller,
    restaurant_id: i64,
) -> Result<crate::entities::restaurant::Model> {
    access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ManageEmployees,
    )
    .await
}

/// Employees may clock themselves in and out; anyone else needs `employees:manage`.
async fn authorize_self_or_manager(
    state: &AppState,
    caller: &Caller,
    restaurant_id: i64,
    employee_id: i64,
) -> Result<()> {
    access::require_member(state.db(), restaurant_id, &caller.user_id).await?;
    let target = employee::get_employee(state.db(), restaurant_id, employee_id).await?;
    if target.user_id.as_deref() == Some(caller.user_id.as_str()) {
        return Ok(());
    }
    authorize(state, caller, restaurant_id).await?;
    Ok(())
}

async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<employee_entity::Model>>> {
    authorize(&state, &caller, restaurant_id).await?;
    let staff =
        employee::list_employees(state.db(), restaurant_id, filter.include_inactive).await?;
    Ok(Json(staff))
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<NewEmployee>,
) -> Result<Json<employee_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(employee::create_employee(state.db(), restaurant_id, payload).await?))
}

async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, employee_id)): Path<(i64, i64)>,
) -> Result<Json<employee_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(employee::get_employee(state.db(), restaurant_id, employee_id).await?))
}

async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, employee_id)): Path<(i64, i64)>,
    Json(payload): Json<EmployeeUpdate>,
) -> Result<Json<employee_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let updated = employee::update_employee(state.db(), restaurant_id, employee_id, payload).await?;
    Ok(Json(updated))
}

async fn deactivate(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, employee_id)): Path<(i64, i64)>,
) -> Result<Json<employee_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let updated = employee::deactivate_employee(state.db(), restaurant_id, employee_id).await?;
    Ok(Json(updated))
}

async fn clock_in(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, employee_id)): Path<(i64, i64)>,
) -> Result<Json<attendance::Model>> {
    authorize_self_or_manager(&state, &caller, restaurant_id, employee_id).await?;
    let shift = employee::clock_in(state.db(), restaurant_id, employee_id, Utc::now()).await?;
    Ok(Json(shift))
}

async fn clock_out(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, employee_id)): Path<(i64, i64)>,
) -> Result<Json<attendance::Model>> {
    authorize_self_or_manager(&state, &caller, restaurant_id, employee_id).await?;
    let shift = employee::clock_out(state.db(), restaurant_id, employee_id, Utc::now()).await?;
    Ok(Json(shift))
}

/// GET /employees/{employee_id}/attendance?from=...&to=... (business dates, inclusive)
async fn attendance(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, employee_id)): Path<(i64, i64)>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<attendance::Model>>> {
    let restaurant = authorize(&state, &caller, restaurant_id).await?;
    let shifts =
        employee::list_attendance(state.db(), &restaurant, employee_id, range.from, range.to)
            .await?;
    Ok(Json(shifts))
}

async fn payroll(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, employee_id)): Path<(i64, i64)>,
    Query(range): Query<DateRange>,
) -> Result<Json<Payroll>> {
    let restaurant = authorize(&state, &caller, restaurant_id).await?;
    let pay =
        employee::payroll(state.db(), &restaurant, employee_id, range.from, range.to).await?;
    Ok(Json(pay))
}
