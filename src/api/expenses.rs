//! Expense handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        access::{self, Permission},
        expense::{self, NewExpense},
    },
    entities::expense as expense_entity,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::{delete, get},
};
use chrono::NaiveDate;
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list).post(create))
        .route("/expenses/{expense_id}", delete(remove))
}

#[derive(Debug, Deserialize)]
struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

async fn authorize(state: &AppState, caller: &Caller, restaurant_id: i64) -> Result<()> {
    access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ManageExpenses,
    )
    .await?;
    Ok(())
}

async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<expense_entity::Model>>> {
    authorize(&state, &caller, restaurant_id).await?;
    let expenses = expense::list_expenses(state.db(), restaurant_id, range.from, range.to).await?;
    Ok(Json(expenses))
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<NewExpense>,
) -> Result<Json<expense_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(expense::create_expense(state.db(), restaurant_id, payload).await?))
}

async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, expense_id)): Path<(i64, i64)>,
) -> Result<Json<bool>> {
    authorize(&state, &caller, restaurant_id).await?;
    expense::delete_expense(state.db(), restaurant_id, expense_id).await?;
    Ok(Json(true))
}
