//! Reporting handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        access::{self, Permission},
        business_hours::BusinessHours,
        report::{self, DailySales},
    },
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new().route("/reports/daily-sales", get(daily_sales))
}

#[derive(Debug, Deserialize)]
struct ReportDate {
    date: Option<NaiveDate>,
}

/// GET /reports/daily-sales?date=YYYY-MM-DD - defaults to the current business date
async fn daily_sales(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<ReportDate>,
) -> Result<Json<DailySales>> {
    let restaurant = access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ViewReports,
    )
    .await?;
    let date = match query.date {
        Some(date) => date,
        None => BusinessHours::for_restaurant(&restaurant)?.current_business_date(),
    };
    Ok(Json(report::daily_sales(state.db(), &restaurant, date).await?))
}
