//! Coupon campaign handlers.

use super::{
    AppState, Caller,
    extract::{Json, Path},
};
use crate::{
    core::{
        access::{self, Permission},
        campaign::{self, CampaignUpdate, NewCampaign},
    },
    entities::campaign as campaign_entity,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    routing::get,
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/campaigns", get(list).post(create))
        .route(
            "/campaigns/{campaign_id}",
            get(get_by_id).patch(update).delete(delete),
        )
}

async fn authorize(state: &AppState, caller: &Caller, restaurant_id: i64) -> Result<()> {
    access::require_permission(
        state.db(),
        restaurant_id,
        &caller.user_id,
        Permission::ManageCampaigns,
    )
    .await?;
    Ok(())
}

async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
) -> Result<Json<Vec<campaign_entity::Model>>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(campaign::list_campaigns(state.db(), restaurant_id).await?))
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<NewCampaign>,
) -> Result<Json<campaign_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(campaign::create_campaign(state.db(), restaurant_id, payload).await?))
}

async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, campaign_id)): Path<(i64, i64)>,
) -> Result<Json<campaign_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    Ok(Json(campaign::get_campaign(state.db(), restaurant_id, campaign_id).await?))
}

async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, campaign_id)): Path<(i64, i64)>,
    Json(payload): Json<CampaignUpdate>,
) -> Result<Json<campaign_entity::Model>> {
    authorize(&state, &caller, restaurant_id).await?;
    let campaign =
        campaign::update_campaign(state.db(), restaurant_id, campaign_id, payload).await?;
    Ok(Json(campaign))
}

async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path((restaurant_id, campaign_id)): Path<(i64, i64)>,
) -> Result<Json<bool>> {
    authorize(&state, &caller, restaurant_id).await?;
    campaign::delete_campaign(state.db(), restaurant_id, campaign_id).await?;
    Ok(Json(true))
}
