//! Coupon campaigns.
//!
//! A campaign is a percentage discount behind a code, valid in the half-open
//! window `[starts_at, ends_at)` for a limited number of uses.

use crate::{
    core::{ensure_non_negative, required_text, round_currency},
    entities::{Campaign, campaign},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Deserialize;

/// Fields needed to create a campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCampaign {
    pub code: String,
    pub discount_percent: f64,
    pub max_discount: Option<f64>,
    pub remaining_uses: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Partial update of a campaign. The code cannot be changed.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CampaignUpdate {
    pub discount_percent: Option<f64>,
    pub max_discount: Option<f64>,
    /// Removes the discount cap; wins over `max_discount`
    #[serde(default)]
    pub clear_max_discount: bool,
    pub remaining_uses: Option<i32>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

fn normalize_code(code: &str) -> Result<String> {
    let code = required_text(code, "Coupon code")?.to_uppercase();
    if code.chars().any(char::is_whitespace) {
        return Err(Error::validation("Coupon code cannot contain spaces"));
    }
    Ok(code)
}

fn validate_percent(percent: f64) -> Result<()> {
    if !percent.is_finite() || percent <= 0.0 || percent > 100.0 {
        return Err(Error::validation(format!(
            "Discount percent must be in (0, 100], got {percent}"
        )));
    }
    Ok(())
}

fn validate_uses(uses: i32) -> Result<()> {
    if uses < 0 {
        return Err(Error::validation("Remaining uses cannot be negative"));
    }
    Ok(())
}

/// Creates a campaign. Codes are stored upper-case and unique per restaurant.
pub async fn create_campaign(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: NewCampaign,
) -> Result<campaign::Model> {
    let code = normalize_code(&input.code)?;
    validate_percent(input.discount_percent)?;
    if let Some(cap) = input.max_discount {
        ensure_non_negative(cap)?;
    }
    validate_uses(input.remaining_uses)?;
    if input.starts_at >= input.ends_at {
        return Err(Error::validation("Campaign must end after it starts"));
    }

    let existing = Campaign::find()
        .filter(campaign::Column::RestaurantId.eq(restaurant_id))
        .filter(campaign::Column::Code.eq(code.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict {
            message: format!("Coupon code '{code}' already exists"),
        });
    }

    let campaign = campaign::ActiveModel {
        restaurant_id: Set(restaurant_id),
        code: Set(code),
        discount_percent: Set(input.discount_percent),
        max_discount: Set(input.max_discount.map(round_currency)),
        remaining_uses: Set(input.remaining_uses),
        starts_at: Set(input.starts_at),
        ends_at: Set(input.ends_at),
        is_active: Set(true),
        ..Default::default()
    };
    campaign.insert(db).await.map_err(Into::into)
}

/// Finds a campaign of the restaurant by id.
pub async fn get_campaign<C>(db: &C, restaurant_id: i64, campaign_id: i64) -> Result<campaign::Model>
where
    C: ConnectionTrait,
{
    Campaign::find_by_id(campaign_id)
        .filter(campaign::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Campaign", campaign_id))
}

pub async fn list_campaigns(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<campaign::Model>> {
    Campaign::find()
        .filter(campaign::Column::RestaurantId.eq(restaurant_id))
        .order_by_desc(campaign::Column::StartsAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates a campaign.
pub async fn update_campaign(
    db: &DatabaseConnection,
    restaurant_id: i64,
    campaign_id: i64,
    update: CampaignUpdate,
) -> Result<campaign::Model> {
    let existing = get_campaign(db, restaurant_id, campaign_id).await?;
    let starts_at = existing.starts_at;
    let mut campaign: campaign::ActiveModel = existing.into();

    if let Some(percent) = update.discount_percent {
        validate_percent(percent)?;
        campaign.discount_percent = Set(percent);
    }
    if update.clear_max_discount {
        campaign.max_discount = Set(None);
    } else if let Some(cap) = update.max_discount {
        ensure_non_negative(cap)?;
        campaign.max_discount = Set(Some(round_currency(cap)));
    }
    if let Some(uses) = update.remaining_uses {
        validate_uses(uses)?;
        campaign.remaining_uses = Set(uses);
    }
    if let Some(ends_at) = update.ends_at {
        if ends_at <= starts_at {
            return Err(Error::validation("Campaign must end after it starts"));
        }
        campaign.ends_at = Set(ends_at);
    }
    if let Some(is_active) = update.is_active {
        campaign.is_active = Set(is_active);
    }

    campaign.update(db).await.map_err(Into::into)
}

/// Deletes a campaign. Orders that used it keep their discount amount.
pub async fn delete_campaign(
    db: &DatabaseConnection,
    restaurant_id: i64,
    campaign_id: i64,
) -> Result<()> {
    let campaign = get_campaign(db, restaurant_id, campaign_id).await?;
    campaign.delete(db).await?;
    Ok(())
}

/// Discount a campaign grants on `subtotal`, capped by `max_discount`.
#[must_use]
pub fn discount_for(campaign: &campaign::Model, subtotal: f64) -> f64 {
    let discount = subtotal * campaign.discount_percent / 100.0;
    let discount = campaign
        .max_discount
        .map_or(discount, |cap| discount.min(cap));
    round_currency(discount.clamp(0.0, subtotal.max(0.0)))
}

/// Uses up one redemption of the coupon `code`.
///
/// The decrement is a single conditional update guarded by
/// `remaining_uses > 0`, so two tills racing for the last use cannot both win.
///
/// # Errors
/// [`Error::CouponUnavailable`] if the code is unknown, inactive, outside its
/// validity window, or used up.
pub async fn redeem<C>(
    db: &C,
    restaurant_id: i64,
    code: &str,
    now: DateTime<Utc>,
) -> Result<campaign::Model>
where
    C: ConnectionTrait,
{
    let code = normalize_code(code)?;
    let unavailable = |reason: &str| Error::CouponUnavailable {
        code: code.clone(),
        reason: reason.to_string(),
    };

    let campaign = Campaign::find()
        .filter(campaign::Column::RestaurantId.eq(restaurant_id))
        .filter(campaign::Column::Code.eq(code.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| unavailable("unknown code"))?;

    if !campaign.is_active {
        return Err(unavailable("campaign is inactive"));
    }
    if now < campaign.starts_at {
        return Err(unavailable("campaign has not started"));
    }
    if now >= campaign.ends_at {
        return Err(unavailable("campaign has ended"));
    }

    let result = Campaign::update_many()
        .col_expr(
            campaign::Column::RemainingUses,
            Expr::col(campaign::Column::RemainingUses).sub(1),
        )
        .filter(campaign::Column::Id.eq(campaign.id))
        .filter(campaign::Column::RemainingUses.gt(0))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        tracing::warn!(campaign_id = campaign.id, "Coupon '{}' is used up", code);
        return Err(unavailable("no uses left"));
    }

    get_campaign(db, restaurant_id, campaign.id).await
}

/// Gives one use back to a campaign, e.g. when its discount is replaced.
///
/// A campaign that was deleted in the meantime is ignored.
pub async fn release<C>(db: &C, campaign_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Campaign::update_many()
        .col_expr(
            campaign::Column::RemainingUses,
            Expr::col(campaign::Column::RemainingUses).add(1),
        )
        .filter(campaign::Column::Id.eq(campaign_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        tracing::debug!(campaign_id, "Released coupon belongs to a deleted campaign");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::{Duration, TimeZone};

    fn sample(code: &str, uses: i32) -> NewCampaign {
        let now = Utc::now();
        NewCampaign {
            code: code.to_string(),
            discount_percent: 10.0,
            max_discount: None,
            remaining_uses: uses,
            starts_at: now - Duration::days(1),
            ends_at: now + Duration::days(1),
        }
    }

    #[test]
    fn test_discount_for_respects_cap() {
        let campaign = campaign::Model {
            id: 1,
            restaurant_id: 1,
            code: "TEN".to_string(),
            discount_percent: 10.0,
            max_discount: Some(15.0),
            remaining_uses: 1,
            starts_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            is_active: true,
        };
        assert_eq!(discount_for(&campaign, 80.0), 8.0);
        assert_eq!(discount_for(&campaign, 500.0), 15.0);
        assert_eq!(discount_for(&campaign, 0.0), 0.0);
    }

    #[tokio::test]
    async fn test_create_campaign_validation() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;

        let mut bad = sample("X", 1);
        bad.discount_percent = 120.0;
        assert!(matches!(
            create_campaign(&db, restaurant.id, bad).await,
            Err(Error::Validation { .. })
        ));

        let mut bad = sample("X", 1);
        bad.ends_at = bad.starts_at;
        assert!(matches!(
            create_campaign(&db, restaurant.id, bad).await,
            Err(Error::Validation { .. })
        ));

        let created = create_campaign(&db, restaurant.id, sample("diwali10", 1)).await?;
        assert_eq!(created.code, "DIWALI10");
        assert!(matches!(
            create_campaign(&db, restaurant.id, sample("Diwali10", 1)).await,
            Err(Error::Conflict { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_uses_up_coupon() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let campaign = create_campaign(&db, restaurant.id, sample("ONCE", 1)).await?;

        let redeemed = redeem(&db, restaurant.id, "once", Utc::now()).await?;
        assert_eq!(redeemed.remaining_uses, 0);

        let again = redeem(&db, restaurant.id, "ONCE", Utc::now()).await;
        assert!(matches!(again, Err(Error::CouponUnavailable { .. })));

        release(&db, campaign.id).await?;
        let restored = get_campaign(&db, restaurant.id, campaign.id).await?;
        assert_eq!(restored.remaining_uses, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_checks_window_and_state() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let campaign = create_campaign(&db, restaurant.id, sample("WINDOW", 5)).await?;

        let early = redeem(&db, restaurant.id, "WINDOW", campaign.starts_at - Duration::seconds(1)).await;
        assert!(matches!(early, Err(Error::CouponUnavailable { .. })));

        let at_end = redeem(&db, restaurant.id, "WINDOW", campaign.ends_at).await;
        assert!(matches!(at_end, Err(Error::CouponUnavailable { .. })));

        update_campaign(
            &db,
            restaurant.id,
            campaign.id,
            CampaignUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;
        let inactive = redeem(&db, restaurant.id, "WINDOW", Utc::now()).await;
        assert!(matches!(inactive, Err(Error::CouponUnavailable { .. })));

        let unknown = redeem(&db, restaurant.id, "NOPE", Utc::now()).await;
        assert!(matches!(unknown, Err(Error::CouponUnavailable { .. })));

        let unchanged = get_campaign(&db, restaurant.id, campaign.id).await?;
        assert_eq!(unchanged.remaining_uses, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_release_of_deleted_campaign_is_ignored() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let campaign = create_campaign(&db, restaurant.id, sample("GONE", 1)).await?;
        delete_campaign(&db, restaurant.id, campaign.id).await?;

        release(&db, campaign.id).await?;
        assert!(list_campaigns(&db, restaurant.id).await?.is_empty());
        Ok(())
    }
}
