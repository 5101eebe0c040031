//! Restaurant business logic - tenant registration, settings, and order serials.

use crate::{
    config::settings::RestaurantSeed,
    core::{business_hours::BusinessHours, required_text, table},
    entities::{Employee, Restaurant, employee, restaurant},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;

/// Settings that may be changed after registration. Absent fields are left as-is.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RestaurantSettings {
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
}

/// Registers a restaurant owned by `owner_user_id`.
///
/// The timezone and opening hours are validated before anything is written.
pub async fn create_restaurant<C>(
    db: &C,
    name: &str,
    owner_user_id: &str,
    timezone: &str,
    opening_time: &str,
    closing_time: &str,
) -> Result<restaurant::Model>
where
    C: ConnectionTrait,
{
    let name = required_text(name, "Restaurant name")?;
    let owner_user_id = required_text(owner_user_id, "Owner")?;
    BusinessHours::parse(timezone, opening_time, closing_time)?;

    let restaurant = restaurant::ActiveModel {
        name: Set(name),
        owner_user_id: Set(owner_user_id),
        timezone: Set(timezone.trim().to_string()),
        opening_time: Set(opening_time.trim().to_string()),
        closing_time: Set(closing_time.trim().to_string()),
        next_order_serial: Set(1),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let restaurant = restaurant.insert(db).await?;
    tracing::info!(restaurant_id = restaurant.id, "Restaurant registered");
    Ok(restaurant)
}

/// Finds a restaurant by id.
pub async fn get_restaurant<C>(db: &C, restaurant_id: i64) -> Result<restaurant::Model>
where
    C: ConnectionTrait,
{
    Restaurant::find_by_id(restaurant_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Restaurant", restaurant_id))
}

/// Restaurants the user owns or works at (active employment only), ordered by name.
pub async fn list_restaurants_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<restaurant::Model>> {
    let employed_at: Vec<i64> = Employee::find()
        .filter(employee::Column::UserId.eq(user_id))
        .filter(employee::Column::IsActive.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(|e| e.restaurant_id)
        .collect();

    Restaurant::find()
        .filter(
            restaurant::Column::OwnerUserId
                .eq(user_id)
                .or(restaurant::Column::Id.is_in(employed_at)),
        )
        .order_by_asc(restaurant::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies new settings after validating the resulting business hours.
pub async fn update_settings(
    db: &DatabaseConnection,
    restaurant_id: i64,
    settings: RestaurantSettings,
) -> Result<restaurant::Model> {
    let current = get_restaurant(db, restaurant_id).await?;

    let timezone = settings.timezone.unwrap_or_else(|| current.timezone.clone());
    let opening_time = settings
        .opening_time
        .unwrap_or_else(|| current.opening_time.clone());
    let closing_time = settings
        .closing_time
        .unwrap_or_else(|| current.closing_time.clone());
    BusinessHours::parse(&timezone, &opening_time, &closing_time)?;

    let mut restaurant: restaurant::ActiveModel = current.into();
    if let Some(name) = settings.name {
        restaurant.name = Set(required_text(&name, "Restaurant name")?);
    }
    restaurant.timezone = Set(timezone.trim().to_string());
    restaurant.opening_time = Set(opening_time.trim().to_string());
    restaurant.closing_time = Set(closing_time.trim().to_string());

    restaurant.update(db).await.map_err(Into::into)
}

/// Hands out the next order serial number of the restaurant.
///
/// The counter is bumped with a single `UPDATE ... SET next_order_serial =
/// next_order_serial + 1`, so run this inside the transaction that inserts the
/// order.
pub async fn next_order_serial<C>(db: &C, restaurant_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let result = Restaurant::update_many()
        .col_expr(
            restaurant::Column::NextOrderSerial,
            Expr::col(restaurant::Column::NextOrderSerial).add(1),
        )
        .filter(restaurant::Column::Id.eq(restaurant_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found("Restaurant", restaurant_id));
    }

    let restaurant = get_restaurant(db, restaurant_id).await?;
    Ok(restaurant.next_order_serial - 1)
}

/// Creates the configured restaurants that do not exist yet, with their tables.
///
/// Returns the number of restaurants created.
pub async fn seed_restaurants(db: &DatabaseConnection, seeds: &[RestaurantSeed]) -> Result<usize> {
    let mut created = 0;
    for seed in seeds {
        let existing = Restaurant::find()
            .filter(restaurant::Column::Name.eq(seed.name.trim()))
            .one(db)
            .await?;
        if existing.is_some() {
            tracing::debug!("Restaurant '{}' already present, skipping seed", seed.name);
            continue;
        }

        let txn = db.begin().await?;
        let restaurant = create_restaurant(
            &txn,
            &seed.name,
            &seed.owner_user_id,
            &seed.timezone,
            &seed.opening_time,
            &seed.closing_time,
        )
        .await?;
        for number in 1..=seed.tables {
            table::insert_table(&txn, restaurant.id, &format!("T{number}"), seed.table_capacity)
                .await?;
        }
        txn.commit().await?;

        tracing::info!(
            restaurant_id = restaurant.id,
            tables = seed.tables,
            "Seeded restaurant '{}'",
            restaurant.name
        );
        created += 1;
    }
    Ok(created)
}
