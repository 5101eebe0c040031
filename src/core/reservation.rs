//! Table reservations.

use crate::{
    core::{business_hours::BusinessHours, required_text, table},
    entities::{Reservation, ReservationStatus, reservation, restaurant},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// A table is held this long around a reservation.
pub const RESERVATION_SLOT_HOURS: i64 = 2;

/// Fields needed to book.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    pub table_id: Option<i64>,
    pub customer_name: String,
    pub phone: String,
    pub party_size: i32,
    pub reserved_for: DateTime<Utc>,
    pub notes: Option<String>,
}

impl ReservationStatus {
    /// Only booked reservations move, and only once.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Booked, Self::Seated | Self::Cancelled | Self::NoShow)
        )
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Seated => "seated",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }
}

/// Books a table (or just a party, when no table is given).
///
/// # Errors
/// - [`Error::Validation`] for an empty party, a time in the past, or a
///   party larger than the table
/// - [`Error::Conflict`] when the table is already held within two hours
pub async fn create_reservation(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: NewReservation,
    now: DateTime<Utc>,
) -> Result<reservation::Model> {
    let customer_name = required_text(&input.customer_name, "Customer name")?;
    let phone = required_text(&input.phone, "Phone")?;
    if input.party_size <= 0 {
        return Err(Error::validation("Party size must be at least 1"));
    }
    if input.reserved_for < now {
        return Err(Error::validation("Reservations cannot be made in the past"));
    }

    if let Some(table_id) = input.table_id {
        let table = table::get_table(db, restaurant_id, table_id).await?;
        if input.party_size > table.capacity {
            return Err(Error::validation(format!(
                "Party of {} does not fit table '{}' (seats {})",
                input.party_size, table.name, table.capacity
            )));
        }

        let slot = Duration::hours(RESERVATION_SLOT_HOURS);
        let clash = Reservation::find()
            .filter(reservation::Column::RestaurantId.eq(restaurant_id))
            .filter(reservation::Column::TableId.eq(table_id))
            .filter(
                reservation::Column::Status
                    .is_in([ReservationStatus::Booked, ReservationStatus::Seated]),
            )
            .filter(reservation::Column::ReservedFor.gt(input.reserved_for - slot))
            .filter(reservation::Column::ReservedFor.lt(input.reserved_for + slot))
            .one(db)
            .await?;
        if let Some(clash) = clash {
            return Err(Error::Conflict {
                message: format!(
                    "Table '{}' is already reserved at {}",
                    table.name, clash.reserved_for
                ),
            });
        }
    }

    let reservation = reservation::ActiveModel {
        restaurant_id: Set(restaurant_id),
        table_id: Set(input.table_id),
        customer_name: Set(customer_name),
        phone: Set(phone),
        party_size: Set(input.party_size),
        reserved_for: Set(input.reserved_for),
        status: Set(ReservationStatus::Booked),
        notes: Set(input.notes.filter(|n| !n.trim().is_empty())),
        created_at: Set(now),
        ..Default::default()
    };
    let reservation = reservation.insert(db).await?;
    tracing::info!(
        restaurant_id,
        reservation_id = reservation.id,
        party_size = reservation.party_size,
        "Reservation booked"
    );
    Ok(reservation)
}

/// Finds a reservation of the restaurant.
pub async fn get_reservation(
    db: &DatabaseConnection,
    restaurant_id: i64,
    reservation_id: i64,
) -> Result<reservation::Model> {
    Reservation::find_by_id(reservation_id)
        .filter(reservation::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Reservation", reservation_id))
}

/// Reservations falling on a business date, in time order.
pub async fn list_reservations(
    db: &DatabaseConnection,
    restaurant: &restaurant::Model,
    business_date: NaiveDate,
) -> Result<Vec<reservation::Model>> {
    let window = BusinessHours::for_restaurant(restaurant)?.window_for(business_date);
    Reservation::find()
        .filter(reservation::Column::RestaurantId.eq(restaurant.id))
        .filter(reservation::Column::ReservedFor.gte(window.start))
        .filter(reservation::Column::ReservedFor.lt(window.end))
        .order_by_asc(reservation::Column::ReservedFor)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Seats, cancels, or marks a booked reservation as a no-show.
pub async fn update_status(
    db: &DatabaseConnection,
    restaurant_id: i64,
    reservation_id: i64,
    status: ReservationStatus,
) -> Result<reservation::Model> {
    let existing = get_reservation(db, restaurant_id, reservation_id).await?;
    if !existing.status.can_transition_to(status) {
        return Err(Error::InvalidTransition {
            from: existing.status.label().to_string(),
            to: status.label().to_string(),
        });
    }

    let mut reservation: reservation::ActiveModel = existing.into();
    reservation.status = Set(status);
    let reservation = reservation.update(db).await?;
    tracing::info!(reservation_id, status = status.label(), "Reservation updated");
    Ok(reservation)
}
