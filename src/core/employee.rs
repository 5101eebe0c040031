//! Staff, attendance, and payroll.
//!
//! A shift is an attendance row; it is open while `clock_out` is empty.
//! Payroll only counts closed shifts, attributed to the business date their
//! clock-in falls on.

use crate::{
    core::{
        business_hours::BusinessHours, ensure_non_negative, required_text, round_currency,
    },
    entities::{Attendance, Employee, Role, attendance, employee, restaurant},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};

/// Fields needed to hire someone.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    /// Identity-provider subject, when the employee signs in
    pub user_id: Option<String>,
    pub role: Role,
    pub hourly_rate: f64,
}

/// Partial update of an employee.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub hourly_rate: Option<f64>,
}

/// Pay owed to an employee for a range of business dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payroll {
    pub employee_id: i64,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub shifts: usize,
    pub hours: f64,
    pub hourly_rate: f64,
    pub amount: f64,
}

fn ensure_assignable(role: Role) -> Result<()> {
    if role == Role::Owner {
        return Err(Error::validation(
            "The owner role belongs to the restaurant owner and cannot be assigned",
        ));
    }
    Ok(())
}

/// Adds an employee. A user can be employed at most once per restaurant.
pub async fn create_employee(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: NewEmployee,
) -> Result<employee::Model> {
    let name = required_text(&input.name, "Employee name")?;
    ensure_assignable(input.role)?;
    ensure_non_negative(input.hourly_rate)?;

    let user_id = match input.user_id.as_deref() {
        Some(user_id) => Some(required_text(user_id, "User id")?),
        None => None,
    };
    if let Some(user_id) = &user_id {
        let existing = Employee::find()
            .filter(employee::Column::RestaurantId.eq(restaurant_id))
            .filter(employee::Column::UserId.eq(user_id.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(Error::Conflict {
                message: format!("User '{user_id}' is already an employee"),
            });
        }
    }

    let employee = employee::ActiveModel {
        restaurant_id: Set(restaurant_id),
        user_id: Set(user_id),
        name: Set(name),
        role: Set(input.role),
        hourly_rate: Set(round_currency(input.hourly_rate)),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    employee.insert(db).await.map_err(Into::into)
}

/// Finds an employee of the restaurant.
pub async fn get_employee<C>(db: &C, restaurant_id: i64, employee_id: i64) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    Employee::find_by_id(employee_id)
        .filter(employee::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Employee", employee_id))
}

/// Employees ordered by name; deactivated ones only when asked for.
pub async fn list_employees(
    db: &DatabaseConnection,
    restaurant_id: i64,
    include_inactive: bool,
) -> Result<Vec<employee::Model>> {
    let mut query = Employee::find().filter(employee::Column::RestaurantId.eq(restaurant_id));
    if !include_inactive {
        query = query.filter(employee::Column::IsActive.eq(true));
    }
    query
        .order_by_asc(employee::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn update_employee(
    db: &DatabaseConnection,
    restaurant_id: i64,
    employee_id: i64,
    update: EmployeeUpdate,
) -> Result<employee::Model> {
    let existing = get_employee(db, restaurant_id, employee_id).await?;
    let mut employee: employee::ActiveModel = existing.into();

    if let Some(name) = update.name {
        employee.name = Set(required_text(&name, "Employee name")?);
    }
    if let Some(role) = update.role {
        ensure_assignable(role)?;
        employee.role = Set(role);
    }
    if let Some(rate) = update.hourly_rate {
        ensure_non_negative(rate)?;
        employee.hourly_rate = Set(round_currency(rate));
    }

    employee.update(db).await.map_err(Into::into)
}

/// Revokes an employee's access while keeping their attendance history.
pub async fn deactivate_employee(
    db: &DatabaseConnection,
    restaurant_id: i64,
    employee_id: i64,
) -> Result<employee::Model> {
    let existing = get_employee(db, restaurant_id, employee_id).await?;
    let mut employee: employee::ActiveModel = existing.into();
    employee.is_active = Set(false);
    let employee = employee.update(db).await?;
    tracing::info!(restaurant_id, employee_id, "Employee deactivated");
    Ok(employee)
}

async fn open_shift(db: &DatabaseConnection, employee_id: i64) -> Result<Option<attendance::Model>> {
    Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(employee_id))
        .filter(attendance::Column::ClockOut.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Starts a shift at `at`.
pub async fn clock_in(
    db: &DatabaseConnection,
    restaurant_id: i64,
    employee_id: i64,
    at: DateTime<Utc>,
) -> Result<attendance::Model> {
    let employee = get_employee(db, restaurant_id, employee_id).await?;
    if !employee.is_active {
        return Err(Error::validation(format!("{} is no longer active", employee.name)));
    }
    if open_shift(db, employee_id).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("{} is already clocked in", employee.name),
        });
    }

    let shift = attendance::ActiveModel {
        employee_id: Set(employee_id),
        restaurant_id: Set(restaurant_id),
        clock_in: Set(at),
        clock_out: Set(None),
        ..Default::default()
    };
    let shift = shift.insert(db).await?;
    tracing::info!(restaurant_id, employee_id, "Clocked in");
    Ok(shift)
}

/// Ends the open shift at `at`.
pub async fn clock_out(
    db: &DatabaseConnection,
    restaurant_id: i64,
    employee_id: i64,
    at: DateTime<Utc>,
) -> Result<attendance::Model> {
    let employee = get_employee(db, restaurant_id, employee_id).await?;
    let shift = open_shift(db, employee_id).await?.ok_or_else(|| Error::Conflict {
        message: format!("{} is not clocked in", employee.name),
    })?;
    if at < shift.clock_in {
        return Err(Error::validation("Clock-out cannot be before clock-in"));
    }

    let mut shift: attendance::ActiveModel = shift.into();
    shift.clock_out = Set(Some(at));
    let shift = shift.update(db).await?;
    tracing::info!(restaurant_id, employee_id, "Clocked out");
    Ok(shift)
}

/// Shifts of an employee that started within the business dates `from..=to`.
pub async fn list_attendance(
    db: &DatabaseConnection,
    restaurant: &restaurant::Model,
    employee_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<attendance::Model>> {
    if from > to {
        return Err(Error::validation("Range start must not be after its end"));
    }
    get_employee(db, restaurant.id, employee_id).await?;
    let window = BusinessHours::for_restaurant(restaurant)?.window_for_range(from, to);

    Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(employee_id))
        .filter(attendance::Column::ClockIn.gte(window.start))
        .filter(attendance::Column::ClockIn.lt(window.end))
        .order_by_asc(attendance::Column::ClockIn)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Pay for the closed shifts in `from..=to`: hours worked times the hourly rate.
#[allow(clippy::cast_precision_loss)]
pub async fn payroll(
    db: &DatabaseConnection,
    restaurant: &restaurant::Model,
    employee_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Payroll> {
    let employee = get_employee(db, restaurant.id, employee_id).await?;
    let shifts = list_attendance(db, restaurant, employee_id, from, to).await?;

    let closed: Vec<_> = shifts
        .iter()
        .filter_map(|s| s.clock_out.map(|out| out - s.clock_in))
        .collect();
    let seconds: i64 = closed.iter().map(chrono::TimeDelta::num_seconds).sum();
    let hours = seconds as f64 / 3600.0;

    Ok(Payroll {
        employee_id,
        from,
        to,
        shifts: closed.len(),
        hours: round_currency(hours),
        hourly_rate: employee.hourly_rate,
        amount: round_currency(hours * employee.hourly_rate),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn test_create_employee_rules() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;

        let owner = create_employee(
            &db,
            restaurant.id,
            NewEmployee {
                name: "Boss".to_string(),
                user_id: None,
                role: Role::Owner,
                hourly_rate: 0.0,
            },
        )
        .await;
        assert!(matches!(owner, Err(Error::Validation { .. })));

        create_test_employee(&db, restaurant.id, "u1", Role::Waiter).await?;
        let duplicate = create_test_employee(&db, restaurant.id, "u1", Role::Chef).await;
        assert!(matches!(duplicate, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_deactivate() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let employee = create_test_employee(&db, restaurant.id, "u2", Role::Waiter).await?;

        let promoted = update_employee(
            &db,
            restaurant.id,
            employee.id,
            EmployeeUpdate {
                role: Some(Role::Manager),
                hourly_rate: Some(22.0),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(promoted.role, Role::Manager);
        assert_eq!(promoted.hourly_rate, 22.0);

        deactivate_employee(&db, restaurant.id, employee.id).await?;
        assert!(list_employees(&db, restaurant.id, false).await?.is_empty());
        assert_eq!(list_employees(&db, restaurant.id, true).await?.len(), 1);

        let result = clock_in(&db, restaurant.id, employee.id, Utc::now()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_single_open_shift() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let employee = create_test_employee(&db, restaurant.id, "u3", Role::Chef).await?;
        let start = Utc::now();

        assert!(matches!(
            clock_out(&db, restaurant.id, employee.id, start).await,
            Err(Error::Conflict { .. })
        ));

        clock_in(&db, restaurant.id, employee.id, start).await?;
        assert!(matches!(
            clock_in(&db, restaurant.id, employee.id, start).await,
            Err(Error::Conflict { .. })
        ));
        assert!(matches!(
            clock_out(&db, restaurant.id, employee.id, start - Duration::minutes(1)).await,
            Err(Error::Validation { .. })
        ));

        let shift = clock_out(&db, restaurant.id, employee.id, start + Duration::hours(8)).await?;
        assert!(shift.clock_out.is_some());
        clock_in(&db, restaurant.id, employee.id, start + Duration::hours(9)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_payroll_counts_closed_shifts_in_range() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let employee = create_test_employee(&db, restaurant.id, "u4", Role::Cashier).await?;
        // Test restaurant opens 09:00 Asia/Kolkata, i.e. 03:30 UTC.
        let day = |d: u32, h: u32, m: u32| Utc.with_ymd_and_hms(2024, 6, d, h, m, 0).unwrap();

        clock_in(&db, restaurant.id, employee.id, day(3, 4, 0)).await?;
        clock_out(&db, restaurant.id, employee.id, day(3, 12, 30)).await?;
        // Clock-in at 02:00 local on the 5th belongs to business date the 4th.
        clock_in(&db, restaurant.id, employee.id, day(4, 20, 30)).await?;
        clock_out(&db, restaurant.id, employee.id, day(4, 22, 0)).await?;
        clock_in(&db, restaurant.id, employee.id, day(6, 4, 0)).await?;
        clock_out(&db, restaurant.id, employee.id, day(6, 6, 0)).await?;
        clock_in(&db, restaurant.id, employee.id, day(7, 4, 0)).await?;

        let from = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let pay = payroll(&db, &restaurant, employee.id, from, to).await?;
        assert_eq!(pay.shifts, 2);
        assert_eq!(pay.hours, 10.0);
        assert_eq!(pay.amount, 150.0);

        let open = payroll(&db, &restaurant, employee.id, to, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap()).await?;
        assert_eq!(open.shifts, 2);
        assert_eq!(open.hours, 3.5);

        let reversed = payroll(&db, &restaurant, employee.id, to, from).await;
        assert!(matches!(reversed, Err(Error::Validation { .. })));
        Ok(())
    }
}
