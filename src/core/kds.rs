//! Kitchen display system.
//!
//! Each checked-out order gets one ticket with a line per order item. Cooks
//! move lines through a small state machine:
//!
//! ```text
//! Pending ──accept──> Preparing ──ready──> Ready
//!    │                    │
//!    └──────reject────────┴──────> Rejected
//! ```
//!
//! The ticket's own status is never set directly; it is recomputed from its
//! lines after every change.

use crate::{
    entities::{KdsOrder, KdsOrderItem, KdsStatus, kds_order, kds_order_item, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;

impl KdsStatus {
    /// Whether a line may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Preparing | Self::Rejected)
                | (Self::Preparing, Self::Ready | Self::Rejected)
        )
    }

    /// Tri-state acceptance flag: `None` while undecided, then whether the
    /// kitchen took the line.
    #[must_use]
    pub const fn accepted(self) -> Option<bool> {
        match self {
            Self::Pending => None,
            Self::Preparing | Self::Ready => Some(true),
            Self::Rejected => Some(false),
        }
    }

    /// Ready and Rejected lines never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Rejected)
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Rejected => "rejected",
        }
    }
}

/// Status of a ticket given the statuses of its lines.
///
/// All rejected gives Rejected. All finished with at least one ready gives
/// Ready. Any line accepted so far gives Preparing. Otherwise Pending.
#[must_use]
pub fn aggregate_status(items: &[KdsStatus]) -> KdsStatus {
    if items.is_empty() {
        return KdsStatus::Pending;
    }
    if items.iter().all(|s| *s == KdsStatus::Rejected) {
        return KdsStatus::Rejected;
    }
    if items.iter().all(|s| s.is_terminal()) {
        return KdsStatus::Ready;
    }
    if items
        .iter()
        .any(|s| matches!(s, KdsStatus::Preparing | KdsStatus::Ready))
    {
        return KdsStatus::Preparing;
    }
    KdsStatus::Pending
}

/// A ticket line as shown on the kitchen screen.
#[derive(Debug, Clone, Serialize)]
pub struct KdsTicketItem {
    #[serde(flatten)]
    pub item: kds_order_item::Model,
    pub accepted: Option<bool>,
}

/// A ticket with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct KdsTicket {
    #[serde(flatten)]
    pub ticket: kds_order::Model,
    pub items: Vec<KdsTicketItem>,
}

impl KdsTicket {
    fn new(ticket: kds_order::Model, items: Vec<kds_order_item::Model>) -> Self {
        let items = items
            .into_iter()
            .map(|item| KdsTicketItem {
                accepted: item.status.accepted(),
                item,
            })
            .collect();
        Self { ticket, items }
    }
}

/// Opens a ticket for a freshly created order, every line Pending.
pub async fn create_ticket<C>(
    db: &C,
    order: &order::Model,
    items: &[order_item::Model],
) -> Result<kds_order::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    let ticket = kds_order::ActiveModel {
        restaurant_id: Set(order.restaurant_id),
        order_id: Set(order.id),
        serial_number: Set(order.serial_number),
        status: Set(KdsStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for item in items {
        kds_order_item::ActiveModel {
            kds_order_id: Set(ticket.id),
            order_item_id: Set(item.id),
            name: Set(item.name.clone()),
            quantity: Set(item.quantity),
            status: Set(KdsStatus::Pending),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(ticket)
}

async fn ticket_items<C>(db: &C, kds_order_id: i64) -> Result<Vec<kds_order_item::Model>>
where
    C: ConnectionTrait,
{
    KdsOrderItem::find()
        .filter(kds_order_item::Column::KdsOrderId.eq(kds_order_id))
        .order_by_asc(kds_order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_ticket<C>(db: &C, restaurant_id: i64, kds_order_id: i64) -> Result<kds_order::Model>
where
    C: ConnectionTrait,
{
    KdsOrder::find_by_id(kds_order_id)
        .filter(kds_order::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("KDS order", kds_order_id))
}

/// A ticket with its lines.
pub async fn get_ticket(
    db: &DatabaseConnection,
    restaurant_id: i64,
    kds_order_id: i64,
) -> Result<KdsTicket> {
    let ticket = find_ticket(db, restaurant_id, kds_order_id).await?;
    let items = ticket_items(db, ticket.id).await?;
    Ok(KdsTicket::new(ticket, items))
}

/// The ticket of an order.
pub async fn ticket_for_order(
    db: &DatabaseConnection,
    restaurant_id: i64,
    order_id: i64,
) -> Result<KdsTicket> {
    let ticket = KdsOrder::find()
        .filter(kds_order::Column::RestaurantId.eq(restaurant_id))
        .filter(kds_order::Column::OrderId.eq(order_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "KDS order for order",
            id: order_id.to_string(),
        })?;
    let items = ticket_items(db, ticket.id).await?;
    Ok(KdsTicket::new(ticket, items))
}

/// Tickets the kitchen still has to work on, oldest first.
pub async fn active_tickets(db: &DatabaseConnection, restaurant_id: i64) -> Result<Vec<KdsTicket>> {
    let tickets = KdsOrder::find()
        .filter(kds_order::Column::RestaurantId.eq(restaurant_id))
        .filter(kds_order::Column::Status.is_in([KdsStatus::Pending, KdsStatus::Preparing]))
        .order_by_asc(kds_order::Column::CreatedAt)
        .order_by_asc(kds_order::Column::Id)
        .find_with_related(KdsOrderItem)
        .all(db)
        .await?;

    Ok(tickets
        .into_iter()
        .map(|(ticket, mut items)| {
            items.sort_by_key(|i| i.id);
            KdsTicket::new(ticket, items)
        })
        .collect())
}

async fn refresh_ticket_status<C>(db: &C, ticket: kds_order::Model) -> Result<KdsTicket>
where
    C: ConnectionTrait,
{
    let items = ticket_items(db, ticket.id).await?;
    let statuses: Vec<KdsStatus> = items.iter().map(|i| i.status).collect();
    let status = aggregate_status(&statuses);

    let ticket = if status == ticket.status {
        ticket
    } else {
        let ticket_id = ticket.id;
        let mut active: kds_order::ActiveModel = ticket.into();
        active.status = Set(status);
        active.updated_at = Set(chrono::Utc::now());
        let ticket = active.update(db).await?;
        tracing::info!(kds_order_id = ticket_id, status = status.label(), "KDS ticket status changed");
        ticket
    };
    Ok(KdsTicket::new(ticket, items))
}

/// Moves one ticket line to `status` and returns the refreshed ticket.
///
/// # Errors
/// [`Error::InvalidTransition`] if the move is not allowed from the line's
/// current status.
pub async fn set_item_status(
    db: &DatabaseConnection,
    restaurant_id: i64,
    kds_item_id: i64,
    status: KdsStatus,
) -> Result<KdsTicket> {
    let txn = db.begin().await?;

    let item = KdsOrderItem::find_by_id(kds_item_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("KDS item", kds_item_id))?;
    // A line whose ticket is in another restaurant does not exist here.
    let ticket = find_ticket(&txn, restaurant_id, item.kds_order_id)
        .await
        .map_err(|err| match err {
            Error::NotFound { .. } => Error::not_found("KDS item", kds_item_id),
            other => other,
        })?;

    if !item.status.can_transition_to(status) {
        tracing::warn!(
            kds_item_id,
            from = item.status.label(),
            to = status.label(),
            "Rejected KDS transition"
        );
        return Err(Error::InvalidTransition {
            from: item.status.label().to_string(),
            to: status.label().to_string(),
        });
    }

    let mut active: kds_order_item::ActiveModel = item.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&txn).await?;

    let ticket = refresh_ticket_status(&txn, ticket).await?;
    txn.commit().await?;
    Ok(ticket)
}

/// Kitchen takes the line: Pending → Preparing.
pub async fn accept_item(db: &DatabaseConnection, restaurant_id: i64, kds_item_id: i64) -> Result<KdsTicket> {
    set_item_status(db, restaurant_id, kds_item_id, KdsStatus::Preparing).await
}

/// Kitchen refuses the line.
pub async fn reject_item(db: &DatabaseConnection, restaurant_id: i64, kds_item_id: i64) -> Result<KdsTicket> {
    set_item_status(db, restaurant_id, kds_item_id, KdsStatus::Rejected).await
}

/// Line is cooked: Preparing → Ready.
pub async fn mark_item_ready(
    db: &DatabaseConnection,
    restaurant_id: i64,
    kds_item_id: i64,
) -> Result<KdsTicket> {
    set_item_status(db, restaurant_id, kds_item_id, KdsStatus::Ready).await
}

async fn move_pending_items(
    db: &DatabaseConnection,
    restaurant_id: i64,
    kds_order_id: i64,
    status: KdsStatus,
) -> Result<KdsTicket> {
    let txn = db.begin().await?;
    let ticket = find_ticket(&txn, restaurant_id, kds_order_id).await?;

    KdsOrderItem::update_many()
        .col_expr(kds_order_item::Column::Status, Expr::value(status))
        .col_expr(kds_order_item::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(kds_order_item::Column::KdsOrderId.eq(kds_order_id))
        .filter(kds_order_item::Column::Status.eq(KdsStatus::Pending))
        .exec(&txn)
        .await?;

    let ticket = refresh_ticket_status(&txn, ticket).await?;
    txn.commit().await?;
    Ok(ticket)
}

/// Accepts every Pending line of a ticket.
pub async fn accept_all(db: &DatabaseConnection, restaurant_id: i64, kds_order_id: i64) -> Result<KdsTicket> {
    move_pending_items(db, restaurant_id, kds_order_id, KdsStatus::Preparing).await
}

/// Rejects every Pending line of a ticket.
pub async fn reject_all(db: &DatabaseConnection, restaurant_id: i64, kds_order_id: i64) -> Result<KdsTicket> {
    move_pending_items(db, restaurant_id, kds_order_id, KdsStatus::Rejected).await
}

/// Removes the ticket of an order along with its lines.
pub async fn delete_for_order<C>(db: &C, order_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let tickets = KdsOrder::find()
        .filter(kds_order::Column::OrderId.eq(order_id))
        .all(db)
        .await?;
    for ticket in tickets {
        KdsOrderItem::delete_many()
            .filter(kds_order_item::Column::KdsOrderId.eq(ticket.id))
            .exec(db)
            .await?;
        ticket.delete(db).await?;
    }
    Ok(())
}
