//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod attendance;
pub mod campaign;
pub mod customer;
pub mod dining_table;
pub mod employee;
pub mod enums;
pub mod expense;
pub mod inventory_item;
pub mod kds_order;
pub mod kds_order_item;
pub mod loyalty_transaction;
pub mod menu_item;
pub mod menu_item_ingredient;
pub mod order;
pub mod order_item;
pub mod reservation;
pub mod restaurant;
pub mod temp_order;
pub mod temp_order_item;

// Re-export entity handles under table-like names
pub use attendance::Entity as Attendance;
pub use campaign::Entity as Campaign;
pub use customer::Entity as Customer;
pub use dining_table::Entity as DiningTable;
pub use employee::Entity as Employee;
pub use enums::{
    DiscountType, KdsStatus, LoyaltyKind, OrderKind, PayMode, ReservationStatus, Role,
};
pub use expense::Entity as Expense;
pub use inventory_item::Entity as InventoryItem;
pub use kds_order::Entity as KdsOrder;
pub use kds_order_item::Entity as KdsOrderItem;
pub use loyalty_transaction::Entity as LoyaltyTransaction;
pub use menu_item::Entity as MenuItem;
pub use menu_item_ingredient::Entity as MenuItemIngredient;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use reservation::Entity as Reservation;
pub use restaurant::Entity as Restaurant;
pub use temp_order::Entity as TempOrder;
pub use temp_order_item::Entity as TempOrderItem;
