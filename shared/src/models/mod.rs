//! Restaurant domain models

pub mod dining_table;
pub mod kitchen_station;
pub mod menu_item;

pub use dining_table::{DiningTable, TableStatus, TableView};
pub use kitchen_station::KitchenStation;
pub use menu_item::MenuItemMeta;
