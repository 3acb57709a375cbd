//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item metadata as resolved from the catalog collaborator
///
/// Used to snapshot the authoritative price and station at item-add time.
/// The catalog itself (CRUD, categories, images) is outside the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItemMeta {
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    pub available: bool,
}
