//! Menu catalog collaborator
//!
//! When a catalog is configured, item names and unit prices supplied by
//! clients are replaced with the catalog's values at command time, and
//! unavailable items are rejected. Without one, caller-supplied values
//! are trusted as-is.

use crate::orders::traits::OrderError;
use async_trait::async_trait;
use shared::models::MenuItemMeta;
use std::collections::HashMap;

/// Batch lookup of menu item metadata
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve metadata for a batch of menu item ids
    ///
    /// Ids unknown to the catalog are absent from the result; the caller
    /// decides whether that is an error.
    async fn get_item_meta_batch(
        &self,
        restaurant_id: &str,
        menu_item_ids: &[String],
    ) -> Result<HashMap<String, MenuItemMeta>, OrderError>;
}

/// In-memory catalog backed by a fixed map
///
/// Used in tests and single-process deployments where the menu is loaded
/// up front.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: HashMap<String, MenuItemMeta>,
}

impl InMemoryCatalog {
    pub fn new(items: HashMap<String, MenuItemMeta>) -> Self {
        Self { items }
    }

    pub fn insert(&mut self, menu_item_id: impl Into<String>, meta: MenuItemMeta) {
        self.items.insert(menu_item_id.into(), meta);
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn get_item_meta_batch(
        &self,
        _restaurant_id: &str,
        menu_item_ids: &[String],
    ) -> Result<HashMap<String, MenuItemMeta>, OrderError> {
        Ok(menu_item_ids
            .iter()
            .filter_map(|id| self.items.get(id).map(|meta| (id.clone(), meta.clone())))
            .collect())
    }
}
