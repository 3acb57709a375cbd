//! Table occupancy binding
//!
//! Tracks which dine-in order occupies which table. Bindings are mutated
//! only in response to order lifecycle changes, inside the owning order's
//! lock, so slot access never races with another binding attempt for the
//! same order.

use crate::orders::traits::OrderError;
use dashmap::DashMap;
use shared::models::{DiningTable, TableStatus, TableView};
use tracing::{debug, warn};

/// One table's occupancy slot
#[derive(Debug, Clone)]
struct TableSlot {
    table: DiningTable,
    status: TableStatus,
    current_order_id: Option<String>,
}

/// Manages the table registry and its order bindings
#[derive(Debug, Default)]
pub struct TableBindingManager {
    slots: DashMap<String, TableSlot>,
}

impl TableBindingManager {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Register a table, initially available
    ///
    /// Re-registering an existing id replaces the table metadata but keeps
    /// the current binding.
    pub fn register_table(&self, table: DiningTable) {
        let id = table.id.clone();
        match self.slots.get_mut(&id) {
            Some(mut slot) => slot.table = table,
            None => {
                self.slots.insert(
                    id,
                    TableSlot {
                        table,
                        status: TableStatus::Available,
                        current_order_id: None,
                    },
                );
            }
        }
    }

    /// Bind a table to an order
    ///
    /// Fails with `TableUnavailable` unless the slot is Available; the
    /// check and the write happen under the slot's shard lock, so two
    /// orders racing for one table cannot both win.
    pub fn bind(&self, table_id: &str, order_id: &str) -> Result<(), OrderError> {
        let mut slot = self
            .slots
            .get_mut(table_id)
            .ok_or_else(|| OrderError::TableNotFound(table_id.to_string()))?;

        if slot.status != TableStatus::Available {
            warn!(
                table_id = %table_id,
                order_id = %order_id,
                status = ?slot.status,
                "Table bind rejected"
            );
            return Err(OrderError::TableUnavailable(table_id.to_string()));
        }

        slot.status = TableStatus::Occupied;
        slot.current_order_id = Some(order_id.to_string());
        debug!(table_id = %table_id, order_id = %order_id, "Table bound");
        Ok(())
    }

    /// Release a table held by an order
    ///
    /// Idempotent: releasing a table the order no longer holds (or that
    /// does not exist) is a no-op, so terminal transitions can always
    /// release unconditionally.
    pub fn release(&self, table_id: &str, order_id: &str) {
        if let Some(mut slot) = self.slots.get_mut(table_id) {
            if slot.current_order_id.as_deref() == Some(order_id) {
                slot.status = TableStatus::Available;
                slot.current_order_id = None;
                debug!(table_id = %table_id, order_id = %order_id, "Table released");
            }
        }
    }

    /// Mark an available table as reserved
    pub fn reserve(&self, table_id: &str) -> Result<(), OrderError> {
        let mut slot = self
            .slots
            .get_mut(table_id)
            .ok_or_else(|| OrderError::TableNotFound(table_id.to_string()))?;

        if slot.status != TableStatus::Available {
            return Err(OrderError::TableUnavailable(table_id.to_string()));
        }
        slot.status = TableStatus::Reserved;
        Ok(())
    }

    /// Clear a reservation without binding an order
    pub fn unreserve(&self, table_id: &str) -> Result<(), OrderError> {
        let mut slot = self
            .slots
            .get_mut(table_id)
            .ok_or_else(|| OrderError::TableNotFound(table_id.to_string()))?;

        if slot.status == TableStatus::Reserved {
            slot.status = TableStatus::Available;
        }
        Ok(())
    }

    /// Current view of one table
    pub fn table_view(&self, table_id: &str) -> Option<TableView> {
        self.slots.get(table_id).map(|slot| TableView {
            table: slot.table.clone(),
            status: slot.status,
            current_order_id: slot.current_order_id.clone(),
        })
    }

    /// Views of all registered tables, sorted by table id
    pub fn all_views(&self) -> Vec<TableView> {
        let mut views: Vec<TableView> = self
            .slots
            .iter()
            .map(|slot| TableView {
                table: slot.table.clone(),
                status: slot.status,
                current_order_id: slot.current_order_id.clone(),
            })
            .collect();
        views.sort_by(|a, b| a.table.id.cmp(&b.table.id));
        views
    }

    pub fn contains(&self, table_id: &str) -> bool {
        self.slots.contains_key(table_id)
    }
}
