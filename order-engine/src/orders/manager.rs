//! OrderManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Event generation with global sequence numbers
//! - Snapshot updates via EventApplier
//! - Table occupancy side effects
//! - Event broadcasting
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Lock the target order (try_lock; contention is rejected)
//!     ├─ 3. Optimistic sequence check (expected_sequence)
//!     ├─ 4. Convert command to action and execute
//!     ├─ 5. Apply events to a working snapshot copy via EventApplier
//!     ├─ 6. Finalize: recompute pricing, verify ticket coverage, checksum
//!     ├─ 7. Apply table side effects
//!     ├─ 8. Commit the working copy and mark command processed
//!     ├─ 9. Broadcast event(s)
//!     └─ 10. Return response
//! ```
//!
//! Everything up to step 8 is fallible; a failure at any point leaves the
//! committed snapshot untouched.

use super::actions::{self, CommandAction};
use super::appliers::EventAction;
use super::pricing;
use super::tables::TableBindingManager;
use super::tickets;
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier, OrderError};
use crate::catalog::Catalog;
use chrono::Local;
use dashmap::DashMap;
use parking_lot::Mutex;
use shared::models::{DiningTable, KitchenStation, MenuItemMeta, TableView};
use shared::order::{
    CommandResponse, EventPayload, ItemSetEntry, OrderCommand, OrderCommandPayload, OrderEvent,
    OrderItemInput, OrderSnapshot,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 16384;

/// Static restaurant configuration the engine runs with
#[derive(Debug, Clone, Default)]
pub struct RestaurantConfig {
    /// Tenant scope stamped on every order
    pub restaurant_id: String,
    /// Kitchen stations; with fewer than two, tickets are not split
    pub stations: Vec<KitchenStation>,
    /// Dining tables available for binding
    pub tables: Vec<DiningTable>,
}

/// One order's committed state plus its event log
struct OrderEntry {
    snapshot: OrderSnapshot,
    events: Vec<OrderEvent>,
}

/// OrderManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger full resync.
pub struct OrderManager {
    config: RestaurantConfig,
    orders: DashMap<String, Arc<Mutex<OrderEntry>>>,
    tables: TableBindingManager,
    catalog: Option<Arc<dyn Catalog>>,
    event_tx: broadcast::Sender<OrderEvent>,
    /// Global event sequence allocator
    sequence: AtomicU64,
    /// Ticket number allocator, unique per restaurant
    ticket_counter: AtomicU64,
    /// Order number allocator (per day, display only)
    order_counter: AtomicU64,
    processed_commands: DashMap<String, ()>,
    epoch: String,
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("restaurant_id", &self.config.restaurant_id)
            .field("orders", &self.orders.len())
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl OrderManager {
    /// Create a new OrderManager with the given configuration
    pub fn new(config: RestaurantConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let tables = TableBindingManager::new();
        for table in &config.tables {
            tables.register_table(table.clone());
        }
        let epoch = uuid::Uuid::new_v4().to_string();
        info!(
            restaurant_id = %config.restaurant_id,
            tables = config.tables.len(),
            stations = config.stations.len(),
            epoch = %epoch,
            "OrderManager started with new epoch"
        );
        Self {
            config,
            orders: DashMap::new(),
            tables,
            catalog: None,
            event_tx,
            sequence: AtomicU64::new(0),
            ticket_counter: AtomicU64::new(0),
            order_counter: AtomicU64::new(0),
            processed_commands: DashMap::new(),
            epoch,
        }
    }

    /// Attach a catalog for item metadata resolution
    pub fn with_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    /// Generate the next display order number
    fn next_order_number(&self) -> String {
        let count = self.order_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let date_str = Local::now().format("%Y%m%d").to_string();
        format!("ORD{}{:04}", date_str, count)
    }

    /// Resolve catalog metadata for a batch of inputs
    fn item_meta_for(
        &self,
        inputs: &[&OrderItemInput],
    ) -> Result<HashMap<String, MenuItemMeta>, OrderError> {
        let Some(catalog) = &self.catalog else {
            return Ok(HashMap::new());
        };
        let ids: Vec<String> = inputs.iter().map(|i| i.menu_item_id.clone()).collect();
        futures::executor::block_on(
            catalog.get_item_meta_batch(&self.config.restaurant_id, &ids),
        )
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: OrderCommand) -> CommandResponse {
        match self.process_command(&cmd) {
            Ok((response, events)) => {
                // Broadcast events after successful commit
                for event in events {
                    let _ = self.event_tx.send(event);
                }
                response
            }
            Err(err) => CommandResponse::error(cmd.command_id, err.into()),
        }
    }

    /// Process a command and return the response with its events
    fn process_command(
        &self,
        cmd: &OrderCommand,
    ) -> Result<(CommandResponse, Vec<OrderEvent>), OrderError> {
        info!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Idempotency check
        if self.processed_commands.contains_key(&cmd.command_id) {
            warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id.clone()), vec![]));
        }

        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id.clone(),
            operator_name: cmd.operator_name.clone(),
            timestamp: cmd.timestamp,
        };

        match &cmd.payload {
            OrderCommandPayload::CreateOrder { .. } => self.process_create(cmd, &metadata),
            _ => self.process_mutation(cmd, &metadata),
        }
    }

    /// CreateOrder path: no existing aggregate to lock
    fn process_create(
        &self,
        cmd: &OrderCommand,
        metadata: &CommandMetadata,
    ) -> Result<(CommandResponse, Vec<OrderEvent>), OrderError> {
        let OrderCommandPayload::CreateOrder {
            order_type,
            table_id,
            customer_id,
            server_id,
            guest_count,
            items,
            pricing: params,
        } = &cmd.payload
        else {
            return Err(OrderError::Internal("not a CreateOrder command".to_string()));
        };

        let inputs: Vec<&OrderItemInput> = items.iter().collect();
        let item_meta = self.item_meta_for(&inputs)?;
        let action = actions::CreateOrderAction {
            order_type: *order_type,
            table_id: table_id.clone(),
            customer_id: customer_id.clone(),
            server_id: server_id.clone(),
            guest_count: *guest_count,
            items: items.clone(),
            pricing: *params,
            order_number: self.next_order_number(),
            item_meta,
        };

        let mut ctx = CommandContext::new(
            None,
            &self.config.stations,
            &self.sequence,
            &self.ticket_counter,
        );
        let events = futures::executor::block_on(action.execute(&mut ctx, metadata))?;
        let order_id = events
            .first()
            .map(|e| e.order_id.clone())
            .ok_or_else(|| OrderError::Internal("create produced no events".to_string()))?;

        let mut snapshot =
            OrderSnapshot::new(order_id.clone(), self.config.restaurant_id.clone());
        self.apply_events(&mut snapshot, &events);
        self.finalize(&mut snapshot)?;

        // bind the table before anything becomes visible; a lost race
        // leaves no trace of this order
        for event in &events {
            if let EventPayload::TableOccupied { table_id } = &event.payload {
                self.tables.bind(table_id, &order_id)?;
            }
        }

        self.orders.insert(
            order_id.clone(),
            Arc::new(Mutex::new(OrderEntry {
                snapshot: snapshot.clone(),
                events: events.clone(),
            })),
        );
        self.processed_commands.insert(cmd.command_id.clone(), ());

        info!(
            command_id = %cmd.command_id,
            order_id = %order_id,
            event_count = events.len(),
            "Command processed successfully"
        );
        Ok((
            CommandResponse::success(
                cmd.command_id.clone(),
                Some(order_id),
                Some(snapshot),
            ),
            events,
        ))
    }

    /// Mutation path: locks the target order for the whole pipeline
    fn process_mutation(
        &self,
        cmd: &OrderCommand,
        metadata: &CommandMetadata,
    ) -> Result<(CommandResponse, Vec<OrderEvent>), OrderError> {
        let order_id = cmd
            .order_id()
            .ok_or_else(|| OrderError::Internal("command targets no order".to_string()))?
            .to_string();

        let entry = self
            .orders
            .get(&order_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| OrderError::OrderNotFound(order_id.clone()))?;

        // 2. Per-order lock; a concurrent writer is reported, not awaited
        let mut guard = entry
            .try_lock()
            .ok_or_else(|| OrderError::OrderBusy(order_id.clone()))?;

        // 3. Optimistic sequence check
        if let Some(expected) = cmd.expected_sequence
            && expected != guard.snapshot.last_sequence
        {
            return Err(OrderError::ConcurrentModification {
                expected,
                current: guard.snapshot.last_sequence,
            });
        }

        // 4. Convert to action; UpdateItems gets catalog metadata injected
        let mut action = CommandAction::from(cmd);
        if let OrderCommandPayload::UpdateItems { entries, .. } = &cmd.payload {
            let inputs: Vec<&OrderItemInput> = entries
                .iter()
                .filter_map(|e| match e {
                    ItemSetEntry::Add { item } => Some(item),
                    ItemSetEntry::Keep { .. } => None,
                })
                .collect();
            if !inputs.is_empty() {
                action.inject_item_meta(self.item_meta_for(&inputs)?);
            }
        }

        let mut ctx = CommandContext::new(
            Some(&guard.snapshot),
            &self.config.stations,
            &self.sequence,
            &self.ticket_counter,
        );
        let events = futures::executor::block_on(action.execute(&mut ctx, metadata))?;

        // 5-6. Fold into a working copy and finalize; the committed
        // snapshot stays untouched until everything checks out
        let mut working = guard.snapshot.clone();
        self.apply_events(&mut working, &events);
        self.finalize(&mut working)?;

        // 7. Table side effects (release is idempotent)
        for event in &events {
            if let EventPayload::TableReleased { table_id } = &event.payload {
                self.tables.release(table_id, &order_id);
            }
        }

        // 8. Commit
        guard.snapshot = working;
        guard.events.extend(events.iter().cloned());
        self.processed_commands.insert(cmd.command_id.clone(), ());

        info!(
            command_id = %cmd.command_id,
            order_id = %order_id,
            event_count = events.len(),
            "Command processed successfully"
        );
        Ok((
            CommandResponse::success(
                cmd.command_id.clone(),
                Some(order_id),
                Some(guard.snapshot.clone()),
            ),
            events,
        ))
    }

    fn apply_events(&self, snapshot: &mut OrderSnapshot, events: &[OrderEvent]) {
        for event in events {
            let applier: EventAction = event.into();
            applier.apply(snapshot, event);
        }
    }

    /// Recompute derived state and verify invariants after a fold
    ///
    /// A failure here is an internal defect; the caller must discard the
    /// working copy.
    fn finalize(&self, snapshot: &mut OrderSnapshot) -> Result<(), OrderError> {
        pricing::recalculate(snapshot).inspect_err(|e| {
            error!(order_id = %snapshot.order_id, error = %e, "Pricing recomputation failed, rolling back");
        })?;
        tickets::verify_coverage(snapshot).inspect_err(|e| {
            error!(order_id = %snapshot.order_id, error = %e, "Ticket coverage violated, rolling back");
        })?;
        snapshot.update_checksum();
        Ok(())
    }

    // ========== Public Query Methods ==========

    /// Get a snapshot by order ID
    pub fn get_snapshot(&self, order_id: &str) -> Option<OrderSnapshot> {
        self.orders
            .get(order_id)
            .map(|entry| entry.lock().snapshot.clone())
    }

    /// Get all non-terminal order snapshots
    pub fn active_orders(&self) -> Vec<OrderSnapshot> {
        self.orders
            .iter()
            .filter_map(|entry| {
                let guard = entry.lock();
                (!guard.snapshot.is_terminal()).then(|| guard.snapshot.clone())
            })
            .collect()
    }

    /// Get the event log for an order
    pub fn order_events(&self, order_id: &str) -> Vec<OrderEvent> {
        self.orders
            .get(order_id)
            .map(|entry| entry.lock().events.clone())
            .unwrap_or_default()
    }

    /// Get the current global sequence number
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Current view of one table
    pub fn table_view(&self, table_id: &str) -> Option<TableView> {
        self.tables.table_view(table_id)
    }

    /// Views of all registered tables
    pub fn table_views(&self) -> Vec<TableView> {
        self.tables.all_views()
    }

    /// Rebuild a snapshot from its event log (for verification)
    ///
    /// Replays every event through the appliers and compares the result's
    /// checksum against the committed snapshot; divergence signals drift.
    pub fn rebuild_snapshot(&self, order_id: &str) -> Result<OrderSnapshot, OrderError> {
        let entry = self
            .orders
            .get(order_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        let guard = entry.lock();

        let mut rebuilt =
            OrderSnapshot::new(order_id.to_string(), self.config.restaurant_id.clone());
        self.apply_events(&mut rebuilt, &guard.events);
        // replay does not mutate committed state; a recompute failure here
        // is the drift we are looking for
        pricing::recalculate(&mut rebuilt)?;
        rebuilt.update_checksum();

        if rebuilt.state_checksum != guard.snapshot.state_checksum {
            error!(
                order_id = %order_id,
                committed = %guard.snapshot.state_checksum,
                rebuilt = %rebuilt.state_checksum,
                "Snapshot drift detected"
            );
        }
        Ok(rebuilt)
    }
}
