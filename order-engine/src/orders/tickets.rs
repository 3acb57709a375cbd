//! Kitchen ticket derivation and reconciliation
//!
//! Converts an order's line items into Kitchen Order Tickets. Items are
//! split by station only when the restaurant defines multiple stations;
//! otherwise one ticket is produced per dispatch batch. After every
//! reconciliation the union of live ticket lines must exactly equal the
//! order's current item set - `verify_coverage` enforces this.

use crate::orders::traits::OrderError;
use shared::models::KitchenStation;
use shared::order::snapshot::{OrderSnapshot, OrderStatus};
use shared::order::ticket::{KitchenTicket, KotStatus, TicketLine, TicketPriority};
use shared::order::types::{OrderItemSnapshot, OrderType};
use std::collections::HashMap;

/// Wait time after which a ticket is escalated to High priority
const HIGH_PRIORITY_WAIT_MS: i64 = 15 * 60 * 1000;

/// Derive the priority for a new ticket
///
/// Supplemental tickets for an order the kitchen already started are Rush;
/// delivery/online orders and orders that have been waiting are High.
pub fn derive_priority(snapshot: &OrderSnapshot, now: i64) -> TicketPriority {
    if snapshot.status == OrderStatus::Preparing {
        return TicketPriority::Rush;
    }
    if matches!(snapshot.order_type, OrderType::Delivery | OrderType::Online) {
        return TicketPriority::High;
    }
    if now.saturating_sub(snapshot.created_at) > HIGH_PRIORITY_WAIT_MS {
        return TicketPriority::High;
    }
    TicketPriority::Normal
}

/// Group items into dispatch batches by station
///
/// With more than one configured station, items split by their station
/// (items without a station fall into a default batch); otherwise a
/// single batch. Batch and item order follow item insertion order.
pub fn group_by_station<'a>(
    items: &[&'a OrderItemSnapshot],
    stations: &[KitchenStation],
) -> Vec<(Option<String>, Vec<&'a OrderItemSnapshot>)> {
    if stations.len() <= 1 {
        if items.is_empty() {
            return Vec::new();
        }
        return vec![(None, items.to_vec())];
    }

    let known: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
    let mut order: Vec<Option<String>> = Vec::new();
    let mut groups: HashMap<Option<String>, Vec<&OrderItemSnapshot>> = HashMap::new();
    for item in items {
        let key = item
            .station_id
            .as_deref()
            .filter(|id| known.contains(id))
            .map(|id| id.to_string());
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(item);
    }

    order
        .into_iter()
        .map(|key| {
            let items = groups.remove(&key).unwrap_or_default();
            (key, items)
        })
        .collect()
}

/// Build a new ticket (NotSent) for one dispatch batch
pub fn build_ticket(
    ticket_number: String,
    station_id: Option<String>,
    items: &[&OrderItemSnapshot],
    priority: TicketPriority,
    now: i64,
) -> KitchenTicket {
    KitchenTicket {
        ticket_number,
        station_id,
        status: KotStatus::NotSent,
        priority,
        lines: items
            .iter()
            .map(|item| TicketLine {
                line_id: item.line_id.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                cancelled: false,
                note: item.note.clone(),
            })
            .collect(),
        chef_id: None,
        created_at: now,
        sent_at: None,
        acknowledged_at: None,
        started_at: None,
        completed_at: None,
    }
}

/// Find the dispatched ticket still referencing an item, if any
///
/// Removing such an item requires the explicit cancellation override;
/// items only on NotSent tickets (or on no ticket at all) are free to go.
pub fn dispatched_ticket_for<'a>(
    snapshot: &'a OrderSnapshot,
    line_id: &str,
) -> Option<&'a KitchenTicket> {
    snapshot.live_tickets().find(|t| {
        t.status != KotStatus::NotSent && t.line(line_id).is_some_and(|l| !l.cancelled)
    })
}

/// Verify the ticket coverage invariant
///
/// For every dispatched non-terminal order, the union of non-cancelled
/// lines across live tickets must exactly equal the order's active item
/// set - same line ids, same quantities. A violation is an internal
/// defect: the operation that produced it must be rolled back.
pub fn verify_coverage(snapshot: &OrderSnapshot) -> Result<(), OrderError> {
    // No tickets exist before dispatch; nothing to cover after close
    if snapshot.status == OrderStatus::Pending || snapshot.is_terminal() {
        return Ok(());
    }

    let mut ticketed: HashMap<&str, i32> = HashMap::new();
    for ticket in snapshot.live_tickets() {
        for line in ticket.active_lines() {
            *ticketed.entry(line.line_id.as_str()).or_insert(0) += line.quantity;
        }
    }

    let mut expected: HashMap<&str, i32> = HashMap::new();
    for item in snapshot.active_items() {
        *expected.entry(item.line_id.as_str()).or_insert(0) += item.quantity;
    }

    if ticketed != expected {
        return Err(OrderError::Internal(format!(
            "ticket coverage broken for order {}: ticketed {:?}, expected {:?}",
            snapshot.order_id, ticketed, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::types::ItemStatus;

    fn item(line_id: &str, station: Option<&str>, quantity: i32) -> OrderItemSnapshot {
        OrderItemSnapshot {
            line_id: line_id.to_string(),
            menu_item_id: format!("menu-{}", line_id),
            name: format!("Item {}", line_id),
            unit_price: 10.0,
            quantity,
            total_price: 10.0 * quantity as f64,
            status: ItemStatus::Queued,
            station_id: station.map(|s| s.to_string()),
            note: None,
        }
    }

    fn station(id: &str) -> KitchenStation {
        KitchenStation {
            id: id.to_string(),
            name: id.to_uppercase(),
        }
    }

    #[test]
    fn test_single_station_yields_one_batch() {
        let items = [item("a", Some("grill"), 1), item("b", Some("tandoor"), 2)];
        let refs: Vec<&OrderItemSnapshot> = items.iter().collect();
        let groups = group_by_station(&refs, &[station("grill")]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, None);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_multi_station_splits_items() {
        let items = [
            item("a", Some("grill"), 1),
            item("b", Some("tandoor"), 2),
            item("c", Some("grill"), 1),
            item("d", None, 1),
        ];
        let refs: Vec<&OrderItemSnapshot> = items.iter().collect();
        let groups = group_by_station(&refs, &[station("grill"), station("tandoor")]);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0.as_deref(), Some("grill"));
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0.as_deref(), Some("tandoor"));
        assert_eq!(groups[1].1.len(), 1);
        // unconfigured station falls into the default batch
        assert_eq!(groups[2].0, None);
    }

    #[test]
    fn test_unknown_station_falls_back_to_default_batch() {
        let items = [item("a", Some("sushi"), 1)];
        let refs: Vec<&OrderItemSnapshot> = items.iter().collect();
        let groups = group_by_station(&refs, &[station("grill"), station("tandoor")]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, None);
    }

    #[test]
    fn test_priority_rush_for_supplemental() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string(), "rest-1".to_string());
        snapshot.status = OrderStatus::Preparing;
        assert_eq!(
            derive_priority(&snapshot, snapshot.created_at),
            TicketPriority::Rush
        );
    }

    #[test]
    fn test_priority_high_for_delivery_and_long_wait() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string(), "rest-1".to_string());
        snapshot.order_type = OrderType::Delivery;
        assert_eq!(
            derive_priority(&snapshot, snapshot.created_at),
            TicketPriority::High
        );

        snapshot.order_type = OrderType::DineIn;
        let late = snapshot.created_at + HIGH_PRIORITY_WAIT_MS + 1;
        assert_eq!(derive_priority(&snapshot, late), TicketPriority::High);
        assert_eq!(
            derive_priority(&snapshot, snapshot.created_at),
            TicketPriority::Normal
        );
    }

    #[test]
    fn test_coverage_holds_for_matching_sets() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string(), "rest-1".to_string());
        snapshot.status = OrderStatus::Confirmed;
        snapshot.items = vec![item("a", None, 2), item("b", None, 1)];
        let refs: Vec<&OrderItemSnapshot> = snapshot.items.iter().collect();
        let ticket = build_ticket(
            "KOT-0001".to_string(),
            None,
            &refs,
            TicketPriority::Normal,
            0,
        );
        snapshot.tickets = vec![ticket];

        assert!(verify_coverage(&snapshot).is_ok());
    }

    #[test]
    fn test_coverage_detects_missing_ticket_line() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string(), "rest-1".to_string());
        snapshot.status = OrderStatus::Confirmed;
        snapshot.items = vec![item("a", None, 2), item("b", None, 1)];
        let refs = [&snapshot.items[0]];
        let ticket = build_ticket(
            "KOT-0001".to_string(),
            None,
            &refs,
            TicketPriority::Normal,
            0,
        );
        snapshot.tickets = vec![ticket];

        assert!(verify_coverage(&snapshot).is_err());
    }

    #[test]
    fn test_coverage_skips_pending_and_terminal_orders() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string(), "rest-1".to_string());
        snapshot.items = vec![item("a", None, 1)];
        assert!(verify_coverage(&snapshot).is_ok());

        snapshot.status = OrderStatus::Cancelled;
        assert!(verify_coverage(&snapshot).is_ok());
    }

    #[test]
    fn test_dispatched_ticket_lookup() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string(), "rest-1".to_string());
        snapshot.status = OrderStatus::Confirmed;
        snapshot.items = vec![item("a", None, 1)];
        let refs: Vec<&OrderItemSnapshot> = snapshot.items.iter().collect();
        let mut ticket = build_ticket(
            "KOT-0001".to_string(),
            None,
            &refs,
            TicketPriority::Normal,
            0,
        );

        ticket.status = KotStatus::NotSent;
        snapshot.tickets = vec![ticket.clone()];
        assert!(dispatched_ticket_for(&snapshot, "a").is_none());

        ticket.status = KotStatus::Sent;
        snapshot.tickets = vec![ticket];
        assert!(dispatched_ticket_for(&snapshot, "a").is_some());
    }
}
