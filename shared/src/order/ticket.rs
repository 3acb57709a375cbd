//! Kitchen Order Ticket (KOT) types
//!
//! A KOT is a per-station work order derived from an order's items. It
//! moves through its own forward-only status machine, independent of the
//! order's state machine but constrained by it: the order cannot reach
//! `Ready` until every live ticket has.

use serde::{Deserialize, Serialize};

/// Ticket status - forward-only progression
///
/// `NotSent → Sent → Acknowledged → Preparing → Ready`, with the
/// acknowledgment step skippable (`Sent → Preparing`). `Cancelled` is
/// reachable only through parent-order cancellation, never via progression.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KotStatus {
    #[default]
    NotSent,
    Sent,
    Acknowledged,
    Preparing,
    Ready,
    Cancelled,
}

impl KotStatus {
    /// Whether this ticket still counts toward order readiness
    pub fn is_open(&self) -> bool {
        !matches!(self, KotStatus::Ready | KotStatus::Cancelled)
    }

    /// Whether progressing from `self` to `target` is a legal forward step
    ///
    /// No backward transition is ever valid, and `Cancelled` can neither be
    /// progressed to nor out of.
    pub fn can_progress_to(&self, target: KotStatus) -> bool {
        use KotStatus::*;
        matches!(
            (self, target),
            (NotSent, Sent)
                | (Sent, Acknowledged)
                | (Sent, Preparing)
                | (Acknowledged, Preparing)
                | (Preparing, Ready)
        )
    }
}

/// Ticket priority, derived from wait time and order type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    #[default]
    Normal,
    High,
    /// Supplemental items ordered after the kitchen already started
    Rush,
}

/// One line of a ticket, referencing an order item
///
/// Lines are never deleted; a removed-but-dispatched item leaves its line
/// behind with `cancelled: true` for audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketLine {
    /// Order item this line refers to
    pub line_id: String,
    /// Item name snapshot (for display on the kitchen ticket)
    pub name: String,
    pub quantity: i32,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Kitchen Order Ticket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenTicket {
    /// Ticket number, unique per restaurant
    pub ticket_number: String,
    /// Station this ticket routes to (None for single-station restaurants)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    pub status: KotStatus,
    pub priority: TicketPriority,
    pub lines: Vec<TicketLine>,
    /// Assigned chef, set by the kitchen on acknowledgment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chef_id: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl KitchenTicket {
    /// Whether this ticket still counts toward order readiness
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Whether this ticket is live (retained and not cancelled)
    pub fn is_live(&self) -> bool {
        self.status != KotStatus::Cancelled
    }

    /// Non-cancelled lines of this ticket
    pub fn active_lines(&self) -> impl Iterator<Item = &TicketLine> {
        self.lines.iter().filter(|l| !l.cancelled)
    }

    /// Find a line by order item id
    pub fn line(&self, line_id: &str) -> Option<&TicketLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [KotStatus; 6] = [
        KotStatus::NotSent,
        KotStatus::Sent,
        KotStatus::Acknowledged,
        KotStatus::Preparing,
        KotStatus::Ready,
        KotStatus::Cancelled,
    ];

    #[test]
    fn test_forward_chain() {
        assert!(KotStatus::NotSent.can_progress_to(KotStatus::Sent));
        assert!(KotStatus::Sent.can_progress_to(KotStatus::Acknowledged));
        assert!(KotStatus::Acknowledged.can_progress_to(KotStatus::Preparing));
        assert!(KotStatus::Preparing.can_progress_to(KotStatus::Ready));
    }

    #[test]
    fn test_acknowledgment_may_be_skipped() {
        assert!(KotStatus::Sent.can_progress_to(KotStatus::Preparing));
    }

    #[test]
    fn test_no_backward_transition() {
        let order = [
            KotStatus::NotSent,
            KotStatus::Sent,
            KotStatus::Acknowledged,
            KotStatus::Preparing,
            KotStatus::Ready,
        ];
        for (i, from) in order.iter().enumerate() {
            for to in &order[..i] {
                assert!(
                    !from.can_progress_to(*to),
                    "{:?} -> {:?} must be invalid",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_cancelled_is_not_a_progression() {
        for status in ALL {
            assert!(!status.can_progress_to(KotStatus::Cancelled));
            assert!(!KotStatus::Cancelled.can_progress_to(status));
        }
    }

    #[test]
    fn test_open_states() {
        assert!(KotStatus::NotSent.is_open());
        assert!(KotStatus::Sent.is_open());
        assert!(KotStatus::Acknowledged.is_open());
        assert!(KotStatus::Preparing.is_open());
        assert!(!KotStatus::Ready.is_open());
        assert!(!KotStatus::Cancelled.is_open());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TicketPriority::Rush > TicketPriority::High);
        assert!(TicketPriority::High > TicketPriority::Normal);
    }
}
