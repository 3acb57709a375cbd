//! Error category classification

use crate::order::types::CommandErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification
///
/// Drives caller behavior:
/// - `Validation`: rejected before any mutation; retry with corrected input
/// - `StateConflict`: business rule violation; never retried automatically
/// - `Concurrency`: reread current state and resubmit
/// - `Invariant`: defect signal; logged at high severity upstream
/// - `NotFound`: unknown aggregate or member
/// - `Internal`: unexpected system failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    StateConflict,
    Concurrency,
    Invariant,
    NotFound,
    Internal,
}

impl ErrorCategory {
    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::StateConflict => "state_conflict",
            Self::Concurrency => "concurrency",
            Self::Invariant => "invariant",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }
}

impl CommandErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        use CommandErrorCode::*;
        match self {
            EmptyOrder | InvalidOrder | InvalidItem | InvalidPricingParams | InvalidAmount => {
                ErrorCategory::Validation
            }
            InvalidTransition | OrderClosed | OrderLocked | TicketsPending | TableUnavailable
            | ItemAlreadyDispatched | MenuItemUnavailable => ErrorCategory::StateConflict,
            ConcurrentModification => ErrorCategory::Concurrency,
            PricingInvariantViolation => ErrorCategory::Invariant,
            OrderNotFound | TicketNotFound | ItemNotFound | TableNotFound => ErrorCategory::NotFound,
            InternalError => ErrorCategory::Internal,
        }
    }
}
