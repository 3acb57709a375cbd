//! Kitchen Station Model

use serde::{Deserialize, Serialize};

/// Kitchen station (grill, tandoor, bar, ...)
///
/// When a restaurant defines multiple stations, ticket derivation splits
/// items by station; otherwise one ticket is produced per dispatch batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenStation {
    pub id: String,
    pub name: String,
}
