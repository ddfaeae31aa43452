//! Movement routing and ledger effect planning

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Types of stock movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Receipt into a warehouse
    In,
    /// Issue out of a warehouse
    Out,
    /// Relocation between two warehouses
    Transfer,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Transfer => "TRANSFER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "IN" => Some(MovementType::In),
            "OUT" => Some(MovementType::Out),
            "TRANSFER" => Some(MovementType::Transfer),
            _ => None,
        }
    }
}

/// A movement carrying only the warehouse references valid for its type.
///
/// Resolving a raw `(type, warehouse_from, warehouse_to)` triple into a route
/// is the single place where shape rules are enforced; downstream code cannot
/// observe an IN with a source warehouse or a transfer with a missing
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementRoute {
    Inbound { to: Uuid },
    Outbound { from: Uuid },
    Transfer { from: Uuid, to: Uuid },
}

/// A signed quantity change against one warehouse balance of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerDelta {
    pub warehouse_id: Uuid,
    pub delta: i64,
}

impl LedgerDelta {
    pub fn new(warehouse_id: Uuid, delta: i64) -> Self {
        Self { warehouse_id, delta }
    }
}

impl MovementRoute {
    /// Enforce the per-type presence rules and build a route.
    ///
    /// | type     | warehouse_from | warehouse_to            |
    /// |----------|----------------|-------------------------|
    /// | IN       | absent         | required                |
    /// | OUT      | required       | absent                  |
    /// | TRANSFER | required       | required, distinct      |
    pub fn resolve(
        movement_type: MovementType,
        warehouse_from: Option<Uuid>,
        warehouse_to: Option<Uuid>,
    ) -> Result<Self, &'static str> {
        match movement_type {
            MovementType::In => match (warehouse_from, warehouse_to) {
                (None, Some(to)) => Ok(MovementRoute::Inbound { to }),
                (Some(_), _) => Err("warehouse_from must be empty for IN movements"),
                (None, None) => Err("warehouse_to is required for IN movements"),
            },
            MovementType::Out => match (warehouse_from, warehouse_to) {
                (Some(from), None) => Ok(MovementRoute::Outbound { from }),
                (_, Some(_)) => Err("warehouse_to must be empty for OUT movements"),
                (None, None) => Err("warehouse_from is required for OUT movements"),
            },
            MovementType::Transfer => match (warehouse_from, warehouse_to) {
                (Some(from), Some(to)) if from != to => Ok(MovementRoute::Transfer { from, to }),
                (Some(_), Some(_)) => {
                    Err("warehouses must be different for TRANSFER movements")
                }
                _ => Err("both warehouse_from and warehouse_to are required for TRANSFER movements"),
            },
        }
    }

    pub fn movement_type(&self) -> MovementType {
        match self {
            MovementRoute::Inbound { .. } => MovementType::In,
            MovementRoute::Outbound { .. } => MovementType::Out,
            MovementRoute::Transfer { .. } => MovementType::Transfer,
        }
    }

    pub fn warehouse_from(&self) -> Option<Uuid> {
        match *self {
            MovementRoute::Inbound { .. } => None,
            MovementRoute::Outbound { from } => Some(from),
            MovementRoute::Transfer { from, .. } => Some(from),
        }
    }

    pub fn warehouse_to(&self) -> Option<Uuid> {
        match *self {
            MovementRoute::Inbound { to } => Some(to),
            MovementRoute::Outbound { .. } => None,
            MovementRoute::Transfer { to, .. } => Some(to),
        }
    }

    /// Balance effects of committing this movement.
    pub fn apply_deltas(&self, quantity: i64) -> Vec<LedgerDelta> {
        match *self {
            MovementRoute::Inbound { to } => vec![LedgerDelta::new(to, quantity)],
            MovementRoute::Outbound { from } => vec![LedgerDelta::new(from, -quantity)],
            MovementRoute::Transfer { from, to } => vec![
                LedgerDelta::new(from, -quantity),
                LedgerDelta::new(to, quantity),
            ],
        }
    }

    /// Balance effects that undo a previously committed movement.
    pub fn reversal_deltas(&self, quantity: i64) -> Vec<LedgerDelta> {
        self.apply_deltas(quantity)
            .into_iter()
            .map(|d| LedgerDelta::new(d.warehouse_id, -d.delta))
            .collect()
    }
}

/// Net balance effects of replacing one committed movement with another.
///
/// The old effect is reversed and the new effect applied, then entries on the
/// same warehouse are merged. Merging is a correctness requirement: raising
/// an IN from 10 to 12 must reach the ledger as a single +2, because undoing
/// the +10 first could drop the balance below zero even though the net change
/// is positive.
pub fn transition_deltas(
    old_route: &MovementRoute,
    old_quantity: i64,
    new_route: &MovementRoute,
    new_quantity: i64,
) -> Vec<LedgerDelta> {
    let mut deltas = old_route.reversal_deltas(old_quantity);
    deltas.extend(new_route.apply_deltas(new_quantity));
    merge_deltas(deltas)
}

/// Merge deltas per warehouse, drop zero entries and sort by warehouse id.
///
/// The sort gives every multi-balance operation a fixed lock acquisition
/// order, so two concurrent transfers over the same pair of warehouses in
/// opposite directions cannot deadlock.
pub fn merge_deltas(deltas: Vec<LedgerDelta>) -> Vec<LedgerDelta> {
    let mut merged: Vec<LedgerDelta> = Vec::new();
    for d in deltas {
        match merged.iter_mut().find(|m| m.warehouse_id == d.warehouse_id) {
            Some(m) => m.delta += d.delta,
            None => merged.push(d),
        }
    }
    merged.retain(|m| m.delta != 0);
    merged.sort_by_key(|m| m.warehouse_id);
    merged
}
