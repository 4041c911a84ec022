//! Typed cache invalidation targets.
//!
//! The client-side response cache is an external collaborator; after a
//! successful mutation this module declares which cached views went stale,
//! and the cache drops them. Keys are a closed enum so the set of views to
//! refresh is checked by the compiler instead of ad hoc string tuples.

use serde::Serialize;

use super::domain::{ContractId, PropertyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationKey {
    ContractList(PropertyId),
    ContractDetail(PropertyId, ContractId),
    AvailableRooms(PropertyId),
    AvailableTenants(PropertyId),
    Invoices(PropertyId),
}

impl InvalidationKey {
    /// Stable string rendering used in wire payloads and logs.
    pub fn cache_key(&self) -> String {
        match self {
            Self::ContractList(property) => format!("contracts:{property}"),
            Self::ContractDetail(property, contract) => {
                format!("contract:{property}:{contract}")
            }
            Self::AvailableRooms(property) => format!("available-rooms:{property}"),
            Self::AvailableTenants(property) => format!("available-tenants:{property}"),
            Self::Invoices(property) => format!("invoices:{property}"),
        }
    }
}

/// Outbound port to the response cache. Implementations only need to drop
/// the named entry; they never recompute anything.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, key: InvalidationKey);
}

/// The complete set of views made stale by finalizing a contract: the
/// contract's detail and list, both availability lists (room and tenant are
/// freed), and the property's invoices (pending ones get cancelled).
pub fn finalize_invalidations(
    property: PropertyId,
    contract: ContractId,
) -> [InvalidationKey; 5] {
    [
        InvalidationKey::ContractList(property),
        InvalidationKey::ContractDetail(property, contract),
        InvalidationKey::AvailableRooms(property),
        InvalidationKey::AvailableTenants(property),
        InvalidationKey::Invoices(property),
    ]
}
