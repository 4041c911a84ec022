//! Room code allocation and contract lifecycle rules for the rental
//! portfolio, plus the shared field validators the tenant and contract
//! forms use.
//!
//! The system of record stays authoritative for uniqueness and
//! availability; everything here validates before submitting and declares
//! which cached views a successful mutation made stale.

pub mod contracts;
pub mod domain;
pub mod invalidation;
pub mod repository;
pub mod rooms;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use contracts::{
    available_rooms, available_tenants, ContractDraft, ContractStateError,
    ContractValidationError, FinalizeOutcome, NewContract,
};
pub use domain::{
    Contract, ContractId, ContractState, Floor, FloorId, Invoice, InvoiceId, InvoiceStatus,
    PropertyId, Room, RoomId, RoomStatus, Tenant, TenantId,
};
pub use invalidation::{finalize_invalidations, CacheInvalidator, InvalidationKey};
pub use repository::{PortfolioRepository, RepositoryError};
pub use rooms::{
    available_codes, available_codes_for_editing, code_range, parse_rent, parse_room_code,
    validate_rent, NewRoom, RoomDraft, RoomValidationError, ROOMS_PER_FLOOR,
};
pub use router::leasing_router;
pub use service::{
    ContractCandidates, FinalizeReceipt, LeasingService, LeasingServiceError, RoomCodeCandidates,
};
