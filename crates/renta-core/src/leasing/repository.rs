//! Storage abstraction standing in for the REST backend that owns
//! persistence. The backend remains the authority on uniqueness and
//! availability; implementations answer `Conflict` when a submission loses
//! a race that local validation could not see.

use super::contracts::NewContract;
use super::domain::{
    Contract, ContractId, Floor, FloorId, Invoice, PropertyId, Room, RoomId, RoomStatus, Tenant,
    TenantId,
};
use super::rooms::NewRoom;

pub trait PortfolioRepository: Send + Sync {
    fn floor(&self, id: FloorId) -> Result<Option<Floor>, RepositoryError>;
    fn room(&self, id: RoomId) -> Result<Option<Room>, RepositoryError>;
    fn tenant(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError>;
    fn contract(&self, id: ContractId) -> Result<Option<Contract>, RepositoryError>;

    fn rooms_on_floor(&self, floor: FloorId) -> Result<Vec<Room>, RepositoryError>;
    fn rooms(&self, property: PropertyId) -> Result<Vec<Room>, RepositoryError>;
    fn tenants(&self, property: PropertyId) -> Result<Vec<Tenant>, RepositoryError>;
    fn invoices(&self, property: PropertyId) -> Result<Vec<Invoice>, RepositoryError>;

    /// Persists a validated room. Answers `Conflict` when the code was
    /// taken between candidate fetch and submit.
    fn insert_room(&self, room: NewRoom) -> Result<Room, RepositoryError>;

    /// Persists a validated contract in ACTIVO state. Answers `Conflict`
    /// when the room or tenant lost availability in the meantime.
    fn insert_contract(
        &self,
        property: PropertyId,
        contract: NewContract,
    ) -> Result<Contract, RepositoryError>;

    fn update_contract(&self, contract: Contract) -> Result<(), RepositoryError>;
    fn update_room_status(&self, id: RoomId, status: RoomStatus) -> Result<(), RepositoryError>;

    /// Bumps the tenant's ACTIVO contract count when a contract is created.
    fn claim_tenant(&self, id: TenantId) -> Result<(), RepositoryError>;
    /// Drops the tenant's ACTIVO contract count when a contract ends.
    fn release_tenant(&self, id: TenantId) -> Result<(), RepositoryError>;

    /// Moves the contract's PENDIENTE invoices to ANULADA, returning how
    /// many were cancelled.
    fn cancel_pending_invoices(&self, contract: ContractId) -> Result<u32, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists or lost an availability race")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
