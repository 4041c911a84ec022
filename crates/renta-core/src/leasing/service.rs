//! Service facade composing the allocator, lifecycle rules, repository,
//! and cache invalidation.
//!
//! The facade never mutates shared state directly: it validates, asks the
//! repository to commit, and declares which cached views became stale. A
//! submission that lost an availability race comes back as a conflict
//! rejection for the caller to refetch and retry from clean state.

use std::sync::Arc;

use serde::Serialize;

use super::contracts::{self, ContractDraft, ContractStateError, ContractValidationError};
use super::domain::{
    Contract, ContractId, FloorId, PropertyId, Room, RoomId, RoomStatus, Tenant, TenantId,
};
use super::invalidation::{CacheInvalidator, InvalidationKey};
use super::repository::{PortfolioRepository, RepositoryError};
use super::rooms::{self, RoomDraft, RoomValidationError};

pub struct LeasingService<R, C> {
    repository: Arc<R>,
    cache: Arc<C>,
}

/// Candidate codes for the room form of one floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomCodeCandidates {
    pub floor_number: u32,
    pub codes: Vec<u32>,
}

/// Candidate tenants and rooms for the contract form. A snapshot; it goes
/// stale the moment another mutation lands, so the repository re-checks on
/// insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractCandidates {
    pub tenants: Vec<Tenant>,
    pub rooms: Vec<Room>,
}

/// What a successful finalize did: the cancelled contract, how many
/// pending invoices were voided, and the cached views to refetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalizeReceipt {
    pub contract: Contract,
    pub cancelled_invoices: u32,
    pub invalidated: Vec<String>,
}

impl<R, C> LeasingService<R, C>
where
    R: PortfolioRepository + 'static,
    C: CacheInvalidator + 'static,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>) -> Self {
        Self { repository, cache }
    }

    /// Codes usable for a new room on `floor`, or for re-editing an
    /// existing room when `editing` is given. A floor belonging to another
    /// property is treated as missing.
    pub fn room_code_candidates(
        &self,
        property: PropertyId,
        floor_id: FloorId,
        editing: Option<RoomId>,
    ) -> Result<RoomCodeCandidates, LeasingServiceError> {
        let floor = self
            .repository
            .floor(floor_id)?
            .filter(|floor| floor.property_id == property)
            .ok_or(RepositoryError::NotFound)?;
        let rooms = self.repository.rooms_on_floor(floor_id)?;

        let codes = match editing {
            Some(room_id) => {
                let room = self
                    .repository
                    .room(room_id)?
                    .ok_or(RepositoryError::NotFound)?;
                rooms::available_codes_for_editing(&floor, &rooms, &room)
            }
            None => rooms::available_codes(&floor, &rooms),
        };

        Ok(RoomCodeCandidates {
            floor_number: floor.number,
            codes,
        })
    }

    /// Validates and persists a new room, then marks the availability list
    /// stale.
    pub fn create_room(
        &self,
        property: PropertyId,
        draft: RoomDraft,
    ) -> Result<Room, LeasingServiceError> {
        let floor = self
            .repository
            .floor(draft.floor_id)?
            .filter(|floor| floor.property_id == property)
            .ok_or(RepositoryError::NotFound)?;
        let existing = self.repository.rooms_on_floor(floor.id)?;

        let validated = rooms::validate_draft(&draft, &floor, &existing, None)?;
        let stored = self.repository.insert_room(validated)?;

        self.cache
            .invalidate(InvalidationKey::AvailableRooms(floor.property_id));

        Ok(stored)
    }

    /// Tenants and rooms currently offerable on the contract form.
    pub fn contract_candidates(
        &self,
        property: PropertyId,
    ) -> Result<ContractCandidates, LeasingServiceError> {
        let tenants = self.repository.tenants(property)?;
        let rooms = self.repository.rooms(property)?;

        Ok(ContractCandidates {
            tenants: contracts::available_tenants(&tenants)
                .into_iter()
                .cloned()
                .collect(),
            rooms: contracts::available_rooms(&rooms)
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    /// Validates and persists a new contract. Room and tenant availability
    /// are re-checked against the repository before committing; candidate
    /// lists fetched earlier may be stale.
    pub fn create_contract(
        &self,
        property: PropertyId,
        draft: ContractDraft,
    ) -> Result<Contract, LeasingServiceError> {
        let validated = contracts::validate_draft(&draft)?;

        let room = self
            .repository
            .room(validated.room_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !room.is_available() {
            return Err(LeasingServiceError::RoomUnavailable(room.id));
        }

        let tenant = self
            .repository
            .tenant(validated.tenant_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !tenant.is_available() {
            return Err(LeasingServiceError::TenantUnavailable(tenant.id));
        }

        let stored = self.repository.insert_contract(property, validated)?;
        self.repository
            .update_room_status(stored.room_id, RoomStatus::Ocupada)?;
        self.repository.claim_tenant(stored.tenant_id)?;

        for key in [
            InvalidationKey::ContractList(property),
            InvalidationKey::AvailableRooms(property),
            InvalidationKey::AvailableTenants(property),
        ] {
            self.cache.invalidate(key);
        }

        Ok(stored)
    }

    /// Finalizes a contract: persists the CANCELADO state, frees the room,
    /// releases the tenant, voids pending invoices, and emits the five
    /// invalidation keys.
    pub fn finalize_contract(
        &self,
        property: PropertyId,
        id: ContractId,
    ) -> Result<FinalizeReceipt, LeasingServiceError> {
        let contract = self
            .repository
            .contract(id)?
            .filter(|contract| contract.property_id == property)
            .ok_or(RepositoryError::NotFound)?;

        let outcome = contracts::finalize(&contract)?;

        self.repository.update_contract(outcome.contract.clone())?;
        self.repository
            .update_room_status(contract.room_id, RoomStatus::Disponible)?;
        self.repository.release_tenant(contract.tenant_id)?;
        let cancelled_invoices = self.repository.cancel_pending_invoices(contract.id)?;

        let mut invalidated = Vec::with_capacity(outcome.invalidations.len());
        for key in outcome.invalidations {
            self.cache.invalidate(key);
            invalidated.push(key.cache_key());
        }

        Ok(FinalizeReceipt {
            contract: outcome.contract,
            cancelled_invoices,
            invalidated,
        })
    }

    /// Records the signature on an ACTIVO, unsigned contract.
    pub fn sign_contract(
        &self,
        property: PropertyId,
        id: ContractId,
    ) -> Result<Contract, LeasingServiceError> {
        let mut contract = self
            .repository
            .contract(id)?
            .filter(|contract| contract.property_id == property)
            .ok_or(RepositoryError::NotFound)?;

        if !contract.can_sign() {
            return Err(LeasingServiceError::SignatureNotAllowed(id));
        }

        contract.signed = true;
        self.repository.update_contract(contract.clone())?;

        self.cache
            .invalidate(InvalidationKey::ContractDetail(
                contract.property_id,
                contract.id,
            ));
        self.cache
            .invalidate(InvalidationKey::ContractList(contract.property_id));

        Ok(contract)
    }
}

/// Error raised by the leasing service.
#[derive(Debug, thiserror::Error)]
pub enum LeasingServiceError {
    #[error(transparent)]
    Room(#[from] RoomValidationError),
    #[error(transparent)]
    Contract(#[from] ContractValidationError),
    #[error(transparent)]
    State(#[from] ContractStateError),
    #[error("room {0} is no longer available")]
    RoomUnavailable(RoomId),
    #[error("tenant {0} already has an active contract")]
    TenantUnavailable(TenantId),
    #[error("contract {0} cannot be signed in its current state")]
    SignatureNotAllowed(ContractId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
