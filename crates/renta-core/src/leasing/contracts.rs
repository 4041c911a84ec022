//! Contract creation validation and the finalize state machine.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{Contract, ContractId, ContractState, Room, RoomId, Tenant, TenantId};
use super::invalidation::{finalize_invalidations, InvalidationKey};
use super::rooms::parse_rent;

/// Raw contract form fields. Selects submit `0` when nothing is chosen;
/// date fields may arrive missing or as empty strings.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractDraft {
    #[serde(default)]
    pub tenant_id: u64,
    #[serde(default)]
    pub room_id: u64,
    #[serde(default, deserialize_with = "deserialize_form_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_form_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub deposit: String,
}

/// Validated creation payload for the system of record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewContract {
    pub tenant_id: TenantId,
    pub room_id: RoomId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub deposit: f64,
}

/// Rejection reasons for a contract submission, checked in declaration
/// order with short-circuit on the first failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractValidationError {
    #[error("tenant and room are required")]
    MissingParties,
    #[error("dates are required")]
    MissingDates,
    #[error("enter a valid deposit amount")]
    InvalidDeposit,
    #[error("end date must be after start date")]
    DateOrder,
}

/// Validates the creation form. The tenant/room, date presence, and deposit
/// checks mirror the system of record; the date ordering check is enforced
/// here as well.
pub fn validate_draft(draft: &ContractDraft) -> Result<NewContract, ContractValidationError> {
    if draft.tenant_id == 0 || draft.room_id == 0 {
        return Err(ContractValidationError::MissingParties);
    }

    let (start_date, end_date) = match (draft.start_date, draft.end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(ContractValidationError::MissingDates),
    };

    let deposit = parse_rent(&draft.deposit).ok_or(ContractValidationError::InvalidDeposit)?;

    if end_date <= start_date {
        return Err(ContractValidationError::DateOrder);
    }

    Ok(NewContract {
        tenant_id: TenantId(draft.tenant_id),
        room_id: RoomId(draft.room_id),
        start_date,
        end_date,
        deposit,
    })
}

/// Tenants offered as candidates for a new contract: no ACTIVO contract.
/// Presentation convenience only; the repository re-checks on insert.
pub fn available_tenants(tenants: &[Tenant]) -> Vec<&Tenant> {
    tenants.iter().filter(|tenant| tenant.is_available()).collect()
}

/// Rooms offered as candidates for a new contract: status DISPONIBLE.
pub fn available_rooms(rooms: &[Room]) -> Vec<&Room> {
    rooms.iter().filter(|room| room.is_available()).collect()
}

/// Illegal lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractStateError {
    #[error("contract {0} is already CANCELADO")]
    AlreadyCancelled(ContractId),
}

/// Result of finalizing a contract: the cancelled copy plus the exact set
/// of cached views the caller must refetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeOutcome {
    pub contract: Contract,
    pub invalidations: [InvalidationKey; 5],
}

/// The single one-way transition ACTIVO -> CANCELADO. CANCELADO is
/// terminal; finalizing twice is rejected, not absorbed.
pub fn finalize(contract: &Contract) -> Result<FinalizeOutcome, ContractStateError> {
    if !contract.is_active() {
        return Err(ContractStateError::AlreadyCancelled(contract.id));
    }

    let mut cancelled = contract.clone();
    cancelled.state = ContractState::Cancelado;

    Ok(FinalizeOutcome {
        invalidations: finalize_invalidations(cancelled.property_id, cancelled.id),
        contract: cancelled,
    })
}

pub(crate) fn deserialize_form_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}
