use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for a managed property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(pub u64);

/// Identifier wrapper for a floor within a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FloorId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvoiceId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FloorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Occupancy status of a room, mirroring the backend's Spanish labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Disponible,
    Ocupada,
}

impl RoomStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disponible => "DISPONIBLE",
            Self::Ocupada => "OCUPADA",
        }
    }
}

/// Lifecycle state of a contract. Created ACTIVO; finalize moves it to
/// CANCELADO, a terminal state with no reactivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractState {
    Activo,
    Cancelado,
}

impl ContractState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Activo => "ACTIVO",
            Self::Cancelado => "CANCELADO",
        }
    }
}

/// Payment status of an invoice. PENDIENTE invoices are moved to ANULADA
/// when their contract is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pendiente,
    Pagada,
    Vencida,
    Anulada,
}

impl InvoiceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendiente => "PENDIENTE",
            Self::Pagada => "PAGADA",
            Self::Vencida => "VENCIDA",
            Self::Anulada => "ANULADA",
        }
    }
}

/// A numbered level of a property. The floor number fixes the code
/// namespace of its rooms: codes live in `[number*100 + 1, number*100 + 8]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub property_id: PropertyId,
    pub number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub floor_id: FloorId,
    pub code: u32,
    pub status: RoomStatus,
    pub rent: f64,
}

impl Room {
    pub fn is_available(&self) -> bool {
        self.status == RoomStatus::Disponible
    }
}

/// Tenant snapshot as served by the system of record. `active_contracts`
/// counts contracts currently in ACTIVO state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub property_id: PropertyId,
    pub full_name: String,
    pub dni: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub active_contracts: u32,
}

impl Tenant {
    pub fn is_available(&self) -> bool {
        self.active_contracts == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub property_id: PropertyId,
    pub tenant_id: TenantId,
    pub room_id: RoomId,
    pub state: ContractState,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub deposit: f64,
    pub signed: bool,
}

impl Contract {
    pub fn is_active(&self) -> bool {
        self.state == ContractState::Activo
    }

    /// The "sign" action is offered only while the contract is ACTIVO and
    /// still unsigned; the flag never affects the lifecycle itself.
    pub fn can_sign(&self) -> bool {
        self.is_active() && !self.signed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub contract_id: ContractId,
    pub property_id: PropertyId,
    /// Billing period in `YYYY-MM` form.
    pub period: String,
    pub status: InvoiceStatus,
}

impl Invoice {
    pub fn is_pending(&self) -> bool {
        self.status == InvoiceStatus::Pendiente
    }
}
