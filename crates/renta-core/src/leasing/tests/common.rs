use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::leasing::contracts::NewContract;
use crate::leasing::domain::{
    Contract, ContractId, ContractState, Floor, FloorId, Invoice, InvoiceId, InvoiceStatus,
    PropertyId, Room, RoomId, RoomStatus, Tenant, TenantId,
};
use crate::leasing::invalidation::{CacheInvalidator, InvalidationKey};
use crate::leasing::repository::{PortfolioRepository, RepositoryError};
use crate::leasing::rooms::NewRoom;
use crate::leasing::service::LeasingService;

pub(super) const PROPERTY: PropertyId = PropertyId(7);

pub(super) fn floor_two() -> Floor {
    Floor {
        id: FloorId(2),
        property_id: PROPERTY,
        number: 2,
    }
}

pub(super) fn room(id: u64, code: u32, status: RoomStatus) -> Room {
    Room {
        id: RoomId(id),
        floor_id: FloorId(2),
        code,
        status,
        rent: 480.0,
    }
}

pub(super) fn seeded_rooms() -> Vec<Room> {
    vec![
        room(21, 201, RoomStatus::Ocupada),
        room(22, 202, RoomStatus::Disponible),
    ]
}

pub(super) fn tenant(id: u64, name: &str, active_contracts: u32) -> Tenant {
    Tenant {
        id: TenantId(id),
        property_id: PROPERTY,
        full_name: name.to_string(),
        dni: "40582931".to_string(),
        email: "tenant@example.com".to_string(),
        whatsapp: Some("987654321".to_string()),
        active_contracts,
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn active_contract(id: u64, tenant_id: u64, room_id: u64) -> Contract {
    Contract {
        id: ContractId(id),
        property_id: PROPERTY,
        tenant_id: TenantId(tenant_id),
        room_id: RoomId(room_id),
        state: ContractState::Activo,
        start_date: date(2026, 1, 1),
        end_date: date(2026, 12, 31),
        deposit: 500.0,
        signed: false,
    }
}

pub(super) fn invoice(id: u64, contract_id: u64, status: InvoiceStatus) -> Invoice {
    Invoice {
        id: InvoiceId(id),
        contract_id: ContractId(contract_id),
        property_id: PROPERTY,
        period: "2026-02".to_string(),
        status,
    }
}

#[derive(Default)]
struct PortfolioState {
    floors: HashMap<FloorId, Floor>,
    rooms: HashMap<RoomId, Room>,
    tenants: HashMap<TenantId, Tenant>,
    contracts: HashMap<ContractId, Contract>,
    invoices: HashMap<InvoiceId, Invoice>,
}

fn next_id(keys: impl Iterator<Item = u64>) -> u64 {
    keys.max().unwrap_or(0) + 1
}

/// In-memory stand-in for the system of record, enforcing the same
/// uniqueness and availability rules on insert.
#[derive(Default)]
pub(super) struct MemoryPortfolio {
    state: Mutex<PortfolioState>,
}

impl MemoryPortfolio {
    pub(super) fn add_floor(&self, floor: Floor) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        state.floors.insert(floor.id, floor);
    }

    pub(super) fn add_room(&self, room: Room) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        state.rooms.insert(room.id, room);
    }

    pub(super) fn add_tenant(&self, tenant: Tenant) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        state.tenants.insert(tenant.id, tenant);
    }

    pub(super) fn add_contract(&self, contract: Contract) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        state.contracts.insert(contract.id, contract);
    }

    pub(super) fn add_invoice(&self, invoice: Invoice) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        state.invoices.insert(invoice.id, invoice);
    }
}

impl PortfolioRepository for MemoryPortfolio {
    fn floor(&self, id: FloorId) -> Result<Option<Floor>, RepositoryError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        Ok(state.floors.get(&id).cloned())
    }

    fn room(&self, id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        Ok(state.rooms.get(&id).cloned())
    }

    fn tenant(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        Ok(state.tenants.get(&id).cloned())
    }

    fn contract(&self, id: ContractId) -> Result<Option<Contract>, RepositoryError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        Ok(state.contracts.get(&id).cloned())
    }

    fn rooms_on_floor(&self, floor: FloorId) -> Result<Vec<Room>, RepositoryError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        let mut rooms: Vec<Room> = state
            .rooms
            .values()
            .filter(|room| room.floor_id == floor)
            .cloned()
            .collect();
        rooms.sort_by_key(|room| room.code);
        Ok(rooms)
    }

    fn rooms(&self, property: PropertyId) -> Result<Vec<Room>, RepositoryError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        let floor_ids: Vec<FloorId> = state
            .floors
            .values()
            .filter(|floor| floor.property_id == property)
            .map(|floor| floor.id)
            .collect();
        let mut rooms: Vec<Room> = state
            .rooms
            .values()
            .filter(|room| floor_ids.contains(&room.floor_id))
            .cloned()
            .collect();
        rooms.sort_by_key(|room| room.code);
        Ok(rooms)
    }

    fn tenants(&self, property: PropertyId) -> Result<Vec<Tenant>, RepositoryError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        let mut tenants: Vec<Tenant> = state
            .tenants
            .values()
            .filter(|tenant| tenant.property_id == property)
            .cloned()
            .collect();
        tenants.sort_by_key(|tenant| tenant.id);
        Ok(tenants)
    }

    fn invoices(&self, property: PropertyId) -> Result<Vec<Invoice>, RepositoryError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        let mut invoices: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|invoice| invoice.property_id == property)
            .cloned()
            .collect();
        invoices.sort_by_key(|invoice| invoice.id);
        Ok(invoices)
    }

    fn insert_room(&self, room: NewRoom) -> Result<Room, RepositoryError> {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        if !state.floors.contains_key(&room.floor_id) {
            return Err(RepositoryError::NotFound);
        }
        let taken = state
            .rooms
            .values()
            .any(|existing| existing.floor_id == room.floor_id && existing.code == room.code);
        if taken {
            return Err(RepositoryError::Conflict);
        }

        let id = RoomId(next_id(state.rooms.keys().map(|key| key.0)));
        let stored = Room {
            id,
            floor_id: room.floor_id,
            code: room.code,
            status: room.status,
            rent: room.rent,
        };
        state.rooms.insert(id, stored.clone());
        Ok(stored)
    }

    fn insert_contract(
        &self,
        property: PropertyId,
        contract: NewContract,
    ) -> Result<Contract, RepositoryError> {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");

        let room = state
            .rooms
            .get(&contract.room_id)
            .ok_or(RepositoryError::NotFound)?;
        if room.status != RoomStatus::Disponible {
            return Err(RepositoryError::Conflict);
        }

        let tenant = state
            .tenants
            .get(&contract.tenant_id)
            .ok_or(RepositoryError::NotFound)?;
        if tenant.active_contracts > 0 {
            return Err(RepositoryError::Conflict);
        }

        let id = ContractId(next_id(state.contracts.keys().map(|key| key.0)));
        let stored = Contract {
            id,
            property_id: property,
            tenant_id: contract.tenant_id,
            room_id: contract.room_id,
            state: ContractState::Activo,
            start_date: contract.start_date,
            end_date: contract.end_date,
            deposit: contract.deposit,
            signed: false,
        };
        state.contracts.insert(id, stored.clone());
        Ok(stored)
    }

    fn update_contract(&self, contract: Contract) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        if !state.contracts.contains_key(&contract.id) {
            return Err(RepositoryError::NotFound);
        }
        state.contracts.insert(contract.id, contract);
        Ok(())
    }

    fn update_room_status(&self, id: RoomId, status: RoomStatus) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        let room = state.rooms.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        room.status = status;
        Ok(())
    }

    fn claim_tenant(&self, id: TenantId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        let tenant = state.tenants.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        tenant.active_contracts += 1;
        Ok(())
    }

    fn release_tenant(&self, id: TenantId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        let tenant = state.tenants.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        tenant.active_contracts = tenant.active_contracts.saturating_sub(1);
        Ok(())
    }

    fn cancel_pending_invoices(&self, contract: ContractId) -> Result<u32, RepositoryError> {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        let mut cancelled = 0;
        for invoice in state.invoices.values_mut() {
            if invoice.contract_id == contract && invoice.status == InvoiceStatus::Pendiente {
                invoice.status = InvoiceStatus::Anulada;
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }
}

/// Records invalidations so tests can assert the exact staleness set.
#[derive(Default)]
pub(super) struct RecordingInvalidator {
    keys: Mutex<Vec<InvalidationKey>>,
}

impl RecordingInvalidator {
    pub(super) fn keys(&self) -> Vec<InvalidationKey> {
        self.keys.lock().expect("invalidator mutex poisoned").clone()
    }
}

impl CacheInvalidator for RecordingInvalidator {
    fn invalidate(&self, key: InvalidationKey) {
        self.keys
            .lock()
            .expect("invalidator mutex poisoned")
            .push(key);
    }
}

/// Portfolio seeded with the floor-two scenario: rooms 201 (occupied) and
/// 202 (free), one free tenant, one tenant already under contract.
pub(super) fn seeded_portfolio() -> Arc<MemoryPortfolio> {
    let portfolio = Arc::new(MemoryPortfolio::default());
    portfolio.add_floor(floor_two());
    for room in seeded_rooms() {
        portfolio.add_room(room);
    }
    portfolio.add_tenant(tenant(1, "María Quispe", 0));
    portfolio.add_tenant(tenant(2, "Jorge Huamán", 1));
    portfolio
}

pub(super) fn build_service() -> (
    LeasingService<MemoryPortfolio, RecordingInvalidator>,
    Arc<MemoryPortfolio>,
    Arc<RecordingInvalidator>,
) {
    let portfolio = seeded_portfolio();
    let cache = Arc::new(RecordingInvalidator::default());
    let service = LeasingService::new(portfolio.clone(), cache.clone());
    (service, portfolio, cache)
}
