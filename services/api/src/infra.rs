use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use renta_core::leasing::contracts::NewContract;
use renta_core::leasing::domain::{
    Contract, ContractId, ContractState, Floor, FloorId, Invoice, InvoiceId, InvoiceStatus,
    PropertyId, Room, RoomId, RoomStatus, Tenant, TenantId,
};
use renta_core::leasing::invalidation::{CacheInvalidator, InvalidationKey};
use renta_core::leasing::repository::{PortfolioRepository, RepositoryError};
use renta_core::leasing::rooms::NewRoom;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
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

/// In-memory system of record backing the service. Enforces code
/// uniqueness and availability on insert, so a submission losing a race
/// between candidate fetch and commit is answered with a conflict.
#[derive(Default)]
pub(crate) struct InMemoryPortfolio {
    state: Mutex<PortfolioState>,
}

impl InMemoryPortfolio {
    pub(crate) fn add_floor(&self, floor: Floor) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        state.floors.insert(floor.id, floor);
    }

    pub(crate) fn add_room(&self, room: Room) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        state.rooms.insert(room.id, room);
    }

    pub(crate) fn add_tenant(&self, tenant: Tenant) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        state.tenants.insert(tenant.id, tenant);
    }

    pub(crate) fn add_invoice(&self, invoice: Invoice) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        state.invoices.insert(invoice.id, invoice);
    }
}

impl PortfolioRepository for InMemoryPortfolio {
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

/// Cache invalidation adapter that only reports. The response cache lives
/// client-side; the service's job ends at naming the stale views.
#[derive(Default, Clone)]
pub(crate) struct TracingInvalidator;

impl CacheInvalidator for TracingInvalidator {
    fn invalidate(&self, key: InvalidationKey) {
        info!(key = %key.cache_key(), "cache view invalidated");
    }
}

pub(crate) const DEMO_PROPERTY: PropertyId = PropertyId(1);

/// Seeds the demo portfolio: two floors, a handful of rooms, one tenant
/// free and one already under contract.
pub(crate) fn demo_portfolio() -> Arc<InMemoryPortfolio> {
    let portfolio = Arc::new(InMemoryPortfolio::default());

    portfolio.add_floor(Floor {
        id: FloorId(1),
        property_id: DEMO_PROPERTY,
        number: 1,
    });
    portfolio.add_floor(Floor {
        id: FloorId(2),
        property_id: DEMO_PROPERTY,
        number: 2,
    });

    portfolio.add_room(Room {
        id: RoomId(11),
        floor_id: FloorId(1),
        code: 101,
        status: RoomStatus::Ocupada,
        rent: 430.0,
    });
    portfolio.add_room(Room {
        id: RoomId(12),
        floor_id: FloorId(1),
        code: 102,
        status: RoomStatus::Disponible,
        rent: 430.0,
    });
    portfolio.add_room(Room {
        id: RoomId(21),
        floor_id: FloorId(2),
        code: 201,
        status: RoomStatus::Ocupada,
        rent: 480.0,
    });
    portfolio.add_room(Room {
        id: RoomId(22),
        floor_id: FloorId(2),
        code: 202,
        status: RoomStatus::Disponible,
        rent: 450.0,
    });

    portfolio.add_tenant(Tenant {
        id: TenantId(1),
        property_id: DEMO_PROPERTY,
        full_name: "María Quispe".to_string(),
        dni: "40582931".to_string(),
        email: "maria.quispe@example.com".to_string(),
        whatsapp: Some("987654321".to_string()),
        active_contracts: 0,
    });
    portfolio.add_tenant(Tenant {
        id: TenantId(2),
        property_id: DEMO_PROPERTY,
        full_name: "Jorge Huamán".to_string(),
        dni: "41776204".to_string(),
        email: "jorge.huaman@example.com".to_string(),
        whatsapp: None,
        active_contracts: 1,
    });

    portfolio
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
