use crate::infra::{demo_portfolio, parse_date, TracingInvalidator, DEMO_PROPERTY};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use renta_core::error::AppError;
use renta_core::leasing::contracts::ContractDraft;
use renta_core::leasing::domain::{FloorId, Invoice, InvoiceId, InvoiceStatus};
use renta_core::leasing::rooms::RoomDraft;
use renta_core::leasing::service::LeasingService;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Contract start date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Contract end date (YYYY-MM-DD). Defaults to start_date + 365 days.
    #[arg(long, value_parser = parse_date)]
    pub(crate) end_date: Option<NaiveDate>,
    /// Deposit captured on the contract form.
    #[arg(long, default_value = "500.00")]
    pub(crate) deposit: String,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        start_date,
        end_date,
        deposit,
    } = args;

    let start_date = start_date.unwrap_or_else(|| Local::now().date_naive());
    let end_date = end_date.unwrap_or(start_date + Duration::days(365));

    let portfolio = demo_portfolio();
    let cache = Arc::new(TracingInvalidator);
    let service = LeasingService::new(portfolio.clone(), cache);

    println!("Rental operations demo");
    println!("Property 1, floor 2");

    let candidates = service.room_code_candidates(DEMO_PROPERTY, FloorId(2), None)?;
    println!("\nFree room codes: {:?}", candidates.codes);

    let room = service.create_room(
        DEMO_PROPERTY,
        RoomDraft {
            floor_id: FloorId(2),
            code: "203".to_string(),
            rent: "500.00".to_string(),
        },
    )?;
    println!(
        "Created room {} ({}, rent {:.2})",
        room.code,
        room.status.label(),
        room.rent
    );

    let offers = service.contract_candidates(DEMO_PROPERTY)?;
    println!("\nContract candidates");
    for tenant in &offers.tenants {
        println!("- tenant: {} (DNI {})", tenant.full_name, tenant.dni);
    }
    for candidate in &offers.rooms {
        println!("- room: {} (rent {:.2})", candidate.code, candidate.rent);
    }

    let Some(tenant) = offers.tenants.first() else {
        println!("\nNo tenant is free for a new contract; demo ends here.");
        return Ok(());
    };
    let contract = service.create_contract(
        DEMO_PROPERTY,
        ContractDraft {
            tenant_id: tenant.id.0,
            room_id: room.id.0,
            start_date: Some(start_date),
            end_date: Some(end_date),
            deposit,
        },
    )?;
    println!(
        "\nContract {} created: {} -> {}, deposit {:.2}, state {}",
        contract.id,
        contract.start_date,
        contract.end_date,
        contract.deposit,
        contract.state.label()
    );

    let signed = service.sign_contract(DEMO_PROPERTY, contract.id)?;
    println!("Contract {} signed: {}", signed.id, signed.signed);

    // The backend would raise the first invoice; seed one so the finalize
    // cascade has something to void.
    portfolio.add_invoice(Invoice {
        id: InvoiceId(1),
        contract_id: contract.id,
        property_id: DEMO_PROPERTY,
        period: format!("{}", contract.start_date.format("%Y-%m")),
        status: InvoiceStatus::Pendiente,
    });

    let receipt = service.finalize_contract(DEMO_PROPERTY, contract.id)?;
    println!(
        "\nContract {} finalized ({} pending invoice(s) voided)",
        receipt.contract.id, receipt.cancelled_invoices
    );
    println!("Views to refetch:");
    for key in &receipt.invalidated {
        println!("- {key}");
    }

    let offers = service.contract_candidates(DEMO_PROPERTY)?;
    println!(
        "\nAvailability restored: {} tenant(s), {} room(s) offerable",
        offers.tenants.len(),
        offers.rooms.len()
    );

    Ok(())
}
