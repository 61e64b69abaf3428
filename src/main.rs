use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;

use parking_ledger::{logging, Config, ParkingLedger, RentalRecord, Slot, VehicleClass};

#[derive(Parser)]
#[command(author, version, about = "Parking lot reservation ledger")]
struct Cli {
    /// SQLite database file (overrides PARKING_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append the full 9 × 5 slot grid. Run once per database.
    Init,
    /// List all slots
    Slots,
    /// Show hourly rates per vehicle class
    Rates,
    /// Add a single slot
    AddSlot {
        block: String,
        position: String,
        /// Store the slot as occupied
        #[arg(long)]
        unavailable: bool,
    },
    /// Park a vehicle in a slot
    Rent {
        block: String,
        position: String,
        vehicle_number: String,
        /// Car, Motorcycle or Bicycle
        vehicle_class: String,
    },
    /// Close a rental and print the price
    Exit {
        block: String,
        position: String,
        vehicle_number: String,
    },
    /// List all rental records
    Rentals,
    /// Export the rental ledger to CSV
    Export { output: PathBuf },
}

fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to read configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let ledger = ParkingLedger::open_sqlite(&config.db_path)
        .with_context(|| format!("Failed to open ledger at {}", config.db_path.display()))?;

    match cli.command {
        Command::Init => run_init(&ledger),
        Command::Slots => run_slots(&ledger),
        Command::Rates => run_rates(&ledger),
        Command::AddSlot {
            block,
            position,
            unavailable,
        } => run_add_slot(&ledger, &block, &position, unavailable),
        Command::Rent {
            block,
            position,
            vehicle_number,
            vehicle_class,
        } => run_rent(&ledger, &block, &position, &vehicle_number, &vehicle_class),
        Command::Exit {
            block,
            position,
            vehicle_number,
        } => run_exit(&ledger, &block, &position, &vehicle_number),
        Command::Rentals => run_rentals(&ledger),
        Command::Export { output } => run_export(&ledger, output),
    }
}

fn run_init(ledger: &ParkingLedger) -> Result<()> {
    let existing = ledger.list_slots()?.len();
    if existing > 0 {
        tracing::warn!(existing, "slots already present, grid will be appended again");
    }

    let slots = ledger.initialize_grid()?;
    println!("✓ Created {} slots", slots.len());
    Ok(())
}

fn run_slots(ledger: &ParkingLedger) -> Result<()> {
    let slots = ledger.list_slots()?;
    for slot in &slots {
        println!("{}", format_slot(slot));
    }

    let free = ledger.list_available_slots()?.len();
    println!("\n{} slots, {} available", slots.len(), free);
    Ok(())
}

fn run_rates(ledger: &ParkingLedger) -> Result<()> {
    for rate in ledger.list_vehicle_rates() {
        println!("{:<12} {:>6} / hour", rate.class, rate.rate);
    }
    Ok(())
}

fn run_add_slot(ledger: &ParkingLedger, block: &str, position: &str, unavailable: bool) -> Result<()> {
    let slot = Slot::new(block, position).with_availability(!unavailable);
    let stored = ledger.add_slot(slot)?;
    println!("✓ Added {}", format_slot(&stored));
    Ok(())
}

fn run_rent(
    ledger: &ParkingLedger,
    block: &str,
    position: &str,
    vehicle_number: &str,
    vehicle_class: &str,
) -> Result<()> {
    let rental = ledger
        .rent(block, position, vehicle_number, VehicleClass::parse(vehicle_class))
        .with_context(|| format!("Cannot rent {}/{} for {}", block, position, vehicle_number))?;

    println!("✓ Rental opened");
    println!("{}", format_rental(&rental));
    Ok(())
}

fn run_exit(ledger: &ParkingLedger, block: &str, position: &str, vehicle_number: &str) -> Result<()> {
    let rental = ledger
        .exit(block, position, vehicle_number)
        .with_context(|| format!("Cannot close {}/{} for {}", block, position, vehicle_number))?;

    println!("✓ Rental closed");
    println!("{}", format_rental(&rental));
    Ok(())
}

fn run_rentals(ledger: &ParkingLedger) -> Result<()> {
    let rentals = ledger.list_rentals()?;
    for rental in &rentals {
        println!("{}", format_rental(rental));
    }

    let open = rentals.iter().filter(|r| r.is_open()).count();
    println!("\n{} rentals, {} open", rentals.len(), open);
    Ok(())
}

fn run_export(ledger: &ParkingLedger, output: PathBuf) -> Result<()> {
    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let rows = ledger.export_rentals_csv(file)?;
    println!("✓ Exported {} rentals to {}", rows, output.display());
    Ok(())
}

fn format_slot(slot: &Slot) -> String {
    format!(
        "{:<4} {:<3} {:<10} {}",
        slot.block,
        slot.position,
        if slot.available { "available" } else { "occupied" },
        slot.id
    )
}

fn format_rental(rental: &RentalRecord) -> String {
    let price = match rental.price {
        Some(price) => price.to_string(),
        None => "open".to_string(),
    };
    format!(
        "{}  {}/{}  {} ({})  since {}  price: {}",
        rental.id,
        rental.slot.block,
        rental.slot.position,
        rental.vehicle.number,
        rental.vehicle.class,
        rental.started_at().format("%Y-%m-%d %H:%M:%S"),
        price
    )
}
