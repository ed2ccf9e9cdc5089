use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use slotbook::application::engine::BookingEngine;
use slotbook::application::scheduler::{DEFAULT_SWEEP_PERIOD, HoldExpirySweeper};
use slotbook::domain::order::{Money, Proof, RequesterId};
use slotbook::domain::ports::{OrderStoreBox, SlotStoreBox};
use slotbook::domain::settings::BookingSettings;
use slotbook::error::BookingError;
use slotbook::infrastructure::in_memory::{
    InMemoryOrderStore, InMemorySlotStore, OpenAvailability, StaticSettings, SystemClock,
};
#[cfg(feature = "storage-rocksdb")]
use slotbook::infrastructure::rocksdb::RocksDBStore;
use slotbook::interfaces::csv::command_reader::{Command, CommandOp, CommandReader};
use slotbook::interfaces::csv::order_writer::OrderWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input booking commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Minutes an unconfirmed reservation is held before expiring
    #[arg(long, default_value_t = 15)]
    hold_minutes: u32,

    /// Flat hourly rate; 0 disables pricing
    #[arg(long, default_value = "0")]
    price_per_hour: Decimal,

    /// Payment QR reference copied onto each order
    #[arg(long, default_value = "")]
    pay_qr_url: String,

    /// Hours of bookable slots to keep ahead of now
    #[arg(long, default_value_t = 72)]
    horizon_hours: u32,
}

fn build_stores(db_path: Option<PathBuf>) -> Result<(SlotStoreBox, OrderStoreBox)> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok((Box::new(store.clone()), Box::new(store)))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok((
                Box::new(InMemorySlotStore::new()),
                Box::new(InMemoryOrderStore::new()),
            ))
        }
        None => Ok((
            Box::new(InMemorySlotStore::new()),
            Box::new(InMemoryOrderStore::new()),
        )),
    }
}

async fn apply(engine: &BookingEngine, cmd: Command) -> slotbook::error::Result<()> {
    match cmd.op {
        CommandOp::Reserve => {
            let start = cmd.start.ok_or_else(|| {
                BookingError::Validation("reserve requires a start time".to_string())
            })?;
            engine.reserve(RequesterId::new(cmd.requester), start).await?;
        }
        CommandOp::Cancel => {
            let requester = RequesterId::new(cmd.requester);
            let order = engine.active_order(&requester).await?.ok_or_else(|| {
                BookingError::Validation(format!("no active order for requester {requester}"))
            })?;
            engine.cancel(order.id).await?;
        }
        CommandOp::Proof => {
            let requester = RequesterId::new(cmd.requester);
            let order = engine.active_order(&requester).await?.ok_or_else(|| {
                BookingError::Validation(format!("no active order for requester {requester}"))
            })?;
            let proof = Proof {
                image_url: cmd.image.unwrap_or_default(),
                note: cmd.note.unwrap_or_default(),
            };
            engine.submit_proof(order.id, vec![proof]).await?;
        }
        CommandOp::Sweep => {
            engine.expire_due().await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = BookingSettings {
        hold_minutes: cli.hold_minutes,
        price_per_hour: Money::new(cli.price_per_hour),
        pay_qr_url: cli.pay_qr_url,
    };

    let (slot_store, order_store) = build_stores(cli.db_path)?;
    let engine = Arc::new(
        BookingEngine::new(
            slot_store,
            order_store,
            Box::new(StaticSettings::new(settings)),
            Box::new(OpenAvailability),
            Box::new(SystemClock),
        )
        .with_horizon(cli.horizon_hours),
    );
    engine.ensure_horizon().await.into_diagnostic()?;

    let _sweeper = HoldExpirySweeper::new(engine.clone(), DEFAULT_SWEEP_PERIOD).spawn();

    // Replay the booking script
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for cmd_result in reader.commands() {
        match cmd_result {
            Ok(cmd) => {
                if let Err(e) = apply(&engine, cmd).await {
                    eprintln!("Error processing command: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    // Output the final order book
    let orders = engine.order_book().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(&orders).into_diagnostic()?;

    Ok(())
}
