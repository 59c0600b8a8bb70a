//! # Seed Data Generator
//!
//! Populates the database with warung-style products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database at KASIR_DATABASE_PATH (default ./kasir.db)
//! cargo run -p kasir-db --bin seed
//!
//! # Specify database path and keep only the first N products
//! cargo run -p kasir-db --bin seed -- --db ./data/dev.db --count 20
//!
//! # More log output
//! RUST_LOG=debug cargo run -p kasir-db --bin seed
//! ```
//!
//! ## Generated Data
//! - Categories: Makanan, Minuman, Sembako, Kebutuhan Rumah
//! - Products with EAN-13-shaped barcodes, a purchase price of 75-85% of the
//!   selling price, wholesale tiers on noodles and drinks, and bundle sizes
//!   for items sold by the carton or renteng
//! - A few restock purchases in the current month

use chrono::{Duration, Utc};
use kasir_core::Money;
use kasir_db::{AppConfig, Database, ProductDraft};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (category, name, unit price, wholesale (price, threshold), bundle size)
type SeedProduct = (&'static str, &'static str, i64, Option<(i64, i64)>, Option<i64>);

const PRODUCTS: &[SeedProduct] = &[
    ("Makanan", "Indomie Goreng", 3500, Some((3000, 10)), Some(40)),
    ("Makanan", "Indomie Soto", 3500, Some((3000, 10)), Some(40)),
    ("Makanan", "Mie Sedaap Goreng", 3500, Some((3100, 10)), Some(40)),
    ("Makanan", "Chitato 68g", 11000, None, None),
    ("Makanan", "Roma Kelapa", 9500, None, None),
    ("Makanan", "Beng-Beng", 2500, Some((2200, 20)), Some(20)),
    ("Minuman", "Aqua 600ml", 3000, Some((2500, 24)), Some(24)),
    ("Minuman", "Teh Pucuk Harum", 4000, Some((3500, 24)), Some(24)),
    ("Minuman", "Kopi Kapal Api Mix", 1500, Some((1300, 10)), Some(10)),
    ("Minuman", "Good Day Cappuccino", 2000, Some((1700, 10)), Some(10)),
    ("Minuman", "Coca-Cola 390ml", 6000, None, Some(12)),
    ("Sembako", "Beras Ramos 5kg", 72000, None, None),
    ("Sembako", "Gula Pasir 1kg", 17500, None, None),
    ("Sembako", "Minyak Bimoli 2L", 38000, None, Some(6)),
    ("Sembako", "Telur Ayam (butir)", 2200, Some((2000, 30)), Some(30)),
    ("Kebutuhan Rumah", "Rinso 770g", 24000, None, None),
    ("Kebutuhan Rumah", "Sunlight 755ml", 16000, None, Some(12)),
    ("Kebutuhan Rumah", "Pepsodent 190g", 13500, None, None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,kasir=debug,sqlx=warn")),
        )
        .init();

    let mut config = AppConfig::from_env()?;
    let mut count = PRODUCTS.len();

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasir POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to insert (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: KASIR_DATABASE_PATH or ./kasir.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(
        store = %config.store_name,
        database = %config.database_path.display(),
        "Seeding store"
    );

    let db = Database::new(config.db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(
            existing,
            "Database already has products; skipping seed. Delete the file to regenerate."
        );
        return Ok(());
    }

    let start = std::time::Instant::now();

    let mut categories = std::collections::HashMap::new();
    for (category, ..) in PRODUCTS {
        if !categories.contains_key(category) {
            let stored = db.categories().insert(category).await?;
            categories.insert(*category, stored.id);
        }
    }

    let mut generated = 0;
    for (index, (category, name, unit_price, wholesale, bundle_size)) in
        PRODUCTS.iter().take(count).enumerate()
    {
        let draft = ProductDraft {
            name: name.to_string(),
            barcode: format!("899{:010}", index * 7919 + 1000),
            category_id: categories.get(category).cloned(),
            unit_price: Money::from_rupiah(*unit_price),
            purchase_price: Money::from_rupiah(unit_price * (75 + (index as i64 % 11)) / 100),
            wholesale_price: wholesale.map(|(price, _)| Money::from_rupiah(price)),
            wholesale_threshold: wholesale.map(|(_, threshold)| threshold),
            stock_quantity: ((index * 37) % 120) as i64 + 5,
            bundle_size: *bundle_size,
        };

        match db.products().insert(&draft).await {
            Ok(product) => {
                generated += 1;
                info!(name = %product.name, price = %product.unit_price, "Inserted product");
            }
            Err(e) => warn!(name = %draft.name, error = %e, "Failed to insert product"),
        }
    }

    let today = Utc::now();
    for (days_ago, amount, note) in [
        (6, 850_000, "Agen mi instan"),
        (3, 420_000, "Air mineral dan teh"),
        (1, 1_250_000, "Sembako bulanan"),
    ] {
        db.restocks()
            .insert(today - Duration::days(days_ago), Money::from_rupiah(amount), note)
            .await?;
    }

    info!(
        products = generated,
        categories = categories.len(),
        elapsed = ?start.elapsed(),
        "Seed complete"
    );

    let search_results = db.products().search("indomie", 10).await?;
    info!(results = search_results.len(), "Search 'indomie'");

    Ok(())
}
