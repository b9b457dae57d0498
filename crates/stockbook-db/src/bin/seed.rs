//! # Seed Data Generator
//!
//! Fills a workbook's inventory sheet with demo products.
//!
//! ## Usage
//! ```bash
//! # 50 products into ./stockbook.db (default)
//! cargo run -p stockbook-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p stockbook-db --bin seed -- --count 200 --db ./data/stockbook.db
//! ```
//!
//! The first two products are always `CAM001` (Camisa, 10 @ 5.00, min 3)
//! and `PAN001` (Pantalon, 4 @ 12.50, min 2). Codes already present in the
//! sheet are skipped, so running the tool twice adds nothing.

use std::collections::HashSet;
use std::env;

use stockbook_core::Product;
use stockbook_db::{InventoryRepository, SqliteConfig, SqliteStore};

/// Product families for generated codes.
const FAMILIES: &[(&str, &[&str])] = &[
    ("CAM", &["Camisa", "Camiseta", "Camisola"]),
    ("PAN", &["Pantalon", "Pantalon corto", "Jean"]),
    ("ZAP", &["Zapatilla", "Zapato", "Sandalia"]),
    ("GOR", &["Gorra", "Sombrero", "Boina"]),
    ("MED", &["Medias", "Calcetin", "Panty"]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./stockbook.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 50)");
                println!("  -d, --db <PATH>    Workbook file path (default: ./stockbook.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockbook Seed Data Generator");
    println!("=============================");
    println!("Workbook: {}", db_path);
    println!("Products: {}", count);
    println!();

    let store = SqliteStore::connect(SqliteConfig::new(&db_path)).await?;
    let inventory = InventoryRepository::new(store.clone());

    println!("✓ Connected to workbook");

    let existing: HashSet<String> = inventory
        .get_all()
        .await?
        .into_iter()
        .map(|p| p.code)
        .collect();

    let fresh: Vec<Product> = generate_products(count)
        .into_iter()
        .filter(|p| !existing.contains(&p.code))
        .collect();

    if fresh.is_empty() {
        println!("⚠ Every generated code is already in the sheet; nothing to add.");
        return Ok(());
    }

    inventory.add_products(&fresh).await?;

    println!(
        "✓ Added {} products ({} already present)",
        fresh.len(),
        count - fresh.len()
    );

    let low = fresh.iter().filter(|p| p.is_low_stock()).count();
    println!("  {} of them start at or below their minimum stock", low);

    store.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds `count` demo products, starting with the two fixed ones.
fn generate_products(count: usize) -> Vec<Product> {
    let fixed = [
        product(1, "CAM001", "Camisa", 10, 500, 3),
        product(2, "PAN001", "Pantalon", 4, 1250, 2),
    ];
    let first_generated_id = fixed.len() + 1;

    let generated = FAMILIES
        .iter()
        .flat_map(|(prefix, names)| names.iter().map(move |name| (*prefix, *name)))
        .cycle()
        .enumerate()
        .map(move |(seed, (prefix, name))| {
            let id = seed + first_generated_id;
            product(
                id,
                &format!("{}{:03}", prefix, id),
                name,
                (seed * 7 % 40) as i64,
                299 + (seed * 173 % 4000) as i64,
                (seed % 6) as i64,
            )
        });

    fixed.into_iter().chain(generated).take(count).collect()
}

fn product(id: usize, code: &str, name: &str, quantity: i64, price_cents: i64, min_stock: i64) -> Product {
    Product {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
        quantity,
        unit_price_cents: price_cents,
        min_stock,
        last_updated: None,
    }
}
