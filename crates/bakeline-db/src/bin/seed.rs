//! # Seed Data Generator
//!
//! Sets up a tenant for development: default code formats for every series
//! and a small bakery menu.
//!
//! ## Usage
//! ```bash
//! # Seed the default tenant
//! cargo run -p bakeline-db --bin seed
//!
//! # Specify database path and tenant
//! cargo run -p bakeline-db --bin seed -- --db ./data/bakeline.db --tenant shop-42
//! ```
//!
//! ## Generated Products
//! - Cakes (18% GST)
//! - Breads (exempt)
//! - Savouries and Cookies (5% / 18% GST)
//!
//! Codes are `{CATEGORY}-{INDEX}`, e.g. `CAK-001`.

use bakeline_core::sequence::CodeSeries;
use bakeline_core::{FoodType, Product, DEFAULT_TENANT_ID};
use bakeline_db::{Database, DbConfig};
use chrono::Utc;
use std::env;
use uuid::Uuid;

/// (code prefix, category, HSN, GST bps, items as (description, rate in paise, food type))
type MenuSection = (&'static str, &'static str, &'static str, u32, &'static [(&'static str, i64, FoodType)]);

const MENU: &[MenuSection] = &[
    (
        "CAK",
        "Cakes",
        "1905",
        1_800,
        &[
            ("Black Forest 500g", 45_000, FoodType::Veg),
            ("Black Forest 1kg", 85_000, FoodType::Veg),
            ("Pineapple Cake 500g", 40_000, FoodType::Veg),
            ("Plum Cake 1kg", 60_000, FoodType::Egg),
            ("Red Velvet 500g", 55_000, FoodType::Egg),
            ("Chocolate Truffle 1kg", 95_000, FoodType::Veg),
        ],
    ),
    (
        "BRD",
        "Breads",
        "1905",
        0,
        &[
            ("Ladi Pav", 4_000, FoodType::Veg),
            ("Milk Bread", 4_500, FoodType::Veg),
            ("Brown Bread", 5_000, FoodType::Veg),
            ("Multigrain Loaf", 7_000, FoodType::Veg),
        ],
    ),
    (
        "SAV",
        "Savouries",
        "2106",
        500,
        &[
            ("Veg Puff", 2_500, FoodType::Veg),
            ("Egg Puff", 3_000, FoodType::Egg),
            ("Chicken Puff", 4_000, FoodType::NonVeg),
            ("Paneer Roll", 4_500, FoodType::Veg),
        ],
    ),
    (
        "CKE",
        "Cookies",
        "1905",
        1_800,
        &[
            ("Butter Cookies 250g", 12_000, FoodType::Veg),
            ("Nankhatai 250g", 11_000, FoodType::Veg),
            ("Choco Chip Cookies 250g", 14_000, FoodType::Egg),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./bakeline_dev.db");
    let mut tenant_id = String::from(DEFAULT_TENANT_ID);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tenant" | "-t" => {
                if i + 1 < args.len() {
                    tenant_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bakeline Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./bakeline_dev.db)");
                println!("  -t, --tenant <ID>    Tenant to seed (default: {})", DEFAULT_TENANT_ID);
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bakeline Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Tenant:   {}", tenant_id);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Code formats: persisted defaults, so later edits start from them
    for series in CodeSeries::ALL {
        let format = db.sequences().format(&tenant_id, series).await?;
        println!("  {:<14} {}", series.as_str(), format.format(1));
    }
    println!("✓ Code series ready");

    let existing = db.products().count(&tenant_id).await?;
    if existing > 0 {
        println!("⚠ Tenant already has {} products", existing);
        println!("  Skipping product seed to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Inserting products...");

    let start = std::time::Instant::now();
    let mut inserted = 0;

    for (prefix, category, hsn, bps, items) in MENU {
        for (index, (description, rate_paise, food_type)) in items.iter().enumerate() {
            let now = Utc::now();
            let product = Product {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant_id.clone(),
                code: format!("{}-{:03}", prefix, index + 1),
                description: description.to_string(),
                category: category.to_string(),
                hsn_code: hsn.to_string(),
                rate_paise: *rate_paise,
                stock_quantity: 50,
                tax_rate_bps: *bps,
                food_type: *food_type,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            db.products().insert(&product).await?;
            inserted += 1;
        }
        println!("  ✓ {}", category);
    }

    println!();
    println!(
        "✓ Inserted {} products in {:.2?}",
        inserted,
        start.elapsed()
    );
    println!();
    println!("🎉 Seed complete!");

    db.close().await;
    Ok(())
}
