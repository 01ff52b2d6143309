//! # bakeline-db: Database Layer for Bakeline
//!
//! SQLite storage for every tenant's parties, products, documents, drafts,
//! agents and code settings, through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bakeline Data Flow                               │
//! │                                                                         │
//! │  billing-api handler (POST /documents/bill)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   bakeline-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│ sequence party │   │  (embedded)  │   │   │
//! │  │   │  SqlitePool   │    │ agent product  │   │ 001_initial  │   │   │
//! │  │   │               │    │ document draft │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (BAKELINE_DATABASE_PATH)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bakeline_db::{Database, DbConfig};
//! use bakeline_core::sequence::CodeSeries;
//!
//! let db = Database::new(DbConfig::new("bakeline.db")).await?;
//! let next = db.sequences().next_code(tenant, CodeSeries::Bill).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::agent::AgentRepository;
pub use repository::document::DocumentRepository;
pub use repository::draft::{DraftInput, DraftRepository};
pub use repository::party::PartyRepository;
pub use repository::product::{ProductQuery, ProductRepository};
pub use repository::sequence::SequenceRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use bakeline_core::{FoodType, PartyInput, Product};
    use chrono::Utc;
    use uuid::Uuid;

    use crate::{Database, DbConfig};

    pub const TENANT: &str = "tenant-a";

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn customer_input(name: &str, phone: &str) -> PartyInput {
        PartyInput {
            name: name.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }

    pub fn product(code: &str, description: &str, category: &str, rate_paise: i64, bps: u32) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            tenant_id: TENANT.to_string(),
            code: code.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            hsn_code: "1905".to_string(),
            rate_paise,
            stock_quantity: 10,
            tax_rate_bps: bps,
            food_type: FoodType::Veg,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
