//! # bakeline-core: Pure Business Logic for Bakeline
//!
//! Everything the billing counter computes lives here as pure functions:
//! money, GST splits, HSN summaries, amount in words, code sequences and
//! the cart reducer. No database, no network, no file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bakeline Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Browser front end (billing screens)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  billing-api (axum handlers)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ bakeline-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  money  │ │   gst   │ │  words  │ │ sequence │ │  cart  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bakeline-db (SQLite repositories)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Party, Product, Document, Draft, Agent)
//! - [`money`] - Money in paise with integer arithmetic
//! - [`gst`] - Line tax computation and HSN aggregation
//! - [`words`] - Amount in words (Indian numbering)
//! - [`invoice`] - Printable invoice model
//! - [`sequence`] - Code series parsing and next-code computation
//! - [`cart`] - Cart reducer and session persistence seam
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bakeline_core::money::Money;
//! use bakeline_core::words::amount_in_words;
//!
//! let total = Money::from_rupees(150_000);
//! assert_eq!(amount_in_words(total), "One Lakh Fifty Thousand Rupees Only");
//! ```

pub mod cart;
pub mod error;
pub mod gst;
pub mod invoice;
pub mod money;
pub mod sequence;
pub mod types;
pub mod validation;
pub mod words;

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

/// Tenant used by the seed binary and single-store installs.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum distinct products in one cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product line.
///
/// Counter staff type quantities by hand; this catches a stray extra zero.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Maximum unit rate in paise (₹1,00,000).
pub const MAX_RATE_PAISE: i64 = 10_000_000;

/// Customer name used when a bill carries no customer.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";
