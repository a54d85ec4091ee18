//! # Stocktrack - daily stock tracking for small kitchens
//!
//! Stocktrack keeps a catalog of stock-keeping items and a dated ledger of
//! stock movements on top of a single SQLite file.
//!
//! Stocktrack provides:
//! - A catalog of items, units of measure and categories with
//!   case-insensitive name uniqueness
//! - An append-only stock ledger that derives used quantity per entry
//! - Purchase price history recorded from priced shipments
//! - A command-line front end for data entry and daily review

pub mod model;
pub mod storage;
pub mod catalog;
pub mod ledger;
pub mod output;
pub mod config;
pub mod ui;


// Re-exports for convenient access
pub use model::{Category, Item, NewItem, NewStockEntry, PriceRecord, StockLogEntry, Unit};
pub use storage::Database;
pub use catalog::CatalogStore;
pub use ledger::{AppendedEntry, StockLedger};

/// Result type alias for Stocktrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Stocktrack operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{kind} already exists: {name}")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("Unknown {kind} id: {id}")]
    Reference { kind: EntityKind, id: i64 },

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("Item {item_id} is referenced by {entries} ledger rows")]
    InUse { item_id: i64, entries: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Database lock poisoned: {0}")]
    Lock(String),
}

/// The catalog entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Unit,
    Category,
    Item,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Unit => "unit",
            EntityKind::Category => "category",
            EntityKind::Item => "item",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
