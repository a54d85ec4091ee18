//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - units(unit_id, unit_name)
//! - categories(category_id, category_name)
//! - items(item_id, item_name, unit_id, category_id, is_daily_tracked)
//! - stock_log(id, date, item_id, quantities, reasons, price_per_unit, notes, used_qty)
//! - item_prices(price_id, item_id, date, price_per_unit, total_price, quantity)

pub mod schema;
pub mod sqlite;

pub use sqlite::{Database, DbStats};
