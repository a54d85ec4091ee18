//! Stock Ledger - dated stock movements and purchase prices
//!
//! Entries are append-only. Each append derives `used_qty` once and, for a
//! priced shipment, records the purchase in `item_prices` within the same
//! transaction.

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use serde::Serialize;
use crate::{EntityKind, Error, Result};
use crate::catalog::item_exists;
use crate::model::{NewStockEntry, PriceRecord, StockLogEntry};
use crate::storage::Database;

const ENTRY_SELECT: &str = r#"
SELECT l.id, l.date, l.item_id, i.item_name, u.unit_name,
       l.opening_stock, l.shipment_in, l.closing_stock,
       l.waste_qty, l.waste_reason, l.void_qty, l.void_reason,
       l.price_per_unit, l.notes, l.used_qty
FROM stock_log l
JOIN items i ON l.item_id = i.item_id
JOIN units u ON i.unit_id = u.unit_id
"#;

/// Outcome of appending one entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppendedEntry {
    pub entry_id: i64,
    pub used_qty: f64,
    /// Set when the entry was a priced shipment
    pub price_id: Option<i64>,
}

/// Append-only ledger of stock movements
pub struct StockLedger<'a> {
    db: &'a Database,
}

impl<'a> StockLedger<'a> {
    /// Create a ledger over an open database
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record one stock movement and return the derived usage
    pub fn append_entry(&self, entry: &NewStockEntry) -> Result<AppendedEntry> {
        entry.validate()?;
        let used_qty = entry.used_qty();

        self.db.write(|tx| {
            if !item_exists(tx, entry.item_id)? {
                tracing::warn!(item_id = entry.item_id, "Entry for unknown item rejected");
                return Err(Error::Reference { kind: EntityKind::Item, id: entry.item_id });
            }

            tx.execute(
                r#"
                INSERT INTO stock_log (date, item_id, opening_stock, shipment_in, closing_stock,
                                       waste_qty, waste_reason, void_qty, void_reason,
                                       price_per_unit, notes, used_qty)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    entry.date,
                    entry.item_id,
                    entry.opening_stock,
                    entry.shipment_in,
                    entry.closing_stock,
                    entry.waste_qty,
                    entry.waste_reason,
                    entry.void_qty,
                    entry.void_reason,
                    entry.price_per_unit,
                    entry.notes,
                    used_qty,
                ],
            )?;
            let entry_id = tx.last_insert_rowid();

            let price_id = match (entry.purchase_total(), entry.price_per_unit) {
                (Some(total_price), Some(price_per_unit)) => {
                    tx.execute(
                        r#"
                        INSERT INTO item_prices (item_id, date, price_per_unit, total_price, quantity)
                        VALUES (?1, ?2, ?3, ?4, ?5)
                        "#,
                        params![entry.item_id, entry.date, price_per_unit, total_price, entry.shipment_in],
                    )?;
                    Some(tx.last_insert_rowid())
                }
                _ => None,
            };

            tracing::info!(
                entry_id,
                item_id = entry.item_id,
                date = %entry.date,
                used_qty,
                priced = price_id.is_some(),
                "Logged stock entry"
            );
            Ok(AppendedEntry { entry_id, used_qty, price_id })
        })
    }

    /// Entries logged on `date`, ordered by item name
    pub fn entries_for_date(&self, date: NaiveDate) -> Result<Vec<StockLogEntry>> {
        self.db.read(|conn| {
            query_entries(
                conn,
                &format!("{ENTRY_SELECT} WHERE l.date = ?1 ORDER BY i.item_name, l.id"),
                params![date],
            )
        })
    }

    /// Entries logged between `from` and `to` inclusive, ordered by date then item name
    pub fn entries_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<StockLogEntry>> {
        if from > to {
            return Err(Error::Validation(format!("date range is inverted: {} > {}", from, to)));
        }
        self.db.read(|conn| {
            query_entries(
                conn,
                &format!("{ENTRY_SELECT} WHERE l.date BETWEEN ?1 AND ?2 ORDER BY l.date, i.item_name, l.id"),
                params![from, to],
            )
        })
    }

    /// Purchase history of one item, oldest first
    pub fn prices_for_item(&self, item_id: i64) -> Result<Vec<PriceRecord>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT price_id, item_id, date, price_per_unit, total_price, quantity
                FROM item_prices
                WHERE item_id = ?1
                ORDER BY date, price_id
                "#,
            )?;
            let prices = stmt
                .query_map([item_id], |row| {
                    Ok(PriceRecord {
                        price_id: row.get(0)?,
                        item_id: row.get(1)?,
                        date: row.get(2)?,
                        price_per_unit: row.get(3)?,
                        total_price: row.get(4)?,
                        quantity: row.get(5)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(prices)
        })
    }
}

fn query_entries(conn: &Connection, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<StockLogEntry>> {
    let mut stmt = conn.prepare(sql)?;
    let entries = stmt
        .query_map(params, row_to_entry)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    tracing::debug!(rows = entries.len(), "Loaded stock entries");
    Ok(entries)
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<StockLogEntry> {
    Ok(StockLogEntry {
        id: row.get(0)?,
        date: row.get(1)?,
        item_id: row.get(2)?,
        item_name: row.get(3)?,
        unit_name: row.get(4)?,
        opening_stock: row.get(5)?,
        shipment_in: row.get(6)?,
        closing_stock: row.get(7)?,
        waste_qty: row.get(8)?,
        waste_reason: row.get(9)?,
        void_qty: row.get(10)?,
        void_reason: row.get(11)?,
        price_per_unit: row.get(12)?,
        notes: row.get(13)?,
        used_qty: row.get(14)?,
    })
}
