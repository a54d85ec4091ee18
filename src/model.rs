//! Catalog and ledger records
//!
//! Master data (units, categories, items) and the two append-only ledger
//! records (stock log entries and price records), plus the input types the
//! presentation layer fills in before calling the stores.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A unit of measure such as `kg` or `pcs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub unit_id: i64,
    pub unit_name: String,
}

/// A classification tag for items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
}

/// A trackable stock-keeping item, joined with its unit and category names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: i64,
    pub item_name: String,
    pub unit_id: i64,
    pub unit_name: String,
    pub category_id: i64,
    pub category_name: String,
    pub is_daily_tracked: bool,
}

/// The full field set for creating or replacing an item.
///
/// There is no partial update: an edit always supplies every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub unit_id: i64,
    pub category_id: i64,
    pub is_daily_tracked: bool,
}

impl NewItem {
    /// Create an item draft; items are tracked daily unless told otherwise
    pub fn new(name: impl Into<String>, unit_id: i64, category_id: i64) -> Self {
        Self {
            name: name.into(),
            unit_id,
            category_id,
            is_daily_tracked: true,
        }
    }

    /// Set the daily-tracking flag
    pub fn daily(mut self, is_daily_tracked: bool) -> Self {
        self.is_daily_tracked = is_daily_tracked;
        self
    }
}

impl From<&Item> for NewItem {
    fn from(item: &Item) -> Self {
        Self {
            name: item.item_name.clone(),
            unit_id: item.unit_id,
            category_id: item.category_id,
            is_daily_tracked: item.is_daily_tracked,
        }
    }
}

/// Trim a user-supplied name and reject it when nothing is left.
pub fn normalize_name(name: &str, field: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Key under which two names count as the same name.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One dated stock movement as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStockEntry {
    pub date: NaiveDate,
    pub item_id: i64,
    pub opening_stock: f64,
    pub shipment_in: f64,
    pub closing_stock: f64,
    pub waste_qty: f64,
    pub waste_reason: Option<String>,
    pub void_qty: f64,
    pub void_reason: Option<String>,
    pub price_per_unit: Option<f64>,
    pub notes: Option<String>,
}

impl NewStockEntry {
    /// Start an entry with every quantity at zero
    pub fn new(date: NaiveDate, item_id: i64) -> Self {
        Self {
            date,
            item_id,
            opening_stock: 0.0,
            shipment_in: 0.0,
            closing_stock: 0.0,
            waste_qty: 0.0,
            waste_reason: None,
            void_qty: 0.0,
            void_reason: None,
            price_per_unit: None,
            notes: None,
        }
    }

    pub fn opening(mut self, qty: f64) -> Self {
        self.opening_stock = qty;
        self
    }

    pub fn shipment(mut self, qty: f64) -> Self {
        self.shipment_in = qty;
        self
    }

    pub fn closing(mut self, qty: f64) -> Self {
        self.closing_stock = qty;
        self
    }

    pub fn waste(mut self, qty: f64, reason: Option<String>) -> Self {
        self.waste_qty = qty;
        self.waste_reason = reason;
        self
    }

    pub fn void(mut self, qty: f64, reason: Option<String>) -> Self {
        self.void_qty = qty;
        self.void_reason = reason;
        self
    }

    pub fn price(mut self, price_per_unit: f64) -> Self {
        self.price_per_unit = Some(price_per_unit);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Reject negative or non-finite quantities and prices.
    pub fn validate(&self) -> Result<()> {
        let quantities = [
            ("opening stock", self.opening_stock),
            ("shipment in", self.shipment_in),
            ("closing stock", self.closing_stock),
            ("waste qty", self.waste_qty),
            ("void qty", self.void_qty),
        ];
        for (field, value) in quantities {
            check_quantity(field, value)?;
        }
        if let Some(price) = self.price_per_unit {
            check_quantity("price per unit", price)?;
        }
        // Finite inputs can still overflow once combined
        if !self.used_qty().is_finite() {
            return Err(Error::Validation("used qty is out of range".to_string()));
        }
        if self.purchase_total().is_some_and(|total| !total.is_finite()) {
            return Err(Error::Validation("purchase total is out of range".to_string()));
        }
        Ok(())
    }

    /// Stock consumed over the logged day. May be negative; never clamped.
    pub fn used_qty(&self) -> f64 {
        self.opening_stock + self.shipment_in - (self.closing_stock + self.waste_qty + self.void_qty)
    }

    /// Total purchase price when this entry warrants a price record
    pub fn purchase_total(&self) -> Option<f64> {
        match self.price_per_unit {
            Some(price) if price > 0.0 && self.shipment_in > 0.0 => Some(price * self.shipment_in),
            _ => None,
        }
    }
}

fn check_quantity(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::Validation(format!("{} must be a number", field)));
    }
    if value < 0.0 {
        return Err(Error::Validation(format!("{} cannot be negative ({})", field, value)));
    }
    Ok(())
}

/// A persisted stock log entry joined with its item and unit names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLogEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub item_id: i64,
    pub item_name: String,
    pub unit_name: String,
    pub opening_stock: f64,
    pub shipment_in: f64,
    pub closing_stock: f64,
    pub waste_qty: f64,
    pub waste_reason: Option<String>,
    pub void_qty: f64,
    pub void_reason: Option<String>,
    pub price_per_unit: Option<f64>,
    pub notes: Option<String>,
    /// Derived at insert time and never recomputed
    pub used_qty: f64,
}

/// A purchase price derived from a priced shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub price_id: i64,
    pub item_id: i64,
    pub date: NaiveDate,
    pub price_per_unit: f64,
    pub total_price: f64,
    pub quantity: f64,
}
