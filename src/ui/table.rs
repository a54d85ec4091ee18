use crate::model::{Category, Item, PriceRecord, StockLogEntry, Unit};
use crate::output::format_qty;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        render_rows(&self.rows)
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Render rows as a rounded table; empty input renders as an empty string
pub fn render_rows<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
pub struct LookupRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
}

impl From<&Unit> for LookupRow {
    fn from(unit: &Unit) -> Self {
        Self { id: unit.unit_id, name: unit.unit_name.clone() }
    }
}

impl From<&Category> for LookupRow {
    fn from(category: &Category) -> Self {
        Self { id: category.category_id, name: category.category_name.clone() }
    }
}

#[derive(Tabled)]
pub struct ItemRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Item")]
    pub name: String,
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Daily")]
    pub daily: &'static str,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            id: item.item_id,
            name: item.item_name.clone(),
            unit: item.unit_name.clone(),
            category: item.category_name.clone(),
            daily: if item.is_daily_tracked { "yes" } else { "no" },
        }
    }
}

#[derive(Tabled)]
pub struct EntryRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Item")]
    pub item: String,
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[tabled(rename = "Open")]
    pub opening: String,
    #[tabled(rename = "In")]
    pub shipment: String,
    #[tabled(rename = "Close")]
    pub closing: String,
    #[tabled(rename = "Waste")]
    pub waste: String,
    #[tabled(rename = "Void")]
    pub void: String,
    #[tabled(rename = "Price")]
    pub price: String,
    #[tabled(rename = "Used")]
    pub used: String,
    #[tabled(rename = "Notes")]
    pub notes: String,
}

impl From<&StockLogEntry> for EntryRow {
    fn from(entry: &StockLogEntry) -> Self {
        Self {
            date: entry.date.to_string(),
            item: entry.item_name.clone(),
            unit: entry.unit_name.clone(),
            opening: format_qty(entry.opening_stock),
            shipment: format_qty(entry.shipment_in),
            closing: format_qty(entry.closing_stock),
            waste: with_reason(entry.waste_qty, entry.waste_reason.as_deref()),
            void: with_reason(entry.void_qty, entry.void_reason.as_deref()),
            price: entry.price_per_unit.map(format_qty).unwrap_or_default(),
            used: format_qty(entry.used_qty),
            notes: entry.notes.clone().unwrap_or_default(),
        }
    }
}

fn with_reason(qty: f64, reason: Option<&str>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => format!("{} ({})", format_qty(qty), reason),
        _ => format_qty(qty),
    }
}

#[derive(Tabled)]
pub struct PriceRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Qty")]
    pub quantity: String,
    #[tabled(rename = "Price/Unit")]
    pub price_per_unit: String,
    #[tabled(rename = "Total")]
    pub total_price: String,
}

impl From<&PriceRecord> for PriceRow {
    fn from(price: &PriceRecord) -> Self {
        Self {
            date: price.date.to_string(),
            quantity: format_qty(price.quantity),
            price_per_unit: format_qty(price.price_per_unit),
            total_price: format_qty(price.total_price),
        }
    }
}
