//! Database schema definitions
//!
//! Name columns use `COLLATE NOCASE UNIQUE` so the database itself rejects
//! case-insensitive duplicates.

/// SQL to create the units table
pub const CREATE_UNITS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS units (
    unit_id INTEGER PRIMARY KEY AUTOINCREMENT,
    unit_name TEXT NOT NULL COLLATE NOCASE UNIQUE
)
"#;

/// SQL to create the categories table
pub const CREATE_CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name TEXT NOT NULL COLLATE NOCASE UNIQUE
)
"#;

/// SQL to create the items table
pub const CREATE_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    item_id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_name TEXT NOT NULL COLLATE NOCASE UNIQUE,
    unit_id INTEGER NOT NULL REFERENCES units(unit_id),
    category_id INTEGER NOT NULL REFERENCES categories(category_id),
    is_daily_tracked BOOLEAN NOT NULL DEFAULT 1
)
"#;

/// SQL to create the stock_log table
/// `used_qty` is derived once at insert time
pub const CREATE_STOCK_LOG_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS stock_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    item_id INTEGER NOT NULL REFERENCES items(item_id),
    opening_stock REAL NOT NULL DEFAULT 0,
    shipment_in REAL NOT NULL DEFAULT 0,
    closing_stock REAL NOT NULL DEFAULT 0,
    waste_qty REAL NOT NULL DEFAULT 0,
    waste_reason TEXT,
    void_qty REAL NOT NULL DEFAULT 0,
    void_reason TEXT,
    price_per_unit REAL,
    notes TEXT,
    used_qty REAL NOT NULL
)
"#;

/// SQL to create the item_prices table
pub const CREATE_ITEM_PRICES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS item_prices (
    price_id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id INTEGER NOT NULL REFERENCES items(item_id),
    date TEXT NOT NULL,
    price_per_unit REAL NOT NULL,
    total_price REAL NOT NULL,
    quantity REAL NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_items_unit ON items(unit_id)",
    "CREATE INDEX IF NOT EXISTS idx_items_category ON items(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_stock_log_date ON stock_log(date)",
    "CREATE INDEX IF NOT EXISTS idx_stock_log_item ON stock_log(item_id)",
    "CREATE INDEX IF NOT EXISTS idx_item_prices_item ON item_prices(item_id)",
];

/// Units seeded into a fresh database
pub const DEFAULT_UNITS: &[&str] = &["kg", "oz", "pcs", "liters", "grams"];

/// Categories seeded into a fresh database
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "ikan", "saos", "bahan", "kepiting", "udang", "kerang", "cumi", "buah", "sayur",
];

/// All schema creation statements, parents before children
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_UNITS_TABLE,
        CREATE_CATEGORIES_TABLE,
        CREATE_ITEMS_TABLE,
        CREATE_STOCK_LOG_TABLE,
        CREATE_ITEM_PRICES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
