//! Catalog Store - items, units and categories
//!
//! Owns the master data tables and every rule on them:
//! - names are unique ignoring case (unique index plus an in-transaction
//!   Unicode-aware check)
//! - items must point at an existing unit and category
//! - items with ledger history cannot be deleted

use rusqlite::{Connection, OptionalExtension, params};
use crate::{EntityKind, Error, Result};
use crate::model::{Category, Item, NewItem, Unit, name_key, normalize_name};
use crate::storage::Database;
use crate::storage::sqlite::is_unique_violation;

const ITEM_COLUMNS: &str = "i.item_id, i.item_name, i.unit_id, u.unit_name, i.category_id, c.category_name, i.is_daily_tracked";

const ITEM_FROM: &str = "FROM items i
     JOIN units u ON i.unit_id = u.unit_id
     JOIN categories c ON i.category_id = c.category_id";

/// Catalog of stock-keeping items and their lookup values
pub struct CatalogStore<'a> {
    db: &'a Database,
}

impl<'a> CatalogStore<'a> {
    /// Create a catalog over an open database
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // ========== Unit Operations ==========

    /// All units ordered by name
    pub fn list_units(&self) -> Result<Vec<Unit>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare("SELECT unit_id, unit_name FROM units ORDER BY unit_name, unit_id")?;
            let units = stmt
                .query_map([], |row| {
                    Ok(Unit {
                        unit_id: row.get(0)?,
                        unit_name: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(units)
        })
    }

    /// Find a unit by name, ignoring case
    pub fn find_unit(&self, name: &str) -> Result<Option<Unit>> {
        self.db.read(|conn| {
            Ok(find_lookup(conn, LookupTable::Units, name)?.map(|(unit_id, unit_name)| Unit { unit_id, unit_name }))
        })
    }

    /// Create a unit; fails when one with the same name exists
    pub fn add_unit(&self, name: &str) -> Result<i64> {
        let name = normalize_name(name, "unit name")?;
        self.db.write(|tx| insert_lookup(tx, LookupTable::Units, &name))
    }

    /// Look up a unit by name, creating it when absent
    pub fn resolve_or_create_unit(&self, name: &str) -> Result<i64> {
        let name = normalize_name(name, "unit name")?;
        self.db.write(|tx| Ok(resolve_lookup(tx, LookupTable::Units, &name)?.0))
    }

    // ========== Category Operations ==========

    /// All categories ordered by name
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT category_id, category_name FROM categories ORDER BY category_name, category_id",
            )?;
            let categories = stmt
                .query_map([], |row| {
                    Ok(Category {
                        category_id: row.get(0)?,
                        category_name: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(categories)
        })
    }

    /// Find a category by name, ignoring case
    pub fn find_category(&self, name: &str) -> Result<Option<Category>> {
        self.db.read(|conn| {
            Ok(find_lookup(conn, LookupTable::Categories, name)?
                .map(|(category_id, category_name)| Category { category_id, category_name }))
        })
    }

    /// Create a category; fails when one with the same name exists
    pub fn add_category(&self, name: &str) -> Result<i64> {
        let name = normalize_name(name, "category name")?;
        self.db.write(|tx| insert_lookup(tx, LookupTable::Categories, &name))
    }

    /// Look up a category by name, creating it when absent
    pub fn resolve_or_create_category(&self, name: &str) -> Result<i64> {
        let name = normalize_name(name, "category name")?;
        self.db.write(|tx| Ok(resolve_lookup(tx, LookupTable::Categories, &name)?.0))
    }

    // ========== Item Operations ==========

    /// Add an item and return its id
    pub fn add_item(&self, item: &NewItem) -> Result<i64> {
        let name = normalize_name(&item.name, "item name")?;

        self.db.write(|tx| {
            check_references(tx, item)?;
            check_name_free(tx, &name, None)?;

            tx.execute(
                r#"
                INSERT INTO items (item_name, unit_id, category_id, is_daily_tracked)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![name, item.unit_id, item.category_id, item.is_daily_tracked],
            )
            .map_err(|e| duplicate_or(e, EntityKind::Item, &name))?;

            let item_id = tx.last_insert_rowid();
            tracing::info!(item_id, item_name = %name, "Added item");
            Ok(item_id)
        })
    }

    /// Replace every field of an existing item
    pub fn update_item(&self, item_id: i64, item: &NewItem) -> Result<()> {
        let name = normalize_name(&item.name, "item name")?;

        self.db.write(|tx| {
            if !item_exists(tx, item_id)? {
                tracing::warn!(item_id, "Update of unknown item rejected");
                return Err(Error::NotFound { kind: EntityKind::Item, id: item_id });
            }
            check_references(tx, item)?;
            check_name_free(tx, &name, Some(item_id))?;

            tx.execute(
                r#"
                UPDATE items
                SET item_name = ?1, unit_id = ?2, category_id = ?3, is_daily_tracked = ?4
                WHERE item_id = ?5
                "#,
                params![name, item.unit_id, item.category_id, item.is_daily_tracked, item_id],
            )
            .map_err(|e| duplicate_or(e, EntityKind::Item, &name))?;

            tracing::info!(item_id, item_name = %name, "Updated item");
            Ok(())
        })
    }

    /// Delete an item.
    ///
    /// Returns `false` when there was nothing to delete. Items with stock log
    /// or price history are kept and reported as [`Error::InUse`].
    pub fn delete_item(&self, item_id: i64) -> Result<bool> {
        self.db.write(|tx| {
            if !item_exists(tx, item_id)? {
                tracing::debug!(item_id, "Delete of unknown item ignored");
                return Ok(false);
            }

            let entries: i64 = tx.query_row(
                r#"
                SELECT (SELECT COUNT(*) FROM stock_log WHERE item_id = ?1)
                     + (SELECT COUNT(*) FROM item_prices WHERE item_id = ?1)
                "#,
                [item_id],
                |row| row.get(0),
            )?;
            if entries > 0 {
                tracing::warn!(item_id, entries, "Delete of item with history rejected");
                return Err(Error::InUse { item_id, entries: entries as usize });
            }

            tx.execute("DELETE FROM items WHERE item_id = ?1", [item_id])?;
            tracing::info!(item_id, "Deleted item");
            Ok(true)
        })
    }

    /// Get an item by id
    pub fn get_item(&self, item_id: i64) -> Result<Option<Item>> {
        self.db.read(|conn| {
            conn.query_row(
                &format!("SELECT {ITEM_COLUMNS} {ITEM_FROM} WHERE i.item_id = ?1"),
                [item_id],
                row_to_item,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// Find an item by exact name, ignoring case
    pub fn find_item(&self, name: &str) -> Result<Option<Item>> {
        let key = name_key(name);
        Ok(self.list_items()?.into_iter().find(|item| name_key(&item.item_name) == key))
    }

    /// All items ordered by name
    pub fn list_items(&self) -> Result<Vec<Item>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {ITEM_COLUMNS} {ITEM_FROM} ORDER BY i.item_name, i.item_id"))?;
            let items = stmt.query_map([], row_to_item)?.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(items)
        })
    }

    /// Items whose name contains `query`, ignoring case.
    ///
    /// A blank query matches nothing.
    pub fn search_items(&self, query: &str) -> Result<Vec<Item>> {
        let needle = name_key(query);
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<Item> = self
            .list_items()?
            .into_iter()
            .filter(|item| item.item_name.to_lowercase().contains(&needle))
            .collect();
        tracing::debug!(query, matches = items.len(), "Searched items");
        Ok(items)
    }
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    Ok(Item {
        item_id: row.get(0)?,
        item_name: row.get(1)?,
        unit_id: row.get(2)?,
        unit_name: row.get(3)?,
        category_id: row.get(4)?,
        category_name: row.get(5)?,
        is_daily_tracked: row.get(6)?,
    })
}

pub(crate) fn item_exists(conn: &Connection, item_id: i64) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM items WHERE item_id = ?1", [item_id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn check_references(conn: &Connection, item: &NewItem) -> Result<()> {
    if !lookup_exists(conn, LookupTable::Units, item.unit_id)? {
        return Err(Error::Reference { kind: EntityKind::Unit, id: item.unit_id });
    }
    if !lookup_exists(conn, LookupTable::Categories, item.category_id)? {
        return Err(Error::Reference { kind: EntityKind::Category, id: item.category_id });
    }
    Ok(())
}

/// Fail when another item already uses `name` under Unicode case folding.
///
/// NOCASE only folds ASCII, so the index alone would let "SALMÓN" and
/// "salmón" coexist.
fn check_name_free(conn: &Connection, name: &str, except: Option<i64>) -> Result<()> {
    let key = name_key(name);
    let mut stmt = conn.prepare("SELECT item_id, item_name FROM items")?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let item_id: i64 = row.get(0)?;
        let existing: String = row.get(1)?;
        if Some(item_id) != except && name_key(&existing) == key {
            tracing::warn!(item_name = name, conflicting_id = item_id, "Duplicate item name rejected");
            return Err(Error::DuplicateName { kind: EntityKind::Item, name: name.to_string() });
        }
    }
    Ok(())
}

fn duplicate_or(err: rusqlite::Error, kind: EntityKind, name: &str) -> Error {
    if is_unique_violation(&err) {
        Error::DuplicateName { kind, name: name.to_string() }
    } else {
        err.into()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum LookupTable {
    Units,
    Categories,
}

impl LookupTable {
    fn kind(self) -> EntityKind {
        match self {
            LookupTable::Units => EntityKind::Unit,
            LookupTable::Categories => EntityKind::Category,
        }
    }

    /// (table, id column, name column)
    fn columns(self) -> (&'static str, &'static str, &'static str) {
        match self {
            LookupTable::Units => ("units", "unit_id", "unit_name"),
            LookupTable::Categories => ("categories", "category_id", "category_name"),
        }
    }
}

fn lookup_exists(conn: &Connection, table: LookupTable, id: i64) -> Result<bool> {
    let (table_name, id_col, _) = table.columns();
    let found = conn
        .query_row(&format!("SELECT 1 FROM {table_name} WHERE {id_col} = ?1"), [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn find_lookup(conn: &Connection, table: LookupTable, name: &str) -> Result<Option<(i64, String)>> {
    let key = name_key(name);
    if key.is_empty() {
        return Ok(None);
    }

    let (table_name, id_col, name_col) = table.columns();
    let mut stmt = conn.prepare(&format!("SELECT {id_col}, {name_col} FROM {table_name} ORDER BY {id_col}"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let existing: String = row.get(1)?;
        if name_key(&existing) == key {
            return Ok(Some((row.get(0)?, existing)));
        }
    }
    Ok(None)
}

fn insert_lookup(conn: &Connection, table: LookupTable, name: &str) -> Result<i64> {
    if find_lookup(conn, table, name)?.is_some() {
        return Err(Error::DuplicateName { kind: table.kind(), name: name.to_string() });
    }

    let (table_name, _, name_col) = table.columns();
    conn.execute(&format!("INSERT INTO {table_name} ({name_col}) VALUES (?1)"), [name])
        .map_err(|e| duplicate_or(e, table.kind(), name))?;

    let id = conn.last_insert_rowid();
    tracing::info!(kind = %table.kind(), id, name, "Added lookup value");
    Ok(id)
}

/// Id of the lookup value named `name`, and whether it had to be created
pub(crate) fn resolve_lookup(conn: &Connection, table: LookupTable, name: &str) -> Result<(i64, bool)> {
    match find_lookup(conn, table, name)? {
        Some((id, _)) => Ok((id, false)),
        None => Ok((insert_lookup(conn, table, name)?, true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::{DEFAULT_CATEGORIES, DEFAULT_UNITS};

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.seed_defaults(DEFAULT_UNITS, DEFAULT_CATEGORIES).unwrap();
        db
    }

    fn ids(catalog: &CatalogStore) -> (i64, i64) {
        let unit = catalog.find_unit("kg").unwrap().unwrap();
        let category = catalog.find_category("ikan").unwrap().unwrap();
        (unit.unit_id, category.category_id)
    }

    #[test]
    fn test_lookups_are_sorted() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);

        let units: Vec<String> = catalog.list_units().unwrap().into_iter().map(|u| u.unit_name).collect();
        assert_eq!(units, vec!["grams", "kg", "liters", "oz", "pcs"]);

        let categories = catalog.list_categories().unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(categories[0].category_name, "bahan");
    }

    #[test]
    fn test_empty_lookups() {
        let db = Database::open_in_memory().unwrap();
        let catalog = CatalogStore::new(&db);
        assert!(catalog.list_units().unwrap().is_empty());
        assert!(catalog.list_categories().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_or_create_unit() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);

        let kg = catalog.find_unit("kg").unwrap().unwrap().unit_id;
        assert_eq!(catalog.resolve_or_create_unit("KG").unwrap(), kg);

        let tray = catalog.resolve_or_create_unit(" tray ").unwrap();
        assert_eq!(catalog.resolve_or_create_unit("Tray").unwrap(), tray);
        assert_eq!(catalog.list_units().unwrap().len(), DEFAULT_UNITS.len() + 1);
    }

    #[test]
    fn test_add_lookup_rejects_duplicates() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);

        assert!(matches!(
            catalog.add_unit("Oz"),
            Err(Error::DuplicateName { kind: EntityKind::Unit, .. })
        ));
        assert!(matches!(
            catalog.add_category("SAYUR"),
            Err(Error::DuplicateName { kind: EntityKind::Category, .. })
        ));
        assert!(matches!(catalog.add_unit("  "), Err(Error::Validation(_))));
        assert!(catalog.add_category("minuman").is_ok());
    }

    #[test]
    fn test_add_item_rejects_case_insensitive_duplicate() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);

        catalog.add_item(&NewItem::new("Salmon", unit, category)).unwrap();

        for name in ["Salmon", "salmon", "SALMON", "  sAlMoN "] {
            let result = catalog.add_item(&NewItem::new(name, unit, category));
            assert!(
                matches!(result, Err(Error::DuplicateName { kind: EntityKind::Item, .. })),
                "{name} should collide"
            );
        }
        assert_eq!(catalog.list_items().unwrap().len(), 1);
    }

    #[test]
    fn test_add_item_unicode_case_folding() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);

        catalog.add_item(&NewItem::new("Salmón", unit, category)).unwrap();
        assert!(matches!(
            catalog.add_item(&NewItem::new("SALMÓN", unit, category)),
            Err(Error::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_add_item_validation_and_references() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);

        assert!(matches!(
            catalog.add_item(&NewItem::new("", unit, category)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            catalog.add_item(&NewItem::new("Tuna", 999, category)),
            Err(Error::Reference { kind: EntityKind::Unit, id: 999 })
        ));
        assert!(matches!(
            catalog.add_item(&NewItem::new("Tuna", unit, 999)),
            Err(Error::Reference { kind: EntityKind::Category, id: 999 })
        ));
        assert!(catalog.list_items().unwrap().is_empty());
    }

    #[test]
    fn test_add_item_stores_trimmed_fields() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);

        let id = catalog.add_item(&NewItem::new("  Squid ", unit, category).daily(false)).unwrap();
        let item = catalog.get_item(id).unwrap().unwrap();
        assert_eq!(item.item_name, "Squid");
        assert_eq!(item.unit_name, "kg");
        assert_eq!(item.category_name, "ikan");
        assert!(!item.is_daily_tracked);
    }

    #[test]
    fn test_update_item_rename_conflict_leaves_rows_unchanged() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);

        let x = catalog.add_item(&NewItem::new("Prawn", unit, category)).unwrap();
        let y = catalog.add_item(&NewItem::new("Crab", unit, category)).unwrap();
        let before_x = catalog.get_item(x).unwrap().unwrap();
        let before_y = catalog.get_item(y).unwrap().unwrap();

        let result = catalog.update_item(x, &NewItem::new("CRAB", unit, category).daily(false));
        assert!(matches!(result, Err(Error::DuplicateName { .. })));

        assert_eq!(catalog.get_item(x).unwrap().unwrap(), before_x);
        assert_eq!(catalog.get_item(y).unwrap().unwrap(), before_y);
    }

    #[test]
    fn test_update_item_full_row() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);
        let pcs = catalog.find_unit("pcs").unwrap().unwrap().unit_id;
        let udang = catalog.find_category("udang").unwrap().unwrap().category_id;

        let id = catalog.add_item(&NewItem::new("Prawn", unit, category)).unwrap();

        // Case-only rename of the same row is allowed
        catalog.update_item(id, &NewItem::new("PRAWN", pcs, udang).daily(false)).unwrap();

        let item = catalog.get_item(id).unwrap().unwrap();
        assert_eq!(item.item_name, "PRAWN");
        assert_eq!(item.unit_name, "pcs");
        assert_eq!(item.category_name, "udang");
        assert!(!item.is_daily_tracked);
    }

    #[test]
    fn test_update_unknown_item_is_not_found() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);

        assert!(matches!(
            catalog.update_item(42, &NewItem::new("Ghost", unit, category)),
            Err(Error::NotFound { kind: EntityKind::Item, id: 42 })
        ));
        assert!(catalog.list_items().unwrap().is_empty());
    }

    #[test]
    fn test_update_item_bad_reference() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);
        let id = catalog.add_item(&NewItem::new("Prawn", unit, category)).unwrap();

        assert!(matches!(
            catalog.update_item(id, &NewItem::new("Prawn", 777, category)),
            Err(Error::Reference { kind: EntityKind::Unit, .. })
        ));
        assert_eq!(catalog.get_item(id).unwrap().unwrap().unit_id, unit);
    }

    #[test]
    fn test_delete_item() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);
        let id = catalog.add_item(&NewItem::new("Lime", unit, category)).unwrap();

        assert!(catalog.delete_item(id).unwrap());
        assert!(catalog.get_item(id).unwrap().is_none());

        // The name is free again
        assert!(catalog.add_item(&NewItem::new("lime", unit, category)).is_ok());
    }

    #[test]
    fn test_delete_unknown_item_is_noop() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);
        catalog.add_item(&NewItem::new("Lime", unit, category)).unwrap();

        let before = db.stats().unwrap();
        assert!(!catalog.delete_item(12345).unwrap());
        assert_eq!(db.stats().unwrap(), before);
    }

    #[test]
    fn test_search_items() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);
        for name in ["Salmon Fillet", "Smoked salmon", "Tuna"] {
            catalog.add_item(&NewItem::new(name, unit, category)).unwrap();
        }

        let names: Vec<String> = catalog
            .search_items("SALMON")
            .unwrap()
            .into_iter()
            .map(|i| i.item_name)
            .collect();
        assert_eq!(names, vec!["Salmon Fillet", "Smoked salmon"]);

        assert!(catalog.search_items("").unwrap().is_empty());
        assert!(catalog.search_items("   ").unwrap().is_empty());
        assert!(catalog.search_items("lobster").unwrap().is_empty());
    }

    #[test]
    fn test_find_item_ignores_case() {
        let db = seeded();
        let catalog = CatalogStore::new(&db);
        let (unit, category) = ids(&catalog);
        let id = catalog.add_item(&NewItem::new("Tuna", unit, category)).unwrap();

        assert_eq!(catalog.find_item("tUNA").unwrap().unwrap().item_id, id);
        assert!(catalog.find_item("Tun").unwrap().is_none());
    }
}
