//! SQLite storage implementation

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use rusqlite::{Connection, ErrorCode, Transaction};
use crate::{Result, Error};
use crate::catalog::{LookupTable, resolve_lookup};
use super::schema;

/// Owned handle to the stock database.
///
/// The connection sits behind a mutex: every unit of work holds the lock for
/// its whole duration, so writers never interleave. Stores borrow this
/// handle instead of reaching for a process-wide connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening database at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self { conn: Mutex::new(conn) };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.write(|tx| {
            for stmt in schema::all_schema_statements() {
                tx.execute(stmt, [])?;
            }
            Ok(())
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Lock("SQLite connection poisoned".to_string()))
    }

    /// Run a read-only unit of work.
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock_conn()?;
        f(&conn)
    }

    /// Run a unit of work in one transaction.
    ///
    /// Commits when `f` succeeds; any error drops the transaction, which rolls
    /// everything back.
    pub fn write<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Insert lookup values that are not present yet, ignoring case the same
    /// way the catalog does.
    ///
    /// Returns how many units and categories were actually added.
    pub fn seed_defaults<S: AsRef<str>>(&self, units: &[S], categories: &[S]) -> Result<(usize, usize)> {
        self.write(|tx| {
            let added_units = seed_lookup(tx, LookupTable::Units, units)?;
            let added_categories = seed_lookup(tx, LookupTable::Categories, categories)?;

            tracing::info!("Seeded {} units and {} categories", added_units, added_categories);
            Ok((added_units, added_categories))
        })
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        self.read(|conn| {
            Ok(DbStats {
                units: count_rows(conn, "units")?,
                categories: count_rows(conn, "categories")?,
                items: count_rows(conn, "items")?,
                log_entries: count_rows(conn, "stock_log")?,
                price_records: count_rows(conn, "item_prices")?,
            })
        })
    }
}

/// Resolve each non-blank name, counting the ones that had to be created
fn seed_lookup<S: AsRef<str>>(conn: &Connection, table: LookupTable, names: &[S]) -> Result<usize> {
    let mut added = 0;
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        if resolve_lookup(conn, table, name)?.1 {
            added += 1;
        }
    }
    Ok(added)
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
    Ok(count as usize)
}

/// Whether a statement failed on a UNIQUE constraint
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub units: usize,
    pub categories: usize,
    pub items: usize,
    pub log_entries: usize,
    pub price_records: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Units: {}", self.units)?;
        writeln!(f, "  Categories: {}", self.categories)?;
        writeln!(f, "  Items: {}", self.items)?;
        writeln!(f, "  Log entries: {}", self.log_entries)?;
        writeln!(f, "  Price records: {}", self.price_records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::{DEFAULT_CATEGORIES, DEFAULT_UNITS};
    use crate::{CatalogStore, EntityKind, NewItem};

    #[test]
    fn test_fresh_database_is_empty() {
        let db = Database::open_in_memory().unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.units, 0);
        assert_eq!(stats.items, 0);
        assert_eq!(stats.log_entries, 0);
    }

    #[test]
    fn test_seed_defaults_is_idempotent() {
        let db = Database::open_in_memory().unwrap();

        let (units, categories) = db.seed_defaults(DEFAULT_UNITS, DEFAULT_CATEGORIES).unwrap();
        assert_eq!(units, DEFAULT_UNITS.len());
        assert_eq!(categories, DEFAULT_CATEGORIES.len());

        let (units, categories) = db.seed_defaults(&["KG", "Liters"], &["IKAN"]).unwrap();
        assert_eq!((units, categories), (0, 0));

        let stats = db.stats().unwrap();
        assert_eq!(stats.units, DEFAULT_UNITS.len());
        assert_eq!(stats.categories, DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let db = Database::open_in_memory().unwrap();

        let result: Result<()> = db.write(|tx| {
            tx.execute("INSERT INTO units (unit_name) VALUES ('kg')", [])?;
            Err(Error::Validation("abort".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(db.stats().unwrap().units, 0);
    }

    #[test]
    fn test_unique_violation_detected() {
        let db = Database::open_in_memory().unwrap();
        db.seed_defaults(&["kg"], &[]).unwrap();

        let err = db
            .write(|tx| {
                tx.execute("INSERT INTO units (unit_name) VALUES ('KG')", [])?;
                Ok(())
            })
            .unwrap_err();
        match err {
            Error::Storage(e) => assert!(is_unique_violation(&e)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.db");

        {
            let db = Database::open(&path).unwrap();
            db.seed_defaults(&["kg", "pcs"], &["ikan"]).unwrap();
        }

        let db = Database::open(&path).unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.units, 2);
        assert_eq!(stats.categories, 1);
    }

    #[test]
    fn test_seed_defaults_folds_unicode_case() {
        let db = Database::open_in_memory().unwrap();

        let added = db.seed_defaults(&["Grámo", "GRÁMO", "  "], &["Pescado", "PÉSCADO", "péscado"]).unwrap();
        assert_eq!(added, (1, 1));

        let catalog = CatalogStore::new(&db);
        let units = catalog.list_units().unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].unit_name, "Grámo");
        assert_eq!(catalog.list_categories().unwrap().len(), 1);

        // A second pass with other casings adds nothing
        assert_eq!(db.seed_defaults(&["grámo"], &["PESCADO", "péscado"]).unwrap(), (0, 0));
    }

    #[test]
    fn test_concurrent_item_adds_keep_names_unique() {
        let db = Database::open_in_memory().unwrap();
        db.seed_defaults(&["kg"], &["ikan"]).unwrap();
        let catalog = CatalogStore::new(&db);
        let unit_id = catalog.find_unit("kg").unwrap().unwrap().unit_id;
        let category_id = catalog.find_category("ikan").unwrap().unwrap().category_id;

        let names = ["Salmón", "SALMÓN", "salmón", "Salmón ", " salmÓn", "SalMón", "sALMÓN", "salmón"];
        let results: Vec<Result<i64>> = std::thread::scope(|scope| {
            let handles: Vec<_> = names
                .iter()
                .map(|name| {
                    let db = &db;
                    scope.spawn(move || CatalogStore::new(db).add_item(&NewItem::new(*name, unit_id, category_id)))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for result in results.iter().filter(|r| r.is_err()) {
            assert!(matches!(result, Err(Error::DuplicateName { kind: EntityKind::Item, .. })));
        }
        assert_eq!(db.stats().unwrap().items, 1);
    }
}
