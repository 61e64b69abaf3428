// Key-value stores backing the ledger
//
// The ledger keeps three independent stores (vehicles, slots, rentals). Each
// store is an ordered map from string id to record:
//   insert(key, value)  - upsert, an existing key keeps its position
//   get(key)            - point lookup by primary id
//   values()            - all records in insertion order
//
// Two backends:
// - MemoryStore: RwLock-guarded, lives as long as the process
// - SqliteStore: one table per store, JSON values, WAL journal

use crate::error::{LedgerError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

pub const VEHICLES_TABLE: &str = "vehicles";
pub const SLOTS_TABLE: &str = "slots";
pub const RENTALS_TABLE: &str = "rentals";

/// Ordered mapping from string identifiers to records
pub trait KeyValueStore<V>: Send + Sync {
    fn insert(&self, key: &str, value: V) -> Result<()>;

    fn get(&self, key: &str) -> Result<Option<V>>;

    /// All values in insertion order
    fn values(&self) -> Result<Vec<V>>;

    fn len(&self) -> Result<usize> {
        Ok(self.values()?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

// ============================================================================
// IN-MEMORY BACKEND
// ============================================================================

struct MemoryTable<V> {
    /// Keys in first-insertion order
    order: Vec<String>,
    entries: HashMap<String, V>,
}

pub struct MemoryStore<V> {
    table: RwLock<MemoryTable<V>>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        MemoryStore {
            table: RwLock::new(MemoryTable {
                order: Vec::new(),
                entries: HashMap::new(),
            }),
        }
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyValueStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    fn insert(&self, key: &str, value: V) -> Result<()> {
        let mut table = self
            .table
            .write()
            .map_err(|_| LedgerError::Poisoned("memory store"))?;

        if table.entries.insert(key.to_string(), value).is_none() {
            table.order.push(key.to_string());
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<V>> {
        let table = self
            .table
            .read()
            .map_err(|_| LedgerError::Poisoned("memory store"))?;
        Ok(table.entries.get(key).cloned())
    }

    fn values(&self) -> Result<Vec<V>> {
        let table = self
            .table
            .read()
            .map_err(|_| LedgerError::Poisoned("memory store"))?;
        Ok(table
            .order
            .iter()
            .filter_map(|key| table.entries.get(key).cloned())
            .collect())
    }

    fn len(&self) -> Result<usize> {
        let table = self
            .table
            .read()
            .map_err(|_| LedgerError::Poisoned("memory store"))?;
        Ok(table.order.len())
    }
}

// ============================================================================
// SQLITE BACKEND
// ============================================================================

/// Open (or create) the ledger database and its three tables
pub fn open_database(path: &Path) -> Result<Arc<Mutex<Connection>>> {
    let conn = Connection::open(path)?;
    setup_database(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases report "memory")
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    tracing::debug!(journal_mode = %mode, "database opened");

    for table in [VEHICLES_TABLE, SLOTS_TABLE, RENTALS_TABLE] {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    key TEXT UNIQUE NOT NULL,
                    value TEXT NOT NULL,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
                )"
            ),
            [],
        )?;
    }

    Ok(())
}

/// Store persisted as JSON rows in one table of a shared connection
pub struct SqliteStore<V> {
    conn: Arc<Mutex<Connection>>,
    table: &'static str,
    _value: PhantomData<fn() -> V>,
}

impl<V> SqliteStore<V> {
    /// `table` must be one of the tables created by `setup_database`
    pub fn new(conn: Arc<Mutex<Connection>>, table: &'static str) -> Self {
        SqliteStore {
            conn,
            table,
            _value: PhantomData,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LedgerError::Poisoned("sqlite connection"))
    }
}

impl<V> KeyValueStore<V> for SqliteStore<V>
where
    V: Serialize + DeserializeOwned,
{
    fn insert(&self, key: &str, value: V) -> Result<()> {
        let json = serde_json::to_string(&value)?;
        let conn = self.lock()?;

        // Upsert keeps the existing seq, so values() order is first-insertion order
        conn.execute(
            &format!(
                "INSERT INTO {} (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = CURRENT_TIMESTAMP",
                self.table
            ),
            params![key, json],
        )?;

        tracing::debug!(table = self.table, key, "stored record");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<V>> {
        let conn = self.lock()?;
        let json: Option<String> = conn
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?1", self.table),
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn values(&self) -> Result<Vec<V>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT value FROM {} ORDER BY seq ASC",
            self.table
        ))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|json| serde_json::from_str(json).map_err(LedgerError::from))
            .collect()
    }

    fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
