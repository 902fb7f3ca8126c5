pub mod repository;


use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};

use crate::util::now_utc_string;

const DB_SCHEMA_VERSION: &str = "0.1.0";

/// Owns one SQLite connection. Every repository borrows this handle; nothing
/// in the crate reaches for an ambient database path.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let storage = Self { conn };
        storage.configure()?;
        Ok(storage)
    }

    /// Read-only handle for query commands; never creates the database file.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open database read-only: {}", path.display()))?;
        Ok(Self { conn })
    }

    fn configure(&self) -> Result<()> {
        self.conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("failed to set journal_mode=WAL")?;
        self.conn
            .pragma_update(None, "synchronous", "NORMAL")
            .context("failed to set synchronous=NORMAL")?;
        self.conn
            .pragma_update(None, "foreign_keys", "ON")
            .context("failed to enable foreign key enforcement")?;
        Ok(())
    }

    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS emitters (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              cnpj TEXT NOT NULL UNIQUE,
              name TEXT NOT NULL,
              fantasy_name TEXT,
              address TEXT,
              city TEXT,
              state TEXT,
              cep TEXT,
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS receivers (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              cnpj_cpf TEXT NOT NULL UNIQUE,
              name TEXT NOT NULL,
              fantasy_name TEXT,
              address TEXT,
              city TEXT,
              state TEXT,
              cep TEXT,
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS products (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              code TEXT NOT NULL UNIQUE,
              description TEXT NOT NULL,
              ncm TEXT,
              unit TEXT,
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS documents (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              doc_type TEXT NOT NULL,
              doc_number TEXT,
              series TEXT,
              access_key TEXT NOT NULL UNIQUE,
              issue_date TEXT,
              emitter_id INTEGER,
              receiver_id INTEGER,
              total_value REAL NOT NULL DEFAULT 0,
              source_hash TEXT,
              imported_at TEXT NOT NULL,
              FOREIGN KEY (emitter_id) REFERENCES emitters (id),
              FOREIGN KEY (receiver_id) REFERENCES receivers (id)
            );

            CREATE TABLE IF NOT EXISTS document_items (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              document_id INTEGER NOT NULL,
              product_id INTEGER NOT NULL,
              position INTEGER NOT NULL,
              quantity REAL NOT NULL DEFAULT 0,
              unit_value REAL NOT NULL DEFAULT 0,
              total_value REAL NOT NULL DEFAULT 0,
              FOREIGN KEY (document_id) REFERENCES documents (id),
              FOREIGN KEY (product_id) REFERENCES products (id)
            );
            ",
        )?;

        self.conn.execute(
            "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            [DB_SCHEMA_VERSION],
        )?;
        self.conn.execute(
            "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            [now_utc_string()],
        )?;

        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
