use rusqlite::{Result, params};
use serde::Serialize;

use crate::db::Storage;
use crate::model::{FiscalDocument, LineItem, Party, Product};
use crate::util::now_utc_string;

pub struct EmitterRepository<'a> {
    storage: &'a Storage,
}

impl<'a> EmitterRepository<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Insert-or-update keyed on CNPJ. Returns `None` without touching the
    /// table when the party has no natural key.
    pub fn upsert(&self, party: &Party) -> Result<Option<i64>> {
        if !party.has_key() {
            return Ok(None);
        }

        let conn = self.storage.conn();
        conn.execute(
            "INSERT INTO emitters (cnpj, name, fantasy_name, address, city, state, cep, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(cnpj) DO UPDATE SET
               name=excluded.name,
               fantasy_name=excluded.fantasy_name,
               address=excluded.address,
               city=excluded.city,
               state=excluded.state,
               cep=excluded.cep",
            params![
                party.cnpj_cpf,
                party.name,
                party.fantasy_name,
                party.address,
                party.city,
                party.state,
                party.cep,
                now_utc_string()
            ],
        )?;

        let id = conn.query_row(
            "SELECT id FROM emitters WHERE cnpj = ?1",
            [&party.cnpj_cpf],
            |row| row.get(0),
        )?;
        Ok(Some(id))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiverRow {
    pub id: i64,
    pub cnpj_cpf: String,
    pub name: String,
    pub fantasy_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub cep: String,
}

pub struct ReceiverRepository<'a> {
    storage: &'a Storage,
}

impl<'a> ReceiverRepository<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn upsert(&self, party: &Party) -> Result<Option<i64>> {
        if !party.has_key() {
            return Ok(None);
        }

        let conn = self.storage.conn();
        conn.execute(
            "INSERT INTO receivers (cnpj_cpf, name, fantasy_name, address, city, state, cep, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(cnpj_cpf) DO UPDATE SET
               name=excluded.name,
               fantasy_name=excluded.fantasy_name,
               address=excluded.address,
               city=excluded.city,
               state=excluded.state,
               cep=excluded.cep",
            params![
                party.cnpj_cpf,
                party.name,
                party.fantasy_name,
                party.address,
                party.city,
                party.state,
                party.cep,
                now_utc_string()
            ],
        )?;

        let id = conn.query_row(
            "SELECT id FROM receivers WHERE cnpj_cpf = ?1",
            [&party.cnpj_cpf],
            |row| row.get(0),
        )?;
        Ok(Some(id))
    }

    pub fn search(&self, query: &str) -> Result<Vec<ReceiverRow>> {
        let pattern = format!("%{query}%");
        let mut statement = self.storage.conn().prepare(
            "SELECT id, cnpj_cpf, name, fantasy_name, address, city, state, cep
             FROM receivers
             WHERE name LIKE ?1 OR cnpj_cpf LIKE ?1 OR fantasy_name LIKE ?1
             ORDER BY name",
        )?;

        let rows = statement
            .query_map([&pattern], |row| {
                Ok(ReceiverRow {
                    id: row.get(0)?,
                    cnpj_cpf: row.get(1)?,
                    name: row.get(2)?,
                    fantasy_name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    address: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    city: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    state: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                    cep: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductRow {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub ncm: String,
    pub unit: String,
}

pub struct ProductRepository<'a> {
    storage: &'a Storage,
}

impl<'a> ProductRepository<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Latest-wins catalog: a re-imported code overwrites the descriptive
    /// columns.
    pub fn upsert(&self, product: &Product) -> Result<Option<i64>> {
        if product.code.is_empty() {
            return Ok(None);
        }

        let conn = self.storage.conn();
        conn.execute(
            "INSERT INTO products (code, description, ncm, unit, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(code) DO UPDATE SET
               description=excluded.description,
               ncm=excluded.ncm,
               unit=excluded.unit",
            params![
                product.code,
                product.description,
                product.ncm,
                product.unit,
                now_utc_string()
            ],
        )?;

        let id = conn.query_row(
            "SELECT id FROM products WHERE code = ?1",
            [&product.code],
            |row| row.get(0),
        )?;
        Ok(Some(id))
    }

    pub fn search(&self, query: &str) -> Result<Vec<ProductRow>> {
        let pattern = format!("%{query}%");
        let mut statement = self.storage.conn().prepare(
            "SELECT id, code, description, ncm, unit
             FROM products
             WHERE description LIKE ?1 OR code LIKE ?1
             ORDER BY description",
        )?;

        let rows = statement
            .query_map([&pattern], |row| {
                Ok(ProductRow {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    description: row.get(2)?,
                    ncm: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    unit: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }
}

pub struct DocumentRepository<'a> {
    storage: &'a Storage,
}

impl<'a> DocumentRepository<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Keyed on access key. A conflicting import refreshes the mutable
    /// header columns but never re-points the emitter/receiver references:
    /// the access key is the trust anchor for those links. Event documents
    /// only ever insert a stub and leave an existing row untouched.
    pub fn upsert(
        &self,
        record: &FiscalDocument,
        emitter_id: Option<i64>,
        receiver_id: Option<i64>,
        source_hash: &str,
    ) -> Result<Option<i64>> {
        if record.access_key.is_empty() {
            return Ok(None);
        }

        let sql = if record.kind.refreshes_header() {
            "INSERT INTO documents (doc_type, doc_number, series, access_key, issue_date,
                                    emitter_id, receiver_id, total_value, source_hash, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(access_key) DO UPDATE SET
               doc_type=excluded.doc_type,
               doc_number=excluded.doc_number,
               series=excluded.series,
               issue_date=excluded.issue_date,
               total_value=excluded.total_value,
               source_hash=excluded.source_hash,
               imported_at=excluded.imported_at"
        } else {
            "INSERT INTO documents (doc_type, doc_number, series, access_key, issue_date,
                                    emitter_id, receiver_id, total_value, source_hash, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(access_key) DO NOTHING"
        };

        let conn = self.storage.conn();
        conn.execute(
            sql,
            params![
                record.kind.as_str(),
                record.doc_number,
                record.series,
                record.access_key,
                record.issue_date,
                emitter_id,
                receiver_id,
                record.total_value,
                source_hash,
                now_utc_string()
            ],
        )?;

        let id = conn.query_row(
            "SELECT id FROM documents WHERE access_key = ?1",
            [&record.access_key],
            |row| row.get(0),
        )?;
        Ok(Some(id))
    }
}

pub struct DocumentItemRepository<'a> {
    storage: &'a Storage,
}

impl<'a> DocumentItemRepository<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn delete_for_document(&self, document_id: i64) -> Result<usize> {
        self.storage.conn().execute(
            "DELETE FROM document_items WHERE document_id = ?1",
            [document_id],
        )
    }

    pub fn insert(
        &self,
        document_id: i64,
        product_id: i64,
        position: usize,
        item: &LineItem,
    ) -> Result<i64> {
        let conn = self.storage.conn();
        conn.execute(
            "INSERT INTO document_items (document_id, product_id, position, quantity, unit_value, total_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                document_id,
                product_id,
                position as i64,
                item.quantity,
                item.unit_value,
                item.total_value
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
