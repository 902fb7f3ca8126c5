use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::SearchArgs;
use crate::db::Storage;
use crate::db::repository::{ProductRepository, ReceiverRepository};

pub fn run_clients(args: SearchArgs) -> Result<()> {
    let storage = Storage::open_read_only(&args.db_path)?;
    let rows = ReceiverRepository::new(&storage).search(&args.query)?;

    info!(query = %args.query, result_count = rows.len(), "client search completed");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        serde_json::to_writer_pretty(&mut out, &rows).context("failed to serialize clients")?;
        writeln!(out)?;
        return Ok(());
    }

    if rows.is_empty() {
        writeln!(out, "no clients found for query: {}", args.query)?;
        return Ok(());
    }

    for row in rows {
        writeln!(
            out,
            "{}  {}  {}  {}/{}",
            row.id, row.cnpj_cpf, row.name, row.city, row.state
        )?;
    }
    Ok(())
}

pub fn run_products(args: SearchArgs) -> Result<()> {
    let storage = Storage::open_read_only(&args.db_path)?;
    let rows = ProductRepository::new(&storage).search(&args.query)?;

    info!(query = %args.query, result_count = rows.len(), "product search completed");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        serde_json::to_writer_pretty(&mut out, &rows).context("failed to serialize products")?;
        writeln!(out)?;
        return Ok(());
    }

    if rows.is_empty() {
        writeln!(out, "no products found for query: {}", args.query)?;
        return Ok(());
    }

    for row in rows {
        writeln!(
            out,
            "{}  {}  {}  ncm={} unit={}",
            row.id, row.code, row.description, row.ncm, row.unit
        )?;
    }
    Ok(())
}
