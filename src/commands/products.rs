use anyhow::{Result, bail};
use tracing::info;

use crate::cli::AddProductArgs;
use crate::db::Storage;
use crate::db::repository::ProductRepository;
use crate::model::Product;

pub fn run(args: AddProductArgs) -> Result<()> {
    let storage = Storage::open(&args.db_path)?;
    storage.ensure_schema()?;

    let product = Product {
        code: args.code.trim().to_string(),
        description: args.description,
        ncm: args.ncm,
        unit: args.unit,
    };

    let Some(id) = ProductRepository::new(&storage).upsert(&product)? else {
        bail!("a product requires a code");
    };

    info!(id, code = %product.code, "product saved");
    Ok(())
}
