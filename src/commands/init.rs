use anyhow::Result;
use tracing::info;

use crate::cli::InitArgs;
use crate::db::Storage;

pub fn run(args: InitArgs) -> Result<()> {
    let storage = Storage::open(&args.db_path)?;
    storage.ensure_schema()?;

    info!(path = %args.db_path.display(), "database initialized");
    Ok(())
}
