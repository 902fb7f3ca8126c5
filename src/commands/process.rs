use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use tracing::{error, info};

use crate::cli::ProcessArgs;
use crate::db::Storage;
use crate::importer::Importer;
use crate::model::ImportSummary;

pub fn run(args: ProcessArgs) -> Result<()> {
    let storage = Storage::open(&args.db_path)?;
    storage.ensure_schema()?;
    let importer = Importer::new(&storage);

    let mut summaries: Vec<ImportSummary> = Vec::new();
    let mut failed = 0_usize;

    for path in &args.files {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

        match importer.import(&bytes) {
            Ok(summary) => {
                if !args.json {
                    println!(
                        "{}: {} number={} access_key={} items={}",
                        path.display(),
                        summary.doc_type,
                        summary.doc_number,
                        summary.access_key,
                        summary.items_persisted
                    );
                }
                summaries.push(summary);
            }
            // One undecodable file must not sink the rest of the batch.
            Err(err) if err.is_data_quality() => {
                error!(path = %path.display(), error = %err, "skipping file");
                failed += 1;
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("storage failure while importing {}", path.display())));
            }
        }
    }

    if args.json {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, &summaries)
            .context("failed to serialize import summaries")?;
        writeln!(out)?;
    }

    info!(
        processed = summaries.len(),
        failed,
        "process command completed"
    );

    if failed > 0 {
        bail!("{failed} of {} file(s) could not be imported", args.files.len());
    }
    Ok(())
}
