use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::db::Storage;
use crate::error::ImportError;
use crate::importer::Importer;
use crate::model::{DocKind, ImportSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Homologation,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "producao",
            Self::Homologation => "homologacao",
        }
    }
}

/// One document returned by the distribution service, identified by its
/// sequence number and the schema token of its payload.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub nsu: u64,
    pub schema: String,
    pub xml: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DistributionResponse {
    pub status_code: String,
    pub next_nsu: u64,
    pub max_nsu: u64,
    pub documents: Vec<FetchedDocument>,
}

/// Seam for the government distribution service. Certificate loading and the
/// SOAP envelope live entirely behind an implementation of this trait; the
/// core only consumes the returned payloads.
pub trait DocumentFetcher {
    fn fetch_documents_since(
        &self,
        last_nsu: u64,
        tax_id: &str,
        environment: Environment,
    ) -> anyhow::Result<DistributionResponse>;
}

/// Schema tokens carry a version suffix, e.g. "procNFe_v4.00" or
/// "resEvento_v1.01".
static SCHEMA_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)_v[\d.]+$").expect("schema token regex compiles"));

pub fn kind_for_schema(schema: &str) -> Option<DocKind> {
    let token = SCHEMA_TOKEN
        .captures(schema)
        .and_then(|captures| captures.get(1))
        .map_or(schema, |m| m.as_str());

    match token {
        "procNFe" | "nfeProc" | "NFe" => Some(DocKind::Nfe),
        "resNFe" => Some(DocKind::NfeSummary),
        "resEvento" | "procEventoNFe" => Some(DocKind::NfeEvent),
        "procCTe" | "cteProc" | "CTe" => Some(DocKind::Cte),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub struct BatchFailure {
    pub nsu: u64,
    pub reason: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub imported: Vec<ImportSummary>,
    pub failures: Vec<BatchFailure>,
}

/// Feed every fetched payload through the import pipeline exactly as if it
/// were a locally supplied file. Data-quality failures are recorded and the
/// batch continues; a storage failure aborts the batch.
pub fn import_batch(
    storage: &Storage,
    documents: &[FetchedDocument],
) -> Result<BatchSummary, ImportError> {
    let importer = Importer::new(storage);
    let mut summary = BatchSummary::default();

    for document in documents {
        match importer.import(&document.xml) {
            Ok(imported) => {
                if let Some(expected) = kind_for_schema(&document.schema) {
                    if imported.doc_type != expected.as_str() {
                        warn!(
                            nsu = document.nsu,
                            schema = %document.schema,
                            classified = imported.doc_type,
                            "schema token disagrees with classified document kind"
                        );
                    }
                }
                summary.imported.push(imported);
            }
            Err(err) if err.is_data_quality() => {
                warn!(nsu = document.nsu, error = %err, "skipping undecodable distribution document");
                summary.failures.push(BatchFailure {
                    nsu: document.nsu,
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(summary)
}
