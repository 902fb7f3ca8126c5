mod classifier;
mod cte;
pub mod navigator;
mod nfe;


use roxmltree::{Document, Node};
use tracing::warn;

use crate::error::ParseError;
use crate::model::{DocKind, FiscalDocument, Party};
use crate::parser::navigator::{descendant, text_at};

/// Classify raw XML text and extract the canonical record for whichever
/// document kind it turns out to be.
pub fn parse_document(xml: &str) -> Result<FiscalDocument, ParseError> {
    let doc = Document::parse(xml)?;
    match classifier::classify(&doc)? {
        DocKind::Nfe => nfe::extract_full(&doc),
        DocKind::NfeSummary => nfe::extract_summary(&doc),
        DocKind::NfeEvent => nfe::extract_event(&doc),
        DocKind::Cte => cte::extract(&doc),
    }
}

pub fn parse_bytes(bytes: &[u8]) -> Result<FiscalDocument, ParseError> {
    let xml = std::str::from_utf8(bytes)?;
    parse_document(xml)
}

/// Access key from the info node's Id attribute, with the document-type
/// prefix token stripped. An empty result is a structural failure: a
/// document without an identity cannot be stored under a natural key.
fn access_key_from_id(
    info: Node<'_, '_>,
    prefix: &str,
    doc_type: &'static str,
) -> Result<String, ParseError> {
    let id = info.attribute("Id").unwrap_or_default();
    let key = id.strip_prefix(prefix).unwrap_or(id).trim().to_string();
    require_access_key(key, doc_type)
}

fn require_access_key(key: String, doc_type: &'static str) -> Result<String, ParseError> {
    if key.is_empty() {
        return Err(ParseError::Malformed {
            doc_type,
            reason: "document carries no access key".to_string(),
        });
    }
    if key.len() != 44 || !key.chars().all(|c| c.is_ascii_digit()) {
        warn!(access_key = %key, doc_type, "access key does not match the 44-digit shape");
    }
    Ok(key)
}

/// Emitter extraction is identical for NF-e and CT-e: an `emit` node with an
/// `enderEmit` address block. A missing node yields an empty party.
fn emitter_party(info: Node<'_, '_>) -> Party {
    let Some(emit) = descendant(info, "emit") else {
        return Party::default();
    };
    Party {
        cnpj_cpf: text_at(emit, &["CNPJ"]),
        name: text_at(emit, &["xNome"]),
        fantasy_name: text_at(emit, &["xFant"]),
        address: text_at(emit, &["enderEmit", "xLgr"]),
        city: text_at(emit, &["enderEmit", "xMun"]),
        state: text_at(emit, &["enderEmit", "UF"]),
        cep: text_at(emit, &["enderEmit", "CEP"]),
    }
}

/// Receivers may be companies (CNPJ) or individuals (CPF); exactly one of
/// the two is populated in the source.
fn cnpj_or_cpf(node: Node<'_, '_>) -> String {
    let cnpj = text_at(node, &["CNPJ"]);
    if cnpj.is_empty() {
        text_at(node, &["CPF"])
    } else {
        cnpj
    }
}
