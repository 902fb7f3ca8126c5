use roxmltree::{Document, Node};

use crate::error::ParseError;
use crate::model::{DocKind, FiscalDocument, Party};
use crate::parser::navigator::{decimal_at, descendant, text_at};
use crate::parser::{access_key_from_id, cnpj_or_cpf, emitter_party};

/// Receiver candidates in priority order: destinatário, then remetente, then
/// recebedor. Fields come from the single node that matched first.
const RECEIVER_NODES: [&str; 3] = ["dest", "rem", "receb"];

pub fn extract(doc: &Document) -> Result<FiscalDocument, ParseError> {
    let info = descendant(doc.root(), "infCte").ok_or_else(|| ParseError::Malformed {
        doc_type: "CT-e",
        reason: "infCte node missing".to_string(),
    })?;

    Ok(FiscalDocument {
        kind: DocKind::Cte,
        access_key: access_key_from_id(info, "CTe", "CT-e")?,
        doc_number: text_at(info, &["ide", "nCT"]),
        series: text_at(info, &["ide", "serie"]),
        issue_date: text_at(info, &["ide", "dhEmi"]),
        total_value: decimal_at(info, &["vPrest", "vTPrest"], 0.0),
        emitter: emitter_party(info),
        receiver: extract_receiver(info),
        // Transport documents carry no merchandise items.
        items: Vec::new(),
    })
}

fn extract_receiver(info: Node<'_, '_>) -> Party {
    let Some(node) = RECEIVER_NODES
        .into_iter()
        .find_map(|name| descendant(info, name))
    else {
        return Party::default();
    };

    Party {
        cnpj_cpf: cnpj_or_cpf(node),
        name: text_at(node, &["xNome"]),
        fantasy_name: text_at(node, &["xFant"]),
        address: address_field(node, "xLgr"),
        city: address_field(node, "xMun"),
        state: address_field(node, "UF"),
        cep: address_field(node, "CEP"),
    }
}

/// The address block is `enderDest` on a destinatário but plain `ender` on
/// the fallback nodes; try both.
fn address_field(node: Node<'_, '_>, field: &str) -> String {
    let primary = text_at(node, &["enderDest", field]);
    if primary.is_empty() {
        text_at(node, &["ender", field])
    } else {
        primary
    }
}
