use roxmltree::{Document, Node};

use crate::error::ParseError;
use crate::model::{DocKind, FiscalDocument, LineItem, Party, Product};
use crate::parser::navigator::{decimal_at, descendant, text_at};
use crate::parser::{access_key_from_id, cnpj_or_cpf, emitter_party, require_access_key};

pub fn extract_full(doc: &Document) -> Result<FiscalDocument, ParseError> {
    let info = descendant(doc.root(), "infNFe").ok_or_else(|| ParseError::Malformed {
        doc_type: "NF-e",
        reason: "infNFe node missing".to_string(),
    })?;

    Ok(FiscalDocument {
        kind: DocKind::Nfe,
        access_key: access_key_from_id(info, "NFe", "NF-e")?,
        doc_number: text_at(info, &["ide", "nNF"]),
        series: text_at(info, &["ide", "serie"]),
        issue_date: text_at(info, &["ide", "dhEmi"]),
        total_value: decimal_at(info, &["total", "ICMSTot", "vNF"], 0.0),
        emitter: emitter_party(info),
        receiver: extract_receiver(info),
        items: extract_items(info),
    })
}

/// Resumed summary delivered by the distribution service: header and emitter
/// only, the access key as element text instead of an Id attribute.
pub fn extract_summary(doc: &Document) -> Result<FiscalDocument, ParseError> {
    let info = descendant(doc.root(), "resNFe").ok_or_else(|| ParseError::Malformed {
        doc_type: "NF-e-resumo",
        reason: "resNFe node missing".to_string(),
    })?;

    Ok(FiscalDocument {
        kind: DocKind::NfeSummary,
        access_key: require_access_key(text_at(info, &["chNFe"]), "NF-e-resumo")?,
        doc_number: String::new(),
        series: String::new(),
        issue_date: text_at(info, &["dhEmi"]),
        total_value: decimal_at(info, &["vNF"], 0.0),
        emitter: Party {
            cnpj_cpf: cnpj_or_cpf(info),
            name: text_at(info, &["xNome"]),
            ..Party::default()
        },
        receiver: Party::default(),
        items: Vec::new(),
    })
}

/// Event summary: references an existing document by access key and carries
/// no business payload of its own.
pub fn extract_event(doc: &Document) -> Result<FiscalDocument, ParseError> {
    let info = descendant(doc.root(), "resEvento").ok_or_else(|| ParseError::Malformed {
        doc_type: "NF-e-evento",
        reason: "resEvento node missing".to_string(),
    })?;

    Ok(FiscalDocument {
        kind: DocKind::NfeEvent,
        access_key: require_access_key(text_at(info, &["chNFe"]), "NF-e-evento")?,
        doc_number: String::new(),
        series: String::new(),
        issue_date: text_at(info, &["dhEvento"]),
        total_value: 0.0,
        emitter: Party::default(),
        receiver: Party::default(),
        items: Vec::new(),
    })
}

fn extract_receiver(info: Node<'_, '_>) -> Party {
    let Some(dest) = descendant(info, "dest") else {
        return Party::default();
    };
    Party {
        cnpj_cpf: cnpj_or_cpf(dest),
        name: text_at(dest, &["xNome"]),
        fantasy_name: text_at(dest, &["xFant"]),
        address: text_at(dest, &["enderDest", "xLgr"]),
        city: text_at(dest, &["enderDest", "xMun"]),
        state: text_at(dest, &["enderDest", "UF"]),
        cep: text_at(dest, &["enderDest", "CEP"]),
    }
}

/// One line item per `det` node, in document order. A `det` without a `prod`
/// child is skipped; unparseable numeric fields degrade to zero.
fn extract_items(info: Node<'_, '_>) -> Vec<LineItem> {
    info.descendants()
        .skip(1)
        .filter(|n| n.is_element() && n.tag_name().name() == "det")
        .filter_map(|det| descendant(det, "prod"))
        .map(|prod| LineItem {
            product: Product {
                code: text_at(prod, &["cProd"]),
                description: text_at(prod, &["xProd"]),
                ncm: text_at(prod, &["NCM"]),
                unit: text_at(prod, &["uCom"]),
            },
            quantity: decimal_at(prod, &["qCom"], 0.0),
            unit_value: decimal_at(prod, &["vUnCom"], 0.0),
            total_value: decimal_at(prod, &["vProd"], 0.0),
        })
        .collect()
}
