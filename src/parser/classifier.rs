use roxmltree::Document;

use crate::error::ParseError;
use crate::model::DocKind;
use crate::parser::navigator;

/// One anchor element per supported document kind, checked in fixed priority
/// order. First match wins; a tree carrying several anchors is not
/// disambiguated further.
const ANCHORS: [(&str, DocKind); 4] = [
    ("infNFe", DocKind::Nfe),
    ("infCte", DocKind::Cte),
    ("resNFe", DocKind::NfeSummary),
    ("resEvento", DocKind::NfeEvent),
];

pub fn classify(doc: &Document) -> Result<DocKind, ParseError> {
    for (anchor, kind) in ANCHORS {
        if navigator::descendant(doc.root(), anchor).is_some() {
            return Ok(kind);
        }
    }
    Err(ParseError::UnrecognizedDocument)
}
