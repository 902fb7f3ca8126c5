use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocKind {
    Nfe,
    Cte,
    NfeSummary,
    NfeEvent,
}

impl DocKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nfe => "NF-e",
            Self::Cte => "CT-e",
            Self::NfeSummary => "NF-e-resumo",
            Self::NfeEvent => "NF-e-evento",
        }
    }

    /// Events only reference an existing document; their payload carries no
    /// header data worth overwriting an already-imported document with.
    pub fn refreshes_header(self) -> bool {
        !matches!(self, Self::NfeEvent)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub cnpj_cpf: String,
    pub name: String,
    pub fantasy_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub cep: String,
}

impl Party {
    pub fn has_key(&self) -> bool {
        !self.cnpj_cpf.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    pub description: String,
    pub ncm: String,
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: Product,
    pub quantity: f64,
    pub unit_value: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalDocument {
    pub kind: DocKind,
    pub access_key: String,
    pub doc_number: String,
    pub series: String,
    pub issue_date: String,
    pub total_value: f64,
    pub emitter: Party,
    pub receiver: Party,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub document_id: i64,
    pub doc_type: &'static str,
    pub doc_number: String,
    pub access_key: String,
    pub items_persisted: usize,
}
