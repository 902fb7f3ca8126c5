use tracing::{debug, info};

use crate::db::Storage;
use crate::db::repository::{
    DocumentItemRepository, DocumentRepository, EmitterRepository, ProductRepository,
    ReceiverRepository,
};
use crate::error::{ImportError, ParseError};
use crate::model::{DocKind, FiscalDocument, ImportSummary};
use crate::parser;
use crate::util::sha256_hex;

/// Drives one import run per input: classify, extract, persist in dependency
/// order. Extraction failures never reach the persistence stage.
pub struct Importer<'a> {
    storage: &'a Storage,
}

impl<'a> Importer<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn import(&self, xml: &[u8]) -> Result<ImportSummary, ImportError> {
        let record = parser::parse_bytes(xml)?;
        self.persist(&record, &sha256_hex(xml))
    }

    fn persist(
        &self,
        record: &FiscalDocument,
        source_hash: &str,
    ) -> Result<ImportSummary, ImportError> {
        let tx = self.storage.conn().unchecked_transaction()?;

        let emitter_id = EmitterRepository::new(self.storage).upsert(&record.emitter)?;
        let receiver_id = ReceiverRepository::new(self.storage).upsert(&record.receiver)?;

        let document_id = DocumentRepository::new(self.storage)
            .upsert(record, emitter_id, receiver_id, source_hash)?
            .ok_or_else(|| ParseError::Malformed {
                doc_type: record.kind.as_str(),
                reason: "document carries no access key".to_string(),
            })?;

        let items_persisted = self.persist_items(record, document_id)?;

        tx.commit()?;

        info!(
            doc_type = record.kind.as_str(),
            access_key = %record.access_key,
            document_id,
            items = items_persisted,
            "document imported"
        );

        Ok(ImportSummary {
            document_id,
            doc_type: record.kind.as_str(),
            doc_number: record.doc_number.clone(),
            access_key: record.access_key.clone(),
            items_persisted,
        })
    }

    /// Only a full NF-e payload owns the item set for its document; summary
    /// and event re-imports must not wipe items persisted by an earlier full
    /// import. Re-importing a full document replaces its items wholesale.
    fn persist_items(
        &self,
        record: &FiscalDocument,
        document_id: i64,
    ) -> Result<usize, ImportError> {
        if record.kind != DocKind::Nfe {
            return Ok(0);
        }

        let products = ProductRepository::new(self.storage);
        let items = DocumentItemRepository::new(self.storage);

        items.delete_for_document(document_id)?;

        let mut persisted = 0;
        for (position, item) in record.items.iter().enumerate() {
            let Some(product_id) = products.upsert(&item.product)? else {
                debug!(position, "skipping line item without a product code");
                continue;
            };
            items.insert(document_id, product_id, position, item)?;
            persisted += 1;
        }
        Ok(persisted)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::error::ParseError;

    const NFE_XML: &str = r#"<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
      <NFe>
        <infNFe Id="NFe35200714200166000187550010000000046550010466" versao="4.00">
          <ide>
            <serie>1</serie>
            <nNF>46</nNF>
            <dhEmi>2020-07-10T09:00:00-03:00</dhEmi>
          </ide>
          <emit>
            <CNPJ>14200166000187</CNPJ>
            <xNome>Widget Industries Ltda</xNome>
          </emit>
          <dest>
            <CNPJ>11222333000181</CNPJ>
            <xNome>Acme Comercio SA</xNome>
          </dest>
          <det nItem="1">
            <prod>
              <cProd>P001</cProd>
              <xProd>Widget</xProd>
              <uCom>UN</uCom>
              <qCom>2</qCom>
              <vUnCom>10.50</vUnCom>
              <vProd>21.00</vProd>
            </prod>
          </det>
          <total>
            <ICMSTot>
              <vNF>21.00</vNF>
            </ICMSTot>
          </total>
        </infNFe>
      </NFe>
    </nfeProc>"#;

    const CTE_NO_TOTAL_XML: &str = r#"<cteProc xmlns="http://www.portalfiscal.inf.br/cte" versao="3.00">
      <CTe>
        <infCte Id="CTe35200714200166000187570010000000011550010001" versao="3.00">
          <ide>
            <serie>1</serie>
            <nCT>11</nCT>
          </ide>
          <emit>
            <CNPJ>14200166000187</CNPJ>
            <xNome>Widget Industries Ltda</xNome>
          </emit>
        </infCte>
      </CTe>
    </cteProc>"#;

    const EVENT_XML: &str = r#"<resEvento xmlns="http://www.portalfiscal.inf.br/nfe" versao="1.01">
        <chNFe>35200714200166000187550010000000046550010466</chNFe>
        <tpEvento>110111</tpEvento>
        <dhEvento>2020-07-12T10:00:00-03:00</dhEvento>
    </resEvento>"#;

    fn storage() -> Storage {
        let storage = Storage::open(Path::new(":memory:")).expect("open in-memory storage");
        storage.ensure_schema().expect("create schema");
        storage
    }

    fn count(storage: &Storage, table: &str) -> i64 {
        storage
            .conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .expect("count rows")
    }

    #[test]
    fn full_nfe_import_persists_all_entities() {
        let storage = storage();
        let summary = Importer::new(&storage)
            .import(NFE_XML.as_bytes())
            .expect("import succeeds");

        assert_eq!(summary.doc_type, "NF-e");
        assert_eq!(summary.doc_number, "46");
        assert_eq!(
            summary.access_key,
            "35200714200166000187550010000000046550010466"
        );
        assert_eq!(summary.items_persisted, 1);

        assert_eq!(count(&storage, "emitters"), 1);
        assert_eq!(count(&storage, "receivers"), 1);
        assert_eq!(count(&storage, "products"), 1);
        assert_eq!(count(&storage, "documents"), 1);
        assert_eq!(count(&storage, "document_items"), 1);

        let cnpj: String = storage
            .conn()
            .query_row("SELECT cnpj FROM emitters", [], |row| row.get(0))
            .expect("select emitter");
        assert_eq!(cnpj, "14200166000187");

        let unit_value: f64 = storage
            .conn()
            .query_row("SELECT unit_value FROM document_items", [], |row| {
                row.get(0)
            })
            .expect("select item");
        assert_eq!(unit_value, 10.50);
    }

    #[test]
    fn reimport_overwrites_header_and_keeps_single_item_set() {
        let storage = storage();
        let importer = Importer::new(&storage);

        importer.import(NFE_XML.as_bytes()).expect("first import");
        let changed = NFE_XML.replace("<nNF>46</nNF>", "<nNF>47</nNF>");
        importer
            .import(changed.as_bytes())
            .expect("second import");

        assert_eq!(count(&storage, "documents"), 1);
        assert_eq!(count(&storage, "document_items"), 1);
        assert_eq!(count(&storage, "emitters"), 1);

        let number: String = storage
            .conn()
            .query_row("SELECT doc_number FROM documents", [], |row| row.get(0))
            .expect("select number");
        assert_eq!(number, "47");
    }

    #[test]
    fn syntax_error_writes_nothing() {
        let storage = storage();
        let err = Importer::new(&storage)
            .import(b"<nfeProc><NFe")
            .unwrap_err();

        assert!(matches!(
            err,
            ImportError::Parse(ParseError::XmlSyntax(_))
        ));
        for table in [
            "emitters",
            "receivers",
            "products",
            "documents",
            "document_items",
        ] {
            assert_eq!(count(&storage, table), 0, "table {table} must stay empty");
        }
    }

    #[test]
    fn cte_without_total_still_persists() {
        let storage = storage();
        let summary = Importer::new(&storage)
            .import(CTE_NO_TOTAL_XML.as_bytes())
            .expect("import succeeds");

        assert_eq!(summary.doc_type, "CT-e");
        assert_eq!(summary.items_persisted, 0);

        let total: f64 = storage
            .conn()
            .query_row("SELECT total_value FROM documents", [], |row| row.get(0))
            .expect("select total");
        assert_eq!(total, 0.0);
    }

    #[test]
    fn event_import_never_clobbers_a_full_document() {
        let storage = storage();
        let importer = Importer::new(&storage);

        importer.import(NFE_XML.as_bytes()).expect("full import");
        let event = importer
            .import(EVENT_XML.as_bytes())
            .expect("event import");

        assert_eq!(event.items_persisted, 0);
        assert_eq!(count(&storage, "documents"), 1);
        assert_eq!(count(&storage, "document_items"), 1);

        let (doc_type, number): (String, String) = storage
            .conn()
            .query_row(
                "SELECT doc_type, doc_number FROM documents",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("select header");
        assert_eq!(doc_type, "NF-e");
        assert_eq!(number, "46");
    }

    #[test]
    fn event_before_full_document_creates_a_stub() {
        let storage = storage();
        let importer = Importer::new(&storage);

        importer.import(EVENT_XML.as_bytes()).expect("event import");
        assert_eq!(count(&storage, "documents"), 1);

        importer.import(NFE_XML.as_bytes()).expect("full import");
        assert_eq!(count(&storage, "documents"), 1);

        let number: String = storage
            .conn()
            .query_row("SELECT doc_number FROM documents", [], |row| row.get(0))
            .expect("select number");
        assert_eq!(number, "46");
    }
}
