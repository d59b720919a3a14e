use chrono::{Datelike, Local};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::db::repository::load_catalog;
use crate::db::DatabaseError;
use crate::models::{Direction, NewLedgerEntry, SourceKind};
use crate::pipeline::chunker::ChunkPlanner;
use crate::pipeline::dedup::{BatchVerdict, DeduplicationEngine, DuplicateVerdict};
use crate::pipeline::extraction::{
    DocumentExtractor, ExtractedContent, ExtractionError, OcrClient, RawDocument,
};
use crate::pipeline::numeric::NumericTokenExtractor;
use crate::pipeline::resolver::CategoryResolver;
use crate::pipeline::structuring::{
    structure_chunks, ChunkPayload, PromptBuilder, StructuringClient,
};
use crate::pipeline::validation::{TransactionValidator, ValidationVerdict};
use crate::pipeline::writer::{ImportCounts, LedgerWriter};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("failed to load category catalog: {0}")]
    Catalog(DatabaseError),

    #[error("all {0} chunks failed structuring")]
    AllChunksFailed(usize),

    #[error("persistence failed: {0}")]
    Persistence(#[from] DatabaseError),
}

/// Where a run currently stands. Terminal states are `Done` and `Failed`;
/// `Failed` is only reachable from `Extracting`, `Structuring` (all chunks
/// lost) and `Persisting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Extracting,
    Chunking,
    Structuring,
    Validating,
    Deduplicating,
    AwaitingConfirmation,
    Persisting,
    Done,
    Failed,
}

/// Everything the pipeline wants to know about one incoming document.
#[derive(Debug)]
pub struct ImportRequest {
    pub user_id: i64,
    pub user_name: String,
    pub account_id: i64,
    pub account_name: String,
    pub kind: SourceKind,
    pub document: RawDocument,
}

/// What the user sees before confirming.
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub run_id: Uuid,
    /// Entries that will be inserted on confirm.
    pub pending: usize,
    pub skipped_duplicate: usize,
    pub rejected_invalid: usize,
    pub failed_chunks: usize,
    pub total_chunks: usize,
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub consistency_ratio: f64,
    pub consistency_warning: bool,
    /// Set when the whole document was judged already imported.
    pub batch_duplicate: Option<String>,
    pub suggested_card_name: Option<String>,
    pub suggested_due_date: Option<String>,
    pub rejection_reasons: Vec<String>,
}

/// Entry point of the pipeline. `prepare` runs every stage up to the user
/// confirmation boundary; nothing touches the ledger until `confirm`.
pub struct ImportRun;

/// A run parked at `AwaitingConfirmation`. Consuming it with `confirm`
/// persists the batch; `cancel` ends the run with zero writes.
#[derive(Debug)]
pub struct PreparedImport {
    state: RunState,
    entries: Vec<NewLedgerEntry>,
    summary: ImportSummary,
}

impl ImportRun {
    pub fn prepare(
        conn: &Connection,
        config: &PipelineConfig,
        client: &dyn StructuringClient,
        ocr: Option<&dyn OcrClient>,
        request: &ImportRequest,
    ) -> Result<PreparedImport, PipelineError> {
        let run_id = Uuid::new_v4();
        let mut state = RunState::Extracting;
        tracing::info!(%run_id, kind = %request.kind, file = %request.document.file_name, "import run started");

        let extractor = DocumentExtractor::new(config, ocr);
        let content = extractor.extract(&request.document).inspect_err(|e| {
            tracing::error!(%run_id, error = %e, "extraction failed");
        })?;
        let text = match content {
            ExtractedContent::Text(t) => t.text,
            ExtractedContent::Rows(rows) => rows_to_text(&rows),
        };

        let tokens = NumericTokenExtractor::extract(&text);

        advance(&mut state, RunState::Chunking, run_id);
        let chunks = ChunkPlanner::new(config.max_chunk_chars).plan(&text);
        if chunks.is_empty() {
            return Err(ExtractionError::NoUsableText.into());
        }

        let catalog = load_catalog(conn).map_err(PipelineError::Catalog)?;
        let builder = PromptBuilder::new(&catalog, &request.user_name, Local::now().year());
        let prompts: Vec<String> =
            chunks.iter().map(|c| builder.build(request.kind, &c.text)).collect();

        advance(&mut state, RunState::Structuring, run_id);
        let results = structure_chunks(client, &prompts, config.max_in_flight);
        let total_chunks = results.len();
        let failed_chunks = results.iter().filter(|r| r.is_err()).count();
        if failed_chunks == total_chunks {
            tracing::error!(%run_id, total_chunks, "every chunk failed structuring");
            return Err(PipelineError::AllChunksFailed(total_chunks));
        }
        let payloads: Vec<ChunkPayload> = results.into_iter().filter_map(Result::ok).collect();

        let suggested_due_date =
            payloads.iter().find_map(|p| p.suggested_due_date.clone());
        let suggested_card_name =
            payloads.iter().find_map(|p| p.suggested_card_name.clone());

        advance(&mut state, RunState::Validating, run_id);
        let validator = TransactionValidator::new(config);
        let mut accepted = Vec::new();
        let mut rejection_reasons = Vec::new();
        for candidate in payloads.iter().flat_map(|p| &p.transactions) {
            match validator.validate(candidate) {
                ValidationVerdict::Accept(tx) => accepted.push(*tx),
                ValidationVerdict::Reject { reason } => {
                    tracing::debug!(%run_id, reason, "candidate rejected");
                    rejection_reasons.push(reason);
                }
            }
        }

        let consistency_ratio = validator.consistency_ratio(&accepted, &tokens);
        let consistency_warning = !validator.is_consistent(consistency_ratio);
        if consistency_warning {
            tracing::warn!(%run_id, consistency_ratio, "amounts diverge from document text");
        }

        advance(&mut state, RunState::Deduplicating, run_id);
        let engine = DeduplicationEngine::new(config);
        let batch = engine.check_batch(
            conn,
            request.kind,
            request.user_id,
            request.account_id,
            suggested_due_date.as_deref(),
        )?;

        let mut kept = Vec::new();
        let mut skipped_duplicate = 0usize;
        let batch_duplicate = match batch {
            BatchVerdict::DuplicateBatch { reason } => {
                tracing::warn!(%run_id, reason, "document judged already imported");
                skipped_duplicate = accepted.len();
                Some(reason)
            }
            BatchVerdict::Proceed => {
                for tx in accepted {
                    match engine.check_transaction(
                        conn,
                        request.kind,
                        request.user_id,
                        request.account_id,
                        &tx,
                    )? {
                        DuplicateVerdict::Keep => kept.push(tx),
                        DuplicateVerdict::Skip { reason } => {
                            tracing::debug!(%run_id, reason, "duplicate skipped");
                            skipped_duplicate += 1;
                        }
                    }
                }
                None
            }
        };

        let resolver = CategoryResolver::new(&catalog);
        let mut total_inflow = 0.0;
        let mut total_outflow = 0.0;
        let entries: Vec<NewLedgerEntry> = kept
            .into_iter()
            .map(|tx| {
                // invoice lines are always expenses, whatever the service said
                let direction = match request.kind {
                    SourceKind::CreditCardInvoice => Direction::Outflow,
                    _ => tx.direction,
                };
                match direction {
                    Direction::Inflow => total_inflow += tx.amount,
                    Direction::Outflow => total_outflow += tx.amount,
                }
                let (category_id, subcategory_id) = resolver.resolve(
                    tx.suggested_category.as_deref(),
                    tx.suggested_subcategory.as_deref(),
                );
                let payment_method = match request.kind {
                    SourceKind::BankStatement => Some(request.account_name.clone()),
                    SourceKind::CreditCardInvoice => suggested_card_name
                        .clone()
                        .or_else(|| Some(request.account_name.clone())),
                    SourceKind::Receipt => None,
                };
                NewLedgerEntry {
                    user_id: request.user_id,
                    account_id: Some(request.account_id),
                    description: tx.description,
                    amount: tx.amount,
                    direction,
                    occurred_at: tx.occurred_at,
                    payment_method,
                    fiscal_document_id: tx.fiscal_document_id,
                    category_id,
                    subcategory_id,
                    line_items: tx.line_items,
                }
            })
            .collect();

        advance(&mut state, RunState::AwaitingConfirmation, run_id);
        let summary = ImportSummary {
            run_id,
            pending: entries.len(),
            skipped_duplicate,
            rejected_invalid: rejection_reasons.len(),
            failed_chunks,
            total_chunks,
            total_inflow,
            total_outflow,
            consistency_ratio,
            consistency_warning,
            batch_duplicate,
            suggested_card_name,
            suggested_due_date,
            rejection_reasons,
        };
        tracing::info!(
            %run_id,
            pending = summary.pending,
            skipped = summary.skipped_duplicate,
            rejected = summary.rejected_invalid,
            "awaiting confirmation"
        );

        Ok(PreparedImport { state, entries, summary })
    }
}

impl PreparedImport {
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn summary(&self) -> &ImportSummary {
        &self.summary
    }

    /// Persist the batch. One transaction; a failure leaves the ledger
    /// untouched and the run `Failed`.
    pub fn confirm(mut self, conn: &mut Connection) -> Result<ImportCounts, PipelineError> {
        advance(&mut self.state, RunState::Persisting, self.summary.run_id);
        match LedgerWriter::persist(
            conn,
            &self.entries,
            self.summary.skipped_duplicate,
            self.summary.rejected_invalid,
        ) {
            Ok(counts) => {
                advance(&mut self.state, RunState::Done, self.summary.run_id);
                Ok(counts)
            }
            Err(e) => {
                advance(&mut self.state, RunState::Failed, self.summary.run_id);
                Err(e.into())
            }
        }
    }

    /// End the run without writing anything.
    pub fn cancel(mut self) -> ImportSummary {
        advance(&mut self.state, RunState::Done, self.summary.run_id);
        tracing::info!(run_id = %self.summary.run_id, "import cancelled");
        self.summary
    }
}

fn advance(state: &mut RunState, to: RunState, run_id: Uuid) {
    tracing::debug!(%run_id, from = ?state, to = ?to, "run state");
    *state = to;
}

/// Render parsed CSV rows back into prompt-friendly lines.
fn rows_to_text(rows: &[crate::pipeline::extraction::CsvRow]) -> String {
    rows.iter()
        .map(|row| {
            row.fields
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{
        count_all_entries, get_or_create_user, insert_account, insert_entries, list_entries,
    };
    use crate::db::sqlite::open_memory_database;
    use crate::models::AccountKind;
    use crate::pipeline::extraction::ocr::MockOcrClient;
    use crate::pipeline::structuring::client::MockStructuringClient;
    use chrono::NaiveDateTime;

    fn setup() -> (Connection, i64, i64) {
        let conn = open_memory_database().unwrap();
        let user = get_or_create_user(&conn, 42, "Ana").unwrap();
        let account = insert_account(&conn, user, "Nubank", AccountKind::Checking).unwrap();
        (conn, user, account)
    }

    fn request(user: i64, account: i64, kind: SourceKind, doc: RawDocument) -> ImportRequest {
        ImportRequest {
            user_id: user,
            user_name: "Ana".into(),
            account_id: account,
            account_name: "Nubank".into(),
            kind,
            document: doc,
        }
    }

    fn csv_doc() -> RawDocument {
        RawDocument {
            bytes: b"Data;Descricao;Valor\n01/06/2025;PIX RECEBIDO JOAO;1200,00\n02/06/2025;UBER TRIP;25,50\n"
                .to_vec(),
            mime_type: "text/csv".into(),
            file_name: "extrato.csv".into(),
        }
    }

    const STATEMENT_RESPONSE: &str = r#"{
        "transacoes": [
            {"data": "01/06/2025", "descricao": "PIX RECEBIDO JOAO", "valor": 1200.00,
             "tipo_transacao": "Entrada", "categoria_sugerida": "Outros"},
            {"data": "02/06/2025", "descricao": "UBER TRIP", "valor": 25.50,
             "tipo_transacao": "Saída", "categoria_sugerida": "Transporte"}
        ]
    }"#;

    #[test]
    fn statement_import_end_to_end() {
        let (mut conn, user, account) = setup();
        let config = PipelineConfig::default();
        let client = MockStructuringClient::returning(STATEMENT_RESPONSE);
        let req = request(user, account, SourceKind::BankStatement, csv_doc());

        let prepared = ImportRun::prepare(&conn, &config, &client, None, &req).unwrap();
        assert_eq!(prepared.state(), RunState::AwaitingConfirmation);
        let summary = prepared.summary();
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.rejected_invalid, 0);
        assert!((summary.total_inflow - 1200.0).abs() < 1e-9);
        assert!((summary.total_outflow - 25.50).abs() < 1e-9);
        assert!(!summary.consistency_warning);

        let counts = prepared.confirm(&mut conn).unwrap();
        assert_eq!(counts.inserted, 2);

        let entries = list_entries(&conn, user).unwrap();
        assert_eq!(entries.len(), 2);
        // statements record the account name as the payment method
        assert_eq!(entries[0].payment_method.as_deref(), Some("Nubank"));
    }

    #[test]
    fn repeated_statement_import_is_idempotent() {
        let (mut conn, user, account) = setup();
        let config = PipelineConfig::default();
        let client = MockStructuringClient::returning(STATEMENT_RESPONSE);

        let req = request(user, account, SourceKind::BankStatement, csv_doc());
        ImportRun::prepare(&conn, &config, &client, None, &req)
            .unwrap()
            .confirm(&mut conn)
            .unwrap();

        let req = request(user, account, SourceKind::BankStatement, csv_doc());
        let second = ImportRun::prepare(&conn, &config, &client, None, &req).unwrap();
        assert_eq!(second.summary().pending, 0);
        assert_eq!(second.summary().skipped_duplicate, 2);
        let counts = second.confirm(&mut conn).unwrap();
        assert_eq!(counts.inserted, 0);
        assert_eq!(count_all_entries(&conn, user).unwrap(), 2);
    }

    #[test]
    fn receipt_import_dedupes_on_fiscal_id_and_window() {
        let (mut conn, user, account) = setup();
        let config = PipelineConfig::default();
        let ocr = MockOcrClient::returning(
            "DROGARIA PACHECO LTDA\nCNPJ 12.345.678/0001-99\n28/06/2025 15:30\nTOTAL R$ 55,80",
        );
        let client = MockStructuringClient::returning(
            r#"{"transacoes": [{
                "data": "28/06/2025", "hora": "15:30:00",
                "descricao": "DROGARIA PACHECO", "valor": 55.80,
                "tipo_transacao": "Saída",
                "categoria_sugerida": "Saúde",
                "documento_fiscal": "12.345.678/0001-99",
                "itens": [{"nome_item": "DORFLEX", "quantidade": 1, "valor_unitario": 25.50}]
            }]}"#,
        );

        let doc = || RawDocument {
            bytes: vec![0xFF, 0xD8, 0xFF],
            mime_type: "image/jpeg".into(),
            file_name: "nota.jpg".into(),
        };

        let req = request(user, account, SourceKind::Receipt, doc());
        let counts = ImportRun::prepare(&conn, &config, &client, Some(&ocr), &req)
            .unwrap()
            .confirm(&mut conn)
            .unwrap();
        assert_eq!(counts.inserted, 1);

        // same receipt photographed again minutes later
        let req = request(user, account, SourceKind::Receipt, doc());
        let counts = ImportRun::prepare(&conn, &config, &client, Some(&ocr), &req)
            .unwrap()
            .confirm(&mut conn)
            .unwrap();
        assert_eq!(counts.inserted, 0);
        assert_eq!(counts.skipped_duplicate, 1);

        let entries = list_entries(&conn, user).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].fiscal_document_id.as_deref(), Some("12345678000199"));
    }

    #[test]
    fn invoice_batch_duplicate_writes_nothing() {
        let (mut conn, user, account) = setup();
        let config = PipelineConfig::default();

        // six June entries already on the card: the billing month is taken
        let existing: Vec<NewLedgerEntry> = (1..=6)
            .map(|d| NewLedgerEntry {
                user_id: user,
                account_id: Some(account),
                description: format!("COMPRA {d}"),
                amount: d as f64,
                direction: Direction::Outflow,
                occurred_at: NaiveDateTime::parse_from_str(
                    &format!("{d:02}/06/2025 00:00:00"),
                    "%d/%m/%Y %H:%M:%S",
                )
                .unwrap(),
                payment_method: None,
                fiscal_document_id: None,
                category_id: None,
                subcategory_id: None,
                line_items: vec![],
            })
            .collect();
        insert_entries(&mut conn, &existing).unwrap();

        let client = MockStructuringClient::returning(
            r#"{"nome_cartao_sugerido": "NUBANK MASTERCARD",
                "vencimento_fatura_sugerido": "15/07/2025",
                "transacoes": [
                    {"data": "03/06/2025", "descricao": "IFOOD", "valor": 55.90, "tipo_transacao": "Saída"},
                    {"data": "04/06/2025", "descricao": "SPOTIFY", "valor": 21.90, "tipo_transacao": "Saída"}
                ]}"#,
        );
        let doc = RawDocument {
            bytes: b"fatura nubank junho IFOOD 55,90 SPOTIFY 21,90 vencimento 15/07/2025"
                .to_vec(),
            mime_type: "text/plain".into(),
            file_name: "fatura.txt".into(),
        };
        let req = request(user, account, SourceKind::CreditCardInvoice, doc);

        let prepared = ImportRun::prepare(&conn, &config, &client, None, &req).unwrap();
        assert!(prepared.summary().batch_duplicate.is_some());
        assert_eq!(prepared.summary().pending, 0);
        assert_eq!(prepared.summary().skipped_duplicate, 2);

        let counts = prepared.confirm(&mut conn).unwrap();
        assert_eq!(counts.inserted, 0);
        assert_eq!(count_all_entries(&conn, user).unwrap(), 6);
    }

    #[test]
    fn repeated_invoice_import_is_idempotent() {
        let (mut conn, user, account) = setup();
        let config = PipelineConfig::default();
        let client = MockStructuringClient::returning(
            r#"{"nome_cartao_sugerido": "NUBANK MASTERCARD",
                "vencimento_fatura_sugerido": "15/07/2025",
                "transacoes": [
                    {"data": "01/06/2025", "descricao": "IFOOD", "valor": 55.90, "tipo_transacao": "Saída"},
                    {"data": "02/06/2025", "descricao": "SPOTIFY", "valor": 21.90, "tipo_transacao": "Saída"},
                    {"data": "03/06/2025", "descricao": "UBER", "valor": 18.40, "tipo_transacao": "Saída"},
                    {"data": "04/06/2025", "descricao": "MERCADO", "valor": 230.00, "tipo_transacao": "Saída"},
                    {"data": "05/06/2025", "descricao": "FARMACIA", "valor": 42.75, "tipo_transacao": "Saída"},
                    {"data": "06/06/2025", "descricao": "CINEMA", "valor": 36.00, "tipo_transacao": "Saída"}
                ]}"#,
        );
        let doc = || RawDocument {
            bytes: b"fatura nubank junho IFOOD 55,90 SPOTIFY 21,90 UBER 18,40 vencimento 15/07/2025"
                .to_vec(),
            mime_type: "text/plain".into(),
            file_name: "fatura.txt".into(),
        };

        let req = request(user, account, SourceKind::CreditCardInvoice, doc());
        let counts = ImportRun::prepare(&conn, &config, &client, None, &req)
            .unwrap()
            .confirm(&mut conn)
            .unwrap();
        assert_eq!(counts.inserted, 6);

        // same invoice PDF sent again: the billing month is already loaded
        let req = request(user, account, SourceKind::CreditCardInvoice, doc());
        let second = ImportRun::prepare(&conn, &config, &client, None, &req).unwrap();
        assert!(second.summary().batch_duplicate.is_some());
        assert_eq!(second.summary().pending, 0);
        assert_eq!(second.summary().skipped_duplicate, 6);

        let counts = second.confirm(&mut conn).unwrap();
        assert_eq!(counts.inserted, 0);
        assert_eq!(count_all_entries(&conn, user).unwrap(), 6);
    }

    #[test]
    fn invoice_entries_are_forced_to_outflow() {
        let (mut conn, user, account) = setup();
        let config = PipelineConfig::default();
        let client = MockStructuringClient::returning(
            r#"{"nome_cartao_sugerido": "INTER GOLD",
                "vencimento_fatura_sugerido": "10/08/2025",
                "transacoes": [
                    {"data": "20/07/2025", "descricao": "ESTORNO LOJA", "valor": 80.00, "tipo_transacao": "Entrada"}
                ]}"#,
        );
        let doc = RawDocument {
            bytes: b"fatura inter julho ESTORNO LOJA 80,00".to_vec(),
            mime_type: "text/plain".into(),
            file_name: "fatura.txt".into(),
        };
        let req = request(user, account, SourceKind::CreditCardInvoice, doc);

        ImportRun::prepare(&conn, &config, &client, None, &req)
            .unwrap()
            .confirm(&mut conn)
            .unwrap();

        let entries = list_entries(&conn, user).unwrap();
        assert_eq!(entries[0].direction, Direction::Outflow);
        assert_eq!(entries[0].payment_method.as_deref(), Some("INTER GOLD"));
    }

    #[test]
    fn zero_amount_candidate_is_rejected_not_fatal() {
        let (mut conn, user, account) = setup();
        let config = PipelineConfig::default();
        let client = MockStructuringClient::returning(
            r#"{"transacoes": [
                {"data": "01/06/2025", "descricao": "AJUSTE", "valor": 0.0, "tipo_transacao": "Saída"},
                {"data": "02/06/2025", "descricao": "UBER TRIP", "valor": 25.50, "tipo_transacao": "Saída"}
            ]}"#,
        );
        let req = request(user, account, SourceKind::BankStatement, csv_doc());

        let prepared = ImportRun::prepare(&conn, &config, &client, None, &req).unwrap();
        assert_eq!(prepared.summary().rejected_invalid, 1);
        assert!(prepared
            .summary()
            .rejection_reasons
            .contains(&"amount cannot be zero".to_string()));

        let counts = prepared.confirm(&mut conn).unwrap();
        assert_eq!(counts.inserted, 1);
        assert_eq!(counts.rejected_invalid, 1);
    }

    #[test]
    fn hallucinated_amounts_raise_consistency_warning() {
        let (conn, user, account) = setup();
        let config = PipelineConfig::default();
        // none of these amounts appear in the CSV text
        let client = MockStructuringClient::returning(
            r#"{"transacoes": [
                {"data": "01/06/2025", "descricao": "A", "valor": 777.77, "tipo_transacao": "Saída"},
                {"data": "02/06/2025", "descricao": "B", "valor": 888.88, "tipo_transacao": "Saída"}
            ]}"#,
        );
        let req = request(user, account, SourceKind::BankStatement, csv_doc());

        let prepared = ImportRun::prepare(&conn, &config, &client, None, &req).unwrap();
        assert!(prepared.summary().consistency_warning);
        assert_eq!(prepared.summary().consistency_ratio, 0.0);
        // still awaiting confirmation; the warning never auto-rejects
        assert_eq!(prepared.summary().pending, 2);
    }

    #[test]
    fn multi_chunk_document_unions_per_chunk_results() {
        let (mut conn, user, account) = setup();
        let config = PipelineConfig { max_chunk_chars: 80, ..PipelineConfig::default() };
        // each chunk structures into exactly one transaction whose amount is
        // taken from the chunk's own text
        let client = MockStructuringClient::with(|prompt| {
            let amount = if prompt.contains("101,00") {
                "101.00"
            } else if prompt.contains("102,00") {
                "102.00"
            } else {
                "103.00"
            };
            Ok(format!(
                r#"{{"transacoes": [{{"data": "01/06/2025", "descricao": "LINHA", "valor": {amount}, "tipo_transacao": "Saída"}}]}}"#
            ))
        });

        let line = |n: u32| format!("01/06/2025 COMPRA PARCELADA LOJA GRANDE NUMERO LONGO 10{n},00");
        let text = format!("{}\n{}\n{}", line(1), line(2), line(3));
        let doc = RawDocument {
            bytes: text.into_bytes(),
            mime_type: "text/plain".into(),
            file_name: "extrato.txt".into(),
        };
        let req = request(user, account, SourceKind::BankStatement, doc);

        let prepared = ImportRun::prepare(&conn, &config, &client, None, &req).unwrap();
        assert_eq!(prepared.summary().total_chunks, 3);
        assert_eq!(prepared.summary().pending, 3);

        let counts = prepared.confirm(&mut conn).unwrap();
        assert_eq!(counts.inserted, 3);
        let amounts: Vec<f64> =
            list_entries(&conn, user).unwrap().iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![101.0, 102.0, 103.0]);
    }

    #[test]
    fn all_chunks_failing_fails_the_run() {
        let (conn, user, account) = setup();
        let config = PipelineConfig::default();
        let client = MockStructuringClient::timing_out();
        let req = request(user, account, SourceKind::BankStatement, csv_doc());

        let err = ImportRun::prepare(&conn, &config, &client, None, &req).unwrap_err();
        assert!(matches!(err, PipelineError::AllChunksFailed(_)));
    }

    #[test]
    fn extraction_failure_fails_the_run() {
        let (conn, user, account) = setup();
        let config = PipelineConfig::default();
        let client = MockStructuringClient::returning("{}");
        let doc = RawDocument {
            bytes: b"PK".to_vec(),
            mime_type: "application/zip".into(),
            file_name: "docs.zip".into(),
        };
        let req = request(user, account, SourceKind::BankStatement, doc);

        let err = ImportRun::prepare(&conn, &config, &client, None, &req).unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(_)));
    }

    #[test]
    fn cancel_writes_nothing() {
        let (conn, user, account) = setup();
        let config = PipelineConfig::default();
        let client = MockStructuringClient::returning(STATEMENT_RESPONSE);
        let req = request(user, account, SourceKind::BankStatement, csv_doc());

        let prepared = ImportRun::prepare(&conn, &config, &client, None, &req).unwrap();
        assert_eq!(prepared.summary().pending, 2);
        let summary = prepared.cancel();
        assert_eq!(summary.pending, 2);
        assert_eq!(count_all_entries(&conn, user).unwrap(), 0);
    }

    #[test]
    fn receipt_line_items_are_persisted() {
        let (mut conn, user, account) = setup();
        let config = PipelineConfig::default();
        let ocr = MockOcrClient::returning("SUPERMERCADO TOTAL R$ 89,90 itens variados");
        let client = MockStructuringClient::returning(
            r#"{"transacoes": [{
                "data": "10/06/2025", "descricao": "SUPERMERCADO", "valor": 89.90,
                "tipo_transacao": "Saída",
                "itens": [
                    {"nome_item": "ARROZ", "quantidade": 2, "valor_unitario": 25.00},
                    {"nome_item": "FEIJAO", "quantidade": 1, "valor_unitario": 9.90}
                ]
            }]}"#,
        );
        let doc = RawDocument {
            bytes: vec![0x89, 0x50, 0x4E, 0x47],
            mime_type: "image/png".into(),
            file_name: "nota.png".into(),
        };
        let req = request(user, account, SourceKind::Receipt, doc);

        ImportRun::prepare(&conn, &config, &client, Some(&ocr), &req)
            .unwrap()
            .confirm(&mut conn)
            .unwrap();

        let items: i64 = conn
            .query_row("SELECT COUNT(*) FROM line_items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(items, 2);
    }
}
