use crate::core::import::{is_exact_match, BatchImporter, ImportPolicy, ParsedDocument, RejectedLine};
use crate::domain::model::{CollectionId, ImportDecision, ImportRecord};
use crate::domain::ports::{BatchIdSource, DocumentProvider, ParameterStore, UuidBatchIds};
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadEntry {
    pub name: String,
    pub guid: Uuid,
    pub group: String,
    pub decision: ImportDecision,
}

/// What one import run did, in document order.
#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub batch_id: String,
    pub dry_run: bool,
    pub entries: Vec<UploadEntry>,
    pub rejected: Vec<RejectedLine>,
}

impl UploadSummary {
    pub fn created(&self) -> usize {
        self.count(ImportDecision::Create)
    }

    pub fn skipped(&self) -> usize {
        self.count(ImportDecision::Skip)
    }

    fn count(&self, decision: ImportDecision) -> usize {
        self.entries.iter().filter(|e| e.decision == decision).count()
    }

    /// Writes one tab-separated audit row per entry and per rejected line.
    pub fn write_report<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
        writer.write_record(["batch_id", "name", "guid", "group", "decision"])?;
        for entry in &self.entries {
            let decision = match entry.decision {
                ImportDecision::Create if self.dry_run => "would-create",
                ImportDecision::Create => "created",
                ImportDecision::Skip => "skipped",
            };
            let guid = entry.guid.to_string();
            writer.write_record([
                self.batch_id.as_str(),
                entry.name.as_str(),
                guid.as_str(),
                entry.group.as_str(),
                decision,
            ])?;
        }
        for rejected in &self.rejected {
            let reason = format!("rejected line {}: {}", rejected.line, rejected.reason);
            writer.write_record([self.batch_id.as_str(), "", "", "", reason.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Reads a shared parameter document and creates the records the backend lacks.
pub struct BatchUploader<S: ParameterStore, D: DocumentProvider, I: BatchIdSource = UuidBatchIds> {
    store: S,
    documents: D,
    importer: BatchImporter<I>,
    dry_run: bool,
}

impl<S: ParameterStore, D: DocumentProvider> BatchUploader<S, D> {
    pub fn new(store: S, documents: D, policy: ImportPolicy) -> Self {
        Self::with_importer(store, documents, BatchImporter::new(policy))
    }
}

impl<S: ParameterStore, D: DocumentProvider, I: BatchIdSource> BatchUploader<S, D, I> {
    pub fn with_importer(store: S, documents: D, importer: BatchImporter<I>) -> Self {
        Self {
            store,
            documents,
            importer,
            dry_run: false,
        }
    }

    /// Classify only; no create calls are issued.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn upload(&self, path: &Path, collection_id: &CollectionId) -> Result<UploadSummary> {
        tracing::info!("Reading shared parameter file {}", path.display());
        let document = self.documents.read_all_text(path).await?;
        self.upload_document(&document, collection_id).await
    }

    /// Records created before a remote failure stay created.
    pub async fn upload_document(
        &self,
        document: &str,
        collection_id: &CollectionId,
    ) -> Result<UploadSummary> {
        let parsed = self.importer.parse(document)?;
        let span = tracing::info_span!(
            "batch",
            batch_id = %parsed.batch_id,
            collection = %collection_id
        );
        self.process(parsed, collection_id).instrument(span).await
    }

    async fn process(
        &self,
        parsed: ParsedDocument,
        collection_id: &CollectionId,
    ) -> Result<UploadSummary> {
        tracing::info!(
            "Importing {} parameter(s) into collection {}",
            parsed.records.len(),
            collection_id
        );

        let mut accepted: Vec<ImportRecord> = Vec::new();
        let mut entries = Vec::with_capacity(parsed.records.len());
        for record in parsed.records {
            let decision = self.decide(&record, &accepted).await?;
            match decision {
                ImportDecision::Skip => {
                    tracing::info!("{} exists. Skipping", record.name);
                }
                ImportDecision::Create if self.dry_run => {
                    tracing::info!("{} would be created", record.name);
                }
                ImportDecision::Create => {
                    self.store.create_record(&record, collection_id).await?;
                    tracing::debug!("Created {} ({})", record.name, record.guid);
                }
            }

            entries.push(UploadEntry {
                name: record.name.clone(),
                guid: record.guid,
                group: record.group_name.clone(),
                decision,
            });
            if decision == ImportDecision::Create {
                accepted.push(record);
            }
        }

        let summary = UploadSummary {
            batch_id: parsed.batch_id,
            dry_run: self.dry_run,
            entries,
            rejected: parsed.rejected,
        };
        tracing::info!(
            "Batch finished: {} created, {} skipped, {} rejected",
            summary.created(),
            summary.skipped(),
            summary.rejected.len()
        );
        Ok(summary)
    }

    // Duplicates inside the same document are caught locally before asking the backend.
    async fn decide(&self, record: &ImportRecord, accepted: &[ImportRecord]) -> Result<ImportDecision> {
        if self.importer.classify(record, accepted, is_exact_match) == ImportDecision::Skip {
            return Ok(ImportDecision::Skip);
        }
        if self.store.find_exact_match(record).await? {
            return Ok(ImportDecision::Skip);
        }
        Ok(ImportDecision::Create)
    }
}
