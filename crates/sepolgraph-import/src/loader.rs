//! Import pipeline: read all CSV files, then upsert in dependency order.
//!
//! Subjects, objects and classes are foundational: each kind is written as
//! one batch and any failure aborts the run. Relationships are written one
//! row at a time; a row that fails (missing endpoint, missing column, store
//! error) is logged, recorded in the report, and skipped.

use std::path::{Path, PathBuf};

use chrono::Utc;

use sepolgraph_core::{Allows, Class, ImportSettings, Object, RecordKind, Subject};
use sepolgraph_graph::{GraphError, PolicyStore};

use crate::csv_reader::{read_records, Record};
use crate::error::{ImportError, Result};
use crate::records::FromRecord;
use crate::report::{ImportReport, SkippedRelationship};

/// Owns a store for the length of one import run.
///
/// [`PolicyLoader::run`] releases the store on every exit path.
pub struct PolicyLoader<S: PolicyStore> {
    store: S,
    settings: ImportSettings,
}

impl<S: PolicyStore> PolicyLoader<S> {
    pub fn new(store: S, settings: ImportSettings) -> Self {
        Self { store, settings }
    }

    /// Run the import and close the store, whatever the outcome.
    pub async fn run(self) -> Result<ImportReport> {
        let Self { store, settings } = self;

        let result = import(&store, &settings).await;
        match &result {
            Ok(report) => tracing::info!(
                subjects = report.subjects,
                objects = report.objects,
                classes = report.classes,
                relationships = report.relationships_written,
                skipped = report.skipped.len(),
                duration_ms = report.duration_ms(),
                "Data import completed"
            ),
            Err(e) => tracing::error!(error = %e, "Data import failed"),
        }

        tracing::info!("Closing store connection");
        store.close().await;
        result
    }
}

/// Everything read from the data directory before the first write.
struct PolicyData {
    subjects: Vec<Subject>,
    objects: Vec<Object>,
    classes: Vec<Class>,
    relationships_path: PathBuf,
    relationships: Vec<Record>,
}

impl PolicyData {
    fn read(settings: &ImportSettings) -> Result<Self> {
        let subjects = read_entities(&settings.subjects_path())?;
        let objects = read_entities(&settings.objects_path())?;
        let classes = read_entities(&settings.classes_path())?;
        let relationships_path = settings.relationships_path();
        let relationships = read_records(&relationships_path)?;

        Ok(Self {
            subjects,
            objects,
            classes,
            relationships_path,
            relationships,
        })
    }
}

async fn import<S: PolicyStore>(store: &S, settings: &ImportSettings) -> Result<ImportReport> {
    let started_at = Utc::now();
    tracing::info!(data_dir = %settings.data_dir.display(), "Reading policy CSV files");
    let data = PolicyData::read(settings)?;

    if settings.create_schema {
        create_schema(store).await?;
    }

    begin_phase(RecordKind::Subject, data.subjects.len());
    end_phase(RecordKind::Subject, store.upsert_subjects(&data.subjects).await)?;

    begin_phase(RecordKind::Object, data.objects.len());
    end_phase(RecordKind::Object, store.upsert_objects(&data.objects).await)?;

    begin_phase(RecordKind::Class, data.classes.len());
    end_phase(RecordKind::Class, store.upsert_classes(&data.classes).await)?;

    begin_phase(RecordKind::Relationship, data.relationships.len());
    let (written, skipped) =
        import_relationships(store, &data.relationships_path, &data.relationships).await;
    if skipped.is_empty() {
        tracing::info!(written, "Imported relationships");
    } else {
        tracing::warn!(
            written,
            skipped = skipped.len(),
            "Imported relationships with skipped rows"
        );
    }

    let graph = match store.summary().await {
        Ok(summary) => Some(summary),
        Err(e) => {
            tracing::warn!(error = %e, "Could not query graph summary");
            None
        }
    };

    Ok(ImportReport {
        data_dir: settings.data_dir.clone(),
        started_at,
        finished_at: Utc::now(),
        subjects: data.subjects.len(),
        objects: data.objects.len(),
        classes: data.classes.len(),
        relationships: data.relationships.len(),
        relationships_written: written,
        skipped,
        graph,
    })
}

async fn create_schema<S: PolicyStore>(store: &S) -> Result<()> {
    tracing::info!("Creating constraints");
    store.create_constraints().await.map_err(ImportError::Schema)?;
    tracing::info!("Creating indexes");
    store.create_indexes().await.map_err(ImportError::Schema)?;
    Ok(())
}

/// Write relationships one row at a time, skipping rows that fail.
async fn import_relationships<S: PolicyStore>(
    store: &S,
    path: &Path,
    records: &[Record],
) -> (usize, Vec<SkippedRelationship>) {
    let mut written = 0;
    let mut skipped = Vec::new();

    for record in records {
        let allows = match Allows::from_record(record) {
            Ok(allows) => allows,
            Err(column) => {
                tracing::warn!(
                    path = %path.display(),
                    line = record.line(),
                    column,
                    "Skipping relationship with missing column"
                );
                skipped.push(SkippedRelationship {
                    line: record.line(),
                    subject: record.text("subject_name").map(str::to_string),
                    object: record.text("object_name").map(str::to_string),
                    reason: format!("missing required column '{column}'"),
                });
                continue;
            }
        };

        match store.upsert_allows(&allows).await {
            Ok(()) => written += 1,
            Err(e) => {
                if matches!(e, GraphError::MissingEndpoint { .. }) {
                    tracing::warn!(
                        line = record.line(),
                        subject = %allows.subject,
                        object = %allows.object,
                        error = %e,
                        "Skipping relationship with missing endpoint"
                    );
                } else {
                    tracing::error!(
                        line = record.line(),
                        subject = %allows.subject,
                        object = %allows.object,
                        error = %e,
                        "Failed to import relationship"
                    );
                }
                skipped.push(SkippedRelationship {
                    line: record.line(),
                    subject: Some(allows.subject),
                    object: Some(allows.object),
                    reason: e.to_string(),
                });
            }
        }
    }

    (written, skipped)
}

/// Read a foundational file and convert every row; any bad row is fatal.
fn read_entities<T: FromRecord>(path: &Path) -> Result<Vec<T>> {
    let records = read_records(path)?;
    records
        .iter()
        .map(|record| {
            T::from_record(record).map_err(|column| {
                tracing::error!(
                    path = %path.display(),
                    line = record.line(),
                    column,
                    kind = %T::KIND,
                    "Missing required column"
                );
                ImportError::MissingColumn {
                    path: path.to_path_buf(),
                    line: record.line(),
                    column,
                }
            })
        })
        .collect()
}

fn begin_phase(kind: RecordKind, count: usize) {
    tracing::info!(kind = %kind, count, "Importing {}", kind.plural());
}

fn end_phase(kind: RecordKind, result: std::result::Result<(), GraphError>) -> Result<()> {
    match result {
        Ok(()) => {
            tracing::info!(kind = %kind, "Imported {}", kind.plural());
            Ok(())
        }
        Err(source) => {
            tracing::error!(kind = %kind, error = %source, "Failed to import {}", kind.plural());
            Err(ImportError::Write { kind, source })
        }
    }
}
