//! Two-phase seeding run: [`prepare`] reads and flattens the source without
//! touching the store, [`commit`] replaces the collection, builds indexes,
//! adds the development user and reads back a [`VerificationReport`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::document::model::DevUser;
use crate::document::naming::FieldNaming;
use crate::error::{SeedError, SeedResult};
use crate::report::VerificationReport;
use crate::source::SourceDocument;
use crate::store::{CollectionName, DocumentStore, IndexSpec, StoreError};
use crate::transform::{self, SkippedSubject};

/// Where the run writes.
#[derive(Debug, Clone)]
pub struct SeedTarget {
    pub quiz_collection: CollectionName,
    pub users_collection: CollectionName,
}

impl Default for SeedTarget {
    fn default() -> Self {
        Self {
            quiz_collection: CollectionName("quiz_data".to_string()),
            users_collection: CollectionName("users".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub source_path: PathBuf,
    pub naming: FieldNaming,
    pub target: SeedTarget,
    pub create_dev_user: bool,
}

/// Validated, store-independent result of the first phase.
#[derive(Debug, Clone)]
pub struct PreparedLoad {
    pub documents: Vec<Value>,
    pub skipped: Vec<SkippedSubject>,
    pub categories_seen: usize,
    pub subjects_seen: usize,
    /// Built up front so an unusable index name fails before any write.
    pub indexes: Vec<IndexSpec>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevUserOutcome {
    Disabled,
    Created,
    AlreadyPresent,
    /// Creation failed; the run carried on.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub deleted: u64,
    pub inserted: u64,
    pub indexes: Vec<IndexSpec>,
    pub dev_user: DevUserOutcome,
    pub report: VerificationReport,
}

/// Read, parse and flatten the source file, stamping records with the
/// current time.
pub fn prepare(options: &SeedOptions) -> SeedResult<PreparedLoad> {
    prepare_at(options, Utc::now())
}

pub fn prepare_at(options: &SeedOptions, now: DateTime<Utc>) -> SeedResult<PreparedLoad> {
    let source = SourceDocument::load(&options.source_path)?;
    prepare_source(&source, options, now)
}

/// Same as [`prepare`] for text already in memory. `options.source_path` is
/// only used in diagnostics.
pub fn prepare_str(
    options: &SeedOptions,
    raw: &str,
    now: DateTime<Utc>,
) -> SeedResult<PreparedLoad> {
    let source = SourceDocument::parse(&options.source_path, raw)?;
    prepare_source(&source, options, now)
}

fn prepare_source(
    source: &SourceDocument,
    options: &SeedOptions,
    now: DateTime<Utc>,
) -> SeedResult<PreparedLoad> {
    let naming = options.naming;
    let indexes = quiz_indexes(&options.target.quiz_collection, naming)?;

    let flattened = transform::flatten(source, now);

    if flattened.is_empty() {
        return Err(SeedError::NoRecords {
            path: source.path().to_path_buf(),
            subjects: flattened.subjects_seen,
        });
    }

    if !flattened.skipped.is_empty() {
        tracing::info!(
            skipped = flattened.skipped.len(),
            "some subjects produced no record"
        );
    }

    Ok(PreparedLoad {
        documents: flattened
            .records
            .iter()
            .map(|record| record.to_document(naming))
            .collect(),
        skipped: flattened.skipped,
        categories_seen: flattened.categories_seen,
        subjects_seen: flattened.subjects_seen,
        indexes,
        now,
    })
}

/// Indexes built over the quiz collection: category, subject, and the pair.
pub fn quiz_indexes(
    collection: &CollectionName,
    naming: FieldNaming,
) -> Result<Vec<IndexSpec>, StoreError> {
    let category = naming.category_field();
    let subject = naming.subject_field();
    Ok(vec![
        IndexSpec::single(collection, category)?,
        IndexSpec::single(collection, subject)?,
        IndexSpec::compound(collection, &[category, subject])?,
    ])
}

/// Write a prepared load to `store`.
pub async fn commit(
    store: &dyn DocumentStore,
    options: &SeedOptions,
    prepared: PreparedLoad,
) -> SeedResult<SeedSummary> {
    let quiz = &options.target.quiz_collection;
    let skipped = prepared.skipped.len();
    let indexes = prepared.indexes;

    tracing::info!(
        backend = store.backend(),
        collection = %quiz,
        documents = prepared.documents.len(),
        "replacing collection contents"
    );
    let outcome = store.replace_all(quiz, prepared.documents).await?;
    tracing::info!(
        deleted = outcome.deleted,
        inserted = outcome.inserted,
        "collection replaced"
    );

    for index in &indexes {
        store.create_index(quiz, index).await?;
    }
    tracing::info!(count = indexes.len(), "indexes created");

    let dev_user = if options.create_dev_user {
        ensure_dev_user(store, &options.target.users_collection, prepared.now).await
    } else {
        DevUserOutcome::Disabled
    };

    let report = VerificationReport::collect(store, quiz, options.naming, skipped).await?;

    Ok(SeedSummary {
        deleted: outcome.deleted,
        inserted: outcome.inserted,
        indexes,
        dev_user,
        report,
    })
}

/// Full run: prepare, then commit. Nothing is written unless preparation
/// succeeds.
pub async fn run(store: &dyn DocumentStore, options: &SeedOptions) -> SeedResult<SeedSummary> {
    let prepared = prepare(options)?;
    commit(store, options, prepared).await
}

/// Best-effort: failures are logged and reported, never returned.
async fn ensure_dev_user(
    store: &dyn DocumentStore,
    users: &CollectionName,
    now: DateTime<Utc>,
) -> DevUserOutcome {
    match try_ensure_dev_user(store, users, now).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(collection = %users, error = %err, "failed to create test user");
            DevUserOutcome::Failed(err.to_string())
        }
    }
}

async fn try_ensure_dev_user(
    store: &dyn DocumentStore,
    users: &CollectionName,
    now: DateTime<Utc>,
) -> SeedResult<DevUserOutcome> {
    let existing = store
        .count_matching(users, "google_id", &json!(DevUser::GOOGLE_ID))
        .await?;
    if existing > 0 {
        tracing::info!(email = DevUser::EMAIL, "test user already present");
        return Ok(DevUserOutcome::AlreadyPresent);
    }

    let user = DevUser::new(now);
    store.insert_one(users, user.to_document()?).await?;
    tracing::info!(email = DevUser::EMAIL, "test user created");
    Ok(DevUserOutcome::Created)
}
