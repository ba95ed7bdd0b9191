use std::io;
use std::path::PathBuf;

use crate::store::StoreError;

/// Fatal failures of a seeding run. Anything that reaches the caller aborts
/// the run; best-effort steps log instead of returning one of these.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(
        "could not read {}: {source}. Make sure to copy it there first (e.g. `docker cp sample-data.json <container>:{}`)",
        .path.display(),
        .path.display()
    )]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "could not parse {} as JSON: {source}. Make sure to copy a valid file there first (e.g. `docker cp sample-data.json <container>:{}`)",
        .path.display(),
        .path.display()
    )]
    SourceInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "{} must be a JSON object mapping categories to subjects, found {found}. Make sure to copy a valid file there first (e.g. `docker cp sample-data.json <container>:{}`)",
        .path.display(),
        .path.display()
    )]
    SourceShape { path: PathBuf, found: &'static str },

    #[error(
        "no documents to insert: none of the {subjects} subjects in {} has a `keywords` array",
        .path.display()
    )]
    NoRecords { path: PathBuf, subjects: usize },

    #[error("could not encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SeedError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            SeedError::SourceUnreadable { .. }
            | SeedError::SourceInvalid { .. }
            | SeedError::SourceShape { .. } => 3,
            SeedError::NoRecords { .. } => 4,
            SeedError::Store(_) => 5,
            SeedError::Encode(_) => 1,
        }
    }
}

/// Convenience alias used throughout the pipeline.
pub type SeedResult<T> = Result<T, SeedError>;
