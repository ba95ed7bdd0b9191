//! Document store abstraction and its backends.
//!
//! A collection holds JSON objects. The PostgreSQL backend maps each
//! collection to a JSONB table; the in-memory backend serves dry runs and
//! tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;

/// Longest identifier PostgreSQL keeps without truncation.
const MAX_IDENTIFIER_LEN: usize = 63;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid identifier {0:?}: use letters, digits and underscores, starting with a letter or underscore (max 63 bytes)")]
    InvalidIdentifier(String),

    #[error("document rejected: {0}")]
    Rejected(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Validated collection name, safe to splice into SQL as a quoted identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionName(pub(crate) String);

impl CollectionName {
    pub fn new(name: impl Into<String>) -> Result<Self, StoreError> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CollectionName {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check an identifier used as a table, index or field name.
pub fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && name.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Ascending index over one or more top-level document fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub fields: Vec<String>,
}

impl IndexSpec {
    pub fn single(collection: &CollectionName, field: &str) -> Result<Self, StoreError> {
        Self::compound(collection, &[field])
    }

    /// Index named `<collection>_<field>[_<field>...]_idx`.
    pub fn compound(collection: &CollectionName, fields: &[&str]) -> Result<Self, StoreError> {
        if fields.is_empty() {
            return Err(StoreError::InvalidIdentifier(String::new()));
        }
        for field in fields {
            validate_identifier(field)?;
        }
        let name = format!("{}_{}_idx", collection, fields.join("_"));
        validate_identifier(&name)?;
        Ok(Self {
            name,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        })
    }
}

/// Result of [`DocumentStore::replace_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub deleted: u64,
    pub inserted: u64,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Delete every document in `collection`, then insert `documents` in
    /// order.
    async fn replace_all(
        &self,
        collection: &CollectionName,
        documents: Vec<Value>,
    ) -> Result<ReplaceOutcome, StoreError>;

    async fn insert_one(&self, collection: &CollectionName, document: Value)
        -> Result<(), StoreError>;

    /// Create the index unless one with the same name exists.
    async fn create_index(
        &self,
        collection: &CollectionName,
        index: &IndexSpec,
    ) -> Result<(), StoreError>;

    async fn list_indexes(&self, collection: &CollectionName) -> Result<Vec<String>, StoreError>;

    async fn count(&self, collection: &CollectionName) -> Result<u64, StoreError>;

    /// Documents whose top-level `field` equals `value`.
    async fn count_matching(
        &self,
        collection: &CollectionName,
        field: &str,
        value: &Value,
    ) -> Result<u64, StoreError>;

    /// Distinct values of a top-level field, sorted. Documents without the
    /// field are ignored.
    async fn distinct(&self, collection: &CollectionName, field: &str)
        -> Result<Vec<Value>, StoreError>;

    /// First document in insertion order.
    async fn find_one(&self, collection: &CollectionName) -> Result<Option<Value>, StoreError>;
}

pub(crate) fn ensure_object(document: &Value) -> Result<(), StoreError> {
    if document.is_object() {
        Ok(())
    } else {
        Err(StoreError::Rejected("document must be a JSON object".to_string()))
    }
}
