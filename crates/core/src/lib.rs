//! Transform-and-load pipeline that seeds the quiz collection of a document
//! store from a nested `category -> subject -> content` JSON file.

pub mod document;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod store;
pub mod transform;

pub use document::naming::FieldNaming;
pub use error::SeedError;
pub use pipeline::{SeedOptions, SeedSummary, SeedTarget};
pub use report::VerificationReport;
pub use store::{CollectionName, DocumentStore, StoreError};
