use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::naming::FieldNaming;

/// A flattened `category / subject` entry ready to be written to the quiz
/// collection.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizRecord {
    pub category: String,
    pub subject: String,
    /// Copied verbatim from the source content object.
    pub keywords: Vec<Value>,
    /// Empty when the source omits `style_modifiers` or it is not an array.
    pub style_modifiers: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizRecord {
    /// Render the record as a store document using `naming` for the
    /// category and subject fields.
    pub fn to_document(&self, naming: FieldNaming) -> Value {
        let mut doc = Map::new();
        doc.insert(
            naming.category_field().to_string(),
            Value::String(self.category.clone()),
        );
        doc.insert(
            naming.subject_field().to_string(),
            Value::String(self.subject.clone()),
        );
        doc.insert("keywords".to_string(), Value::Array(self.keywords.clone()));
        doc.insert(
            "style_modifiers".to_string(),
            Value::Array(self.style_modifiers.clone()),
        );
        doc.insert("created_at".to_string(), Value::String(iso_timestamp(&self.created_at)));
        doc.insert("updated_at".to_string(), Value::String(iso_timestamp(&self.updated_at)));
        Value::Object(doc)
    }
}

/// Fixed identity inserted into the users collection so a local frontend can
/// sign in without going through Google.
#[derive(Debug, Clone, Serialize)]
pub struct DevUser {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
    pub exp: i64,
    pub questions_count: i64,
    #[serde(serialize_with = "serialize_iso")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_iso")]
    pub updated_at: DateTime<Utc>,
}

impl DevUser {
    pub const GOOGLE_ID: &'static str = "dev-user-local";
    pub const EMAIL: &'static str = "dev@localhost";
    pub const NAME: &'static str = "Local Developer";

    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            google_id: Self::GOOGLE_ID.to_string(),
            email: Self::EMAIL.to_string(),
            name: Self::NAME.to_string(),
            email_verified: true,
            exp: 0,
            questions_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix, the textual form of
/// a BSON/JS date.
pub fn iso_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&iso_timestamp(ts))
}
