use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{SeedError, SeedResult};

/// Read the whole source file as UTF-8 text.
pub fn read_source(path: &Path) -> SeedResult<String> {
    std::fs::read_to_string(path).map_err(|source| SeedError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Parsed source: category name to a (not yet checked) subject mapping, in
/// document order.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: PathBuf,
    categories: Map<String, Value>,
}

impl SourceDocument {
    /// Parse raw JSON text. `path` is only used for diagnostics.
    pub fn parse(path: &Path, raw: &str) -> SeedResult<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|source| SeedError::SourceInvalid {
            path: path.to_path_buf(),
            source,
        })?;

        match value {
            Value::Object(categories) => Ok(Self {
                path: path.to_path_buf(),
                categories,
            }),
            other => Err(SeedError::SourceShape {
                path: path.to_path_buf(),
                found: json_type_name(&other),
            }),
        }
    }

    /// Read and parse in one step.
    pub fn load(path: &Path) -> SeedResult<Self> {
        let raw = read_source(path)?;
        let doc = Self::parse(path, &raw)?;
        tracing::info!(
            path = %path.display(),
            categories = doc.categories.len(),
            "loaded source document"
        );
        Ok(doc)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn categories(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.categories.iter()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_keeps_document_order() {
        let raw = r#"{"Zeta": {}, "Alpha": {}, "Mid": {}}"#;
        let doc = SourceDocument::parse(Path::new("data.json"), raw).unwrap();
        let names: Vec<&str> = doc.categories().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn malformed_json_is_source_invalid() {
        let err = SourceDocument::parse(Path::new("data.json"), "{ not json").unwrap_err();
        assert!(matches!(err, SeedError::SourceInvalid { .. }));
        assert!(err.to_string().contains("data.json"));
    }

    #[test]
    fn top_level_array_is_rejected() {
        let err = SourceDocument::parse(Path::new("data.json"), "[1, 2]").unwrap_err();
        match err {
            SeedError::SourceShape { found, .. } => assert_eq!(found, "an array"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"A": {{"S1": {{"keywords": ["k1"]}}}}}}"#).unwrap();

        let doc = SourceDocument::load(file.path()).unwrap();
        assert_eq!(doc.category_count(), 1);
        assert_eq!(doc.path(), file.path());
    }

    #[test]
    fn missing_file_is_source_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample-data.json");

        let err = read_source(&path).unwrap_err();
        assert!(matches!(err, SeedError::SourceUnreadable { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}
