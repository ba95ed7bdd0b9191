use std::fmt;

use serde_json::Value;

use crate::document::naming::FieldNaming;
use crate::store::{CollectionName, DocumentStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub documents: u64,
}

/// Figures read back from the destination collection after a load.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub collection: String,
    pub total_documents: u64,
    pub categories: Vec<CategoryCount>,
    pub distinct_subjects: u64,
    pub skipped_subjects: usize,
    pub sample: Option<Value>,
}

impl VerificationReport {
    pub async fn collect(
        store: &dyn DocumentStore,
        collection: &CollectionName,
        naming: FieldNaming,
        skipped_subjects: usize,
    ) -> Result<Self, StoreError> {
        let category_field = naming.category_field();

        let total_documents = store.count(collection).await?;

        let mut categories = Vec::new();
        for value in store.distinct(collection, category_field).await? {
            let documents = store.count_matching(collection, category_field, &value).await?;
            categories.push(CategoryCount {
                name: display_value(&value),
                documents,
            });
        }

        let distinct_subjects = store
            .distinct(collection, naming.subject_field())
            .await?
            .len() as u64;

        let sample = store.find_one(collection).await?;

        Ok(Self {
            collection: collection.to_string(),
            total_documents,
            categories,
            distinct_subjects,
            skipped_subjects,
            sample,
        })
    }

    pub fn distinct_categories(&self) -> usize {
        self.categories.len()
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Verification ({}) ===", self.collection)?;
        writeln!(f, "Total documents: {}", self.total_documents)?;
        writeln!(f, "Total categories: {}", self.distinct_categories())?;
        writeln!(f, "Total subjects: {}", self.distinct_subjects)?;
        writeln!(f, "Skipped subjects: {}", self.skipped_subjects)?;

        writeln!(f)?;
        writeln!(f, "Categories in database:")?;
        for category in &self.categories {
            writeln!(f, "  - {}: {} subjects", category.name, category.documents)?;
        }

        writeln!(f)?;
        writeln!(f, "Sample document:")?;
        match &self.sample {
            Some(doc) => {
                let pretty = serde_json::to_string_pretty(doc).map_err(|_| fmt::Error)?;
                write!(f, "{pretty}")
            }
            None => write!(f, "(none)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn seeded() -> (MemoryStore, CollectionName) {
        let store = MemoryStore::new();
        let quiz = CollectionName::new("quiz_data").unwrap();
        store
            .replace_all(
                &quiz,
                vec![
                    json!({"topic": "Languages", "subtopic": "Rust", "keywords": ["ownership"]}),
                    json!({"topic": "Languages", "subtopic": "Go", "keywords": []}),
                    json!({"topic": "Containers", "subtopic": "Docker", "keywords": ["run"]}),
                ],
            )
            .await
            .unwrap();
        (store, quiz)
    }

    #[tokio::test]
    async fn collect_reads_figures_from_store() {
        let (store, quiz) = seeded().await;
        let report = VerificationReport::collect(&store, &quiz, FieldNaming::Topic, 2)
            .await
            .unwrap();

        assert_eq!(report.total_documents, 3);
        assert_eq!(report.distinct_categories(), 2);
        assert_eq!(report.distinct_subjects, 3);
        assert_eq!(report.skipped_subjects, 2);
        assert_eq!(
            report.categories,
            vec![
                CategoryCount { name: "Containers".into(), documents: 1 },
                CategoryCount { name: "Languages".into(), documents: 2 },
            ]
        );
        assert_eq!(report.sample.as_ref().unwrap()["subtopic"], "Rust");
    }

    #[tokio::test]
    async fn collect_with_mismatched_naming_sees_nothing() {
        let (store, quiz) = seeded().await;
        let report = VerificationReport::collect(&store, &quiz, FieldNaming::Category, 0)
            .await
            .unwrap();

        assert_eq!(report.total_documents, 3);
        assert_eq!(report.distinct_categories(), 0);
        assert_eq!(report.distinct_subjects, 0);
    }

    #[tokio::test]
    async fn display_lists_categories_and_sample() {
        let (store, quiz) = seeded().await;
        let report = VerificationReport::collect(&store, &quiz, FieldNaming::Topic, 0)
            .await
            .unwrap();
        let text = report.to_string();

        assert!(text.contains("Total documents: 3"));
        assert!(text.contains("Total categories: 2"));
        assert!(text.contains("  - Languages: 2 subjects"));
        assert!(text.contains("\"subtopic\": \"Rust\""));
    }
}
