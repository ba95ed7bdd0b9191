use chrono::{DateTime, Utc};

use crate::document::model::QuizRecord;
use crate::document::validate::{self, SkipReason};
use crate::source::SourceDocument;

/// A subject (or whole category, when `subject` is `None`) that produced no
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSubject {
    pub category: String,
    pub subject: Option<String>,
    pub reason: SkipReason,
}

/// Output of [`flatten`].
#[derive(Debug, Clone, Default)]
pub struct Flattened {
    pub records: Vec<QuizRecord>,
    pub skipped: Vec<SkippedSubject>,
    pub categories_seen: usize,
    pub subjects_seen: usize,
}

impl Flattened {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Walk `category -> subject -> content` in document order and build one
/// record per subject whose content carries a `keywords` array.
///
/// Ineligible subjects are collected in [`Flattened::skipped`], never
/// reported as errors.
pub fn flatten(source: &SourceDocument, now: DateTime<Utc>) -> Flattened {
    let mut out = Flattened::default();

    for (category, subjects) in source.categories() {
        out.categories_seen += 1;

        let Some(subjects) = subjects.as_object() else {
            tracing::debug!(%category, "skipping category: not an object");
            out.skipped.push(SkippedSubject {
                category: category.clone(),
                subject: None,
                reason: SkipReason::CategoryNotAnObject,
            });
            continue;
        };

        tracing::info!(%category, subjects = subjects.len(), "category");

        for (subject, content) in subjects {
            out.subjects_seen += 1;

            let keywords = match validate::eligible_keywords(content) {
                Ok(keywords) => keywords,
                Err(reason) => {
                    tracing::debug!(%category, %subject, %reason, "skipping subject");
                    out.skipped.push(SkippedSubject {
                        category: category.clone(),
                        subject: Some(subject.clone()),
                        reason,
                    });
                    continue;
                }
            };

            let record = QuizRecord {
                category: category.clone(),
                subject: subject.clone(),
                keywords: keywords.clone(),
                style_modifiers: validate::style_modifiers(content),
                created_at: now,
                updated_at: now,
            };
            tracing::debug!(
                %subject,
                keywords = record.keywords.len(),
                style_modifiers = record.style_modifiers.len(),
                "subject"
            );
            out.records.push(record);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn source(raw: &str) -> SourceDocument {
        SourceDocument::parse(Path::new("sample-data.json"), raw).unwrap()
    }

    #[test]
    fn single_subject_becomes_single_record() {
        let now = Utc::now();
        let out = flatten(&source(r#"{"A": {"S1": {"keywords": ["k1", "k2"]}}}"#), now);

        assert_eq!(out.records.len(), 1);
        let record = &out.records[0];
        assert_eq!(record.category, "A");
        assert_eq!(record.subject, "S1");
        assert_eq!(record.keywords, vec![json!("k1"), json!("k2")]);
        assert!(record.style_modifiers.is_empty());
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn subject_without_keywords_is_skipped_silently() {
        let out = flatten(&source(r#"{"A": {"S1": {"notkeywords": []}}}"#), Utc::now());

        assert!(out.is_empty());
        assert_eq!(out.subjects_seen, 1);
        assert_eq!(
            out.skipped,
            vec![SkippedSubject {
                category: "A".into(),
                subject: Some("S1".into()),
                reason: SkipReason::MissingKeywords,
            }]
        );
    }

    #[test]
    fn record_count_matches_eligible_subjects() {
        let raw = r#"{
            "Containers": {
                "Docker Commands": {"keywords": ["docker run"], "style_modifiers": ["command syntax"]},
                "Compose": {"keywords": "not a list"},
                "Swarm": {}
            },
            "Languages": {
                "Rust": {"keywords": ["ownership", "borrowing"]},
                "Go": {"keywords": []}
            },
            "Broken": 42
        }"#;
        let out = flatten(&source(raw), Utc::now());

        assert_eq!(out.records.len(), 3);
        assert_eq!(out.categories_seen, 3);
        assert_eq!(out.subjects_seen, 5);
        assert_eq!(out.skipped.len(), 3);
        assert_eq!(
            out.records.len() + out.skipped.iter().filter(|s| s.subject.is_some()).count(),
            out.subjects_seen
        );
    }

    #[test]
    fn records_follow_document_order() {
        let raw = r#"{
            "B": {"b2": {"keywords": []}, "b1": {"keywords": []}},
            "A": {"a1": {"keywords": []}}
        }"#;
        let out = flatten(&source(raw), Utc::now());
        let order: Vec<(&str, &str)> = out
            .records
            .iter()
            .map(|r| (r.category.as_str(), r.subject.as_str()))
            .collect();
        assert_eq!(order, vec![("B", "b2"), ("B", "b1"), ("A", "a1")]);
    }

    #[test]
    fn style_modifiers_are_copied() {
        let raw = r#"{"A": {"S1": {"keywords": ["k"], "style_modifiers": ["terse", "practical"]}}}"#;
        let out = flatten(&source(raw), Utc::now());
        assert_eq!(
            out.records[0].style_modifiers,
            vec![json!("terse"), json!("practical")]
        );
    }

    #[test]
    fn non_object_category_is_one_skip() {
        let out = flatten(&source(r#"{"A": ["S1"]}"#), Utc::now());
        assert_eq!(out.subjects_seen, 0);
        assert_eq!(out.skipped[0].subject, None);
        assert_eq!(out.skipped[0].reason, SkipReason::CategoryNotAnObject);
    }
}
