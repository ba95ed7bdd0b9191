use std::fmt;
use std::str::FromStr;

/// Output field names used for the category and subject of a quiz record.
///
/// Two loader variants historically disagreed on these names. `Topic` is what
/// the quiz backend reads; `Category` is kept for databases seeded by the
/// older variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldNaming {
    /// `topic` / `subtopic`
    #[default]
    Topic,
    /// `category` / `subject` (legacy)
    Category,
}

impl FieldNaming {
    pub fn category_field(self) -> &'static str {
        match self {
            FieldNaming::Topic => "topic",
            FieldNaming::Category => "category",
        }
    }

    pub fn subject_field(self) -> &'static str {
        match self {
            FieldNaming::Topic => "subtopic",
            FieldNaming::Category => "subject",
        }
    }

    pub fn is_legacy(self) -> bool {
        matches!(self, FieldNaming::Category)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown field naming {0:?}, expected `topic` or `category`")]
pub struct ParseFieldNamingError(String);

impl FromStr for FieldNaming {
    type Err = ParseFieldNamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topic" => Ok(FieldNaming::Topic),
            "category" | "legacy" => Ok(FieldNaming::Category),
            _ => Err(ParseFieldNamingError(s.to_string())),
        }
    }
}

impl fmt::Display for FieldNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldNaming::Topic => f.write_str("topic"),
            FieldNaming::Category => f.write_str("category"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_naming_is_topic() {
        let naming = FieldNaming::default();
        assert_eq!(naming.category_field(), "topic");
        assert_eq!(naming.subject_field(), "subtopic");
        assert!(!naming.is_legacy());
    }

    #[test]
    fn parse_accepts_legacy_alias() {
        assert_eq!("category".parse::<FieldNaming>().unwrap(), FieldNaming::Category);
        assert_eq!("Legacy".parse::<FieldNaming>().unwrap(), FieldNaming::Category);
        assert_eq!(" topic ".parse::<FieldNaming>().unwrap(), FieldNaming::Topic);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "subtopic".parse::<FieldNaming>().unwrap_err();
        assert!(err.to_string().contains("subtopic"));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for naming in [FieldNaming::Topic, FieldNaming::Category] {
            assert_eq!(naming.to_string().parse::<FieldNaming>().unwrap(), naming);
        }
    }
}
