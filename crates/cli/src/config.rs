use std::path::PathBuf;

use clap::Parser;
use quiz_seed_core::{CollectionName, FieldNaming, SeedOptions, SeedTarget};

/// Seed the quiz collection from a nested `category -> subject` JSON file.
///
/// Every option can also come from the environment (or a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(name = "quiz-seed", version, about)]
pub struct AppConfig {
    /// Source JSON file.
    #[arg(long, env = "SEED_SOURCE", default_value = "/tmp/sample-data.json")]
    pub source: PathBuf,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL", required_unless_present = "dry_run")]
    pub database_url: Option<String>,

    /// Maximum database connections in the pool.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 2)]
    pub db_max_connections: u32,

    /// Collection that receives the flattened quiz records.
    #[arg(long, env = "QUIZ_COLLECTION", default_value = "quiz_data")]
    pub quiz_collection: CollectionName,

    /// Collection that receives the development user.
    #[arg(long, env = "USERS_COLLECTION", default_value = "users")]
    pub users_collection: CollectionName,

    /// Output field names: `topic` (topic/subtopic) or `category`
    /// (category/subject, legacy).
    #[arg(long, env = "FIELD_NAMING", default_value = "topic")]
    pub field_naming: FieldNaming,

    /// Do not create the `dev@localhost` test user.
    #[arg(long, env = "SEED_SKIP_DEV_USER")]
    pub skip_dev_user: bool,

    /// Run against an in-memory store; the database is never contacted.
    #[arg(long, env = "SEED_DRY_RUN")]
    pub dry_run: bool,

    /// Log level (e.g., "info", "debug", "trace"). `RUST_LOG` wins when set.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl AppConfig {
    pub fn seed_options(&self) -> SeedOptions {
        SeedOptions {
            source_path: self.source.clone(),
            naming: self.field_naming,
            target: SeedTarget {
                quiz_collection: self.quiz_collection.clone(),
                users_collection: self.users_collection.clone(),
            },
            create_dev_user: !self.skip_dev_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_needs_no_database_url() {
        let config = AppConfig::try_parse_from(["quiz-seed", "--dry-run"]).unwrap();
        assert!(config.dry_run);

        let options = config.seed_options();
        assert!(options.create_dev_user);
        assert_eq!(options.target.quiz_collection.as_str(), "quiz_data");
        assert_eq!(options.target.users_collection.as_str(), "users");
    }

    #[test]
    fn flags_override_defaults() {
        let config = AppConfig::try_parse_from([
            "quiz-seed",
            "--database-url",
            "postgres://localhost/quizdb",
            "--source",
            "data/sample-data.json",
            "--field-naming",
            "category",
            "--quiz-collection",
            "quiz_legacy",
            "--skip-dev-user",
        ])
        .unwrap();

        let options = config.seed_options();
        assert_eq!(options.naming, FieldNaming::Category);
        assert_eq!(options.source_path, PathBuf::from("data/sample-data.json"));
        assert_eq!(options.target.quiz_collection.as_str(), "quiz_legacy");
        assert!(!options.create_dev_user);
    }

    #[test]
    fn unsafe_collection_name_is_rejected() {
        let result = AppConfig::try_parse_from([
            "quiz-seed",
            "--dry-run",
            "--quiz-collection",
            "quiz;drop",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_field_naming_is_rejected() {
        let result =
            AppConfig::try_parse_from(["quiz-seed", "--dry-run", "--field-naming", "subtopic"]);
        assert!(result.is_err());
    }
}
