mod config;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use quiz_seed_core::document::model::DevUser;
use quiz_seed_core::pipeline::{self, DevUserOutcome, SeedSummary};
use quiz_seed_core::store::{DocumentStore, MemoryStore, PostgresStore};
use quiz_seed_core::SeedError;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config = AppConfig::parse();
    init_tracing(&config);

    match run(&config).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let (message, code) = failure(&err);
            eprintln!("{message}");
            ExitCode::from(code)
        }
    }
}

/// Single stderr line and exit status for a failed run.
fn failure(err: &anyhow::Error) -> (String, u8) {
    let code = err
        .downcast_ref::<SeedError>()
        .map_or(1, SeedError::exit_code);
    (format!("ERROR: {err:#}"), code)
}

fn init_tracing(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(config: &AppConfig) -> anyhow::Result<SeedSummary> {
    let options = config.seed_options();

    // Validate the whole input before connecting anywhere.
    let prepared = pipeline::prepare(&options)?;
    tracing::info!(
        documents = prepared.documents.len(),
        skipped = prepared.skipped.len(),
        "source validated"
    );

    let store: Box<dyn DocumentStore> = if config.dry_run {
        tracing::info!("dry run: using in-memory store");
        Box::new(MemoryStore::new())
    } else {
        let url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL is required unless --dry-run is set")?;
        let store = PostgresStore::connect(url, config.db_max_connections)
            .await
            .context("failed to connect to database")?;
        Box::new(store)
    };

    let summary = pipeline::commit(store.as_ref(), &options, prepared).await?;
    Ok(summary)
}

fn print_summary(summary: &SeedSummary) {
    println!("Deleted {} existing documents", summary.deleted);
    println!("Inserted {} documents", summary.inserted);
    let names: Vec<&str> = summary.indexes.iter().map(|i| i.name.as_str()).collect();
    println!("Indexes: {}", names.join(", "));
    match &summary.dev_user {
        DevUserOutcome::Created => {
            println!("Test user created with email: {}", DevUser::EMAIL)
        }
        DevUserOutcome::AlreadyPresent => {
            println!("Test user already present: {}", DevUser::EMAIL)
        }
        DevUserOutcome::Failed(err) => println!("WARNING: Failed to create test user: {err}"),
        DevUserOutcome::Disabled => {}
    }
    println!();
    println!("{}", summary.report);
    println!();
    println!("=== Data Load Complete! ===");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn seed_error_keeps_its_exit_code() {
        let err = anyhow::Error::from(SeedError::NoRecords {
            path: PathBuf::from("/tmp/sample-data.json"),
            subjects: 1,
        });
        let (message, code) = failure(&err);

        assert_eq!(code, 4);
        assert!(message.starts_with("ERROR: no documents to insert"));
        assert_eq!(message.lines().count(), 1);
    }

    #[test]
    fn bootstrap_error_exits_with_one() {
        let err = anyhow::anyhow!("connection refused").context("failed to connect to database");
        let (message, code) = failure(&err);

        assert_eq!(code, 1);
        assert_eq!(message, "ERROR: failed to connect to database: connection refused");
    }
}
