use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    ensure_object, validate_identifier, CollectionName, DocumentStore, IndexSpec, ReplaceOutcome,
    StoreError,
};

/// Rows per multi-row INSERT; two bind parameters each keeps well under the
/// 65535-parameter limit.
const INSERT_CHUNK: usize = 1000;

/// Document store over PostgreSQL JSONB. Each collection is a table created
/// on first use.
pub struct PostgresStore {
    pool: PgPool,
    ensured: Mutex<HashSet<CollectionName>>,
}

impl PostgresStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        // Verify connection
        sqlx::query("SELECT 1").execute(&pool).await?;
        tracing::info!("connected to PostgreSQL");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            ensured: Mutex::new(HashSet::new()),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure_collection(&self, collection: &CollectionName) -> Result<(), StoreError> {
        let mut ensured = self.ensured.lock().await;
        if ensured.contains(collection) {
            return Ok(());
        }

        let ddl = format!(
            r#"CREATE TABLE IF NOT EXISTS "{collection}" (
                seq BIGSERIAL PRIMARY KEY,
                id UUID NOT NULL UNIQUE,
                content JSONB NOT NULL CHECK (jsonb_typeof(content) = 'object'),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"#
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        tracing::debug!(%collection, "collection table ready");

        ensured.insert(collection.clone());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn replace_all(
        &self,
        collection: &CollectionName,
        documents: Vec<Value>,
    ) -> Result<ReplaceOutcome, StoreError> {
        documents.iter().try_for_each(ensure_object)?;
        self.ensure_collection(collection).await?;

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(&format!(r#"DELETE FROM "{collection}""#))
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut inserted = 0;
        for chunk in documents.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!(r#"INSERT INTO "{collection}" (id, content) "#));
            builder.push_values(chunk.iter().cloned(), |mut row, doc| {
                row.push_bind(Uuid::now_v7()).push_bind(Json(doc));
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;

        Ok(ReplaceOutcome { deleted, inserted })
    }

    async fn insert_one(
        &self,
        collection: &CollectionName,
        document: Value,
    ) -> Result<(), StoreError> {
        ensure_object(&document)?;
        self.ensure_collection(collection).await?;

        sqlx::query(&format!(
            r#"INSERT INTO "{collection}" (id, content) VALUES ($1, $2)"#
        ))
        .bind(Uuid::now_v7())
        .bind(Json(document))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_index(
        &self,
        collection: &CollectionName,
        index: &IndexSpec,
    ) -> Result<(), StoreError> {
        validate_identifier(&index.name)?;
        for field in &index.fields {
            validate_identifier(field)?;
        }
        self.ensure_collection(collection).await?;

        let columns = index
            .fields
            .iter()
            .map(|field| format!("(content->>'{field}')"))
            .collect::<Vec<_>>()
            .join(", ");
        let ddl = format!(
            r#"CREATE INDEX IF NOT EXISTS "{}" ON "{collection}" ({columns})"#,
            index.name
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    async fn list_indexes(&self, collection: &CollectionName) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT indexname::text FROM pg_indexes \
             WHERE schemaname = current_schema() AND tablename = $1 \
             ORDER BY indexname",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn count(&self, collection: &CollectionName) -> Result<u64, StoreError> {
        self.ensure_collection(collection).await?;
        let count: i64 = sqlx::query_scalar(&format!(r#"SELECT COUNT(*) FROM "{collection}""#))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn count_matching(
        &self,
        collection: &CollectionName,
        field: &str,
        value: &Value,
    ) -> Result<u64, StoreError> {
        self.ensure_collection(collection).await?;
        let count: i64 = sqlx::query_scalar(&format!(
            r#"SELECT COUNT(*) FROM "{collection}" WHERE content -> $1 = $2"#
        ))
        .bind(field)
        .bind(Json(value))
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }

    async fn distinct(
        &self,
        collection: &CollectionName,
        field: &str,
    ) -> Result<Vec<Value>, StoreError> {
        self.ensure_collection(collection).await?;
        let rows: Vec<Json<Value>> = sqlx::query_scalar(&format!(
            r#"SELECT DISTINCT content -> $1 FROM "{collection}"
               WHERE content -> $1 IS NOT NULL
               ORDER BY 1"#
        ))
        .bind(field)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(v)| v).collect())
    }

    async fn find_one(&self, collection: &CollectionName) -> Result<Option<Value>, StoreError> {
        self.ensure_collection(collection).await?;
        let row: Option<Json<Value>> = sqlx::query_scalar(&format!(
            r#"SELECT content FROM "{collection}" ORDER BY seq LIMIT 1"#
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|Json(v)| v))
    }
}
