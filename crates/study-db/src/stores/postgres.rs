//! PostgreSQL implementation of DocumentStore
//!
//! Documents live in a single `documents` table keyed by `(collection, id)`
//! with the body in a JSONB column. Transactions run at SERIALIZABLE
//! isolation so concurrent read-modify-write cycles either serialize or
//! abort with a serialization failure, which surfaces as
//! `TransactionConflict`.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use study_core::{
    Document, DocumentId, DocumentPath, DocumentStore, DomainError, RepoResult,
    StoreTransaction, WriteBatch, WriteOp,
};

use crate::mappers::into_entry;
use crate::models::DocumentModel;

use super::error::map_db_error;

/// PostgreSQL implementation of DocumentStore
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new PgDocumentStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> RepoResult<Box<dyn StoreTransaction>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        Ok(Box::new(PgStoreTransaction {
            tx,
            writes: WriteBatch::new(),
        }))
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn get(&self, path: &DocumentPath) -> RepoResult<Option<Document>> {
        let result = sqlx::query_as::<_, DocumentModel>(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(path.collection())
        .bind(path.id().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(|model| model.data.0))
    }

    #[instrument(skip(self))]
    async fn list(&self, collection: &str) -> RepoResult<Vec<(DocumentId, Document)>> {
        let results = sqlx::query_as::<_, DocumentModel>(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1
            ORDER BY id
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(into_entry).collect()
    }
}

/// An open SERIALIZABLE transaction with buffered writes
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
    writes: WriteBatch,
}

impl PgStoreTransaction {
    async fn flush(&mut self) -> RepoResult<()> {
        for op in self.writes.iter() {
            match op {
                WriteOp::Set { path, doc } => {
                    sqlx::query(
                        r#"
                        INSERT INTO documents (collection, id, data, updated_at)
                        VALUES ($1, $2, $3, now())
                        ON CONFLICT (collection, id) DO UPDATE
                        SET data = EXCLUDED.data,
                            updated_at = now()
                        "#,
                    )
                    .bind(path.collection())
                    .bind(path.id().as_str())
                    .bind(Json(doc))
                    .execute(&mut *self.tx)
                    .await
                    .map_err(map_db_error)?;
                }
                WriteOp::Update { path, patch } => {
                    // `||` merges top-level keys, matching WriteOp::apply
                    let result = sqlx::query(
                        r#"
                        UPDATE documents
                        SET data = data || $3,
                            updated_at = now()
                        WHERE collection = $1 AND id = $2
                        "#,
                    )
                    .bind(path.collection())
                    .bind(path.id().as_str())
                    .bind(Json(patch))
                    .execute(&mut *self.tx)
                    .await
                    .map_err(map_db_error)?;

                    if result.rows_affected() == 0 {
                        return Err(DomainError::DocumentNotFound(path.to_string()));
                    }
                }
                WriteOp::Delete { path } => {
                    sqlx::query(
                        r#"
                        DELETE FROM documents WHERE collection = $1 AND id = $2
                        "#,
                    )
                    .bind(path.collection())
                    .bind(path.id().as_str())
                    .execute(&mut *self.tx)
                    .await
                    .map_err(map_db_error)?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    #[instrument(skip(self), fields(path = %path))]
    async fn get(&mut self, path: &DocumentPath) -> RepoResult<Option<Document>> {
        let result = sqlx::query_as::<_, DocumentModel>(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(path.collection())
        .bind(path.id().as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        self.writes.overlay(path, result.map(|model| model.data.0))
    }

    #[instrument(skip(self))]
    async fn list(&mut self, collection: &str) -> RepoResult<Vec<(DocumentId, Document)>> {
        let results = sqlx::query_as::<_, DocumentModel>(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1
            ORDER BY id
            "#,
        )
        .bind(collection)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        let base = results
            .into_iter()
            .map(into_entry)
            .collect::<RepoResult<Vec<_>>>()?;
        self.writes.overlay_collection(collection, base)
    }

    fn set(&mut self, path: &DocumentPath, doc: Document) {
        self.writes.set(path, doc);
    }

    fn update(&mut self, path: &DocumentPath, patch: Document) {
        self.writes.update(path, patch);
    }

    fn delete(&mut self, path: &DocumentPath) {
        self.writes.delete(path);
    }

    async fn commit(mut self: Box<Self>) -> RepoResult<()> {
        let writes = self.writes.len();
        self.flush().await?;
        let this = *self;
        this.tx.commit().await.map_err(map_db_error)?;
        debug!(writes, "Transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        let this = *self;
        this.tx.rollback().await.map_err(map_db_error)
    }
}
