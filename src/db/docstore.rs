use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Error as SqlxError;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::{DocumentGateway, GatewayError, LoadedDocument};
use crate::models::{DocumentRow, DocumentSummary};

/// Database connection pool over the `documents` table
pub struct DocStore {
    pool: PgPool,
}

impl DocStore {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    ///
    /// # Returns
    /// * `Result<Self, SqlxError>` - Database connection pool or error
    pub async fn connect(database_url: &str) -> Result<Self, SqlxError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    /// Create the documents table if it does not exist yet.
    pub async fn init_schema(&self) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database schema initialized");
        Ok(())
    }

    /// Insert a new document at version 0.
    pub async fn create_document(
        &self,
        title: &str,
        content: &str,
    ) -> Result<DocumentRow, SqlxError> {
        let id = Uuid::new_v4();
        info!("Creating document {} ('{}')", id, title);

        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (id, title, content, version)
            VALUES ($1, $2, $3, 0)
            RETURNING id, title, content, version, created_at, updated_at;
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// List all documents (id and title only).
    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>, SqlxError> {
        sqlx::query_as::<_, DocumentSummary>("SELECT id, title FROM documents ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
    }

    /// Fetch a full document by id.
    pub async fn get_document(&self, document_id: Uuid) -> Result<Option<DocumentRow>, SqlxError> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT id, title, content, version, created_at, updated_at FROM documents WHERE id = $1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete a document by id
    ///
    /// # Returns
    /// * `Result<bool, SqlxError>` - true if a row was deleted
    pub async fn delete_document(&self, document_id: Uuid) -> Result<bool, SqlxError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Load the editable state of a document for a new session.
    pub async fn load_document(
        &self,
        document_id: Uuid,
    ) -> Result<Option<LoadedDocument>, SqlxError> {
        sqlx::query_as::<_, LoadedDocument>("SELECT content, version FROM documents WHERE id = $1")
            .bind(document_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Persist session content, only moving the version forward.
    ///
    /// Overlapping saves for the same document may complete out of order;
    /// the `version < $3` guard keeps a slow save for an older version from
    /// overwriting a newer persisted one.
    ///
    /// # Returns
    /// * `Result<bool, SqlxError>` - true if the row was updated
    pub async fn save_document(
        &self,
        document_id: Uuid,
        content: &str,
        version: i32,
    ) -> Result<bool, SqlxError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET content = $2,
                version = $3,
                updated_at = NOW()
            WHERE id = $1
                AND version < $3;
            "#,
        )
        .bind(document_id)
        .bind(content)
        .bind(version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DocumentGateway for DocStore {
    async fn load(&self, document_id: Uuid) -> Result<Option<LoadedDocument>, GatewayError> {
        Ok(self.load_document(document_id).await?)
    }

    async fn save(
        &self,
        document_id: Uuid,
        content: &str,
        version: i32,
    ) -> Result<(), GatewayError> {
        let updated = self.save_document(document_id, content, version).await?;
        if updated {
            info!("Document {} persisted at version {}", document_id, version);
        } else {
            debug!(
                "Skipped stale save for document {} at version {}",
                document_id, version
            );
        }
        Ok(())
    }
}
