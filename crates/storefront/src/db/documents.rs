//! `PostgreSQL` implementation of the `DocumentStore` port.
//!
//! All SQL is runtime-checked (`sqlx::query_as`, not `sqlx::query!`) so the
//! crate builds without a live database.

use async_trait::async_trait;
use libreria_core::Document;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use crate::store::{DocumentStore, Precondition, StoreError, StoredDocument};

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    version: i64,
    body: Json<Document>,
}

impl TryFrom<DocumentRow> for StoredDocument {
    type Error = StoreError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            version: to_version(row.version)?,
            id: row.id,
            body: row.body.0,
        })
    }
}

fn to_version(raw: i64) -> Result<u64, StoreError> {
    u64::try_from(raw).map_err(|_| StoreError::Unavailable(format!("negative version {raw}")))
}

fn from_version(version: u64) -> Result<i64, StoreError> {
    i64::try_from(version).map_err(|_| StoreError::Unavailable(format!("version {version} out of range")))
}

/// Document store backed by the `storefront.documents` table.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn conflict(collection: &str, id: &str) -> StoreError {
        StoreError::Conflict {
            collection: collection.to_owned(),
            id: id.to_owned(),
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self))]
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, version, body
            FROM storefront.documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StoredDocument::try_from).transpose()
    }

    #[instrument(skip(self, body))]
    async fn put(
        &self,
        collection: &str,
        id: &str,
        body: Document,
        precondition: Precondition,
    ) -> Result<u64, StoreError> {
        let body = Json(body);
        let version: Option<i64> = match precondition {
            Precondition::Any => {
                sqlx::query_scalar(
                    r"
                    INSERT INTO storefront.documents (collection, id, version, body)
                    VALUES ($1, $2, nextval('storefront.document_version'), $3)
                    ON CONFLICT (collection, id) DO UPDATE
                        SET version = EXCLUDED.version,
                            body = EXCLUDED.body,
                            updated_at = now()
                    RETURNING version
                    ",
                )
                .bind(collection)
                .bind(id)
                .bind(&body)
                .fetch_optional(&self.pool)
                .await?
            }
            Precondition::Absent => {
                sqlx::query_scalar(
                    r"
                    INSERT INTO storefront.documents (collection, id, version, body)
                    VALUES ($1, $2, nextval('storefront.document_version'), $3)
                    ON CONFLICT (collection, id) DO NOTHING
                    RETURNING version
                    ",
                )
                .bind(collection)
                .bind(id)
                .bind(&body)
                .fetch_optional(&self.pool)
                .await?
            }
            Precondition::Version(expected) => {
                sqlx::query_scalar(
                    r"
                    UPDATE storefront.documents
                    SET version = nextval('storefront.document_version'),
                        body = $3,
                        updated_at = now()
                    WHERE collection = $1 AND id = $2 AND version = $4
                    RETURNING version
                    ",
                )
                .bind(collection)
                .bind(id)
                .bind(&body)
                .bind(from_version(expected)?)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        version.map_or_else(|| Err(Self::conflict(collection, id)), to_version)
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            DELETE FROM storefront.documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, version, body
            FROM storefront.documents
            WHERE collection = $1
            ORDER BY id
            ",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoredDocument::try_from).collect()
    }

    #[instrument(skip(self, value))]
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let mut filter = Document::new();
        filter.insert(field.to_owned(), value.clone());

        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, version, body
            FROM storefront.documents
            WHERE collection = $1 AND body @> $2
            ORDER BY id
            ",
        )
        .bind(collection)
        .bind(Json(filter))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoredDocument::try_from).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
