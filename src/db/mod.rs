use serde_json::Value;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use thiserror::Error;

use crate::models::{Collection, Document, ObjectId, INTERNAL_ID_FIELD};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("stored document is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("document must be a JSON object")]
    NotAnObject,

    #[error("unsupported filter value for field `{0}`")]
    UnsupportedFilter(String),
}

/// Equality filter over top-level document fields.
pub type Filter = Vec<(&'static str, Value)>;

/// True for URLs naming an in-memory SQLite database.
fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// One connection, never recycled, so an in-memory database lives as long
/// as the pool.
fn single_connection() -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

/// Document store over SQLite: one table per collection, each row a JSON
/// document keyed by its hex identifier. Tables are created on first insert.
#[derive(Clone, Debug)]
pub struct DocumentStore {
    pool: SqlitePool,
    name: String,
}

impl DocumentStore {
    /// Connects to the SQLite database at `url`, creating the file if needed.
    /// In-memory URLs get the same single-connection pool as [`Self::in_memory`].
    pub async fn connect(url: &str, name: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = if is_memory_url(url) {
            single_connection().connect_with(options).await?
        } else {
            SqlitePool::connect_with(options).await?
        };
        Ok(Self::from_pool(pool, name))
    }

    /// Private in-memory store.
    pub async fn in_memory(name: &str) -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:", name).await
    }

    pub fn from_pool(pool: SqlitePool, name: &str) -> Self {
        Self { pool, name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Closes the underlying pool; later calls fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn ensure_collection(&self, collection: Collection) -> Result<(), sqlx::Error> {
        let ddl = format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (
                   _id TEXT PRIMARY KEY NOT NULL,
                   doc TEXT NOT NULL
               )"#,
            collection.name()
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    async fn collection_exists(&self, collection: Collection) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(r#"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?"#)
            .bind(collection.name())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>(0)? > 0)
    }

    /// Stores `document` as a new record and returns its identifier.
    pub async fn insert<T: serde::Serialize>(
        &self,
        collection: Collection,
        document: &T,
    ) -> Result<ObjectId, StoreError> {
        let Value::Object(mut doc) = serde_json::to_value(document)? else {
            return Err(StoreError::NotAnObject);
        };
        doc.remove(INTERNAL_ID_FIELD);

        self.ensure_collection(collection).await?;

        let id = ObjectId::generate();
        let sql = format!(r#"INSERT INTO "{}" (_id, doc) VALUES (?, ?)"#, collection.name());
        sqlx::query(&sql)
            .bind(id.as_str())
            .bind(Value::Object(doc).to_string())
            .execute(&self.pool)
            .await?;

        tracing::debug!(collection = collection.name(), %id, "document inserted");
        Ok(id)
    }

    /// Returns the documents of `collection` matching every filter entry,
    /// in insertion order. Each document carries its `_id`.
    pub async fn query(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        if !self.collection_exists(collection).await? {
            return Ok(Vec::new());
        }

        let mut sql = format!(r#"SELECT _id, doc FROM "{}""#, collection.name());
        for (i, (field, value)) in filter.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            match value {
                Value::Null => sql.push_str("json_extract(doc, ?) IS NULL"),
                Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                    sql.push_str("json_extract(doc, ?) = ?")
                }
                _ => return Err(StoreError::UnsupportedFilter(field.to_string())),
            }
        }
        sql.push_str(" ORDER BY rowid");

        let mut query = sqlx::query(&sql);
        for (field, value) in filter {
            query = query.bind(format!("$.{field}"));
            query = match value {
                Value::String(s) => query.bind(s.clone()),
                Value::Bool(b) => query.bind(*b as i64),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => query.bind(i),
                    None => query.bind(n.as_f64().unwrap_or_default()),
                },
                _ => query,
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let id: String = row.try_get("_id")?;
                let raw: String = row.try_get("doc")?;
                let Value::Object(mut doc) = serde_json::from_str::<Value>(&raw)? else {
                    return Err(StoreError::NotAnObject);
                };
                doc.insert(INTERNAL_ID_FIELD.to_string(), Value::String(id));
                Ok(doc)
            })
            .collect()
    }

    /// Names of the collections holding data, alphabetically.
    pub async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT name FROM sqlite_master
               WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
               ORDER BY name"#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(StoreError::from))
            .collect()
    }
}
