//! Lookup of stored model records

use crate::domain::{ExampleResult, ModelInstance, ModelStore, ModelType};
use crate::persistence::error::PersistenceError;
use crate::persistence::pool::ConnectionPool;
use crate::persistence::PersistenceConfig;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use sqlx::any::AnyRow;
use sqlx::{Column, Row};

static TABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid table name regex"));

/// SQLx-based implementation of ModelStore
pub struct SqlxModelStore {
    pool: ConnectionPool,
}

impl SqlxModelStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Open a pool from configuration and wrap it
    pub async fn connect(config: &PersistenceConfig) -> Result<Self, PersistenceError> {
        let pool = ConnectionPool::new(
            &config.url,
            config.max_connections,
            config.connect_timeout_secs,
        )
        .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    async fn fetch_first(
        &self,
        table: &str,
    ) -> Result<Option<Map<String, Value>>, PersistenceError> {
        if !TABLE_NAME.is_match(table) {
            return Err(PersistenceError::InvalidTable(table.to_string()));
        }

        let sql = format!(
            "SELECT * FROM {} LIMIT 1",
            self.pool.backend().quote_identifier(table)
        );
        let row = sqlx::query(&sql).fetch_optional(self.pool.pool()).await?;

        Ok(row.map(|row| row_to_attributes(&row)))
    }
}

#[async_trait]
impl ModelStore for SqlxModelStore {
    async fn first(&self, model: &ModelType) -> ExampleResult<Option<ModelInstance>> {
        let Some(table) = model.table.as_deref() else {
            return Ok(None);
        };

        let attributes = self.fetch_first(table).await?;
        Ok(attributes.map(|attributes| ModelInstance::new(model.name.clone(), attributes)))
    }
}

/// Convert a row of unknown shape to JSON attributes.
///
/// `AnyRow` carries no generic "get as value", so each column is tried as
/// text, integer, float and boolean in turn; anything else becomes null.
fn row_to_attributes(row: &AnyRow) -> Map<String, Value> {
    let mut attributes = Map::new();
    for col in row.columns() {
        let idx = col.ordinal();
        let value = if let Ok(s) = row.try_get::<String, _>(idx) {
            Value::String(s)
        } else if let Ok(i) = row.try_get::<i64, _>(idx) {
            json!(i)
        } else if let Ok(f) = row.try_get::<f64, _>(idx) {
            json!(f)
        } else if let Ok(b) = row.try_get::<bool, _>(idx) {
            json!(b)
        } else {
            Value::Null
        };
        attributes.insert(col.name().to_string(), value);
    }
    attributes
}
