use crate::config::DatabaseConfig;
use crate::db::models::{RecordRow, StoreValue, UpsertRecord};
use crate::db::schema::{self, STORES, StoreDef, TS_COLUMN, quote_ident};
use crate::error::WorkshopError;
use serde_json::{Map, Number, Value};
use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{Column, Pool, Row, Sqlite, TypeInfo, ValueRef};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Open the pool with WAL + relaxed sync and make sure every table exists.
pub async fn connect(cfg: &DatabaseConfig) -> Result<RecordStorage, WorkshopError> {
    let connect_opts = SqliteConnectOptions::from_str(&cfg.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(cfg.busy_timeout_secs));
    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections.max(1))
        .connect_with(connect_opts)
        .await?;

    let storage = RecordStorage::new(pool);
    storage.init_schema().await?;
    Ok(storage)
}

#[derive(Clone)]
pub struct RecordStorage {
    pool: SqlitePool,
}

impl RecordStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create every registry table and its key-column index.
    pub async fn init_schema(&self) -> Result<(), WorkshopError> {
        for stmt in schema::init_statements() {
            sqlx::query(&stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert-or-replace every record inside a single transaction.
    /// Any failing record rolls back the whole batch. Returns the number of records written.
    pub async fn upsert_many(&self, records: Vec<UpsertRecord>) -> Result<usize, WorkshopError> {
        let mut tx = self.pool.begin().await?;
        let count = records.len();

        for record in records {
            let sql = upsert_sql(record.store, &record.columns);
            debug!(store = record.store.name, %sql, "upsert");
            let query = record
                .columns
                .into_iter()
                .fold(sqlx::query(&sql), |q, (_, value)| bind_value(q, value));
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(count)
    }

    /// All rows of `store` whose key column equals `key`, newest first.
    pub async fn find_by_key(
        &self,
        store: &StoreDef,
        key: &str,
    ) -> Result<Vec<RecordRow>, WorkshopError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ? ORDER BY {} DESC",
            quote_ident(store.name),
            quote_ident(store.key_column),
            quote_ident(TS_COLUMN)
        );
        let rows = sqlx::query(&sql).bind(key).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_json).collect()
    }

    /// The `limit` most recent rows of `store`, projected onto `columns`.
    pub async fn latest(
        &self,
        store: &StoreDef,
        columns: &[&str],
        limit: u32,
    ) -> Result<Vec<RecordRow>, WorkshopError> {
        let projection = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} DESC LIMIT ?",
            projection,
            quote_ident(store.name),
            quote_ident(TS_COLUMN)
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_json).collect()
    }

    /// Row count per store, in registry order.
    pub async fn counts(&self) -> Result<Map<String, Value>, WorkshopError> {
        let mut out = Map::new();
        for store in STORES {
            let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(store.name));
            let (n,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
            out.insert(store.name.to_string(), Value::from(n));
        }
        Ok(out)
    }
}

fn upsert_sql(store: &StoreDef, columns: &[(String, StoreValue)]) -> String {
    let names = columns
        .iter()
        .map(|(c, _)| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        quote_ident(store.name),
        names,
        placeholders
    )
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: StoreValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        StoreValue::Null => query.bind(None::<String>),
        StoreValue::Integer(i) => query.bind(i),
        StoreValue::Real(f) => query.bind(f),
        StoreValue::Text(s) => query.bind(s),
    }
}

/// Decode a row by the storage class of each value, not the declared column type.
fn row_to_json(row: &SqliteRow) -> Result<RecordRow, WorkshopError> {
    let mut out = Map::with_capacity(row.columns().len());
    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(idx)?),
                "REAL" => Number::from_f64(row.try_get::<f64, _>(idx)?)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                "BLOB" => {
                    let bytes: Vec<u8> = row.try_get(idx)?;
                    Value::String(String::from_utf8_lossy(&bytes).into_owned())
                }
                _ => Value::String(row.try_get::<String, _>(idx)?),
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::store;

    #[test]
    fn upsert_sql_uses_payload_columns_in_order() {
        let cols = vec![
            ("id".to_string(), StoreValue::Text("a1".into())),
            ("ts".to_string(), StoreValue::Integer(1)),
            ("key".to_string(), StoreValue::Text("K".into())),
        ];
        assert_eq!(
            upsert_sql(store("spares").unwrap(), &cols),
            "INSERT OR REPLACE INTO \"spares\" (\"id\", \"ts\", \"key\") VALUES (?, ?, ?)"
        );
    }
}
