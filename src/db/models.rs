use crate::db::schema::{Domain, ID_COLUMN, StoreDef, TS_COLUMN};
use crate::error::WorkshopError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row as returned to clients: column name -> JSON value, in table column order.
pub type RecordRow = Map<String, Value>;

/// Storage value kinds accepted in a sync payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl StoreValue {
    pub fn from_json(column: &str, value: Value) -> Result<Self, WorkshopError> {
        match value {
            Value::Null => Ok(StoreValue::Null),
            Value::Bool(b) => Ok(StoreValue::Integer(i64::from(b))),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(StoreValue::Integer(i)),
                None => n
                    .as_f64()
                    .map(StoreValue::Real)
                    .ok_or_else(|| WorkshopError::UnsupportedValue {
                        column: column.to_string(),
                    }),
            },
            Value::String(s) => Ok(StoreValue::Text(s)),
            Value::Array(_) | Value::Object(_) => Err(WorkshopError::UnsupportedValue {
                column: column.to_string(),
            }),
        }
    }
}

/// One client-side change to replay into a store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncItem {
    pub id: String,
    pub store: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    pub ts: i64,
    // Client queue bookkeeping; accepted but not persisted.
    #[serde(default)]
    pub synced: Option<bool>,
    #[serde(default)]
    pub sync_ts: Option<i64>,
}

/// `{ "items": [...] }` as sent by the client, or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SyncBatch {
    Wrapped { items: Vec<SyncItem> },
    Bare(Vec<SyncItem>),
}

impl SyncBatch {
    pub fn into_items(self) -> Vec<SyncItem> {
        match self {
            SyncBatch::Wrapped { items } | SyncBatch::Bare(items) => items,
        }
    }
}

/// A sync item checked against the registry, ready to be written.
#[derive(Debug)]
pub struct UpsertRecord {
    pub store: &'static StoreDef,
    pub columns: Vec<(String, StoreValue)>,
}

impl UpsertRecord {
    /// Resolve the store, fill in `{id, ts}` for an empty payload, and convert every
    /// payload entry, rejecting columns the store does not declare.
    pub fn from_item(item: SyncItem) -> Result<Self, WorkshopError> {
        let store = crate::db::schema::store(&item.store)
            .ok_or_else(|| WorkshopError::UnknownStore(item.store.clone()))?;

        let payload = if item.payload.is_empty() {
            let mut synthesized = Map::new();
            synthesized.insert(ID_COLUMN.to_string(), Value::String(item.id));
            synthesized.insert(TS_COLUMN.to_string(), Value::from(item.ts));
            synthesized
        } else {
            item.payload
        };

        let columns = payload
            .into_iter()
            .map(|(column, value)| {
                if !store.has_column(&column) {
                    return Err(WorkshopError::UnknownColumn {
                        store: store.name.to_string(),
                        column,
                    });
                }
                let value = StoreValue::from_json(&column, value)?;
                Ok((column, value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { store, columns })
    }
}

/// Unified search output, grouped by domain then sub-kind.
#[derive(Debug, Default, Serialize)]
pub struct SearchResult {
    pub engines: Map<String, Value>,
    pub generators: Map<String, Value>,
    pub spares: Vec<RecordRow>,
}

impl SearchResult {
    pub fn insert(&mut self, store: &StoreDef, rows: Vec<RecordRow>) {
        let group = match store.domain {
            Domain::Engines => &mut self.engines,
            Domain::Generators => &mut self.generators,
            Domain::Spares => {
                self.spares.extend(rows);
                return;
            }
        };
        let rows = rows.into_iter().map(Value::Object).collect();
        group.insert(store.kind.to_string(), Value::Array(rows));
    }
}

/// Projection returned by the recency endpoints.
#[derive(Debug, Serialize)]
pub struct RecentItems {
    pub items: Vec<RecordRow>,
}
