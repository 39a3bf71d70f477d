use crate::db::schema::{Domain, STORES, StoreDef, TS_COLUMN};
use crate::db::{RecentItems, RecordStorage, SearchResult, SyncItem, UpsertRecord};
use crate::error::WorkshopError;
use tracing::{debug, info};

pub const RECENT_LIMIT: u32 = 3;

/// Validate every item first, then write the whole batch in one transaction.
/// Returns the number of items applied.
pub async fn sync_batch(
    storage: &RecordStorage,
    items: Vec<SyncItem>,
) -> Result<usize, WorkshopError> {
    let records = items
        .into_iter()
        .map(UpsertRecord::from_item)
        .collect::<Result<Vec<_>, _>>()?;
    let count = storage.upsert_many(records).await?;
    info!(count, "sync batch applied");
    Ok(count)
}

/// Look up `key` in every store's key column, grouping matches by domain and sub-kind.
pub async fn unified_search(
    storage: &RecordStorage,
    key: &str,
) -> Result<SearchResult, WorkshopError> {
    let mut out = SearchResult::default();
    let mut hits = 0usize;
    for store in STORES {
        let rows = storage.find_by_key(store, key).await?;
        hits += rows.len();
        out.insert(store, rows);
    }
    debug!(key, hits, "unified search");
    Ok(out)
}

/// Latest supply entries of a domain: key column, previous site and timestamp.
pub async fn latest_supplies(
    storage: &RecordStorage,
    domain: Domain,
) -> Result<RecentItems, WorkshopError> {
    let store = supply_store(domain)?;
    let items = storage
        .latest(store, &[store.key_column, "prevSite", TS_COLUMN], RECENT_LIMIT)
        .await?;
    Ok(RecentItems { items })
}

/// The registry is static, so a domain without a supply store is a server fault.
fn supply_store(domain: Domain) -> Result<&'static StoreDef, WorkshopError> {
    STORES
        .iter()
        .find(|s| s.domain == domain && s.kind == "supply")
        .ok_or_else(|| WorkshopError::Internal(format!("no supply store for {domain:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supply_store_per_domain() {
        assert_eq!(supply_store(Domain::Engines).unwrap().name, "eng_supply");
        assert_eq!(supply_store(Domain::Generators).unwrap().name, "gen_supply");
    }

    #[test]
    fn missing_supply_store_is_a_server_fault() {
        let err = supply_store(Domain::Spares).unwrap_err();
        assert!(matches!(err, WorkshopError::Internal(_)));
    }
}
