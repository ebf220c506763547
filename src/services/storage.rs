use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{CatalogRecord, MarkupRule};

/// The stored-state boundary the assembler depends on: per-item flags and
/// prices, images keyed by search key, markup rules, and manual overrides.
/// Implementations must offer read-your-writes consistency within a single
/// browsing session. The shipped implementation is in-memory; a hosted
/// database implementation plugs in behind this trait.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Connectivity probe for health checks.
    async fn ping(&self) -> Result<(), ServiceError>;

    async fn fetch_records(&self) -> Result<Vec<CatalogRecord>, ServiceError>;

    async fn fetch_record(&self, id: Uuid) -> Result<Option<CatalogRecord>, ServiceError>;

    /// Replaces the entire catalog, assigning identifiers to records that
    /// lack one. Atomic: readers never observe a half-replaced catalog.
    async fn replace_records(
        &self,
        records: Vec<CatalogRecord>,
    ) -> Result<Vec<CatalogRecord>, ServiceError>;

    async fn update_record(&self, record: CatalogRecord) -> Result<(), ServiceError>;

    /// Returns true when a record was actually removed.
    async fn delete_record(&self, id: Uuid) -> Result<bool, ServiceError>;

    async fn wipe(&self) -> Result<(), ServiceError>;

    /// Stored image payloads keyed by search key. One payload can apply to
    /// many catalog rows.
    async fn fetch_images(&self) -> Result<HashMap<String, String>, ServiceError>;

    async fn put_image(&self, search_key: String, payload: String) -> Result<(), ServiceError>;

    async fn fetch_markup_rules(&self) -> Result<Vec<MarkupRule>, ServiceError>;

    /// Replaces the rule set wholesale, keeping at most one rule per
    /// category scope.
    async fn upsert_markup_rules(&self, rules: Vec<MarkupRule>) -> Result<(), ServiceError>;

    async fn fetch_overrides(&self) -> Result<HashMap<Uuid, Decimal>, ServiceError>;

    async fn set_override(&self, item_id: Uuid, price: Decimal) -> Result<(), ServiceError>;

    async fn clear_override(&self, item_id: Uuid) -> Result<(), ServiceError>;
}

/// In-memory catalog store backed by concurrent maps.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    records: RwLock<Vec<CatalogRecord>>,
    images: DashMap<String, String>,
    rules: RwLock<Vec<MarkupRule>>,
    overrides: DashMap<Uuid, Decimal>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned() -> ServiceError {
        ServiceError::StorageError("catalog store lock poisoned".to_string())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn fetch_records(&self) -> Result<Vec<CatalogRecord>, ServiceError> {
        let records = self.records.read().map_err(|_| Self::lock_poisoned())?;
        Ok(records.clone())
    }

    async fn fetch_record(&self, id: Uuid) -> Result<Option<CatalogRecord>, ServiceError> {
        let records = self.records.read().map_err(|_| Self::lock_poisoned())?;
        Ok(records.iter().find(|r| r.id == Some(id)).cloned())
    }

    async fn replace_records(
        &self,
        mut records: Vec<CatalogRecord>,
    ) -> Result<Vec<CatalogRecord>, ServiceError> {
        for record in &mut records {
            if record.id.is_none() {
                record.id = Some(Uuid::new_v4());
            }
        }
        let mut guard = self.records.write().map_err(|_| Self::lock_poisoned())?;
        *guard = records.clone();
        Ok(records)
    }

    async fn update_record(&self, record: CatalogRecord) -> Result<(), ServiceError> {
        let id = record
            .id
            .ok_or_else(|| ServiceError::InvalidOperation("record has no identifier".into()))?;
        let mut guard = self.records.write().map_err(|_| Self::lock_poisoned())?;
        match guard.iter_mut().find(|r| r.id == Some(id)) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(ServiceError::NotFound(format!("catalog record {}", id))),
        }
    }

    async fn delete_record(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut guard = self.records.write().map_err(|_| Self::lock_poisoned())?;
        let before = guard.len();
        guard.retain(|r| r.id != Some(id));
        Ok(guard.len() < before)
    }

    async fn wipe(&self) -> Result<(), ServiceError> {
        let mut guard = self.records.write().map_err(|_| Self::lock_poisoned())?;
        guard.clear();
        Ok(())
    }

    async fn fetch_images(&self) -> Result<HashMap<String, String>, ServiceError> {
        Ok(self
            .images
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn put_image(&self, search_key: String, payload: String) -> Result<(), ServiceError> {
        self.images.insert(search_key, payload);
        Ok(())
    }

    async fn fetch_markup_rules(&self) -> Result<Vec<MarkupRule>, ServiceError> {
        let rules = self.rules.read().map_err(|_| Self::lock_poisoned())?;
        Ok(rules.clone())
    }

    async fn upsert_markup_rules(&self, incoming: Vec<MarkupRule>) -> Result<(), ServiceError> {
        let mut guard = self.rules.write().map_err(|_| Self::lock_poisoned())?;
        for rule in incoming {
            match guard.iter_mut().find(|r| r.category == rule.category) {
                Some(existing) => *existing = rule,
                None => guard.push(rule),
            }
        }
        Ok(())
    }

    async fn fetch_overrides(&self) -> Result<HashMap<Uuid, Decimal>, ServiceError> {
        Ok(self
            .overrides
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect())
    }

    async fn set_override(&self, item_id: Uuid, price: Decimal) -> Result<(), ServiceError> {
        self.overrides.insert(item_id, price);
        Ok(())
    }

    async fn clear_override(&self, item_id: Uuid) -> Result<(), ServiceError> {
        self.overrides.remove(&item_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(name: &str) -> CatalogRecord {
        CatalogRecord::item(1, name.to_string(), name.to_uppercase())
    }

    #[tokio::test]
    async fn replace_assigns_identifiers() {
        let store = InMemoryCatalogStore::new();
        let persisted = store.replace_records(vec![record("clownfish")]).await.unwrap();
        assert!(persisted[0].id.is_some());

        let fetched = store.fetch_records().await.unwrap();
        assert_eq!(fetched, persisted);
    }

    #[tokio::test]
    async fn update_unknown_record_is_not_found() {
        let store = InMemoryCatalogStore::new();
        let mut r = record("tang");
        r.id = Some(Uuid::new_v4());
        assert_matches::assert_matches!(
            store.update_record(r).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn markup_rules_upsert_by_category_scope() {
        let store = InMemoryCatalogStore::new();
        store
            .upsert_markup_rules(vec![
                MarkupRule::new(None, dec!(30)),
                MarkupRule::new(Some("ANGELS".into()), dec!(40)),
            ])
            .await
            .unwrap();
        store
            .upsert_markup_rules(vec![MarkupRule::new(Some("ANGELS".into()), dec!(55))])
            .await
            .unwrap();

        let rules = store.fetch_markup_rules().await.unwrap();
        assert_eq!(rules.len(), 2);
        let angels = rules
            .iter()
            .find(|r| r.category.as_deref() == Some("ANGELS"))
            .unwrap();
        assert_eq!(angels.markup_percentage, dec!(55));
    }

    #[tokio::test]
    async fn overrides_read_your_writes() {
        let store = InMemoryCatalogStore::new();
        let id = Uuid::new_v4();
        store.set_override(id, dec!(19.99)).await.unwrap();
        assert_eq!(
            store.fetch_overrides().await.unwrap().get(&id),
            Some(&dec!(19.99))
        );
        store.clear_override(id).await.unwrap();
        assert!(store.fetch_overrides().await.unwrap().is_empty());
    }
}
