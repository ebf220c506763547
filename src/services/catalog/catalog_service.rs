//! Catalog assembler and admin operations.
//!
//! Merges parser output with the stored per-item state (images keyed by
//! search key, markup rules), replaces the catalog wholesale on import, and
//! exposes the per-item admin mutations. Carrying disabled/archived flags
//! across a full re-import is an explicit non-goal of the ingestion path:
//! an import replaces the catalog, and only images survive, correlated by
//! search key.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{
    CatalogItemView, CatalogRecord, CatalogView, CategoryGroup, ImportStats, UNCATEGORIZED,
};
use crate::services::catalog::ingest::{ensure_supported_extension, parse_catalog};
use crate::services::catalog::normalize::normalize;
use crate::services::catalog::pricing::apply_pricing;
use crate::services::storage::CatalogStore;

/// Inline image payloads must be a `data:image/` base64 URI and decode to
/// under this many bytes. Enforced before storage.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    event_sender: Arc<EventSender>,
    max_image_bytes: usize,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, event_sender: Arc<EventSender>) -> Self {
        Self::with_image_limit(store, event_sender, MAX_IMAGE_BYTES)
    }

    pub fn with_image_limit(
        store: Arc<dyn CatalogStore>,
        event_sender: Arc<EventSender>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            store,
            event_sender,
            max_image_bytes,
        }
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        self.store.ping().await
    }

    /// Runs the full import pipeline: parse, merge stored images by search
    /// key, annotate sale prices, replace the stored catalog wholesale.
    ///
    /// Replacement is gated on a successful, non-empty parse; a malformed or
    /// header-only file never wipes the existing catalog.
    #[instrument(skip(self, contents), fields(file = %file_name))]
    pub async fn import_catalog(
        &self,
        file_name: &str,
        contents: &str,
    ) -> Result<ImportStats, ServiceError> {
        ensure_supported_extension(file_name)?;
        let outcome = parse_catalog(contents)?;
        let mut records = outcome.records;

        // One stored image can apply to many catalog rows, e.g. several
        // size variants of the same species.
        let images = self.store.fetch_images().await?;
        for record in records.iter_mut().filter(|r| !r.is_category) {
            if let Some(payload) = images.get(&record.search_key) {
                record.image = Some(payload.clone());
            }
        }

        let rules = self.store.fetch_markup_rules().await?;
        let overrides = self.store.fetch_overrides().await?;
        apply_pricing(&mut records, &rules, &overrides);

        self.store.replace_records(records).await?;

        info!(
            items = outcome.stats.items,
            categories = outcome.stats.categories,
            "catalog replaced from import"
        );
        self.event_sender
            .send_or_log(Event::CatalogImported {
                items: outcome.stats.items,
                categories: outcome.stats.categories,
                total_rows: outcome.stats.total_rows,
            })
            .await;

        Ok(outcome.stats)
    }

    /// Grouped display view: active records partitioned by category,
    /// categories alphabetical, the uncategorized bucket last, empty
    /// buckets dropped. Disabled items are visible only to privileged
    /// viewers; archived items are excluded everywhere.
    pub async fn grouped_catalog(
        &self,
        view: CatalogView,
    ) -> Result<Vec<CategoryGroup>, ServiceError> {
        let records = self.store.fetch_records().await?;

        let mut categorized: BTreeMap<String, Vec<CatalogItemView>> = BTreeMap::new();
        let mut uncategorized: Vec<CatalogItemView> = Vec::new();

        for record in records.into_iter().filter(|r| !r.is_category) {
            if record.archived {
                continue;
            }
            if record.disabled && view == CatalogView::Public {
                continue;
            }
            let item = to_view(record);
            match item.category.clone() {
                Some(category) => categorized.entry(category).or_default().push(item),
                None => uncategorized.push(item),
            }
        }

        let mut groups: Vec<CategoryGroup> = categorized
            .into_iter()
            .map(|(name, mut items)| {
                sort_items(&mut items);
                CategoryGroup { name, items }
            })
            .collect();

        if !uncategorized.is_empty() {
            sort_items(&mut uncategorized);
            groups.push(CategoryGroup {
                name: UNCATEGORIZED.to_string(),
                items: uncategorized,
            });
        }

        Ok(groups)
    }

    pub async fn item(&self, id: Uuid) -> Result<CatalogItemView, ServiceError> {
        let record = self.require_item(id).await?;
        Ok(to_view(record))
    }

    #[instrument(skip(self))]
    pub async fn set_disabled(
        &self,
        id: Uuid,
        disabled: bool,
    ) -> Result<CatalogItemView, ServiceError> {
        let mut record = self.require_item(id).await?;
        record.disabled = disabled;
        self.store.update_record(record.clone()).await?;

        let event = if disabled {
            Event::ItemDisabled(id)
        } else {
            Event::ItemEnabled(id)
        };
        self.event_sender.send_or_log(event).await;
        Ok(to_view(record))
    }

    #[instrument(skip(self))]
    pub async fn set_archived(
        &self,
        id: Uuid,
        archived: bool,
    ) -> Result<CatalogItemView, ServiceError> {
        let mut record = self.require_item(id).await?;
        record.archived = archived;
        self.store.update_record(record.clone()).await?;

        let event = if archived {
            Event::ItemArchived(id)
        } else {
            Event::ItemUnarchived(id)
        };
        self.event_sender.send_or_log(event).await;
        Ok(to_view(record))
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_record(id).await? {
            return Err(ServiceError::NotFound(format!("catalog record {}", id)));
        }
        self.event_sender.send_or_log(Event::ItemDeleted(id)).await;
        Ok(())
    }

    /// Explicit destructive wipe of the whole catalog.
    #[instrument(skip(self))]
    pub async fn wipe(&self) -> Result<(), ServiceError> {
        self.store.wipe().await?;
        self.event_sender.send_or_log(Event::CatalogWiped).await;
        Ok(())
    }

    /// Attaches an image to an item, stored under its search key so every
    /// row sharing the key picks it up. A failed per-row refresh does not
    /// block the remaining rows.
    #[instrument(skip(self, payload))]
    pub async fn attach_image(
        &self,
        id: Uuid,
        payload: String,
    ) -> Result<CatalogItemView, ServiceError> {
        validate_image_payload(&payload, self.max_image_bytes)?;
        let mut record = self.require_item(id).await?;
        let search_key = record.search_key.clone();

        self.store
            .put_image(search_key.clone(), payload.clone())
            .await?;

        let records = self.store.fetch_records().await?;
        for mut sibling in records
            .into_iter()
            .filter(|r| !r.is_category && r.search_key == search_key)
        {
            sibling.image = Some(payload.clone());
            if sibling.id == record.id {
                record = sibling.clone();
            }
            if let Err(err) = self.store.update_record(sibling).await {
                warn!(search_key = %search_key, "image refresh failed for one row: {}", err);
            }
        }

        self.event_sender
            .send_or_log(Event::ImageAttached {
                item_id: id,
                search_key,
            })
            .await;
        Ok(to_view(record))
    }

    async fn require_item(&self, id: Uuid) -> Result<CatalogRecord, ServiceError> {
        let record = self
            .store
            .fetch_record(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("catalog record {}", id)))?;
        if record.is_category {
            return Err(ServiceError::InvalidOperation(
                "operation does not apply to category headers".into(),
            ));
        }
        Ok(record)
    }
}

fn sort_items(items: &mut [CatalogItemView]) {
    items.sort_by(|a, b| {
        a.raw_name
            .cmp(&b.raw_name)
            .then(a.unique_id.cmp(&b.unique_id))
    });
}

fn to_view(record: CatalogRecord) -> CatalogItemView {
    let normalized = normalize(&record.raw_name);
    CatalogItemView {
        id: record.id,
        unique_id: record.unique_id,
        raw_name: record.raw_name,
        display_name: normalized.display_name,
        size: normalized.size,
        gender: normalized.gender,
        search_key: record.search_key,
        category: record.category,
        cost_basis: record.cost_basis,
        sale_price: record.sale_price,
        quantity_on_hand: record.quantity_on_hand,
        disabled: record.disabled,
        archived: record.archived,
        image: record.image,
    }
}

/// Accepts a direct URL or an inline `data:image/` base64 payload decoding
/// to under `max_bytes`. Enforced before storage, never after.
pub fn validate_image_payload(payload: &str, max_bytes: usize) -> Result<(), ServiceError> {
    if payload.starts_with("http://") || payload.starts_with("https://") {
        return Ok(());
    }

    if let Some(rest) = payload.strip_prefix("data:image/") {
        let encoded = rest
            .split_once(";base64,")
            .map(|(_, tail)| tail)
            .ok_or_else(|| {
                ServiceError::InvalidInput("inline image must be base64-encoded".into())
            })?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| ServiceError::InvalidInput(format!("invalid base64 image: {}", e)))?;
        if decoded.len() >= max_bytes {
            return Err(ServiceError::InvalidInput(format!(
                "inline image exceeds the {} byte limit",
                max_bytes
            )));
        }
        return Ok(());
    }

    Err(ServiceError::InvalidInput(
        "image must be a URL or a data:image/ URI".into(),
    ))
}
