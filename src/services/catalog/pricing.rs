//! Pricing policy: markup rules, manual overrides, and the `.99` price rule.
//!
//! All arithmetic runs in `rust_decimal` so nothing surprising happens at
//! the cent boundary.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{CatalogRecord, MarkupRule, ParsedPrice};
use crate::services::storage::CatalogStore;

/// Computes the displayed sale price from a cost basis and a markup
/// percentage: `floor(cost * (1 + markup/100)) + 0.99`.
///
/// The trailing `.99` is deliberate psychological pricing, not rounding; a
/// floored whole part of 0 yields `0.99`.
pub fn compute_sale_price(cost_basis: Decimal, markup_percentage: Decimal) -> Decimal {
    let marked = cost_basis * (Decimal::ONE + markup_percentage / dec!(100));
    marked.floor() + dec!(0.99)
}

/// Selects the markup rule for a category: exact category match first, then
/// the store-wide (null-category) default. When several rules share a scope,
/// the most recently updated one wins.
pub fn resolve_rule<'a>(
    rules: &'a [MarkupRule],
    category: Option<&str>,
) -> Option<&'a MarkupRule> {
    if let Some(category) = category {
        let specific = rules
            .iter()
            .filter(|r| r.category.as_deref() == Some(category))
            .max_by_key(|r| r.updated_at);
        if specific.is_some() {
            return specific;
        }
    }
    rules
        .iter()
        .filter(|r| r.category.is_none())
        .max_by_key(|r| r.updated_at)
}

/// Resolves the sale price for one record. Precedence: manual override
/// (verbatim) over markup rule over leaving the parsed price unchanged.
pub fn resolve_sale_price(
    record: &CatalogRecord,
    rules: &[MarkupRule],
    overrides: &HashMap<Uuid, Decimal>,
) -> Option<ParsedPrice> {
    if record.is_category {
        return None;
    }
    if let Some(id) = record.id {
        if let Some(price) = overrides.get(&id) {
            return Some(ParsedPrice::new(*price));
        }
    }
    let cost = record.cost_basis.as_ref()?.amount;
    let rule = resolve_rule(rules, record.category.as_deref())?;
    Some(ParsedPrice::new(compute_sale_price(
        cost,
        rule.markup_percentage,
    )))
}

/// Annotates sale prices across a record set, returning how many records
/// changed. Records with no applicable override or rule keep whatever price
/// the parse produced.
pub fn apply_pricing(
    records: &mut [CatalogRecord],
    rules: &[MarkupRule],
    overrides: &HashMap<Uuid, Decimal>,
) -> usize {
    let mut updated = 0;
    for record in records.iter_mut() {
        if let Some(price) = resolve_sale_price(record, rules, overrides) {
            if record.sale_price.as_ref() != Some(&price) {
                record.sale_price = Some(price);
                updated += 1;
            }
        }
    }
    updated
}

/// Service wrapper over the pricing policy and the rule/override state.
#[derive(Clone)]
pub struct PricingService {
    store: Arc<dyn CatalogStore>,
    event_sender: Arc<EventSender>,
}

impl PricingService {
    pub fn new(store: Arc<dyn CatalogStore>, event_sender: Arc<EventSender>) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    pub async fn markup_rules(&self) -> Result<Vec<MarkupRule>, ServiceError> {
        self.store.fetch_markup_rules().await
    }

    #[instrument(skip(self, rules))]
    pub async fn upsert_markup_rules(
        &self,
        rules: Vec<MarkupRule>,
    ) -> Result<Vec<MarkupRule>, ServiceError> {
        self.store.upsert_markup_rules(rules).await?;
        let stored = self.store.fetch_markup_rules().await?;
        self.event_sender
            .send_or_log(Event::MarkupRulesUpdated {
                rule_count: stored.len(),
            })
            .await;
        Ok(stored)
    }

    /// Sets a manual override. The override supersedes any markup rule
    /// unconditionally, so the stored record's display price is updated to
    /// the override verbatim.
    #[instrument(skip(self))]
    pub async fn set_override(
        &self,
        item_id: Uuid,
        price: Decimal,
    ) -> Result<CatalogRecord, ServiceError> {
        if price < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "override price cannot be negative".into(),
            ));
        }
        let mut record = self.require_item(item_id).await?;

        self.store.set_override(item_id, price).await?;
        record.sale_price = Some(ParsedPrice::new(price));
        self.store.update_record(record.clone()).await?;

        self.event_sender
            .send_or_log(Event::PriceOverrideSet { item_id })
            .await;
        Ok(record)
    }

    /// Clears a manual override and re-resolves the record's price from the
    /// markup rules. With no applicable rule the price is left as it was.
    #[instrument(skip(self))]
    pub async fn clear_override(&self, item_id: Uuid) -> Result<CatalogRecord, ServiceError> {
        let mut record = self.require_item(item_id).await?;

        self.store.clear_override(item_id).await?;
        let rules = self.store.fetch_markup_rules().await?;
        if let Some(price) = resolve_sale_price(&record, &rules, &HashMap::new()) {
            record.sale_price = Some(price);
            self.store.update_record(record.clone()).await?;
        }

        self.event_sender
            .send_or_log(Event::PriceOverrideCleared { item_id })
            .await;
        Ok(record)
    }

    /// Re-runs the pricing policy over the whole catalog.
    #[instrument(skip(self))]
    pub async fn recompute(&self) -> Result<usize, ServiceError> {
        let mut records = self.store.fetch_records().await?;
        let rules = self.store.fetch_markup_rules().await?;
        let overrides = self.store.fetch_overrides().await?;

        let updated = apply_pricing(&mut records, &rules, &overrides);
        for record in records.iter().filter(|r| !r.is_category) {
            self.store.update_record(record.clone()).await?;
        }

        info!(updated = updated, "pricing recompute finished");
        self.event_sender
            .send_or_log(Event::PricesRecomputed { updated })
            .await;
        Ok(updated)
    }

    async fn require_item(&self, item_id: Uuid) -> Result<CatalogRecord, ServiceError> {
        let record = self
            .store
            .fetch_record(item_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("catalog record {}", item_id)))?;
        if record.is_category {
            return Err(ServiceError::InvalidOperation(
                "category headers carry no price".into(),
            ));
        }
        Ok(record)
    }
}
