use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Bucket label for items that fell outside every category header.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A parsed monetary value. Callers need both the raw amount and the
/// formatted display form, so the two always travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParsedPrice {
    pub amount: Decimal,
    /// `"$" + 2-decimal fixed` rendering of `amount`.
    pub display: String,
}

impl ParsedPrice {
    pub fn new(amount: Decimal) -> Self {
        Self {
            display: format!("${}", format_two_places(amount)),
            amount,
        }
    }
}

/// Renders a decimal with exactly two fractional digits.
pub fn format_two_places(value: Decimal) -> String {
    let mut s = value.round_dp(2).to_string();
    if let Some(dot) = s.find('.') {
        let decimals = s.len() - dot - 1;
        if decimals == 0 {
            s.push_str("00");
        } else if decimals == 1 {
            s.push('0');
        }
    } else {
        s.push_str(".00");
    }
    s
}

/// One row of the ingested catalog: either a purchasable item or a category
/// header (`is_category = true`), in which case it carries no price,
/// quantity, or image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogRecord {
    /// Opaque external identifier; absent until the store persists the record.
    pub id: Option<Uuid>,
    /// Stable key for UI identity, assigned at parse time, never reused
    /// within one load.
    pub unique_id: u64,
    /// Name exactly as it appeared in the source row.
    pub raw_name: String,
    /// Canonical uppercase, punctuation-stripped form of the cleaned name.
    /// Correlates catalog rows with stored images across re-imports.
    pub search_key: String,
    pub category: Option<String>,
    pub is_category: bool,
    pub cost_basis: Option<ParsedPrice>,
    pub sale_price: Option<ParsedPrice>,
    pub quantity_on_hand: u32,
    pub disabled: bool,
    pub archived: bool,
    /// Direct URL or inline `data:image/...` base64 payload.
    pub image: Option<String>,
}

impl CatalogRecord {
    pub fn item(unique_id: u64, raw_name: String, search_key: String) -> Self {
        Self {
            id: None,
            unique_id,
            raw_name,
            search_key,
            category: None,
            is_category: false,
            cost_basis: None,
            sale_price: None,
            quantity_on_hand: 0,
            disabled: false,
            archived: false,
            image: None,
        }
    }

    pub fn header(unique_id: u64, raw_name: String, category: String) -> Self {
        Self {
            id: None,
            unique_id,
            search_key: String::new(),
            raw_name,
            category: Some(category),
            is_category: true,
            cost_basis: None,
            sale_price: None,
            quantity_on_hand: 0,
            disabled: false,
            archived: false,
            image: None,
        }
    }
}

/// Counters reported back to the admin after an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportStats {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub categories: usize,
    pub items: usize,
}

/// Which records a catalog view exposes. Disabled items are hidden from
/// non-privileged viewers but retained; archived items are excluded from
/// both views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogView {
    #[default]
    Public,
    Privileged,
}

/// One catalog item enriched with the normalizer's display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogItemView {
    pub id: Option<Uuid>,
    pub unique_id: u64,
    pub raw_name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub search_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_basis: Option<ParsedPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<ParsedPrice>,
    pub quantity_on_hand: u32,
    pub disabled: bool,
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Items of one category, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryGroup {
    pub name: String,
    pub items: Vec<CatalogItemView>,
}
