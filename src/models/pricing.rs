use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A markup percentage scoped to one category, or store-wide when
/// `category` is `None`. A category-specific rule always beats the
/// store-wide default for items in that category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MarkupRule {
    pub category: Option<String>,
    pub markup_percentage: Decimal,
    /// When several rules exist for the same category (seeded out-of-band),
    /// the most recently updated one wins.
    pub updated_at: DateTime<Utc>,
}

impl MarkupRule {
    pub fn new(category: Option<String>, markup_percentage: Decimal) -> Self {
        Self {
            category,
            markup_percentage,
            updated_at: Utc::now(),
        }
    }
}
