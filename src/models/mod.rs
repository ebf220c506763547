pub mod catalog;
pub mod pricing;

pub use catalog::{
    CatalogItemView, CatalogRecord, CatalogView, CategoryGroup, ImportStats, ParsedPrice,
    UNCATEGORIZED,
};
pub use pricing::MarkupRule;
