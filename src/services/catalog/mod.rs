//! Catalog pipeline: ingestion, normalization, assembly, pricing.
//!
//! Two distinct suffix-strip mechanisms operate on names, on purpose. The
//! parser's `clean_item_name` cuts lot-size noise (and everything after the
//! first hyphen) to derive the search key used for image correlation; the
//! normalizer's token scan later extracts size and gender for display. They
//! run at different stages on different inputs and are not interchangeable.

pub mod catalog_service;
pub mod ingest;
pub mod normalize;
pub mod pricing;

pub use catalog_service::CatalogService;
pub use pricing::PricingService;
