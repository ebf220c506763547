pub mod catalog;
pub mod storage;

pub use catalog::{CatalogService, PricingService};
pub use storage::{CatalogStore, InMemoryCatalogStore};
