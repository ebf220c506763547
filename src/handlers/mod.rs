use std::sync::Arc;

use crate::services::catalog::{CatalogService, PricingService};

pub mod catalog;
pub mod common;
pub mod pricing;

/// Service container handed to every handler through `AppState`.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub pricing: Arc<PricingService>,
}
