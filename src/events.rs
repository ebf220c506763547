use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

// Events emitted by the catalog and pricing services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog lifecycle
    CatalogImported {
        items: usize,
        categories: usize,
        total_rows: usize,
    },
    CatalogWiped,

    // Per-item admin actions
    ItemDisabled(Uuid),
    ItemEnabled(Uuid),
    ItemArchived(Uuid),
    ItemUnarchived(Uuid),
    ItemDeleted(Uuid),
    ImageAttached {
        item_id: Uuid,
        search_key: String,
    },

    // Pricing
    PriceOverrideSet {
        item_id: Uuid,
    },
    PriceOverrideCleared {
        item_id: Uuid,
    },
    MarkupRulesUpdated {
        rule_count: usize,
    },
    PricesRecomputed {
        updated: usize,
    },

    /// Generic event data
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing the caller if the
    /// processing loop has gone away. Event delivery is advisory; a dropped
    /// event never corrupts catalog state.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

/// Processes incoming events until the channel closes.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::CatalogImported {
                items,
                categories,
                total_rows,
            } => {
                info!(
                    items = items,
                    categories = categories,
                    total_rows = total_rows,
                    "Catalog import completed"
                );
            }
            Event::CatalogWiped => {
                warn!("Catalog wiped");
            }
            Event::PricesRecomputed { updated } => {
                info!(updated = updated, "Sale prices recomputed");
            }
            Event::Generic { message, timestamp } => {
                info!(at = %timestamp, "{}", message);
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    error!("Event channel closed; processing loop exiting");
}
