use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
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

    /// Sends an event, logging instead of failing when the channel is closed or
    /// full. Store writes that already happened must not be reported as failed
    /// because of a notification problem.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event: {}", e);
        }
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),

    // Site events
    SiteCreated(Uuid),
    SiteUpdated(Uuid),
    SiteDeleted(Uuid),

    // Usage ledger events
    UsageBatchRecorded {
        site_id: Uuid,
        events_written: usize,
        total_cost: Decimal,
    },
    LowStockDetected {
        product_id: Uuid,
        stock_quantity: Decimal,
        threshold: Decimal,
    },

    // Generic event data
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Function to process incoming events, logging each one and keeping the
// business counters current.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        info!("Received event: {:?}", event);

        match event {
            Event::UsageBatchRecorded {
                site_id,
                events_written,
                total_cost,
            } => {
                if let Err(e) = handle_usage_batch_recorded(site_id, events_written, total_cost) {
                    error!(
                        "Failed to handle usage batch event: site_id={}, error={}",
                        site_id, e
                    );
                }
            }
            Event::LowStockDetected {
                product_id,
                stock_quantity,
                threshold,
            } => {
                if let Err(e) = handle_low_stock(product_id, stock_quantity, threshold) {
                    error!(
                        "Failed to handle low stock event: product_id={}, error={}",
                        product_id, e
                    );
                }
            }
            Event::ProductCreated(product_id) => {
                info!("Product created: {}", product_id);
                crate::metrics::BUSINESS_METRICS.record_product_created();
            }
            Event::ProductUpdated(product_id) => {
                info!("Product updated: {}", product_id);
            }
            Event::ProductDeleted(product_id) => {
                info!("Product deleted: {}", product_id);
                crate::metrics::BUSINESS_METRICS.record_product_deleted();
            }
            Event::SiteCreated(site_id) => {
                info!("Site created: {}", site_id);
                crate::metrics::BUSINESS_METRICS.record_site_created();
            }
            Event::SiteUpdated(site_id) => {
                info!("Site updated: {}", site_id);
            }
            Event::SiteDeleted(site_id) => {
                info!("Site deleted: {}", site_id);
                crate::metrics::BUSINESS_METRICS.record_site_deleted();
            }
            Event::Generic {
                message,
                timestamp,
                metadata,
            } => {
                info!(
                    "Generic event at {}: {} (metadata: {})",
                    timestamp, message, metadata
                );
            }
        }
    }

    info!("Event processing loop stopped");
}

fn handle_usage_batch_recorded(
    site_id: Uuid,
    events_written: usize,
    total_cost: Decimal,
) -> Result<(), String> {
    info!(
        "Usage batch recorded: site={}, events={}, total_cost={}",
        site_id, events_written, total_cost
    );

    crate::metrics::BUSINESS_METRICS.record_usage_batch(events_written as u64);

    Ok(())
}

fn handle_low_stock(
    product_id: Uuid,
    stock_quantity: Decimal,
    threshold: Decimal,
) -> Result<(), String> {
    warn!(
        "Low stock alert: product {} has {} remaining (threshold {})",
        product_id, stock_quantity, threshold
    );

    crate::metrics::BUSINESS_METRICS.record_low_stock_alert();

    Ok(())
}
