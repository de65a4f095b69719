pub mod dashboard;
pub mod products;
pub mod purchases;
pub mod sites;
pub mod usage;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    products::ProductService, purchases::PurchaseSummaryService, sites::SiteService,
    stats::DashboardService, usage::UsageService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub sites: Arc<SiteService>,
    pub usage: Arc<UsageService>,
    pub purchases: Arc<PurchaseSummaryService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Build the service container shared by every request handler.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            products: Arc::new(ProductService::new(db_pool.clone(), event_sender.clone())),
            sites: Arc::new(SiteService::new(db_pool.clone(), event_sender.clone())),
            usage: Arc::new(UsageService::new(db_pool.clone(), event_sender)),
            purchases: Arc::new(PurchaseSummaryService::new(db_pool.clone())),
            dashboard: Arc::new(DashboardService::new(db_pool)),
        }
    }
}
