// Catalog and site management
pub mod products;
pub mod sites;

// Usage recording and reporting
pub mod purchases;
pub mod usage;

// Dashboard statistics
pub mod stats;
