pub mod product;
pub mod site;
pub mod usage_event;
