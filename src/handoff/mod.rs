//! Handoff of drilldown state across a full page navigation

mod records;
mod store;

pub use records::{load_record, store_record, store_records, DashboardData, PreselectFilters};
pub use store::{HandoffKey, HandoffStore, MemoryHandoffStore, ReadPolicy};
