//! Filter model (noun module)
//!
//! The filter shape exchanged with charts, dashboards and the handoff store,
//! and the content-equality rule used for deduplication.

mod model;
mod types;

pub use model::{new_filter_id, Filter, TIME_FROM_COLUMN, TIME_TO_COLUMN};
pub use types::{Conjunction, FilterOp};
