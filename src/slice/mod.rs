//! Chart-side types (noun module): form data, chart keys, URL drilldowns

mod chart_key;
mod drilldown;
mod form_data;

pub use chart_key::ChartKey;
pub use drilldown::{DrilldownTarget, UrlDrilldown};
pub use form_data::{DimensionAttr, FormData};
