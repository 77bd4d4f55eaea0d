//! Time bounds: clocks, date expressions, rendering

mod clock;
mod format;
mod resolve;

pub use clock::{Clock, ManualClock, SystemClock};
pub use format::{format_instant, is_valid_format, DEFAULT_DATE_FORMAT};
pub use resolve::{resolve_at, DateResolver, Resolution, ResolvedInstant};
