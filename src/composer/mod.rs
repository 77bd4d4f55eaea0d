//! Filter composition (verb module): merge, convert, deduplicate

mod compose;
mod convert;
mod where_clause;

pub use compose::{dedup, FilterComposer, DEFAULT_ALL_LABEL};
pub use convert::convert_for_sql;
pub use where_clause::merge_where;
