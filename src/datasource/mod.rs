//! Datasource metadata (noun module)

mod meta;
mod types;

pub use meta::{DatasourceColumn, DatasourceMeta, DatasourceRef, ParseDatasourceRefError};
pub use types::ColumnType;
