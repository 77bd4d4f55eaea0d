//! drillpath - Drill-down filter resolution and navigation
//!
//! This library provides:
//! - Filter types shared by charts, dashboards and drilldowns
//! - Relative date resolution for dashboard time bounds
//! - Hierarchy lookups (next drill level, drill menus)
//! - Filter composition with column-type-aware value conversion
//! - An expiring handoff store for state crossing a page navigation
//! - Click-to-filter extraction per visualization kind
//! - The drilldown engine: to dashboards, to slices, to hierarchy levels
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `filter/` - Filter, FilterOp, Conjunction
//! - `hierarchy/` - HierarchyDefinition, HierarchyColumn, HierarchyIndex
//! - `datasource/` - ColumnType, DatasourceMeta, DatasourceRef
//! - `slice/` - FormData, ChartKey, UrlDrilldown
//! - `config` - EngineConfig
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML/JSON → EngineConfig, HierarchyIndex
//! - `dates/` - date expression → instant → text
//! - `composer/` - existing + context filters → merged filters
//! - `context/` - click payload → context filters
//! - `handoff/` - navigation state → keyed records → navigation state
//! - `engine/` - click + target → navigation or chart replacement
//!
//! # Example
//!
//! ```ignore
//! use drillpath::{parser, DrilldownEngine, SliceContext, VizKind};
//!
//! let config = parser::parse_config_file("drillpath.yaml")?;
//! let engine = DrilldownEngine::new(collaborators, config);
//! let ctx = SliceContext::new(chart_key, form_data).with_columns(columns);
//! let context = VizKind::Table.extractor().extract(&click, &ctx.form_data);
//! let outcome = engine.to_dashboard(&ctx, "12", &context).await?;
//! ```

pub mod composer;
pub mod config;
pub mod context;
pub mod datasource;
pub mod dates;
pub mod engine;
pub mod error;
pub mod filter;
pub mod handoff;
pub mod hierarchy;
pub mod parser;
pub mod slice;

mod de;

// Re-export commonly used types
pub use composer::{dedup, merge_where, FilterComposer};
pub use config::EngineConfig;
pub use context::{ClickPayload, ContextExtractor, GraphRole, VizKind};
pub use datasource::{ColumnType, DatasourceColumn, DatasourceMeta, DatasourceRef};
pub use dates::{format_instant, Clock, DateResolver, ManualClock, Resolution, ResolvedInstant, SystemClock};
pub use engine::{
    ChartStateSink, Collaborators, DrillOutcome, DrilldownEngine, HierarchyDrill, NavigationState,
    Navigator, Notifier, PageContext, SliceBackend, SliceContext,
};
pub use error::{DrillError, DrillResult, ParseError};
pub use filter::{Conjunction, Filter, FilterOp};
pub use handoff::{HandoffKey, HandoffStore, MemoryHandoffStore, ReadPolicy};
pub use hierarchy::{next_column, HierarchyColumn, HierarchyDefinition, HierarchyIndex};
pub use slice::{ChartKey, DimensionAttr, FormData, UrlDrilldown};
