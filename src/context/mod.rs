//! Context extraction (verb module): from a click to the filters it implies

mod extract;
mod graph;
mod payload;
mod period;

pub use extract::{
    ContextExtractor, GraphExtractor, MapExtractor, NoContext, PieExtractor, PivotExtractor,
    SeriesExtractor, TableExtractor, VizKind,
};
pub use graph::GraphRole;
pub use payload::{ClickPayload, GraphEdge, MarkerDimension, PivotSegment, RowCell};
