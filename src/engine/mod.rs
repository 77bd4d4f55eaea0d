//! Drilldown orchestration (verb module)
//!
//! The engine reads a [`SliceContext`], computes the filters of the drill
//! target and hands them over through the [`Collaborators`]:
//!
//! - dashboards: handoff records plus a full navigation
//! - slices and hierarchy levels: an in-place chart replacement

mod cancel;
mod collaborators;
mod context;
mod drill;
mod hierarchy;
mod navigation;

pub use cancel::{CancellationRegistry, DrillToken};
pub use collaborators::{
    ChartReplacement, ChartStateSink, Collaborators, DashboardDefinition, DashboardSlice,
    Navigator, Notifier, PreviousSliceState, SliceBackend,
};
pub use context::{PageContext, SliceContext};
pub use drill::{DrilldownEngine, PreseededDashboard};
pub use hierarchy::{apply_graph_role, drill_form_data, insert_dimension, HierarchyDrill};
pub use navigation::{DrillOutcome, NavigationState, PreparedSlice};
