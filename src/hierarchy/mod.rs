//! Hierarchies (noun module) and the next-level lookup over them

mod definition;
mod index;

pub use definition::{HierarchyColumn, HierarchyDefinition};
pub use index::{next_column, DrillGroup, DrillOption, HierarchyIndex};
