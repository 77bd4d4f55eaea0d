//! Form data rewriting for hierarchy drilldowns

use crate::composer::FilterComposer;
use crate::context::{ClickPayload, GraphRole, VizKind};
use crate::filter::Filter;
use crate::hierarchy::HierarchyColumn;
use crate::slice::{DimensionAttr, FormData};

/// A request to drill one hierarchy level down, or to revert that level
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyDrill {
    pub column: HierarchyColumn,
    pub context_filters: Vec<Filter>,
    pub toggle_off: bool,
    pub attr: DimensionAttr,
    /// All columns of the column's hierarchy, to place the new level
    pub siblings: Option<Vec<HierarchyColumn>>,
    /// Filters pinning the clicked x-axis period
    pub period_filters: Vec<Filter>,
    /// Role of the clicked node, on graph charts
    pub graph_role: Option<GraphRole>,
}

impl HierarchyDrill {
    pub fn new(column: HierarchyColumn, context_filters: Vec<Filter>) -> Self {
        Self {
            column,
            context_filters,
            toggle_off: false,
            attr: DimensionAttr::Groupby,
            siblings: None,
            period_filters: Vec::new(),
            graph_role: None,
        }
    }

    /// Drill from a click on the chart described by `form`
    ///
    /// Context and period filters come from the extractor of the chart's
    /// `viz_type`; a click on a graph node also sets its role.
    pub fn from_click(column: HierarchyColumn, click: &ClickPayload, form: &FormData) -> Self {
        let extractor = form
            .viz_type
            .as_deref()
            .and_then(VizKind::from_viz_type)
            .unwrap_or(VizKind::BigNumber)
            .extractor();
        Self {
            context_filters: extractor.extract(click, form),
            period_filters: extractor.period_filters(click, form),
            graph_role: GraphRole::of_click(click),
            ..Self::new(column, Vec::new())
        }
    }

    /// Revert the level instead of drilling into it
    pub fn toggle_off(mut self) -> Self {
        self.toggle_off = true;
        self
    }

    pub fn with_attr(mut self, attr: DimensionAttr) -> Self {
        self.attr = attr;
        self
    }

    pub fn with_siblings(mut self, siblings: Vec<HierarchyColumn>) -> Self {
        self.siblings = Some(siblings);
        self
    }

    pub fn with_period_filters(mut self, period_filters: Vec<Filter>) -> Self {
        self.period_filters = period_filters;
        self
    }

    pub fn with_graph_role(mut self, graph_role: GraphRole) -> Self {
        self.graph_role = Some(graph_role);
        self
    }
}

/// Insert `column` after the last dimension that is a sibling with an order
/// not above the column's; append when there is no such sibling
pub fn insert_dimension(
    dimensions: &[String],
    column: &HierarchyColumn,
    siblings: Option<&[HierarchyColumn]>,
) -> Vec<String> {
    let position = siblings.and_then(|siblings| {
        dimensions.iter().rposition(|dimension| {
            siblings
                .iter()
                .any(|s| &s.name == dimension && s.order <= column.order)
        })
    });
    let at = match position {
        Some(index) => index + 1,
        None => dimensions.len(),
    };
    let mut out = dimensions.to_vec();
    out.insert(at, column.name.clone());
    unique(out)
}

/// Drop repeated names, keeping the first of each
fn unique(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// Rewrite the endpoints of a graph after a new level was added
///
/// `original` is the graph's `[source, target]` group-by before the drill,
/// `drilled` the group-by after it.
pub fn apply_graph_role(
    original: &[String],
    drilled: &[String],
    role: Option<GraphRole>,
    siblings: &[HierarchyColumn],
) -> Vec<String> {
    let (Some(source), Some(target)) = (original.first(), original.get(1)) else {
        return drilled.to_vec();
    };
    let Some(new_col) = drilled.iter().find(|c| !original.contains(c)) else {
        return drilled.to_vec();
    };
    match role {
        Some(GraphRole::Common) => [source, target]
            .into_iter()
            .map(|endpoint| {
                if siblings.iter().any(|s| &s.name == endpoint) {
                    new_col.clone()
                } else {
                    endpoint.clone()
                }
            })
            .collect(),
        Some(GraphRole::Target) => vec![source.clone(), new_col.clone()],
        _ => vec![new_col.clone(), target.clone()],
    }
}

/// Compute the form data a hierarchy drill replaces the chart with
pub fn drill_form_data(form: &FormData, request: &HierarchyDrill, composer: &FilterComposer) -> FormData {
    let column = &request.column;
    let context: Vec<Filter> = if request.toggle_off {
        request
            .context_filters
            .iter()
            .filter(|f| f.hierarchy_column.as_ref().map(|h| h.id) != Some(column.id))
            .cloned()
            .collect()
    } else {
        request
            .context_filters
            .iter()
            .map(|f| Filter {
                hierarchy_column: Some(column.clone()),
                ..f.clone()
            })
            .collect()
    };

    let current = form.dimension(request.attr);
    let dimensions = if request.toggle_off {
        current.iter().filter(|c| **c != column.name).cloned().collect()
    } else {
        insert_dimension(current, column, request.siblings.as_deref())
    };

    let mut next = form.clone();
    next.set_dimension(request.attr, dimensions);

    let existing: Vec<Filter> = form
        .filters
        .iter()
        .chain(request.period_filters.iter())
        .cloned()
        .collect();
    next.filters = composer.compose(&existing, &context);
    if request.toggle_off {
        next.filters
            .retain(|f| f.drill_down_col.as_deref() != Some(column.name.as_str()));
    }

    if next.viz_type.as_deref() == Some("directed_force") && next.groupby.len() > 2 {
        next.groupby = apply_graph_role(
            &form.groupby,
            &next.groupby,
            request.graph_role,
            request.siblings.as_deref().unwrap_or_default(),
        );
    }

    next
}
