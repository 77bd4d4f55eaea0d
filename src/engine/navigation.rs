use serde::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::handoff::HandoffKey;
use crate::slice::{ChartKey, FormData};

/// Filters, where clause and time bounds computed for one navigation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    pub filters: Vec<Filter>,
    #[serde(rename = "where")]
    pub where_clause: String,
    /// Rendered lower time bound
    pub from: Option<String>,
    /// Rendered upper time bound
    pub to: Option<String>,
}

/// Target form data together with the state it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSlice {
    pub form_data: FormData,
    pub state: NavigationState,
}

/// How a drilldown ended
#[derive(Debug, Clone, PartialEq)]
pub enum DrillOutcome {
    /// The page was sent to another dashboard
    Navigated {
        url: String,
        preselect_key: HandoffKey,
        data_key: HandoffKey,
        state: NavigationState,
    },
    /// A chart was replaced in place
    Replaced {
        chart_key: ChartKey,
        slice_id: i64,
        state: NavigationState,
    },
    /// A newer drilldown on the same chart took over; nothing was done
    Superseded,
}

impl DrillOutcome {
    pub fn is_superseded(&self) -> bool {
        matches!(self, DrillOutcome::Superseded)
    }

    pub fn state(&self) -> Option<&NavigationState> {
        match self {
            DrillOutcome::Navigated { state, .. } | DrillOutcome::Replaced { state, .. } => Some(state),
            DrillOutcome::Superseded => None,
        }
    }
}
