use std::collections::HashMap;
use std::sync::Mutex;

use crate::slice::ChartKey;

/// Ticket of one drilldown invocation on one chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillToken {
    chart_key: ChartKey,
    generation: u64,
}

impl DrillToken {
    pub fn chart_key(&self) -> &ChartKey {
        &self.chart_key
    }
}

/// Tracks the latest drilldown invocation per chart
///
/// Issuing a token for a chart invalidates every earlier token of that chart.
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    generations: Mutex<HashMap<ChartKey, u64>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, chart_key: &ChartKey) -> DrillToken {
        let mut generations = self.generations.lock().unwrap_or_else(|e| e.into_inner());
        let generation = generations.entry(chart_key.clone()).or_insert(0);
        *generation += 1;
        DrillToken {
            chart_key: chart_key.clone(),
            generation: *generation,
        }
    }

    /// Check if no newer token was issued for the token's chart
    pub fn is_current(&self, token: &DrillToken) -> bool {
        let generations = self.generations.lock().unwrap_or_else(|e| e.into_inner());
        generations.get(&token.chart_key) == Some(&token.generation)
    }
}
