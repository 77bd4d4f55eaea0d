//! Read-only lookups over hierarchy definitions

use super::definition::{HierarchyColumn, HierarchyDefinition};
use crate::slice::{DimensionAttr, FormData};

/// Find the next drillable column after `current`
///
/// Only groupable columns with an order strictly greater than the current
/// column's order qualify; the one with the lowest order wins, ties going to
/// the first in declaration order. Returns `None` at the deepest level.
pub fn next_column<'a>(
    hierarchy: &'a HierarchyDefinition,
    current: &HierarchyColumn,
) -> Option<&'a HierarchyColumn> {
    let mut best: Option<&HierarchyColumn> = None;
    for column in &hierarchy.columns {
        if !column.groupby || column.order <= current.order {
            continue;
        }
        match best {
            Some(b) if b.order <= column.order => {}
            _ => best = Some(column),
        }
    }
    best
}

/// A column a user may drill into from the clicked element
#[derive(Debug, Clone, PartialEq)]
pub struct DrillOption {
    pub column: HierarchyColumn,
    /// Already present in the dimension list; choosing it reverts the drill
    pub active: bool,
    /// Active at the top of the dimension list; the top level can not be reverted
    pub locked: bool,
}

/// Drill options offered by one hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct DrillGroup {
    pub hierarchy_id: i64,
    pub title: String,
    pub options: Vec<DrillOption>,
}

/// Index over the hierarchies available to one chart
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    hierarchies: Vec<HierarchyDefinition>,
}

impl HierarchyIndex {
    pub fn new(hierarchies: Vec<HierarchyDefinition>) -> Self {
        Self { hierarchies }
    }

    pub fn hierarchies(&self) -> &[HierarchyDefinition] {
        &self.hierarchies
    }

    /// Get a hierarchy by id
    pub fn get(&self, id: i64) -> Option<&HierarchyDefinition> {
        self.hierarchies.iter().find(|h| h.id == id)
    }

    /// Hierarchies not switched off for the chart
    pub fn enabled<'a>(
        &'a self,
        disabled: &'a [i64],
    ) -> impl Iterator<Item = &'a HierarchyDefinition> + 'a {
        self.hierarchies.iter().filter(move |h| !disabled.contains(&h.id))
    }

    /// Find the next drillable column after `current` in `hierarchy`
    pub fn next_column<'a>(
        &self,
        hierarchy: &'a HierarchyDefinition,
        current: &HierarchyColumn,
    ) -> Option<&'a HierarchyColumn> {
        next_column(hierarchy, current)
    }

    /// Build the drill menu for a click on `clicked_column`
    ///
    /// With no active dimensions a hierarchy offers the level after its first
    /// column; otherwise it offers the level after each of its columns already
    /// in `active_dimensions`. Only hierarchies containing the clicked column
    /// contribute.
    pub fn drill_options(
        &self,
        active_dimensions: &[String],
        clicked_column: &str,
        disabled: &[i64],
    ) -> Vec<DrillGroup> {
        let mut groups = Vec::new();

        for hierarchy in self.enabled(disabled) {
            if !hierarchy.contains_column(clicked_column) {
                continue;
            }

            let candidates: Vec<&HierarchyColumn> = if active_dimensions.is_empty() {
                hierarchy
                    .first_column()
                    .and_then(|first| next_column(hierarchy, first))
                    .into_iter()
                    .collect()
            } else {
                hierarchy
                    .columns
                    .iter()
                    .filter(|c| active_dimensions.contains(&c.name))
                    .filter_map(|c| next_column(hierarchy, c))
                    .collect()
            };

            let mut options: Vec<DrillOption> = Vec::new();
            for column in candidates {
                if options.iter().any(|o| o.column.id == column.id) {
                    continue;
                }
                let position = active_dimensions.iter().position(|d| d == &column.name);
                options.push(DrillOption {
                    column: column.clone(),
                    active: position.is_some(),
                    locked: position == Some(0),
                });
            }

            if !options.is_empty() {
                groups.push(DrillGroup {
                    hierarchy_id: hierarchy.id,
                    title: hierarchy.label().to_string(),
                    options,
                });
            }
        }

        groups
    }

    /// Check if a chart offers any drilldown at all
    ///
    /// True when the chart has URL drilldowns, or when the first column of an
    /// enabled hierarchy is among its dimensions (`columns` for distribution
    /// bars, `groupby` otherwise).
    pub fn shows_drill_menu(&self, form_data: &FormData) -> bool {
        if !form_data.url_drilldowns.is_empty() {
            return true;
        }
        let attr = if form_data.viz_type.as_deref() == Some("dist_bar") {
            DimensionAttr::Columns
        } else {
            DimensionAttr::Groupby
        };
        let dimensions = form_data.dimension(attr);
        self.enabled(&form_data.disabled_hierarchy)
            .filter_map(|h| h.first_column())
            .any(|first| dimensions.contains(&first.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo() -> HierarchyDefinition {
        HierarchyDefinition {
            id: 1,
            name: "geo".into(),
            verbose_name: Some("Geography".into()),
            table_id: Some(7),
            columns: vec![
                HierarchyColumn::new(11, "country", 10),
                HierarchyColumn::new(12, "city", 20),
                HierarchyColumn::new(13, "district", 30),
            ],
        }
    }

    #[test]
    fn test_next_column_steps_through_orders() {
        let h = geo();
        let next = next_column(&h, &h.columns[1]).unwrap();
        assert_eq!(next.name, "district");
        assert!(next_column(&h, &h.columns[2]).is_none());
    }

    #[test]
    fn test_next_column_skips_non_groupby() {
        let mut h = geo();
        h.columns[1].groupby = false;
        let next = next_column(&h, &h.columns[0]).unwrap();
        assert_eq!(next.name, "district");
    }

    #[test]
    fn test_next_column_does_not_assume_sorted_input() {
        let mut h = geo();
        h.columns.reverse();
        let country = h.get_column("country").unwrap().clone();
        assert_eq!(next_column(&h, &country).unwrap().name, "city");
    }

    #[test]
    fn test_next_column_tie_goes_to_first() {
        let mut h = geo();
        h.columns.push(HierarchyColumn::new(14, "borough", 20));
        let next = next_column(&h, &h.columns[0]).unwrap();
        assert_eq!(next.name, "city");
    }

    #[test]
    fn test_drill_options_without_active_dimensions() {
        let index = HierarchyIndex::new(vec![geo()]);
        let groups = index.drill_options(&[], "country", &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, "Geography");
        assert_eq!(groups[0].options[0].column.name, "city");
        assert!(!groups[0].options[0].active);
    }

    #[test]
    fn test_drill_options_follow_active_dimensions() {
        let index = HierarchyIndex::new(vec![geo()]);
        let dims = vec!["country".to_string(), "city".to_string()];
        let groups = index.drill_options(&dims, "city", &[]);
        let names: Vec<&str> = groups[0].options.iter().map(|o| o.column.name.as_str()).collect();
        assert_eq!(names, vec!["city", "district"]);
        assert!(groups[0].options[0].active);
        assert!(!groups[0].options[0].locked);
    }

    #[test]
    fn test_drill_options_skip_disabled_and_unrelated() {
        let index = HierarchyIndex::new(vec![geo()]);
        assert!(index.drill_options(&[], "country", &[1]).is_empty());
        assert!(index.drill_options(&[], "product", &[]).is_empty());
    }

    #[test]
    fn test_shows_drill_menu() {
        let index = HierarchyIndex::new(vec![geo()]);
        let mut form = FormData::default();
        assert!(!index.shows_drill_menu(&form));

        form.groupby = vec!["country".into()];
        assert!(index.shows_drill_menu(&form));

        form.disabled_hierarchy = vec![1];
        assert!(!index.shows_drill_menu(&form));

        form.viz_type = Some("dist_bar".into());
        form.disabled_hierarchy.clear();
        assert!(!index.shows_drill_menu(&form));
        form.columns = vec!["country".into()];
        assert!(index.shows_drill_menu(&form));
    }
}
