//! Hierarchy drilldowns: level insertion, reverting, graph endpoints

mod common;

use common::*;
use serde_json::json;

use drillpath::{
    ChartKey, DrillOutcome, Filter, FormData, GraphRole, HierarchyColumn, HierarchyDrill,
    SliceContext,
};

fn geo_columns() -> Vec<HierarchyColumn> {
    load_hierarchies("hierarchies.json").get(1).unwrap().columns.clone()
}

fn column(name: &str) -> HierarchyColumn {
    geo_columns().into_iter().find(|c| c.name == name).unwrap()
}

async fn drill(harness: &Harness, ctx: &SliceContext, request: HierarchyDrill) -> FormData {
    let outcome = harness.engine.to_hierarchy_level(ctx, request).await.unwrap();
    assert!(matches!(outcome, DrillOutcome::Replaced { slice_id: 10, .. }));
    harness.sink.replacements().last().unwrap().form_data.clone()
}

#[tokio::test]
async fn test_drill_inserts_level_and_tags_filters() {
    let harness = Harness::new().with_sales();
    let ctx = sales_context();
    let request = HierarchyDrill::new(column("city"), vec![Filter::in_values("country", ["France"])])
        .with_siblings(geo_columns());

    let next = drill(&harness, &ctx, request).await;
    assert_eq!(next.groupby, vec!["country", "city"]);
    let country = next.filters.iter().find(|f| f.col == "country").unwrap();
    assert_eq!(country.hierarchy_column.as_ref().map(|c| c.id), Some(12));
    assert_eq!(harness.backend.requests(), vec!["/datasource/table/3"]);

    let events = harness.sink.events();
    let SinkEvent::SliceState(previous) = &events[0] else {
        panic!("expected the previous state first");
    };
    assert_eq!(previous.root_slice_id, 10);
    assert_eq!(previous.drilled_value.as_deref(), Some("city"));
}

#[tokio::test]
async fn test_insertion_order_regardless_of_call_order() {
    let harness = Harness::new().with_sales();
    let ctx = sales_context();

    let after_district = drill(
        &harness,
        &ctx,
        HierarchyDrill::new(column("district"), Vec::new()).with_siblings(geo_columns()),
    )
    .await;
    assert_eq!(after_district.groupby, vec!["country", "district"]);

    let ctx = SliceContext::new(ChartKey::for_slice(10), after_district);
    let after_city = drill(
        &harness,
        &ctx,
        HierarchyDrill::new(column("city"), Vec::new()).with_siblings(geo_columns()),
    )
    .await;
    assert_eq!(after_city.groupby, vec!["country", "city", "district"]);
}

#[tokio::test]
async fn test_toggle_off_reverts_level() {
    let harness = Harness::new().with_sales();
    let mut drilled = sales_form();
    drilled.groupby = vec!["country".into(), "city".into()];
    drilled.filters.push(Filter {
        drill_down_col: Some("city".into()),
        ..Filter::in_values("country", ["France"])
    });
    let ctx = SliceContext::new(ChartKey::for_slice(10), drilled);

    let tagged = Filter {
        hierarchy_column: Some(column("city")),
        ..Filter::in_values("country", ["Spain"])
    };
    let untagged = Filter::in_values("segment", ["retail"]);
    let request = HierarchyDrill::new(column("city"), vec![tagged, untagged]).toggle_off();

    let next = drill(&harness, &ctx, request).await;
    assert_eq!(next.groupby, vec!["country"]);
    let cols: Vec<&str> = next.filters.iter().map(|f| f.col.as_str()).collect();
    assert_eq!(cols, vec!["product", "segment"]);
}

#[tokio::test]
async fn test_graph_endpoints_follow_node_role() {
    let graph = form(json!({
        "slice_id": 10,
        "datasource": "3__table",
        "viz_type": "directed_force",
        "groupby": ["country", "product"]
    }));
    let cases = [
        (GraphRole::Common, vec!["city", "product"]),
        (GraphRole::Target, vec!["country", "city"]),
        (GraphRole::Source, vec!["city", "product"]),
    ];
    for (role, expected) in cases {
        let harness = Harness::new().with_sales();
        let ctx = SliceContext::new(ChartKey::for_slice(10), graph.clone());
        let request = HierarchyDrill::new(column("city"), Vec::new())
            .with_siblings(geo_columns())
            .with_graph_role(role);
        let next = drill(&harness, &ctx, request).await;
        assert_eq!(next.groupby, expected, "role {:?}", role);
    }
}

#[tokio::test]
async fn test_missing_datasource_aborts() {
    let harness = Harness::new();
    let request = HierarchyDrill::new(column("city"), Vec::new());
    let result = harness.engine.to_hierarchy_level(&sales_context(), request).await;
    assert!(result.is_err());
    assert!(harness.sink.events().is_empty());
    assert_eq!(harness.notifier.errors().len(), 1);
}

#[test]
fn test_drill_menu_from_fixture() {
    let index = load_hierarchies("hierarchies.json");
    let groups = index.drill_options(&["country".to_string()], "country", &[]);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].title, "Geography");
    assert_eq!(groups[0].options[0].column.name, "city");

    assert!(index.shows_drill_menu(&sales_form()));
    let mut disabled = sales_form();
    disabled.disabled_hierarchy = vec![1];
    assert!(!index.shows_drill_menu(&disabled));
}
