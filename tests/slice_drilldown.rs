//! Drilldowns replacing a chart with another slice

mod common;

use common::*;
use serde_json::json;

use drillpath::{ChartKey, DrillError, DrillOutcome, Filter, FormData, UrlDrilldown};

fn detail_form() -> FormData {
    form(json!({
        "slice_id": 20,
        "datasource": "7__table",
        "viz_type": "table",
        "metric": "count",
        "filters": [{"col": "channel", "val": "web"}],
        "where": "status = 'paid'",
        "from_dttm": "2019-01-01 00:00:00"
    }))
}

fn harness_with_detail() -> Harness {
    let harness = Harness::new().with_sales();
    harness.backend.add_slice(20, detail_form());
    harness.backend.add_datasource("7__table", datasource(7));
    harness
}

#[tokio::test]
async fn test_slice_replacement() {
    let harness = harness_with_detail();
    let ctx = sales_context();

    let outcome = harness
        .engine
        .to_slice(&ctx, 20, &[Filter::in_values("country", ["France"])])
        .await
        .unwrap();
    assert!(matches!(outcome, DrillOutcome::Replaced { slice_id: 20, .. }));

    assert_eq!(
        harness.backend.requests(),
        vec!["/slice_formdata/20", "/slice_formdata/10", "/datasource/table/7"]
    );

    let events = harness.sink.events();
    assert_eq!(events.len(), 2);
    let SinkEvent::SliceState(previous) = &events[0] else {
        panic!("expected the previous state first");
    };
    assert_eq!(previous.root_slice_id, 10);
    assert!(!previous.from_drilldown);
    assert_eq!(previous.form_data, ctx.form_data);

    let SinkEvent::Replace(replacement) = &events[1] else {
        panic!("expected a replacement");
    };
    assert_eq!(replacement.chart_key, ChartKey::for_slice(10));
    assert_eq!(replacement.slice_id, 20);
    assert_eq!(replacement.datasource.name.as_deref(), Some("table_7"));

    let next = &replacement.form_data;
    assert_eq!(next.metrics, Some(vec![json!("count")]));
    assert_eq!(next.where_clause.as_deref(), Some("amount > 0 and status = 'paid'"));
    assert_eq!(next.since.as_deref(), Some("2024-03-03 12:00:00"));
    assert_eq!(next.until.as_deref(), Some("2024-03-10 12:00:00"));
    let cols: Vec<&str> = next.filters.iter().map(|f| f.col.as_str()).collect();
    assert_eq!(cols, vec!["product", "country", "channel", "order_date", "order_date"]);
    assert_eq!(next.filters[2].val, json!(["web"]));

    assert!(harness.navigator.urls().is_empty());
}

#[tokio::test]
async fn test_stored_bounds_without_dashboard_bounds() {
    let harness = harness_with_detail();
    let mut source = sales_form();
    source.extra_filters.clear();
    source.granularity_sqla = None;
    let mut stored = sales_form();
    stored.from_dttm = Some("2020-06-01 00:00:00".into());
    harness.backend.add_slice(10, stored);

    let ctx = drillpath::SliceContext::new(ChartKey::for_slice(10), source);
    harness.engine.to_slice(&ctx, 20, &[]).await.unwrap();

    let replacement = &harness.sink.replacements()[0];
    assert_eq!(replacement.form_data.from_dttm.as_deref(), Some("2020-06-01 00:00:00"));
    assert_eq!(replacement.form_data.to_dttm, None);
    assert!(replacement.form_data.filters.iter().all(|f| f.col != "order_date"));
}

#[tokio::test]
async fn test_root_slice_and_drilldown_flag() {
    let harness = harness_with_detail();
    let ctx = drillpath::SliceContext::new(ChartKey::new("slice_10_drilldown"), sales_form())
        .with_previous_states(vec![form(json!({"slice_id": 4})), form(json!({"slice_id": 3}))]);

    harness.engine.to_slice(&ctx, 20, &[]).await.unwrap();

    let events = harness.sink.events();
    let SinkEvent::SliceState(previous) = &events[0] else {
        panic!("expected the previous state first");
    };
    assert_eq!(previous.root_slice_id, 3);
    assert!(previous.from_drilldown);
    assert!(harness.sink.replacements()[0].from_drilldown);
}

#[tokio::test]
async fn test_invalid_datasource_reference() {
    let harness = Harness::new().with_sales();
    let mut broken = detail_form();
    broken.datasource = Some("garbage".into());
    harness.backend.add_slice(20, broken);

    let result = harness.engine.to_slice(&sales_context(), 20, &[]).await;
    assert!(matches!(result, Err(DrillError::InvalidDatasource { ref value }) if value == "garbage"));
    assert!(harness.sink.events().is_empty());
    assert_eq!(harness.notifier.errors(), vec!["Invalid datasource reference 'garbage'"]);
}

#[tokio::test]
async fn test_superseded_drilldown_does_not_dispatch() {
    let harness = harness_with_detail();
    let mut other = detail_form();
    other.slice_id = Some(21);
    harness.backend.add_slice(21, other);
    let gate = harness.backend.gate(20);
    let ctx = sales_context();

    let slow = harness.engine.to_slice(&ctx, 20, &[]);
    let fast = async {
        let outcome = harness.engine.to_slice(&ctx, 21, &[]).await;
        gate.notify_one();
        outcome
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.unwrap(), DrillOutcome::Superseded);
    assert!(matches!(fast.unwrap(), DrillOutcome::Replaced { slice_id: 21, .. }));

    let replacements = harness.sink.replacements();
    assert_eq!(replacements.len(), 1);
    assert_eq!(replacements[0].slice_id, 21);
    assert!(harness.notifier.errors().is_empty());
}

#[tokio::test]
async fn test_url_drilldowns() {
    let harness = harness_with_detail();
    let mut source = sales_form();
    source.url_drilldowns = serde_json::from_value(json!([
        {"title": "Details", "field": "country", "type": "slices", "url": 20},
        {"title": "Overview", "field": "country", "type": "dashboards", "url": "sales"},
        {"title": "Broken", "field": "country", "type": "slices", "url": ""},
        {"title": "Other", "field": "city", "type": "slices", "url": 20}
    ]))
    .unwrap();
    let ctx = drillpath::SliceContext::new(ChartKey::for_slice(10), source);

    let entries: Vec<&UrlDrilldown> = harness.engine.url_drilldowns(&ctx, "country");
    let titles: Vec<&str> = entries.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Details", "Overview", "Broken"]);

    let context = [Filter::in_values("country", ["France"])];
    let outcome = harness
        .engine
        .run_url_drilldown(&ctx, entries[0], &context, &[])
        .await
        .unwrap();
    assert!(matches!(outcome, DrillOutcome::Replaced { slice_id: 20, .. }));

    let outcome = harness
        .engine
        .run_url_drilldown(&ctx, entries[1], &context, &[])
        .await
        .unwrap();
    let DrillOutcome::Navigated { url, .. } = outcome else {
        panic!("expected a navigation");
    };
    assert!(url.starts_with("/superset/dashboard/sales/?"));

    let result = harness.engine.run_url_drilldown(&ctx, entries[2], &context, &[]).await;
    assert!(matches!(result, Err(DrillError::InvalidTarget { .. })));
}
