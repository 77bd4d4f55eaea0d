//! The drilldown orchestrator

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::cancel::{CancellationRegistry, DrillToken};
use super::collaborators::{
    ChartReplacement, Collaborators, DashboardDefinition, PreviousSliceState,
};
use super::context::SliceContext;
use super::hierarchy::{drill_form_data, HierarchyDrill};
use super::navigation::{DrillOutcome, NavigationState, PreparedSlice};
use crate::composer::{merge_where, FilterComposer};
use crate::config::EngineConfig;
use crate::dates::{format_instant, DateResolver};
use crate::error::{DrillError, DrillResult};
use crate::filter::{
    new_filter_id, Conjunction, Filter, FilterOp, TIME_FROM_COLUMN, TIME_TO_COLUMN,
};
use crate::handoff::{load_record, store_records, DashboardData, PreselectFilters};
use crate::slice::{DrilldownTarget, FormData, UrlDrilldown};

/// A dashboard definition prepared for an inline drilldown panel
#[derive(Debug, Clone, PartialEq)]
pub struct PreseededDashboard {
    pub dashboard: DashboardDefinition,
    pub where_clause: String,
}

/// Computes drilldown filters and carries them to the drill target
///
/// One engine serves any number of charts; invocations on the same chart
/// supersede each other.
pub struct DrilldownEngine {
    collaborators: Collaborators,
    config: EngineConfig,
    dates: DateResolver,
    registry: CancellationRegistry,
}

impl DrilldownEngine {
    pub fn new(collaborators: Collaborators, config: EngineConfig) -> Self {
        Self {
            collaborators,
            config,
            dates: DateResolver::default(),
            registry: CancellationRegistry::new(),
        }
    }

    /// Resolve time bounds against a different clock
    pub fn with_date_resolver(mut self, dates: DateResolver) -> Self {
        self.dates = dates;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A composer converting values by the chart's datasource columns
    pub fn composer(&self, ctx: &SliceContext) -> FilterComposer {
        FilterComposer::new(ctx.columns.clone()).with_all_label(self.config.all_label.clone())
    }

    /// The chart's filters merged with the filters of a click
    pub fn active_filters(&self, ctx: &SliceContext, context: &[Filter]) -> Vec<Filter> {
        self.composer(ctx).compose(&ctx.form_data.active_filters(), context)
    }

    /// Render an instant with the configured pattern
    fn render(&self, instant: &NaiveDateTime) -> String {
        format_instant(instant, &self.config.date_format)
    }

    /// Time bounds of the chart: dashboard `__from`/`__to` filters win over
    /// the bounds stored with the slice
    pub fn time_bounds(&self, form: &FormData, stored: &FormData) -> (Option<String>, Option<String>) {
        let expression = |filter: &Filter| match filter.first_value() {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };

        let from = match form.extra_filter(TIME_FROM_COLUMN) {
            Some(filter) => Some(self.render(&self.dates.resolve(&expression(filter)).instant)),
            None => stored.from_dttm.clone(),
        };
        let to = match form.extra_filter(TIME_TO_COLUMN) {
            Some(filter) => {
                let expression = expression(filter);
                let instant = if expression == "now" {
                    self.dates.now()
                } else {
                    self.dates.resolve(&expression).instant
                };
                Some(self.render(&instant))
            }
            None => stored.to_dttm.clone(),
        };
        (from, to)
    }

    /// Filters restricting the chart's time column to the bounds
    pub fn time_restriction_filters(
        &self,
        form: &FormData,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Vec<Filter> {
        let Some(time_col) = form.granularity_sqla.as_deref().filter(|c| !c.is_empty()) else {
            return Vec::new();
        };
        [(FilterOp::Ge, from), (FilterOp::Le, to)]
            .into_iter()
            .filter_map(|(op, bound)| {
                let bound = bound?;
                Some(Filter {
                    conjunction: Some(Conjunction::And),
                    ..Filter::new(time_col, op, bound)
                })
            })
            .collect()
    }

    /// Fetch a slice's form data and rewrite it for a drilldown
    ///
    /// The result carries `filters` merged with the slice's own filters, the
    /// time restriction and the dashboard filters handed over to this page,
    /// the merged where clause and the time bounds.
    pub async fn prepare_slice(
        &self,
        ctx: &SliceContext,
        target_slice_id: i64,
        filters: Vec<Filter>,
    ) -> DrillResult<PreparedSlice> {
        let backend = &self.collaborators.backend;
        let fetched = backend.slice_form_data(target_slice_id).await?;
        let stored = match ctx.slice_id() {
            Some(current) if current != target_slice_id => backend.slice_form_data(current).await?,
            _ => fetched.clone(),
        };

        let (from, to) = self.time_bounds(&ctx.form_data, &stored);
        let time_filters = self.time_restriction_filters(&ctx.form_data, from.as_deref(), to.as_deref());

        let dashboard: DashboardData = ctx
            .page
            .data_key
            .as_ref()
            .and_then(|key| load_record(self.collaborators.handoff.as_ref(), key))
            .unwrap_or_default();

        let all: Vec<Filter> = filters
            .into_iter()
            .chain(fetched.filters.iter().cloned())
            .chain(time_filters)
            .chain(dashboard.filters)
            .filter(Filter::is_meaningful)
            .collect();
        let filters = self.composer(ctx).compose(&all, &[]);
        let where_clause = merge_where([
            ctx.form_data.where_clause.as_deref(),
            fetched.where_clause.as_deref(),
        ]);

        debug!(
            "engine: prepared slice {} with {} filters",
            target_slice_id,
            filters.len()
        );

        let mut form_data = fetched;
        form_data.filters = filters.clone();
        form_data.where_clause = Some(where_clause.clone());
        if form_data.metrics.is_none() {
            form_data.metrics = form_data.metric.clone().map(|m| vec![m]);
        }
        form_data.from_dttm = from.clone();
        form_data.to_dttm = to.clone();
        form_data.since = from.clone();
        form_data.until = to.clone();

        Ok(PreparedSlice {
            form_data,
            state: NavigationState {
                filters,
                where_clause,
                from,
                to,
            },
        })
    }

    /// Navigate to a dashboard, carrying the click's filters
    pub async fn to_dashboard(
        &self,
        ctx: &SliceContext,
        dashboard_id: &str,
        context: &[Filter],
    ) -> DrillResult<DrillOutcome> {
        let filters = self.active_filters(ctx, context);
        self.dashboard_with(ctx, dashboard_id, filters).await
    }

    /// Replace the chart with another slice, carrying the click's filters
    pub async fn to_slice(
        &self,
        ctx: &SliceContext,
        slice_id: i64,
        context: &[Filter],
    ) -> DrillResult<DrillOutcome> {
        let filters = self.active_filters(ctx, context);
        self.slice_with(ctx, slice_id, filters).await
    }

    /// Drill one hierarchy level down, or revert a level
    pub async fn to_hierarchy_level(
        &self,
        ctx: &SliceContext,
        request: HierarchyDrill,
    ) -> DrillResult<DrillOutcome> {
        let token = self.registry.issue(&ctx.chart_key);
        let result = self.hierarchy_inner(ctx, &request, &token).await;
        self.finish("hierarchy", &token, result)
    }

    /// URL drilldowns configured for a clicked column or metric
    pub fn url_drilldowns<'a>(&self, ctx: &'a SliceContext, field: &str) -> Vec<&'a UrlDrilldown> {
        ctx.form_data
            .url_drilldowns
            .iter()
            .filter(|d| d.field == field)
            .collect()
    }

    /// Follow a URL drilldown
    pub async fn run_url_drilldown(
        &self,
        ctx: &SliceContext,
        drilldown: &UrlDrilldown,
        context: &[Filter],
        period_filters: &[Filter],
    ) -> DrillResult<DrillOutcome> {
        let mut filters = self.active_filters(ctx, context);
        filters.extend(period_filters.iter().cloned());

        match drilldown.target {
            DrilldownTarget::Dashboards => match drilldown.target_id() {
                Some(id) => self.dashboard_with(ctx, &id, filters).await,
                None => Err(self.report(invalid_target(drilldown))),
            },
            DrilldownTarget::Slices => match drilldown.target_slice_id() {
                Some(id) => self.slice_with(ctx, id, filters).await,
                None => Err(self.report(invalid_target(drilldown))),
            },
        }
    }

    /// Load a dashboard definition with the click's filters preselected on
    /// its first chart
    pub async fn preseed_dashboard(
        &self,
        ctx: &SliceContext,
        dashboard_id: &str,
        context: &[Filter],
    ) -> DrillResult<PreseededDashboard> {
        let mut dashboard = match self.collaborators.backend.dashboard(dashboard_id).await {
            Ok(dashboard) => dashboard,
            Err(err) => return Err(self.report(err)),
        };

        let form = &ctx.form_data;
        let (from, to) = self.time_bounds(form, form);
        let mut filters: Vec<Filter> = context
            .iter()
            .map(|f| {
                let val = match &f.val {
                    Value::Array(_) => f.val.clone(),
                    scalar => Value::Array(vec![scalar.clone()]),
                };
                Filter {
                    op: Some(FilterOp::In),
                    val,
                    ..f.clone()
                }
            })
            .collect();
        filters.extend(self.time_restriction_filters(form, from.as_deref(), to.as_deref()));
        filters.extend(form.filters.iter().cloned());

        if let Some(first) = dashboard.slices.first() {
            dashboard.filters.insert(first.slice_id.to_string(), filters);
        }

        info!("engine: preseeded dashboard {}", dashboard_id);
        Ok(PreseededDashboard {
            dashboard,
            where_clause: merge_where([form.where_clause.as_deref()]),
        })
    }

    async fn dashboard_with(
        &self,
        ctx: &SliceContext,
        dashboard_id: &str,
        filters: Vec<Filter>,
    ) -> DrillResult<DrillOutcome> {
        let token = self.registry.issue(&ctx.chart_key);
        let result = self.dashboard_inner(ctx, dashboard_id, filters, &token).await;
        self.finish("dashboard", &token, result)
    }

    async fn dashboard_inner(
        &self,
        ctx: &SliceContext,
        dashboard_id: &str,
        filters: Vec<Filter>,
        token: &DrillToken,
    ) -> DrillResult<DrillOutcome> {
        let slice_id = ctx.slice_id().ok_or_else(|| missing_slice(ctx))?;
        let prepared = self.prepare_slice(ctx, slice_id, filters).await?;
        if !self.registry.is_current(token) {
            return Ok(DrillOutcome::Superseded);
        }

        let hid = ctx.page.hid.clone().unwrap_or_else(new_filter_id);
        let hid_index = ctx.page.hid_index.unwrap_or(0);
        let state = prepared.state;

        let handoff = self.collaborators.handoff.as_ref();
        let preselect = PreselectFilters::from([(slice_id.to_string(), state.filters.clone())]);
        let data = DashboardData {
            extra_where: state.where_clause.clone(),
            filters: state.filters.clone(),
        };
        let (preselect_key, data_key) = store_records(handoff, &preselect, &data)?;

        self.collaborators
            .sink
            .save_dashboard_state(&hid, hid_index)
            .await;

        let url = format!(
            "{}/dashboard/{}/?preselect_filters_key={}&hid={}&hid_index={}&data_key={}",
            self.config.base(),
            dashboard_id,
            preselect_key,
            hid,
            hid_index + 1,
            data_key
        );
        self.collaborators.navigator.navigate(&url).await;
        info!("engine: {} drilled to {}", ctx.chart_key, url);

        Ok(DrillOutcome::Navigated {
            url,
            preselect_key,
            data_key,
            state,
        })
    }

    async fn slice_with(
        &self,
        ctx: &SliceContext,
        slice_id: i64,
        filters: Vec<Filter>,
    ) -> DrillResult<DrillOutcome> {
        let token = self.registry.issue(&ctx.chart_key);
        let result = self.slice_inner(ctx, slice_id, filters, &token).await;
        self.finish("slice", &token, result)
    }

    async fn slice_inner(
        &self,
        ctx: &SliceContext,
        slice_id: i64,
        filters: Vec<Filter>,
        token: &DrillToken,
    ) -> DrillResult<DrillOutcome> {
        let root_slice_id = ctx.root_slice_id().ok_or_else(|| missing_slice(ctx))?;
        let prepared = self.prepare_slice(ctx, slice_id, filters).await?;
        let datasource_ref = prepared.form_data.datasource_ref()?;
        let datasource = self.collaborators.backend.datasource(&datasource_ref).await?;
        if !self.registry.is_current(token) {
            return Ok(DrillOutcome::Superseded);
        }

        let from_drilldown = ctx.chart_key.is_drilldown();
        self.replace(
            PreviousSliceState {
                root_slice_id,
                drilled_value: None,
                from_drilldown,
                form_data: ctx.form_data.clone(),
            },
            ChartReplacement {
                chart_key: ctx.chart_key.clone(),
                slice_id,
                form_data: prepared.form_data,
                datasource,
                from_drilldown,
            },
        )
        .await;
        info!("engine: {} drilled to slice {}", ctx.chart_key, slice_id);

        Ok(DrillOutcome::Replaced {
            chart_key: ctx.chart_key.clone(),
            slice_id,
            state: prepared.state,
        })
    }

    async fn hierarchy_inner(
        &self,
        ctx: &SliceContext,
        request: &HierarchyDrill,
        token: &DrillToken,
    ) -> DrillResult<DrillOutcome> {
        let key_slice_id = ctx.chart_key.slice_id().ok_or_else(|| missing_slice(ctx))?;
        let slice_id = ctx.slice_id().ok_or_else(|| missing_slice(ctx))?;

        let form_data = drill_form_data(&ctx.form_data, request, &self.composer(ctx));
        let datasource_ref = form_data.datasource_ref()?;
        let datasource = self.collaborators.backend.datasource(&datasource_ref).await?;
        if !self.registry.is_current(token) {
            return Ok(DrillOutcome::Superseded);
        }

        let state = NavigationState {
            filters: form_data.filters.clone(),
            where_clause: form_data.where_clause.clone().unwrap_or_default(),
            from: form_data.from_dttm.clone(),
            to: form_data.to_dttm.clone(),
        };
        let from_drilldown = ctx.chart_key.is_drilldown();
        self.replace(
            PreviousSliceState {
                root_slice_id: key_slice_id,
                drilled_value: Some(request.column.name.clone()),
                from_drilldown,
                form_data: ctx.form_data.clone(),
            },
            ChartReplacement {
                chart_key: ctx.chart_key.clone(),
                slice_id,
                form_data,
                datasource,
                from_drilldown,
            },
        )
        .await;
        info!(
            "engine: {} {} level {}",
            ctx.chart_key,
            if request.toggle_off { "reverted" } else { "drilled to" },
            request.column.name
        );

        Ok(DrillOutcome::Replaced {
            chart_key: ctx.chart_key.clone(),
            slice_id,
            state,
        })
    }

    async fn replace(&self, previous: PreviousSliceState, replacement: ChartReplacement) {
        let sink = &self.collaborators.sink;
        sink.save_slice_state(previous).await;
        sink.replace_chart(replacement).await;
    }

    /// Report a failure, unless a newer invocation made it irrelevant
    fn finish(
        &self,
        mode: &str,
        token: &DrillToken,
        result: DrillResult<DrillOutcome>,
    ) -> DrillResult<DrillOutcome> {
        match result {
            Ok(DrillOutcome::Superseded) => {
                debug!("engine: {} drilldown on {} superseded", mode, token.chart_key());
                Ok(DrillOutcome::Superseded)
            }
            Err(_) if !self.registry.is_current(token) => {
                debug!("engine: {} drilldown on {} superseded", mode, token.chart_key());
                Ok(DrillOutcome::Superseded)
            }
            Err(err) => {
                warn!("engine: {} drilldown on {} aborted: {}", mode, token.chart_key(), err);
                Err(self.report(err))
            }
            ok => ok,
        }
    }

    fn report(&self, err: DrillError) -> DrillError {
        self.collaborators.notifier.notify_error(&err);
        err
    }
}

fn missing_slice(ctx: &SliceContext) -> DrillError {
    DrillError::MissingSlice {
        chart_key: ctx.chart_key.to_string(),
    }
}

fn invalid_target(drilldown: &UrlDrilldown) -> DrillError {
    DrillError::InvalidTarget {
        value: drilldown.url.to_string(),
    }
}

impl std::fmt::Debug for DrilldownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrilldownEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
