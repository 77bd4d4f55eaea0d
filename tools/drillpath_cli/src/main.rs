use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};

use drillpath::{
    format_instant, parser, DatasourceColumn, DateResolver, DimensionAttr, EngineConfig, Filter,
    FilterComposer, FormData,
};

#[derive(Parser)]
#[command(name = "drillpath")]
#[command(about = "Inspect drilldown filters, time bounds and hierarchy levels")]
#[command(version)]
struct Args {
    /// Engine settings (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a date expression such as "3 days ago"
    ResolveDate {
        expression: String,

        /// strftime pattern, overriding the configured one
        #[arg(long)]
        format: Option<String>,
    },
    /// Show the level after a column of a hierarchy
    NextColumn {
        /// Hierarchy payload (JSON)
        #[arg(long)]
        hierarchies: PathBuf,

        #[arg(long)]
        hierarchy: i64,

        /// Current column name
        #[arg(long)]
        column: String,
    },
    /// Show the drill menu of a chart for a clicked column
    DrillMenu {
        /// Hierarchy payload (JSON)
        #[arg(long)]
        hierarchies: PathBuf,

        /// Chart form data (JSON)
        #[arg(long)]
        form: PathBuf,

        /// Clicked column name
        #[arg(long)]
        column: String,
    },
    /// Merge existing filters with context filters
    Compose {
        /// Existing filters (JSON list)
        #[arg(long)]
        existing: PathBuf,

        /// Context filters (JSON list)
        #[arg(long)]
        context: PathBuf,

        /// Datasource columns for value conversion (JSON list)
        #[arg(long)]
        columns: Option<PathBuf>,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(parser::parse_config_file(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let output = match args.command {
        Commands::ResolveDate { expression, format } => {
            let resolved = DateResolver::default().resolve(&expression);
            let pattern = format.unwrap_or_else(|| config.date_format.clone());
            json!({
                "instant": format_instant(&resolved.instant, &pattern),
                "resolution": format!("{:?}", resolved.resolution),
            })
        }
        Commands::NextColumn {
            hierarchies,
            hierarchy,
            column,
        } => {
            let index = parser::parse_hierarchies_file(&hierarchies)?;
            let definition = index
                .get(hierarchy)
                .ok_or_else(|| anyhow!("Hierarchy {} not found", hierarchy))?;
            let current = definition
                .get_column(&column)
                .ok_or_else(|| anyhow!("Column '{}' not in hierarchy {}", column, hierarchy))?;
            json!(index.next_column(definition, current))
        }
        Commands::DrillMenu {
            hierarchies,
            form,
            column,
        } => {
            let index = parser::parse_hierarchies_file(&hierarchies)?;
            let form: FormData = read_json(&form)?;
            let attr = if form.viz_type.as_deref() == Some("dist_bar") {
                DimensionAttr::Columns
            } else {
                DimensionAttr::Groupby
            };
            let mut groups = Vec::new();
            for group in index.drill_options(form.dimension(attr), &column, &form.disabled_hierarchy) {
                let options: Vec<_> = group
                    .options
                    .iter()
                    .map(|o| {
                        json!({
                            "column": o.column.name,
                            "title": o.column.label(),
                            "active": o.active,
                            "locked": o.locked,
                        })
                    })
                    .collect();
                groups.push(json!({
                    "hierarchy": group.hierarchy_id,
                    "title": group.title,
                    "options": options,
                }));
            }
            let url_drilldowns: Vec<_> = form
                .url_drilldowns
                .iter()
                .filter(|d| d.field == column)
                .collect();
            json!({
                "shows_menu": index.shows_drill_menu(&form),
                "url_drilldowns": url_drilldowns,
                "hierarchies": groups,
            })
        }
        Commands::Compose {
            existing,
            context,
            columns,
        } => {
            let existing: Vec<Filter> = read_json(&existing)?;
            let context: Vec<Filter> = read_json(&context)?;
            let columns: Vec<DatasourceColumn> = match columns {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };
            let composer = FilterComposer::new(columns).with_all_label(config.all_label.clone());
            json!(composer.compose(&existing, &context))
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
