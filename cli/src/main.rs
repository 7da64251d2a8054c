//! Neuroatlas CLI: explore a connectivity dataset from the terminal
//!
//! Loads the hierarchy binding table and the statement collection from disk,
//! then prints the region tree, heatmaps, path diagrams or filter values.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use neuroatlas::aggregate::AggregationWarning;
use neuroatlas::payload::{
    parse_child_order, parse_end_organ_order, parse_hierarchy_records, parse_major_nerves,
    parse_statements, read_payload,
};
use neuroatlas::projection::{
    build_y_axis, expand_all, flatten_y_axis, project_detail, project_matrix, prune_y_axis,
    total_statements, ExpansionState, YAxisRow,
};
use neuroatlas::{
    aggregate, aggregate_all, build_hierarchy, build_organ_catalog, filter_options,
    statement_diagram, AtlasConfig, ChildOrderMap, EndOrganOrderMap, Filters, Hierarchy,
    HierarchyRecord, NodeId, OrganAxis, OrganCatalog, StatementMap,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neuroatlas", version, about = "Neuroatlas connectivity explorer")]
struct Cli {
    /// Hierarchy binding table (JSON)
    #[arg(long, global = true, env = "NEUROATLAS_HIERARCHY")]
    hierarchy: Option<PathBuf>,

    /// Knowledge statements: composer page or id → statement map (JSON)
    #[arg(long, global = true, env = "NEUROATLAS_STATEMENTS")]
    statements: Option<PathBuf>,

    /// Atlas configuration (YAML, or JSON by extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Child display order map (JSON)
    #[arg(long, global = true)]
    child_order: Option<PathBuf>,

    /// End organ order map (JSON)
    #[arg(long, global = true)]
    organ_order: Option<PathBuf>,

    /// Major nerves binding table (JSON)
    #[arg(long, global = true)]
    nerves: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(clap::Args, Clone, Default)]
struct FilterArgs {
    /// Keep statements with this phenotype (repeatable)
    #[arg(long)]
    phenotype: Vec<String>,

    /// Keep statements passing through this nerve (repeatable)
    #[arg(long)]
    nerve: Vec<String>,

    /// Keep statements observed in this species (repeatable)
    #[arg(long)]
    species: Vec<String>,

    /// Keep statements originating in this entity or region (repeatable)
    #[arg(long)]
    origin: Vec<String>,
}

impl FilterArgs {
    fn to_filters(&self) -> Filters {
        Filters::new()
            .with_phenotypes(self.phenotype.iter().cloned())
            .with_nerves(self.nerve.iter().cloned())
            .with_species(self.species.iter().cloned())
            .with_origins(self.origin.iter().cloned())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the region hierarchy
    Tree {
        /// Deepest level to print (roots are level 0)
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Main heatmap: regions × target organs
    Heatmap {
        /// Expand these node ids (repeatable)
        #[arg(long)]
        expand: Vec<String>,

        /// Expand every region
        #[arg(long)]
        expand_all: bool,

        /// Drop rows without data
        #[arg(long)]
        hide_empty: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// End-organ heatmap for one organ below one hierarchy node
    Summary {
        /// Target organ id
        #[arg(long)]
        organ: String,

        /// Hierarchy node id
        #[arg(long)]
        node: String,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Path diagram of one statement
    Diagram {
        /// Statement id
        statement: String,
    },
    /// Values available to each filter
    Options,
}

/// Everything loaded from disk for one invocation
struct Dataset {
    config: AtlasConfig,
    records: Vec<HierarchyRecord>,
    hierarchy: Hierarchy,
    statements: StatementMap,
    child_order: ChildOrderMap,
    organ_order: EndOrganOrderMap,
    major_nerves: BTreeSet<String>,
}

impl Dataset {
    fn load(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => AtlasConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AtlasConfig::default(),
        };

        let hierarchy_path = cli
            .hierarchy
            .as_ref()
            .ok_or_else(|| anyhow!("--hierarchy is required"))?;
        let records = parse_hierarchy_records(&read_payload(hierarchy_path)?)
            .with_context(|| format!("decoding {}", hierarchy_path.display()))?;
        let hierarchy = build_hierarchy(&records, &config);

        let statements = match &cli.statements {
            Some(path) => parse_statements(&read_payload(path)?)
                .with_context(|| format!("decoding {}", path.display()))?,
            None => StatementMap::new(),
        };

        let child_order = match &cli.child_order {
            Some(path) => parse_child_order(&read_payload(path)?)?,
            None => ChildOrderMap::new(),
        };
        let organ_order = match &cli.organ_order {
            Some(path) => parse_end_organ_order(&read_payload(path)?)?,
            None => EndOrganOrderMap::new(),
        };
        let major_nerves = match &cli.nerves {
            Some(path) => parse_major_nerves(&read_payload(path)?)?,
            None => BTreeSet::new(),
        };

        Ok(Dataset {
            config,
            records,
            hierarchy,
            statements,
            child_order,
            organ_order,
            major_nerves,
        })
    }

    fn catalog(&self) -> OrganCatalog {
        build_organ_catalog(&self.records, &self.organ_order, &self.config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Diagram { statement } => {
            let path = cli
                .statements
                .as_ref()
                .ok_or_else(|| anyhow!("--statements is required"))?;
            let statements = parse_statements(&read_payload(path)?)?;
            let config = match &cli.config {
                Some(path) => AtlasConfig::from_file(path)?,
                None => AtlasConfig::default(),
            };
            run_diagram(&statements, statement, &config, &cli.format)
        }
        Commands::Tree { depth } => run_tree(&Dataset::load(cli)?, *depth, &cli.format),
        Commands::Heatmap {
            expand,
            expand_all,
            hide_empty,
            filters,
        } => run_heatmap(
            &Dataset::load(cli)?,
            expand,
            *expand_all,
            *hide_empty,
            &filters.to_filters(),
            &cli.format,
        ),
        Commands::Summary {
            organ,
            node,
            filters,
        } => run_summary(&Dataset::load(cli)?, organ, node, &filters.to_filters(), &cli.format),
        Commands::Options => run_options(&Dataset::load(cli)?, &cli.format),
    }
}

fn run_tree(data: &Dataset, depth: Option<usize>, format: &OutputFormat) -> Result<()> {
    let items = build_y_axis(&data.hierarchy, data.hierarchy.roots(), &data.child_order);
    let mut expansion = ExpansionState::new();
    expand_all(&items, &mut expansion);
    let rows: Vec<YAxisRow> = flatten_y_axis(&items, &expansion)
        .into_iter()
        .filter(|row| depth.map_or(true, |d| row.depth <= d))
        .collect();

    let header: Vec<String> = ["Region", "Id", "Nodes", "Statements"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let statements = data
                .hierarchy
                .get(row.id.as_str())
                .map(|node| node.statement_count())
                .unwrap_or(0);
            vec![
                format!("{}{}", "  ".repeat(row.depth), row.label),
                row.id.to_string(),
                data.hierarchy.subtree_size(row.id.as_str()).to_string(),
                statements.to_string(),
            ]
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        _ => print_rows(&header, &body, format),
    }
    Ok(())
}

fn run_heatmap(
    data: &Dataset,
    expand: &[String],
    expand_every: bool,
    hide_empty: bool,
    filters: &Filters,
    format: &OutputFormat,
) -> Result<()> {
    let catalog = data.catalog();
    let axis = OrganAxis::target_organs(catalog.organs.values());
    let result = aggregate_all(&data.hierarchy, &axis, &data.statements, filters);
    report_warnings(&result.warnings);

    let mut items = build_y_axis(&data.hierarchy, data.hierarchy.roots(), &data.child_order);
    if hide_empty {
        items = prune_y_axis(&items, &result.connections);
    }
    let mut expansion = ExpansionState::new();
    if expand_every {
        expand_all(&items, &mut expansion);
    }
    for id in expand {
        expansion.expand(id.as_str());
    }
    let rows = flatten_y_axis(&items, &expansion);

    match format {
        OutputFormat::Json => {
            let detail = project_detail(&result.connections, &rows, &axis);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "columns": axis.columns(),
                    "rows": detail,
                }))?
            );
        }
        _ => {
            let matrix = project_matrix(&result.connections, &rows, &axis);
            print_matrix(&axis, &rows, &matrix, format);
        }
    }
    Ok(())
}

fn run_summary(
    data: &Dataset,
    organ_id: &str,
    node_id: &str,
    filters: &Filters,
    format: &OutputFormat,
) -> Result<()> {
    let catalog = data.catalog();
    let organ = catalog
        .get(organ_id)
        .ok_or_else(|| anyhow!("unknown organ {}", organ_id))?;
    let axis = OrganAxis::end_organs(organ);
    let result = aggregate(&data.hierarchy, &axis, &data.statements, filters, node_id)?;
    report_warnings(&result.warnings);

    let items = build_y_axis(&data.hierarchy, &[NodeId::new(node_id)], &data.child_order);
    let mut expansion = ExpansionState::new();
    expansion.expand(node_id);
    let rows = flatten_y_axis(&items, &expansion);

    match format {
        OutputFormat::Json => {
            let detail = project_detail(&result.connections, &rows, &axis);
            let totals: Vec<usize> = detail.iter().map(|row| total_statements(&row.cells)).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "organ": organ.name,
                    "columns": axis.columns(),
                    "rows": detail,
                    "totals": totals,
                }))?
            );
        }
        _ => {
            let matrix = project_matrix(&result.connections, &rows, &axis);
            print_matrix(&axis, &rows, &matrix, format);
        }
    }
    Ok(())
}

fn run_diagram(
    statements: &StatementMap,
    statement_id: &str,
    config: &AtlasConfig,
    format: &OutputFormat,
) -> Result<()> {
    let statement = statements
        .get(statement_id)
        .ok_or_else(|| anyhow!("unknown statement {}", statement_id))?;
    let model = statement_diagram(statement, &config.layout);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&model)?),
        _ => {
            let header: Vec<String> = ["Layer", "Kind", "Name", "Type", "From", "To", "Forward"]
                .iter()
                .map(|s| s.to_string())
                .collect();
            let body: Vec<Vec<String>> = model
                .nodes
                .iter()
                .map(|node| {
                    let names = |list: &[neuroatlas::diagram::Adjacency]| {
                        list.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join("; ")
                    };
                    vec![
                        node.key.layer.to_string(),
                        node.kind.to_string(),
                        node.name.clone(),
                        node.anatomical_type.clone().unwrap_or_default(),
                        names(&node.from),
                        names(&node.to),
                        node.forward_connections.join("; "),
                    ]
                })
                .collect();
            print_rows(&header, &body, format);
            if let OutputFormat::Table = format {
                println!("{} node(s), {} link(s)", model.node_count(), model.link_count());
            }
        }
    }
    Ok(())
}

fn run_options(data: &Dataset, format: &OutputFormat) -> Result<()> {
    let catalog = data.catalog();
    let items = build_y_axis(&data.hierarchy, data.hierarchy.roots(), &data.child_order);
    let options = filter_options(
        &data.statements,
        &items,
        catalog.ordered(),
        &data.major_nerves,
        &data.config.path_delimiter,
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&options)?),
        _ => {
            let header: Vec<String> = ["Filter", "Id", "Label"].iter().map(|s| s.to_string()).collect();
            let groups = [
                ("phenotype", &options.phenotypes),
                ("apinatomy", &options.apinatomies),
                ("species", &options.species),
                ("origin", &options.origins),
                ("via", &options.vias),
                ("end organ", &options.end_organs),
                ("nerve", &options.nerves),
            ];
            let body: Vec<Vec<String>> = groups
                .iter()
                .flat_map(|(name, list)| {
                    list.iter()
                        .map(move |o| vec![name.to_string(), o.id.clone(), o.label.clone()])
                })
                .collect();
            print_rows(&header, &body, format);
        }
    }
    Ok(())
}

fn report_warnings(warnings: &[AggregationWarning]) {
    for warning in warnings {
        match warning {
            AggregationWarning::AxisMismatch { node } => {
                eprintln!("Warning: no organ column matches the data below {}", node)
            }
            AggregationWarning::NoVisibleStatements => {
                eprintln!("Warning: no statements pass the current filters")
            }
        }
    }
}

fn print_matrix(axis: &OrganAxis, rows: &[YAxisRow], matrix: &[Vec<usize>], format: &OutputFormat) {
    let mut header = vec!["Region".to_string()];
    header.extend(axis.labels().into_iter().map(str::to_string));
    let body: Vec<Vec<String>> = rows
        .iter()
        .zip(matrix)
        .map(|(row, counts)| {
            let mut cells = vec![row.label.clone()];
            cells.extend(counts.iter().map(|c| match (format, c) {
                (OutputFormat::Table, 0) => String::new(),
                _ => c.to_string(),
            }));
            cells
        })
        .collect();
    print_rows(&header, &body, format);
}

fn print_rows(header: &[String], body: &[Vec<String>], format: &OutputFormat) {
    match format {
        OutputFormat::Csv => {
            println!("{}", header.iter().map(|h| csv_field(h)).collect::<Vec<_>>().join(","));
            for row in body {
                println!("{}", row.iter().map(|c| csv_field(c)).collect::<Vec<_>>().join(","));
            }
        }
        _ => {
            if body.is_empty() {
                println!("(no results)");
                return;
            }
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(header);
            for row in body {
                table.add_row(row);
            }
            println!("{}", table);
            println!("{} row(s)", body.len());
        }
    }
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
