//! `docgraph` command-line interface

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use docgraph_core::{BatchReport, Pipeline, PipelineConfig};
use docgraph_enrich::GitLogHistory;
use docgraph_graph::GraphView;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_TOP_AUTHORS: usize = 10;

fn dir_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("DIR")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help(help)
}

fn cli() -> Command {
    Command::new("docgraph")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Header extraction, compliance scoring and relationship graphs for proposal documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("concurrency")
                .long("concurrency")
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Documents processed at once"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .subcommand(
            Command::new("extract")
                .about("Extract header records from source documents")
                .arg(dir_arg("input", "Directory of source documents"))
                .arg(dir_arg("output", "Directory for records")),
        )
        .subcommand(
            Command::new("enrich")
                .about("Add history metadata and insights to stored records")
                .arg(dir_arg("input", "Directory of stored records"))
                .arg(dir_arg("sources", "Source checkout (documents and history)"))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_name("DIR")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory for enriched records (default: input)"),
                )
                .arg(
                    Arg::new("no-history")
                        .long("no-history")
                        .action(ArgAction::SetTrue)
                        .help("Skip git history lookup"),
                ),
        )
        .subcommand(
            Command::new("graph")
                .about("Print the relationship graph as JSON")
                .arg(dir_arg("records", "Directory of stored records"))
                .arg(
                    Arg::new("status")
                        .long("status")
                        .help("Only nodes with this status and their edges"),
                )
                .arg(
                    Arg::new("mentions")
                        .long("mentions")
                        .action(ArgAction::SetTrue)
                        .help("Include free-text mention edges"),
                ),
        )
        .subcommand(
            Command::new("summary")
                .about("Print a corpus summary as JSON")
                .arg(dir_arg("records", "Directory of stored records"))
                .arg(
                    Arg::new("top")
                        .long("top")
                        .default_value("10")
                        .value_parser(value_parser!(usize))
                        .help("Number of top authors"),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<PipelineConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(&concurrency) = matches.get_one::<usize>("concurrency") {
        config = config.with_max_concurrency(concurrency);
    }
    Ok(config)
}

fn path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a Path> {
    args.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("missing --{name}"))
}

fn print_report(pass: &str, report: &BatchReport) {
    println!("{pass}: {} processed", report.processed());
    println!("  written:    {}", report.written.len());
    println!("  unresolved: {}", report.unresolved.len());
    println!("  skipped:    {}", report.skipped.len());
    for (path, failure) in &report.skipped {
        println!("    {}: {failure}", path.display());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));
    let mut config = load_config(&matches)?;
    tracing::debug!(?config, "configuration loaded");

    match matches.subcommand() {
        Some(("extract", args)) => {
            let pipeline = Pipeline::new(config)?;
            let report = pipeline
                .extract(path(args, "input")?, path(args, "output")?)
                .await?;
            print_report("extract", &report);
        }
        Some(("enrich", args)) => {
            let input = path(args, "input")?;
            let sources = path(args, "sources")?;
            let output = args
                .get_one::<PathBuf>("output")
                .map_or(input, PathBuf::as_path);
            let mut pipeline = Pipeline::new(config)?;
            if !args.get_flag("no-history") {
                pipeline = pipeline.with_history(Arc::new(GitLogHistory::new(sources)));
            }
            let report = pipeline.enrich(input, sources, output).await?;
            print_report("enrich", &report);
        }
        Some(("graph", args)) => {
            if args.get_flag("mentions") {
                config = config.with_mentions(true);
            }
            let pipeline = Pipeline::new(config)?;
            let graph = pipeline.graph(path(args, "records")?).await?;
            let view = GraphView::of(&graph);
            let view = match args.get_one::<String>("status") {
                Some(status) => view.filter_status(status),
                None => view,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Some(("summary", args)) => {
            let top = args.get_one::<usize>("top").copied().unwrap_or(DEFAULT_TOP_AUTHORS);
            let pipeline = Pipeline::new(config)?;
            let summary = pipeline.summary(path(args, "records")?, top).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}
