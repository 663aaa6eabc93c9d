// Command-line entry point for testreach.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use testreach::application::{AnalysisReport, AnalyzeUsecase};
use testreach::config::ReachConfig;
use testreach::domain::reachability::TraversalStrategy;
use testreach::infrastructure::CacheStatus;
use testreach::ports::JsonExporter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ./testreach.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for cached artifacts and outputs
    #[arg(short, long, global = true)]
    work_dir: Option<PathBuf>,

    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build call entries for every unit test in a call log
    Analyze(AnalyzeArgs),
    /// Rewrite the JSON document from the stored snapshot
    Export,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Call log produced by the call-graph tool
    #[arg(short = 'l', long)]
    call_log: Option<PathBuf>,

    /// JSON list of `pkg.Class#method` tests to use instead of the naming convention
    #[arg(short, long)]
    test_list: Option<PathBuf>,

    /// Required suffix of test class names
    #[arg(long)]
    class_suffix: Option<String>,

    /// Required prefix of test method names
    #[arg(long)]
    method_prefix: Option<String>,

    /// Restrict reachable methods to this prefix instead of the extracted one
    #[arg(short, long)]
    project_prefix: Option<String>,

    /// Depth assignment for methods reachable along several paths
    #[arg(long, value_enum)]
    traversal: Option<TraversalStrategy>,

    /// Discard cached unit tests and call entries first
    #[arg(long)]
    refresh: bool,
}

impl AnalyzeArgs {
    fn apply(self, config: &mut ReachConfig) {
        if let Some(call_log) = self.call_log {
            config.call_log = call_log;
        }
        if let Some(test_list) = self.test_list {
            config.test_list = Some(test_list);
        }
        if let Some(suffix) = self.class_suffix {
            config.naming.class_suffix = suffix;
        }
        if let Some(prefix) = self.method_prefix {
            config.naming.method_prefix = prefix;
        }
        if let Some(prefix) = self.project_prefix {
            config.project_prefix = Some(prefix);
        }
        if let Some(traversal) = self.traversal {
            config.traversal = traversal;
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "testreach=debug" } else { "testreach=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &AnalysisReport, config: &ReachConfig) {
    match &report.computed {
        Some(details) => {
            println!("Call graph: {} callers, {} edges", details.callers, details.edges);
            let source = match details.unit_tests {
                CacheStatus::Hit => "cached",
                CacheStatus::Computed => "selected",
            };
            println!("Unit tests: {} ({})", report.tests, source);
            if details.unmatched_tests > 0 {
                println!("Listed tests without recorded calls: {}", details.unmatched_tests);
            }
            println!("Project prefix: {:?}", details.project_prefix);
        }
        None => println!("Unit tests: {} (from snapshot)", report.tests),
    }
    println!(
        "Call entries: {} (max level {})",
        report.total_entries, report.max_level
    );
    println!("Snapshot: {}", config.entry_snapshot_path().display());
    if report.snapshot == CacheStatus::Computed {
        println!("Report: {}", config.entry_json_path().display());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = ReachConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(work_dir) = cli.work_dir {
        config.work_dir = work_dir;
    }

    match cli.command {
        Command::Analyze(args) => {
            let refresh = args.refresh;
            args.apply(&mut config);
            let usecase = AnalyzeUsecase {
                config: &config,
                exporter: &JsonExporter,
            };
            if refresh {
                usecase.refresh().context("Failed to discard cached artifacts")?;
            }
            let (_, report) = usecase.run().context("Analysis failed")?;
            print_report(&report, &config);
        }
        Command::Export => {
            let usecase = AnalyzeUsecase {
                config: &config,
                exporter: &JsonExporter,
            };
            let index = usecase.export().context("Export failed")?;
            println!(
                "Exported {} tests to {}",
                index.len(),
                config.entry_json_path().display()
            );
        }
    }
    Ok(())
}
