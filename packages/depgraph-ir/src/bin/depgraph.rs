//! depgraph CLI
//!
//! Runs the dependency analysis over a serialized class model.
//!
//! # Usage
//!
//! ```bash
//! # Reachability from a static main method
//! depgraph analyze --model classes.json --entry 'app.Main.main([Ljava.lang.String;)V' \
//!     --arg '[Ljava.lang.String;'
//!
//! # Coarse analysis, JSON report
//! depgraph analyze --model classes.json --entry 'app.Main.run()V' --mode fast --format json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use depgraph_ir::{
    AnalysisMode, AnalysisStats, AnalyzerConfig, DependencyAnalyzer, DependencyInfo,
    InMemoryClassSource, MethodReference,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "depgraph")]
#[command(about = "Whole-program dependency analysis over a class model", long_about = None)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze reachability from one entry point
    Analyze {
        /// Class model JSON file
        #[arg(short, long)]
        model: PathBuf,

        /// Entry point, e.g. `app.Main.main([Ljava.lang.String;)V`
        #[arg(short, long)]
        entry: String,

        /// Type flowing into each entry point parameter, in order
        #[arg(long = "arg")]
        args: Vec<String>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured analysis mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Precise,
    Fast,
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Analysis result as printed
#[derive(Serialize)]
struct Report {
    entry_point: String,
    interrupted: bool,
    classes: Vec<String>,
    methods: Vec<String>,
    fields: Vec<String>,
    call_edges: Vec<(String, String)>,
    diagnostics: Vec<ReportProblem>,
    stats: AnalysisStats,
}

#[derive(Serialize)]
struct ReportProblem {
    severity: &'static str,
    location: String,
    message: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Analyze {
            model,
            entry,
            args,
            config,
            mode,
            format,
        } => analyze(model, &entry, &args, config, mode, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn analyze(
    model: PathBuf,
    entry: &str,
    args: &[String],
    config: Option<PathBuf>,
    mode: Option<ModeArg>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let entry_point: MethodReference = entry.parse()?;

    let mut config = match config {
        Some(path) => AnalyzerConfig::from_yaml(&path.to_string_lossy())?,
        None => AnalyzerConfig::default(),
    };
    if let Some(mode) = mode {
        config = config.mode(match mode {
            ModeArg::Precise => AnalysisMode::Precise,
            ModeArg::Fast => AnalysisMode::Fast,
        });
    }

    let source = InMemoryClassSource::from_file(&model)?;
    info!(classes = source.len(), model = %model.display(), "Class model loaded");

    let mut analyzer = DependencyAnalyzer::new(source, config)?;
    let mut argument_types = vec![entry_point.class_name.as_str()];
    argument_types.extend(args.iter().map(String::as_str));
    analyzer.add_entry_point(&entry_point, &argument_types)?;
    analyzer.process_dependencies()?;

    let report = build_report(&analyzer, &entry_point);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report),
    }
    Ok(())
}

fn build_report(analyzer: &DependencyAnalyzer, entry_point: &MethodReference) -> Report {
    let diagnostics = analyzer
        .diagnostics()
        .problems()
        .iter()
        .map(|problem| ReportProblem {
            severity: problem.severity.as_str(),
            location: problem.location.to_string(),
            message: problem.message.clone(),
        })
        .collect();

    Report {
        entry_point: entry_point.to_string(),
        interrupted: analyzer.was_interrupted(),
        classes: analyzer
            .reachable_classes()
            .into_iter()
            .map(str::to_string)
            .collect(),
        methods: analyzer
            .reachable_methods()
            .into_iter()
            .filter(|m| analyzer.get_method(m).is_some_and(|dep| dep.is_used()))
            .map(|m| m.to_string())
            .collect(),
        fields: analyzer
            .reachable_fields()
            .into_iter()
            .map(|f| f.to_string())
            .collect(),
        call_edges: analyzer
            .call_graph()
            .edges()
            .into_iter()
            .map(|(caller, callee)| (caller.to_string(), callee.to_string()))
            .collect(),
        diagnostics,
        stats: analyzer.stats(),
    }
}

fn print_text(report: &Report) {
    println!("Entry point: {}", report.entry_point);
    if report.interrupted {
        println!("(analysis interrupted, results are partial)");
    }

    let sections: [(&str, &Vec<String>); 3] = [
        ("Classes", &report.classes),
        ("Methods", &report.methods),
        ("Fields", &report.fields),
    ];
    for (title, items) in sections {
        println!("\n{} ({})", title, items.len());
        for item in items {
            println!("  {}", item);
        }
    }

    println!("\nCalls ({})", report.call_edges.len());
    for (caller, callee) in &report.call_edges {
        println!("  {} -> {}", caller, callee);
    }

    if !report.diagnostics.is_empty() {
        println!("\nDiagnostics ({})", report.diagnostics.len());
        for problem in &report.diagnostics {
            println!(
                "  [{}] {}: {}",
                problem.severity, problem.location, problem.message
            );
        }
    }

    let stats = &report.stats;
    println!(
        "\n{} nodes, {} transitions, {} propagations, {} merges, {} splits in {:.1} ms",
        stats.nodes,
        stats.transitions,
        stats.propagations,
        stats.domain_merges,
        stats.domain_splits,
        stats.duration_ms
    );
}
