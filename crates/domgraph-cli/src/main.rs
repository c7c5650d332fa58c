//! Dominance graph solver CLI.
//!
//! Provides the `domgraph` binary with subcommands for solving, counting and
//! classifying dominance graphs. Graphs are read from JSON documents (see
//! [`document`]) or generated as chains of the given length. Non-compact
//! graphs are compactified before solving.
//!
//! Results go to stdout as JSON; diagnostics and logs go to stderr.
//! Exit codes: 0 = success, 1 = unsolvable or malformed graph,
//! 3 = I/O, parse or serialization error.

mod document;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use domgraph_chart::{
    classify, solve_with, Chart, SolveError, SolvedFormIterator, SolverConfig, SplitSource,
};
use domgraph_core::{chain, DomGraph, NodeLabels};

use document::{GraphDocument, LoadError};

/// Dominance graph solver.
#[derive(Parser)]
#[command(name = "domgraph", about = "Solve, count and classify dominance graphs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the graph comes from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Path to a JSON graph document.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Generate a chain of this length instead of reading a file.
    #[arg(short, long)]
    chain: Option<usize>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Solve a graph and print its solved forms.
    Solve {
        #[command(flatten)]
        input: InputArgs,

        /// Keep only the first split of every subgraph.
        #[arg(long)]
        first: bool,

        /// Maximum number of solved forms to print.
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the number of solved forms.
    Count {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the graph classes the graph belongs to.
    Classify {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Solve {
            input,
            first,
            limit,
        } => run_solve(&input, first, limit),
        Commands::Count { input } => run_count(&input),
        Commands::Classify { input } => run_classify(&input),
    };
    process::exit(exit_code);
}

/// Report printed by `domgraph solve`.
#[derive(Debug, Serialize)]
struct SolveReport {
    solvable: bool,
    /// Decimal string; counts routinely exceed 64 bits.
    count: String,
    chart_size: usize,
    subgraphs: usize,
    /// Solved forms as (dominator, dominated root) name pairs.
    solved_forms: Vec<Vec<(String, String)>>,
}

fn load_graph(input: &InputArgs) -> Result<(DomGraph, NodeLabels), LoadError> {
    if let Some(length) = input.chain {
        return Ok(chain(length)?);
    }
    match &input.input {
        Some(path) => Ok(GraphDocument::read(path)?.to_graph()?),
        None => Ok((DomGraph::new(), NodeLabels::new())),
    }
}

/// Checks weak normality before compactifying so the error names the
/// predicate that failed.
fn compact_graph(graph: &DomGraph) -> Result<DomGraph, SolveError> {
    graph
        .check_weakly_normal()
        .map_err(|violation| SolveError::NotWeaklyNormal { violation })?;
    Ok(graph.compactify()?)
}

/// Loads and compactifies the input, reporting failures on stderr.
fn load_compact(input: &InputArgs) -> Result<DomGraph, i32> {
    let (graph, _labels) = load_graph(input).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code()
    })?;
    compact_graph(&graph).map_err(|e| {
        eprintln!("Error: {}", e);
        1
    })
}

/// Solves `graph` into a fresh chart. `Err` carries the exit code.
fn solve_graph(graph: &DomGraph, split_source: SplitSource) -> Result<Option<Chart>, i32> {
    let config = SolverConfig { split_source };
    let mut chart = Chart::new();
    match solve_with(graph, &mut chart, &config) {
        Ok(true) => Ok(Some(chart)),
        Ok(false) => Ok(None),
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(1)
        }
    }
}

fn build_report(graph: &DomGraph, chart: Option<&Chart>, limit: usize) -> SolveReport {
    let Some(chart) = chart else {
        return SolveReport {
            solvable: false,
            count: "0".to_string(),
            chart_size: 0,
            subgraphs: 0,
            solved_forms: Vec::new(),
        };
    };

    let name = |id| graph.name(id).unwrap_or_default().to_string();
    let solved_forms = SolvedFormIterator::new(chart, graph)
        .take(limit)
        .map(|form| {
            form.edges()
                .iter()
                .map(|e| (name(e.src), name(e.tgt)))
                .collect()
        })
        .collect();

    SolveReport {
        solvable: true,
        count: chart.count_solved_forms().to_string(),
        chart_size: chart.size(),
        subgraphs: chart.subgraph_count(),
        solved_forms,
    }
}

/// Prints `value` as pretty JSON. `Err` carries the exit code.
fn print_json<T: Serialize>(value: &T) -> Result<(), i32> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: failed to serialize result: {}", e);
            Err(3)
        }
    }
}

/// Execute the solve subcommand.
fn run_solve(input: &InputArgs, first: bool, limit: usize) -> i32 {
    let graph = match load_compact(input) {
        Ok(g) => g,
        Err(code) => return code,
    };
    let split_source = if first {
        SplitSource::First
    } else {
        SplitSource::Complete
    };
    let chart = match solve_graph(&graph, split_source) {
        Ok(chart) => chart,
        Err(code) => return code,
    };

    let report = build_report(&graph, chart.as_ref(), limit);
    tracing::info!(count = %report.count, chart_size = report.chart_size, "solved");
    if let Err(code) = print_json(&report) {
        return code;
    }
    if report.solvable {
        0
    } else {
        1
    }
}

/// Execute the count subcommand.
fn run_count(input: &InputArgs) -> i32 {
    let graph = match load_compact(input) {
        Ok(g) => g,
        Err(code) => return code,
    };
    match solve_graph(&graph, SplitSource::Complete) {
        Ok(Some(chart)) => {
            println!("{}", chart.count_solved_forms());
            0
        }
        Ok(None) => {
            println!("0");
            1
        }
        Err(code) => code,
    }
}

/// Execute the classify subcommand. Classification never compactifies.
fn run_classify(input: &InputArgs) -> i32 {
    match load_graph(input) {
        Ok((graph, _)) => match print_json(&classify(&graph)) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}
