use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "showline", version)]
struct Cli {
    /// Log resolution progress to stderr (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a timeline and print every object's instances as JSON.
    Resolve(ResolveArgs),
    /// Print what each layer holds at a point in time, plus upcoming events.
    State(StateArgs),
}

#[derive(Args, Debug)]
struct TimelineArgs {
    /// Input timeline JSON (an array of objects).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Reference time; repeating objects are tiled from the period containing it.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Max repeat tiles per instance.
    #[arg(long)]
    limit_count: Option<usize>,

    /// No repeat tiles at or after this time.
    #[arg(long)]
    limit_time: Option<f64>,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    #[command(flatten)]
    timeline: TimelineArgs,
}

#[derive(Parser, Debug)]
struct StateArgs {
    #[command(flatten)]
    timeline: TimelineArgs,

    /// Query time (defaults to `--time`).
    #[arg(long)]
    at: Option<f64>,

    /// Max number of upcoming events to list.
    #[arg(long)]
    events: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Resolve(args) => cmd_resolve(args),
        Command::State(args) => cmd_state(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve(args: &TimelineArgs) -> anyhow::Result<showline::ResolvedGraph> {
    let objects = showline::load_objects_from_path(&args.in_path)?;
    let mut options = showline::ResolveOptions::at(args.time);
    options.limit_count = args.limit_count;
    options.limit_time = args.limit_time;
    let graph = showline::resolve_timeline(&objects, options)
        .with_context(|| format!("resolve timeline '{}'", args.in_path.display()))?;
    tracing::info!(
        objects = graph.objects.len(),
        instances = graph.statistics.resolved_instance_count,
        "resolved"
    );
    Ok(graph)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("serialize output")?;
    println!("{json}");
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let graph = resolve(&args.timeline)?;
    print_json(&graph, args.timeline.pretty)
}

fn cmd_state(args: StateArgs) -> anyhow::Result<()> {
    let graph = resolve(&args.timeline)?;
    let at = args.at.unwrap_or(args.timeline.time);
    let state = showline::get_state(&graph, at, args.events);
    print_json(&state, args.timeline.pretty)
}
