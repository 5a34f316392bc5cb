#![forbid(unsafe_code)]

mod cmd;
mod icons;
mod output;

use assetdeps_core::config::load_user_config;
use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "adeps",
    author,
    version,
    about = "adeps: asset dependency graph builder and cache",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self, user_output: Option<&str>) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, user_output)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Cache",
        about = "Rebuild the dependency graph and save the cache",
        long_about = "Rebuild the dependency graph from the project's dependency manifest and write the binary cache.",
        after_help = "EXAMPLES:\n    # Full rebuild\n    adeps build\n\n    # Skip package roots and folders\n    adeps build --no-packages --no-folders\n\n    # Emit machine-readable output\n    adeps build --json"
    )]
    Build(cmd::build::BuildArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show what an asset uses and what uses it",
        long_about = "Look up one asset in the cached graph and list its direct dependencies and dependents.",
        after_help = "EXAMPLES:\n    # Show a material\n    adeps show Assets/Materials/Wood.mat\n\n    # Emit machine-readable output\n    adeps show Assets/Materials/Wood.mat --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "Summarize the dependency graph",
        long_about = "Report asset and edge counts and the most referenced assets.",
        after_help = "EXAMPLES:\n    # Default report\n    adeps stats\n\n    # Top 25 most referenced assets\n    adeps stats --top 25"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Read",
        about = "List assets nothing depends on",
        long_about = "List every asset whose used-by set is empty.",
        after_help = "EXAMPLES:\n    # All unused assets\n    adeps unused\n\n    # Only under one folder\n    adeps unused --under Assets/Art"
    )]
    Unused(cmd::unused::UnusedArgs),

    #[command(
        next_help_heading = "Cache",
        about = "Verify dependency cache integrity",
        long_about = "Load the cache and check that used-by is exactly the inverse of uses and that every reference resolves.",
        after_help = "EXAMPLES:\n    # Verify the cache\n    adeps verify\n\n    # Emit machine-readable output\n    adeps verify --json"
    )]
    Verify,

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    adeps completions bash\n\n    # Generate zsh completions\n    adeps completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ADEPS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "assetdeps=debug,info"
        } else {
            "assetdeps=info,warn"
        })
    });

    let format = env::var("ADEPS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.downcast_ref::<output::Reported>().is_none() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let user = load_user_config().unwrap_or_else(|err| {
        warn!("ignoring user config: {err}");
        assetdeps_core::UserConfig::default()
    });
    let output = cli.output_mode(user.output.as_deref());
    let project_root = env::current_dir()?;
    debug!(root = %project_root.display(), ?output, "starting");

    let started = Instant::now();
    let project = || cmd::Project::open(&project_root, output);
    let result = match cli.command {
        Commands::Build(ref args) => cmd::build::run_build(args, output, &project()?),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &project()?),
        Commands::Stats(ref args) => cmd::stats::run_stats(args, output, &project()?),
        Commands::Unused(ref args) => cmd::unused::run_unused(args, output, &project()?),
        Commands::Verify => cmd::verify::run_verify(output, &project()?),
        Commands::Completions(ref args) => {
            cmd::completions::run_completions(args, &mut std::io::stdout())
        }
    };
    info!(elapsed_ms = started.elapsed().as_millis(), "command finished");

    result
}
