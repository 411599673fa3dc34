mod handlers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use handlers::SessionArgs;

#[derive(Parser)]
#[command(name = "taskrank", version, about = "Rank your backlog for the hours you actually have")]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Rank open tasks in a single pass
    Rank {
        #[arg(long)]
        json: bool,
        /// Number of tasks to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Plan a working order, re-scoring after every pick
    Plan {
        #[arg(long)]
        json: bool,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Explain the score of a specific task
    Explain {
        task: String,
        /// Strict mode: require exact ID or slug (no fuzzy matching)
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },
    /// Group open tasks into batches
    Batch {
        #[arg(long, default_value = "5")]
        max_clusters: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show the longest blocking chain
    Critical {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank { .. } | Commands::Plan { .. } | Commands::Explain { .. } => {
            dispatch_ranking_ops(&cli.session, cli.command)
        }
        Commands::Batch { .. } | Commands::Critical { .. } => {
            dispatch_structure_ops(&cli.session, cli.command)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch_ranking_ops(session: &SessionArgs, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Rank { json, limit } => handlers::rank::handle(session, json, limit),
        Commands::Plan { json, limit } => handlers::plan::handle(session, json, limit),
        Commands::Explain { task, strict, json } => {
            handlers::explain::handle(session, &task, strict, json)
        }
        _ => unreachable!("Invalid ranking command dispatch"),
    }
}

fn dispatch_structure_ops(session: &SessionArgs, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Batch { max_clusters, json } => {
            handlers::batch::handle(session, max_clusters, json)
        }
        Commands::Critical { json } => handlers::critical::handle(session, json),
        _ => unreachable!("Invalid structure command dispatch"),
    }
}
