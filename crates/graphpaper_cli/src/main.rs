//! GraphPaper CLI - inspect and edit graph files from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "gp")]
#[command(about = "Cards, edges and commits in a GraphPaper file", long_about = None)]
#[command(version)]
struct Cli {
    /// Graph file to operate on
    #[arg(short, long, global = true, default_value = "graph.gp")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new graph file
    Init,
    /// Show the cards and edges at the head commit
    Show,
    /// Add, edit or remove cards
    Card {
        #[command(subcommand)]
        command: CardCommands,
    },
    /// Connect two cards
    Link {
        /// Origin card (oid prefix)
        orig: String,
        /// Destination card (oid prefix)
        dest: String,
    },
    /// Remove an edge
    Unlink {
        /// Edge (oid prefix)
        edge: String,
    },
    /// Show commit history from the head
    Log {
        /// Maximum number of commits to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print a stored object
    Cat {
        /// Object ID or unique prefix
        object_id: String,
    },
    /// List every stored object
    Objects,
    /// Verify file integrity
    Verify {
        /// Only re-hash stored objects, skip loading commits
        #[arg(long)]
        objects_only: bool,
    },
    /// Read or write configuration values
    Config {
        /// Key to read or write (lists everything if omitted)
        key: Option<String>,
        /// New value
        value: Option<String>,
    },
}

#[derive(Subcommand)]
enum CardCommands {
    /// Add a card
    Add {
        /// Card text
        text: String,
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        x: i64,
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        y: i64,
        #[arg(long, default_value = "200")]
        w: i64,
        #[arg(long, default_value = "100")]
        h: i64,
    },
    /// Replace a card's text
    Text {
        /// Card (oid prefix)
        card: String,
        /// New text
        text: String,
    },
    /// Move a card
    Move {
        /// Card (oid prefix)
        card: String,
        #[arg(allow_negative_numbers = true)]
        x: i64,
        #[arg(allow_negative_numbers = true)]
        y: i64,
    },
    /// Resize a card
    Resize {
        /// Card (oid prefix)
        card: String,
        w: i64,
        h: i64,
    },
    /// Remove a card and every edge touching it
    Rm {
        /// Card (oid prefix)
        card: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file = cli.file.as_path();

    match cli.command {
        Commands::Init => commands::init::run(file),
        Commands::Show => commands::show::run(file),
        Commands::Card { command } => match command {
            CardCommands::Add { text, x, y, w, h } => commands::card::add(file, &text, x, y, w, h),
            CardCommands::Text { card, text } => commands::card::text(file, &card, &text),
            CardCommands::Move { card, x, y } => commands::card::move_to(file, &card, x, y),
            CardCommands::Resize { card, w, h } => commands::card::resize(file, &card, w, h),
            CardCommands::Rm { card } => commands::card::remove(file, &card),
        },
        Commands::Link { orig, dest } => commands::link::link(file, &orig, &dest),
        Commands::Unlink { edge } => commands::link::unlink(file, &edge),
        Commands::Log { limit } => commands::log::run(file, limit),
        Commands::Cat { object_id } => commands::cat::run(file, &object_id),
        Commands::Objects => commands::objects::run(file),
        Commands::Verify { objects_only } => commands::verify::run(file, objects_only),
        Commands::Config { key, value } => {
            commands::config::run(file, key.as_deref(), value.as_deref())
        }
    }
}
