//! latindrill CLI — timed Latin grammar drills in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use latindrill_core::model::{Difficulty, Mode};

mod commands;

#[derive(Parser)]
#[command(name = "latindrill", version, about = "Timed Latin case and agreement drills")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play timed rounds interactively
    Play {
        /// Difficulty: easy, normal, hard (default: last used)
        #[arg(long, short)]
        difficulty: Option<Difficulty>,

        /// Mode: match or construct
        #[arg(long, short, default_value = "match")]
        mode: Mode,

        /// RNG seed for reproducible rounds
        #[arg(long)]
        seed: Option<u64>,

        /// Do not echo selected words
        #[arg(long)]
        mute: bool,
    },

    /// Let a deterministic bot play a number of rounds
    Autoplay {
        /// Difficulty: easy, normal, hard
        #[arg(long, short, default_value = "normal")]
        difficulty: Difficulty,

        /// Mode: match or construct
        #[arg(long, short, default_value = "match")]
        mode: Mode,

        /// Rounds to play
        #[arg(long, default_value = "3")]
        rounds: u32,

        /// Probability that the bot answers correctly
        #[arg(long, default_value = "0.8")]
        accuracy: f64,

        /// RNG seed (default: config seed, then 7)
        #[arg(long)]
        seed: Option<u64>,

        /// Keep progress in memory only
        #[arg(long)]
        no_save: bool,

        /// Print round summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show lifetime progress and the reward collection
    Stats {
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the lexicon or check it for content problems
    Lexicon {
        /// Lexicon TOML file (default: config lexicon, then built-in)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Report content warnings instead of listing entries
        #[arg(long)]
        check: bool,
    },

    /// Create a starter config and example lexicon
    Init,

    /// Reset lifetime progress
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("latindrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Play {
            difficulty,
            mode,
            seed,
            mute,
        } => commands::play::execute(config, difficulty, mode, seed, mute).await,
        Commands::Autoplay {
            difficulty,
            mode,
            rounds,
            accuracy,
            seed,
            no_save,
            json,
        } => commands::autoplay::execute(
            config,
            commands::autoplay::AutoplayOptions {
                difficulty,
                mode,
                rounds,
                accuracy,
                seed,
                no_save,
                json,
            },
        ),
        Commands::Stats { json } => commands::stats::execute(config, json),
        Commands::Lexicon { file, check } => commands::lexicon::execute(config, file, check),
        Commands::Init => commands::init::execute(),
        Commands::Reset { yes } => commands::reset::execute(config, yes),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
