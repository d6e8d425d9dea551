//! # Proxima CLI
//!
//! Loads a JSON scene file into a collision world and reports on it. The
//! `watch` subcommand keeps the process alive and re-checks the scene every
//! time the file is saved.

mod watcher;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use proxima::report;
use scene::{Scene, SceneFile};
use tracing::Level;

#[derive(Parser)]
#[command(name = "proxima", version, about = "Collision and distance queries over scene files")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report validity of the initial state and every step
    Check {
        scene: PathBuf,
        /// Skip robot link against robot link pairs
        #[arg(long)]
        no_self: bool,
    },
    /// Print the distance of every candidate pair
    Distances {
        scene: PathBuf,
        #[arg(long)]
        no_self: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Distance between two named objects, ignoring the allowed collision matrix
    Pair { scene: PathBuf, a: String, b: String },
    /// Re-run `check` whenever the scene file changes
    Watch {
        scene: PathBuf,
        #[arg(long)]
        no_self: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::Check { scene, no_self } => {
            let mut scene = load(&scene)?;
            let self_collision = report::self_collision(&scene, no_self);
            let valid = report::check(&mut scene, self_collision, &mut stdout)?;
            Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Distances { scene, no_self, json } => {
            let scene = load(&scene)?;
            report::distances(&scene, report::self_collision(&scene, no_self), json, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Pair { scene, a, b } => {
            report::pair(&load(&scene)?, &a, &b, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Watch { scene, no_self } => {
            drop(stdout);
            watcher::run(&scene, no_self)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn load(path: &Path) -> Result<Scene> {
    SceneFile::load(path)?.into_scene()
}
