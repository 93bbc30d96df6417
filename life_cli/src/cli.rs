// cli.rs - Command-line flags and the run loop that drives the controller

use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use life::{Board, Observable, PlaybackController, patterns};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::config::{self, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "life", version, about = "Headless Conway's Game of Life runner")]
pub struct Cli {
    /// Settings file (board_size, animation_speed)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Board side length; overrides the settings file
    #[arg(long)]
    pub size: Option<usize>,

    /// Animation speed in [0, 1]; overrides the settings file
    #[arg(long)]
    pub speed: Option<f64>,

    /// Start from a bundled preset (see --list-presets)
    #[arg(long, conflicts_with_all = ["random", "load"])]
    pub preset: Option<String>,

    /// Start from a random board
    #[arg(long, conflicts_with = "load")]
    pub random: bool,

    /// Start from a board saved as JSON
    #[arg(long)]
    pub load: Option<PathBuf>,

    /// Generations to run before stopping
    #[arg(long, default_value_t = 10)]
    pub generations: u64,

    /// Advance with `next` instead of the timer
    #[arg(long)]
    pub step: bool,

    /// Write the last board as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Write --speed back to the settings file
    #[arg(long)]
    pub persist_speed: bool,

    /// Print the bundled presets and exit
    #[arg(long)]
    pub list_presets: bool,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.list_presets {
        for preset in patterns::PRESETS {
            println!("{:<20} {}x{}", preset.name, preset.size, preset.size);
        }
        return Ok(());
    }

    let mut settings = config::load_settings(&args.config)?;
    if let Some(size) = args.size {
        settings.board_size = size;
    }

    let mut board_size = Observable::new(settings.board_size);
    let mut ctrl = PlaybackController::new(
        Handle::current(),
        Board::new(settings.board_size)?,
        settings.animation_speed,
    );
    ctrl.follow_board_size(board_size.subscribe());

    if args.persist_speed {
        let path = args.config.clone();
        ctrl = ctrl.with_speed_sink(move |speed: f64| {
            if let Err(err) = config::save_speed(&path, speed) {
                warn!(%err, "could not persist speed");
            }
        });
    }
    if let Some(speed) = args.speed {
        ctrl.change_speed(speed)?;
    }

    if let Some(name) = &args.preset {
        let Some(preset) = patterns::find(name) else {
            bail!("unknown preset '{name}', try --list-presets");
        };
        ctrl.load_preset(preset)?;
    } else if let Some(path) = &args.load {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read board '{}'", path.display()))?;
        let board: Board = serde_json::from_str(&raw)
            .with_context(|| format!("failed to decode board '{}'", path.display()))?;
        ctrl.load_board(board);
    } else if args.random {
        ctrl.randomize();
    }

    let last = if args.step {
        step(&ctrl, args.generations)?
    } else {
        animate(&ctrl, args.generations).await?
    };

    if let Some(path) = &args.save {
        let raw = serde_json::to_string(&last).context("failed to encode board")?;
        fs::write(path, raw)
            .with_context(|| format!("failed to write board '{}'", path.display()))?;
        info!(path = %path.display(), "board saved");
    }

    drop(board_size);
    Ok(())
}

fn print_board(generation: u64, board: &Board) {
    println!("generation {generation}  population {}", board.population());
    print!("{board}");
    println!();
}

fn step(ctrl: &PlaybackController, generations: u64) -> Result<Board> {
    let mut board = ctrl.board();
    print_board(0, &board);
    for generation in 1..=generations {
        ctrl.next()?;
        board = ctrl.board();
        print_board(generation, &board);
    }
    Ok(board)
}

async fn animate(ctrl: &PlaybackController, generations: u64) -> Result<Board> {
    let mut boards = ctrl.observe_board();
    let mut board = boards.recv().await.context("controller went away")?;
    print_board(0, &board);

    ctrl.play()?;
    for generation in 1..=generations {
        tokio::select! {
            next = boards.recv() => {
                board = next.context("controller went away")?;
                print_board(generation, &board);
            }
            _ = tokio::signal::ctrl_c() => {
                info!(generation, "interrupted");
                break;
            }
        }
    }
    ctrl.stop()?;
    Ok(board)
}
