use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::game::GameSettings;
use crate::maze::Difficulty;
use crate::traversal::Fog;

const DEFAULT_COOLDOWN_MS: u64 = 90;
const DEFAULT_FPS: u64 = 60;

/// Terminal maze runner: reach the bottom-right corner before time runs out.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub maze: MazeArgs,

    /// Write tracing output to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal (default)
    Play(PlayArgs),
    /// Print one generated maze as ASCII and exit
    Print,
}

#[derive(Args, Debug, Clone)]
pub struct MazeArgs {
    /// RNG seed; random when omitted
    #[arg(long, env = "FOGMAZE_SEED", global = true)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, env = "FOGMAZE_DIFFICULTY", default_value_t = DifficultyArg::Medium, global = true)]
    pub difficulty: DifficultyArg,

    /// Grid size N, overriding the difficulty preset
    #[arg(long, global = true)]
    pub size: Option<usize>,

    /// Fraction of cells sampled by the braiding pass, in [0, 1]
    #[arg(long, global = true)]
    pub braid: Option<f64>,

    /// Visibility radius around the player
    #[arg(long, global = true, conflicts_with = "no_fog")]
    pub fog: Option<usize>,

    /// Show the whole maze even on hard
    #[arg(long, global = true)]
    pub no_fog: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// Minimum time between accepted moves
    #[arg(long, env = "FOGMAZE_COOLDOWN_MS", default_value_t = DEFAULT_COOLDOWN_MS)]
    pub cooldown_ms: u64,

    /// Level time limit; derived from the grid size when omitted
    #[arg(long, env = "FOGMAZE_TIME_LIMIT")]
    pub time_limit_secs: Option<u64>,

    #[arg(long, env = "FOGMAZE_FPS", default_value_t = DEFAULT_FPS)]
    pub fps: u64,
}

impl Default for PlayArgs {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            time_limit_secs: None,
            fps: DEFAULT_FPS,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

impl MazeArgs {
    pub fn game_settings(&self, play: &PlayArgs) -> GameSettings {
        let mut settings = GameSettings::new(self.difficulty.into());
        settings.size = self.size;
        settings.braid_fraction = self.braid;
        if self.no_fog {
            settings.fog = Fog::clear();
        } else if let Some(radius) = self.fog {
            settings.fog = Fog::with_radius(radius);
        }
        settings.cooldown = Duration::from_millis(play.cooldown_ms);
        settings.time_limit = play.time_limit_secs.filter(|s| *s > 0).map(Duration::from_secs);
        settings
    }
}

impl PlayArgs {
    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.fps.max(1))
    }
}
