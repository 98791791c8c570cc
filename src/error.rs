use std::io;

#[derive(Debug, thiserror::Error)]
pub enum MazeError {
    #[error("maze size must be at least 2, got {size}")]
    InvalidSize { size: usize },
    #[error("braid fraction must be a finite value in [0, 1], got {fraction}")]
    InvalidBraidFraction { fraction: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Maze(#[from] MazeError),
    #[error("could not open log file {path}: {source}")]
    LogFile { path: String, source: io::Error },
}
