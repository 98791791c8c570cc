//! Procedurally generated mazes with a move validator, optional fog of war
//! and a small terminal game shell on top.
//!
//! Construction runs Grid Builder, backtracker carve and braiding pass in
//! order; [`traversal::Traversal`] then owns the finished [`maze::Maze`] and
//! is the only thing that moves the player.

pub mod braid;
pub mod carve;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod maze;
pub mod render;
pub mod traversal;

pub use error::{AppError, MazeError};
pub use grid::{Dir, Grid, Pos};
pub use maze::{Difficulty, Maze, MazeSettings};
pub use traversal::{Fog, MoveOutcome, Traversal, TraversalState};
