use tracing::{debug, info};

use crate::grid::{Dir, Pos};
use crate::maze::Maze;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraversalState {
    Idle,
    Active,
    Won,
    Lost,
}

impl TraversalState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TraversalState::Won | TraversalState::Lost)
    }

    pub fn name(self) -> &'static str {
        match self {
            TraversalState::Idle => "ready",
            TraversalState::Active => "playing",
            TraversalState::Won => "won",
            TraversalState::Lost => "lost",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: bool,
    pub position: Pos,
    pub reached_goal: bool,
}

/// Square visibility window around the player. Only affects what gets drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fog {
    pub radius: Option<usize>,
}

impl Fog {
    pub fn clear() -> Self {
        Self { radius: None }
    }

    pub fn with_radius(radius: usize) -> Self {
        Self {
            radius: Some(radius),
        }
    }

    pub fn reveals(&self, cell: Pos, player: Pos) -> bool {
        match self.radius {
            Some(r) => cell.chebyshev(player) <= r,
            None => true,
        }
    }
}

/// Player position state machine over a finished maze.
pub struct Traversal {
    maze: Maze,
    position: Pos,
    state: TraversalState,
    moves: u32,
    fog: Fog,
}

impl Traversal {
    pub fn new(maze: Maze, fog: Fog) -> Self {
        let position = maze.start();
        Self {
            maze,
            position,
            state: TraversalState::Idle,
            moves: 0,
            fog,
        }
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn position(&self) -> Pos {
        self.position
    }

    pub fn state(&self) -> TraversalState {
        self.state
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn fog(&self) -> Fog {
        self.fog
    }

    /// Moves one cell in `dir` when the way is open. Rejected moves, and any
    /// move after the traversal has ended, leave every field untouched.
    pub fn attempt_move(&mut self, dir: Dir) -> MoveOutcome {
        let rejected = MoveOutcome {
            moved: false,
            position: self.position,
            reached_goal: false,
        };
        if self.state.is_terminal() {
            return rejected;
        }
        let Some(next) = self.maze.passage(self.position, dir) else {
            debug!(?dir, x = self.position.x, y = self.position.y, "move blocked");
            return rejected;
        };

        self.position = next;
        self.moves += 1;
        let reached_goal = next == self.maze.goal();
        self.state = if reached_goal {
            info!(moves = self.moves, "goal reached");
            TraversalState::Won
        } else {
            TraversalState::Active
        };
        MoveOutcome {
            moved: true,
            position: next,
            reached_goal,
        }
    }

    /// External failure, e.g. the level clock ran out.
    pub fn fail(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = TraversalState::Lost;
        true
    }

    pub fn is_visible(&self, cell: Pos) -> bool {
        self.maze.grid().contains(cell) && self.fog.reveals(cell, self.position)
    }
}
