use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;
use tracing::info;

use crate::braid::{braid, validate_fraction};
use crate::carve::carve;
use crate::error::MazeError;
use crate::grid::{Dir, Grid, Pos};

const MAX_LEVEL_SIZE: usize = 40;
const LEVEL_SIZE_STEP: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn base_size(self) -> usize {
        match self {
            Difficulty::Easy => 8,
            Difficulty::Medium => 12,
            Difficulty::Hard => 16,
        }
    }

    pub fn braid_fraction(self) -> f64 {
        match self {
            Difficulty::Easy => 0.10,
            Difficulty::Medium => 0.05,
            Difficulty::Hard => 0.0,
        }
    }

    pub fn fog_radius(self) -> Option<usize> {
        match self {
            Difficulty::Hard => Some(3),
            _ => None,
        }
    }

    fn millis_per_row(self) -> u64 {
        match self {
            Difficulty::Easy => 1500,
            Difficulty::Medium => 1200,
            Difficulty::Hard => 1000,
        }
    }

    /// Grid size for a 1-based level number.
    pub fn size_for_level(self, level: u32) -> usize {
        let extra = (level.max(1) as usize - 1).saturating_mul(LEVEL_SIZE_STEP);
        self.base_size().saturating_add(extra).min(MAX_LEVEL_SIZE)
    }

    pub fn time_limit(self, size: usize) -> Duration {
        Duration::from_millis(self.millis_per_row() * size as u64)
    }
}

/// Construction parameters for one maze.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MazeSettings {
    pub size: usize,
    pub braid_fraction: f64,
}

impl MazeSettings {
    pub fn new(size: usize, braid_fraction: f64) -> Self {
        Self {
            size,
            braid_fraction,
        }
    }

    pub fn for_level(difficulty: Difficulty, level: u32) -> Self {
        Self::new(difficulty.size_for_level(level), difficulty.braid_fraction())
    }
}

/// A generated maze: carved grid with start at the top-left corner and goal
/// at the bottom-right. Structurally immutable once built.
#[derive(Clone, Debug)]
pub struct Maze {
    grid: Grid,
    start: Pos,
    goal: Pos,
}

impl Maze {
    /// Grid Builder, Carver and Braiding pass in order. Nothing is returned
    /// until all three are done.
    pub fn construct(settings: MazeSettings, rng: &mut impl Rng) -> Result<Self, MazeError> {
        let fraction = validate_fraction(settings.braid_fraction)?;
        let mut grid = Grid::new(settings.size)?;
        let start = Pos::new(0, 0);
        let goal = Pos::new(settings.size - 1, settings.size - 1);

        carve(&mut grid, start, rng);
        let report = braid(&mut grid, fraction, rng)?;

        info!(
            size = settings.size,
            openings = grid.openings(),
            braided = report.opened,
            "maze constructed"
        );
        Ok(Self { grid, start, goal })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    pub fn openings(&self) -> usize {
        self.grid.openings()
    }

    /// Neighbour reached by moving `dir` from `pos`, if the way is open.
    pub fn passage(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let next = self.grid.neighbor(pos, dir)?;
        if self.grid.is_open(pos, dir) {
            Some(next)
        } else {
            None
        }
    }

    /// BFS step counts from `from` to every cell, indexed like the grid.
    pub fn distances_from(&self, from: Pos) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.grid.cell_count()];
        if !self.grid.contains(from) {
            return dist;
        }
        let mut q = VecDeque::new();
        dist[self.grid.index(from)] = Some(0);
        q.push_back(from);

        while let Some(pos) = q.pop_front() {
            let base = dist[self.grid.index(pos)].unwrap_or(0);
            for dir in Dir::ALL {
                let Some(next) = self.passage(pos, dir) else {
                    continue;
                };
                let idx = self.grid.index(next);
                if dist[idx].is_none() {
                    dist[idx] = Some(base + 1);
                    q.push_back(next);
                }
            }
        }
        dist
    }

    pub fn shortest_path_len(&self, from: Pos, to: Pos) -> Option<usize> {
        if !self.grid.contains(to) {
            return None;
        }
        self.distances_from(from)[self.grid.index(to)]
    }

    pub fn is_connected(&self) -> bool {
        self.distances_from(self.start).iter().all(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn construct_places_start_and_goal_in_corners() {
        let mut rng = StdRng::seed_from_u64(11);
        let maze = Maze::construct(MazeSettings::new(5, 0.0), &mut rng).unwrap();
        assert_eq!(maze.start(), Pos::new(0, 0));
        assert_eq!(maze.goal(), Pos::new(4, 4));
        assert_eq!(maze.openings(), 24);
        assert!(maze.is_connected());
    }

    #[test]
    fn construct_rejects_bad_settings() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Maze::construct(MazeSettings::new(1, 0.0), &mut rng),
            Err(MazeError::InvalidSize { size: 1 })
        ));
        assert!(matches!(
            Maze::construct(MazeSettings::new(6, 2.0), &mut rng),
            Err(MazeError::InvalidBraidFraction { .. })
        ));
    }

    #[test]
    fn shortest_path_in_two_by_two() {
        let mut rng = StdRng::seed_from_u64(9);
        let maze = Maze::construct(MazeSettings::new(2, 0.0), &mut rng).unwrap();
        // three openings out of four possible: the goal is always two steps away
        assert_eq!(maze.shortest_path_len(maze.start(), maze.goal()), Some(2));
        assert_eq!(maze.shortest_path_len(maze.start(), Pos::new(5, 5)), None);
    }

    #[test]
    fn passage_respects_walls_and_bounds() {
        let mut rng = StdRng::seed_from_u64(4);
        let maze = Maze::construct(MazeSettings::new(6, 0.0), &mut rng).unwrap();
        assert_eq!(maze.passage(Pos::new(0, 0), Dir::North), None);
        assert_eq!(maze.passage(Pos::new(0, 0), Dir::West), None);
        for pos in maze.grid().positions() {
            for dir in Dir::ALL {
                if let Some(next) = maze.passage(pos, dir) {
                    assert_eq!(maze.passage(next, dir.opposite()), Some(pos));
                }
            }
        }
    }

    #[test]
    fn level_sizes_grow_and_cap() {
        assert_eq!(Difficulty::Easy.size_for_level(1), 8);
        assert_eq!(Difficulty::Easy.size_for_level(3), 12);
        assert_eq!(Difficulty::Hard.size_for_level(100), 40);
        assert_eq!(Difficulty::Medium.size_for_level(0), 12);
        assert_eq!(Difficulty::Hard.time_limit(16), Duration::from_secs(16));
    }
}
