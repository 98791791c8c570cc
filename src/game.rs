use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::error::MazeError;
use crate::grid::Dir;
use crate::maze::{Difficulty, Maze, MazeSettings};
use crate::traversal::{Fog, MoveOutcome, Traversal, TraversalState};

const POINTS_PER_LEVEL: u32 = 100;

/// Receives the result of each won level.
pub trait CompletionSink {
    fn on_complete(&mut self, score: u32, max_score: u32);
}

/// Running total kept by the terminal front end.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    pub total: u32,
    pub best_possible: u32,
    pub levels_won: u32,
}

impl CompletionSink for ScoreBoard {
    fn on_complete(&mut self, score: u32, max_score: u32) {
        self.total += score;
        self.best_possible += max_score;
        self.levels_won += 1;
    }
}

/// Per-run tuning, usually from the command line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub size: Option<usize>,
    pub braid_fraction: Option<f64>,
    pub fog: Fog,
    pub cooldown: Duration,
    pub time_limit: Option<Duration>,
}

impl GameSettings {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            size: None,
            braid_fraction: None,
            fog: Fog {
                radius: difficulty.fog_radius(),
            },
            cooldown: Duration::from_millis(90),
            time_limit: None,
        }
    }

    pub fn maze_settings(&self, level: u32) -> MazeSettings {
        let mut settings = MazeSettings::for_level(self.difficulty, level);
        if let Some(size) = self.size {
            settings.size = size;
        }
        if let Some(fraction) = self.braid_fraction {
            settings.braid_fraction = fraction;
        }
        settings
    }

    fn time_limit_for(&self, size: usize) -> Duration {
        self.time_limit
            .unwrap_or_else(|| self.difficulty.time_limit(size))
    }
}

pub fn level_score(level: u32, shortest: usize, moves: u32) -> (u32, u32) {
    let max_score = POINTS_PER_LEVEL * level.max(1);
    let shortest = shortest.max(1) as u64;
    let taken = (moves as u64).max(shortest);
    let score = (max_score as u64 * shortest / taken) as u32;
    (score, max_score)
}

/// One level at a time: owns the current maze, enforces the input
/// cooldown and the level clock, and reports wins to a sink.
pub struct Game {
    settings: GameSettings,
    rng: StdRng,
    level: u32,
    traversal: Traversal,
    shortest: usize,
    started_at: Instant,
    time_limit: Duration,
    last_input: Option<Instant>,
    reported: bool,
}

impl Game {
    pub fn new(settings: GameSettings, seed: u64, now: Instant) -> Result<Self, MazeError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (traversal, shortest, time_limit) = build_level(&settings, 1, &mut rng)?;
        Ok(Self {
            settings,
            rng,
            level: 1,
            traversal,
            shortest,
            started_at: now,
            time_limit,
            last_input: None,
            reported: false,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn traversal(&self) -> &Traversal {
        &self.traversal
    }

    pub fn maze(&self) -> &Maze {
        self.traversal.maze()
    }

    pub fn state(&self) -> TraversalState {
        self.traversal.state()
    }

    pub fn shortest(&self) -> usize {
        self.shortest
    }

    pub fn time_left(&self, now: Instant) -> Duration {
        self.time_limit
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }

    /// Forwards a directional input unless it arrives inside the cooldown
    /// window. Returns None for dropped inputs.
    pub fn handle_move(
        &mut self,
        dir: Dir,
        now: Instant,
        sink: &mut impl CompletionSink,
    ) -> Option<MoveOutcome> {
        if let Some(last) = self.last_input {
            if now.saturating_duration_since(last) < self.settings.cooldown {
                return None;
            }
        }
        self.last_input = Some(now);
        let outcome = self.traversal.attempt_move(dir);
        if outcome.reached_goal {
            self.report(sink);
        }
        Some(outcome)
    }

    /// Signals a loss when the level clock runs out.
    pub fn tick(&mut self, now: Instant) -> TraversalState {
        if !self.state().is_terminal() && self.time_left(now).is_zero() {
            warn!(level = self.level, moves = self.traversal.moves(), "level timed out");
            self.traversal.fail();
        }
        self.state()
    }

    pub fn next_level(&mut self, now: Instant) -> Result<(), MazeError> {
        self.load_level(self.level + 1, now)
    }

    pub fn restart(&mut self, now: Instant) -> Result<(), MazeError> {
        self.load_level(self.level, now)
    }

    fn load_level(&mut self, level: u32, now: Instant) -> Result<(), MazeError> {
        let (traversal, shortest, time_limit) = build_level(&self.settings, level, &mut self.rng)?;
        self.level = level;
        self.traversal = traversal;
        self.shortest = shortest;
        self.time_limit = time_limit;
        self.started_at = now;
        self.last_input = None;
        self.reported = false;
        Ok(())
    }

    fn report(&mut self, sink: &mut impl CompletionSink) {
        if self.reported {
            return;
        }
        self.reported = true;
        let (score, max_score) = level_score(self.level, self.shortest, self.traversal.moves());
        info!(level = self.level, score, max_score, "level complete");
        sink.on_complete(score, max_score);
    }
}

fn build_level(
    settings: &GameSettings,
    level: u32,
    rng: &mut StdRng,
) -> Result<(Traversal, usize, Duration), MazeError> {
    let maze_settings = settings.maze_settings(level);
    let maze = Maze::construct(maze_settings, rng)?;
    let shortest = maze
        .shortest_path_len(maze.start(), maze.goal())
        .unwrap_or(0);
    let time_limit = settings.time_limit_for(maze.size());
    info!(
        level,
        size = maze.size(),
        shortest,
        time_limit_ms = time_limit.as_millis() as u64,
        "level ready"
    );
    Ok((Traversal::new(maze, settings.fog), shortest, time_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Pos;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(u32, u32)>,
    }

    impl CompletionSink for Recorder {
        fn on_complete(&mut self, score: u32, max_score: u32) {
            self.calls.push((score, max_score));
        }
    }

    fn settings() -> GameSettings {
        let mut s = GameSettings::new(Difficulty::Easy);
        s.size = Some(4);
        s.braid_fraction = Some(0.0);
        s.cooldown = Duration::from_millis(100);
        s.time_limit = Some(Duration::from_secs(10));
        s
    }

    fn path_to_goal(maze: &Maze) -> Vec<Dir> {
        let grid = maze.grid();
        let dist = maze.distances_from(maze.goal());
        let mut pos = maze.start();
        let mut path = Vec::new();
        while pos != maze.goal() {
            let d = dist[grid.index(pos)].unwrap();
            let (dir, next) = Dir::ALL
                .into_iter()
                .filter_map(|dir| maze.passage(pos, dir).map(|n| (dir, n)))
                .find(|(_, n)| dist[grid.index(*n)] == Some(d - 1))
                .unwrap();
            path.push(dir);
            pos = next;
        }
        path
    }

    #[test]
    fn score_scales_with_efficiency() {
        assert_eq!(level_score(1, 6, 6), (100, 100));
        assert_eq!(level_score(2, 6, 12), (100, 200));
        assert_eq!(level_score(3, 6, 3), (300, 300));
    }

    #[test]
    fn inputs_inside_cooldown_are_dropped() {
        let t0 = Instant::now();
        let mut game = Game::new(settings(), 1, t0).unwrap();
        let mut sink = Recorder::default();
        assert!(game.handle_move(Dir::North, t0, &mut sink).is_some());
        assert!(game
            .handle_move(Dir::North, t0 + Duration::from_millis(50), &mut sink)
            .is_none());
        assert!(game
            .handle_move(Dir::North, t0 + Duration::from_millis(150), &mut sink)
            .is_some());
    }

    #[test]
    fn winning_reports_once() {
        let t0 = Instant::now();
        let mut game = Game::new(settings(), 2, t0).unwrap();
        let mut sink = Recorder::default();
        let path = path_to_goal(game.maze());
        let mut now = t0;
        for dir in &path {
            game.handle_move(*dir, now, &mut sink).unwrap();
            now += Duration::from_millis(200);
        }
        assert_eq!(game.state(), TraversalState::Won);
        assert_eq!(sink.calls, vec![(100, 100)]);

        game.handle_move(Dir::North, now, &mut sink);
        assert_eq!(sink.calls.len(), 1);
        assert_eq!(game.tick(now + Duration::from_secs(60)), TraversalState::Won);
    }

    #[test]
    fn clock_running_out_loses() {
        let t0 = Instant::now();
        let mut game = Game::new(settings(), 3, t0).unwrap();
        assert_eq!(game.tick(t0 + Duration::from_secs(5)), TraversalState::Idle);
        assert_eq!(game.tick(t0 + Duration::from_secs(10)), TraversalState::Lost);
        let mut sink = Recorder::default();
        let out = game
            .handle_move(Dir::East, t0 + Duration::from_secs(11), &mut sink)
            .unwrap();
        assert!(!out.moved);
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn next_level_builds_a_fresh_maze() {
        let t0 = Instant::now();
        let mut s = settings();
        s.size = None;
        let mut game = Game::new(s, 4, t0).unwrap();
        assert_eq!(game.maze().size(), 8);
        game.next_level(t0).unwrap();
        assert_eq!(game.level(), 2);
        assert_eq!(game.maze().size(), 10);
        assert_eq!(game.state(), TraversalState::Idle);
        assert_eq!(game.traversal().position(), Pos::new(0, 0));
    }

    #[test]
    fn invalid_size_is_rejected_up_front() {
        let mut s = settings();
        s.size = Some(1);
        assert!(matches!(
            Game::new(s, 0, Instant::now()),
            Err(MazeError::InvalidSize { size: 1 })
        ));
    }
}
