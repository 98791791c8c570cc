use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::grid::{Dir, Grid, Pos};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CarveStats {
    pub pushes: usize,
    pub pops: usize,
}

/// Carves a perfect maze into a fully walled grid with an iterative
/// depth-first backtracker starting at `start`.
///
/// The visited set lives only for the duration of the carve. Every cell is
/// pushed and popped exactly once, leaving `N² - 1` openings.
pub fn carve(grid: &mut Grid, start: Pos, rng: &mut impl Rng) -> CarveStats {
    let mut stats = CarveStats::default();
    if !grid.contains(start) {
        return stats;
    }
    let mut visited = vec![false; grid.cell_count()];
    let mut stack = Vec::with_capacity(grid.cell_count());

    visited[grid.index(start)] = true;
    stack.push(start);
    stats.pushes += 1;

    let mut options = Vec::with_capacity(4);
    while let Some(&current) = stack.last() {
        options.clear();
        for dir in Dir::ALL {
            if let Some(next) = grid.neighbor(current, dir) {
                if !visited[grid.index(next)] {
                    options.push((dir, next));
                }
            }
        }

        match options.choose(rng) {
            Some(&(dir, next)) => {
                grid.carve(current, dir);
                visited[grid.index(next)] = true;
                stack.push(next);
                stats.pushes += 1;
            }
            None => {
                stack.pop();
                stats.pops += 1;
            }
        }
    }

    debug!(
        size = grid.size(),
        pushes = stats.pushes,
        pops = stats.pops,
        "carved perfect maze"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn pushes_and_pops_every_cell_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = Grid::new(6).unwrap();
        let stats = carve(&mut grid, Pos::new(0, 0), &mut rng);
        assert_eq!(stats, CarveStats { pushes: 36, pops: 36 });
        assert_eq!(grid.openings(), 35);
    }

    #[test]
    fn five_by_five_has_twenty_four_openings() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut grid = Grid::new(5).unwrap();
            carve(&mut grid, Pos::new(0, 0), &mut rng);
            assert_eq!(grid.openings(), 24, "seed {seed}");
            assert!(grid.walls_symmetric());
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let mut a = Grid::new(9).unwrap();
        let mut b = Grid::new(9).unwrap();
        carve(&mut a, Pos::new(0, 0), &mut StdRng::seed_from_u64(42));
        carve(&mut b, Pos::new(0, 0), &mut StdRng::seed_from_u64(42));
        for pos in a.positions() {
            assert_eq!(a.cell(pos), b.cell(pos));
        }
    }

    #[test]
    fn start_can_be_any_cell() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = Grid::new(4).unwrap();
        let stats = carve(&mut grid, Pos::new(2, 3), &mut rng);
        assert_eq!(stats.pushes, 16);
        assert_eq!(grid.openings(), 15);
    }
}
