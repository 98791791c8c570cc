use crate::error::MazeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    North,
    East,
    South,
    West,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::North, Dir::East, Dir::South, Dir::West];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::North => (0, -1),
            Dir::East => (1, 0),
            Dir::South => (0, 1),
            Dir::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::North => Dir::South,
            Dir::East => Dir::West,
            Dir::South => Dir::North,
            Dir::West => Dir::East,
        }
    }

    fn index(self) -> usize {
        match self {
            Dir::North => 0,
            Dir::East => 1,
            Dir::South => 2,
            Dir::West => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// max(|dx|, |dy|)
    pub fn chebyshev(self, other: Pos) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    walls: [bool; 4],
}

impl Cell {
    fn closed() -> Self {
        Self { walls: [true; 4] }
    }

    pub fn has_wall(&self, dir: Dir) -> bool {
        self.walls[dir.index()]
    }

    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|w| **w).count()
    }
}

/// Square cell grid. Dimensions are fixed at construction and walls between
/// neighbours are only ever removed in matched pairs.
#[derive(Clone, Debug)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(size: usize) -> Result<Self, MazeError> {
        if size < 2 {
            return Err(MazeError::InvalidSize { size });
        }
        Ok(Self {
            size,
            cells: vec![Cell::closed(); size * size],
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    pub fn index(&self, pos: Pos) -> usize {
        pos.y * self.size + pos.x
    }

    pub fn pos_at(&self, idx: usize) -> Pos {
        Pos {
            x: idx % self.size,
            y: idx / self.size,
        }
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        if !self.contains(pos) {
            return None;
        }
        self.cells.get(self.index(pos))
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.cells.len()).map(|idx| self.pos_at(idx))
    }

    /// The in-bounds cell one step from `pos` in `dir`, if any.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x as isize + dx;
        let ny = pos.y as isize + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let next = Pos {
            x: nx as usize,
            y: ny as usize,
        };
        if self.contains(next) {
            Some(next)
        } else {
            None
        }
    }

    /// Out-of-bounds positions read as fully walled.
    pub fn has_wall(&self, pos: Pos, dir: Dir) -> bool {
        self.cell(pos).map_or(true, |c| c.has_wall(dir))
    }

    pub fn is_open(&self, pos: Pos, dir: Dir) -> bool {
        !self.has_wall(pos, dir)
    }

    /// Removes the wall between `pos` and its neighbour in `dir` on both sides.
    /// Returns false when the neighbour is out of bounds or the pair was
    /// already open.
    pub fn carve(&mut self, pos: Pos, dir: Dir) -> bool {
        if !self.contains(pos) {
            return false;
        }
        let Some(next) = self.neighbor(pos, dir) else {
            return false;
        };
        let a = self.index(pos);
        let b = self.index(next);
        if !self.cells[a].walls[dir.index()] {
            return false;
        }
        self.cells[a].walls[dir.index()] = false;
        self.cells[b].walls[dir.opposite().index()] = false;
        true
    }

    pub fn open_dirs(&self, pos: Pos) -> Vec<Dir> {
        Dir::ALL
            .iter()
            .copied()
            .filter(|d| self.neighbor(pos, *d).is_some() && self.is_open(pos, *d))
            .collect()
    }

    /// Number of open wall pairs. Each pair is counted once, from its
    /// east/south side.
    pub fn openings(&self) -> usize {
        let mut open = 0;
        for pos in self.positions() {
            for dir in [Dir::East, Dir::South] {
                if self.neighbor(pos, dir).is_some() && self.is_open(pos, dir) {
                    open += 1;
                }
            }
        }
        open
    }

    pub fn walls_symmetric(&self) -> bool {
        self.positions().all(|pos| {
            Dir::ALL.iter().all(|&dir| match self.neighbor(pos, dir) {
                Some(next) => self.has_wall(pos, dir) == self.has_wall(next, dir.opposite()),
                None => self.has_wall(pos, dir),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sizes_below_two() {
        assert!(matches!(Grid::new(0), Err(MazeError::InvalidSize { size: 0 })));
        assert!(matches!(Grid::new(1), Err(MazeError::InvalidSize { size: 1 })));
        assert!(Grid::new(2).is_ok());
    }

    #[test]
    fn new_grid_is_fully_walled() {
        let grid = Grid::new(4).unwrap();
        assert_eq!(grid.cell_count(), 16);
        assert_eq!(grid.openings(), 0);
        for pos in grid.positions() {
            assert_eq!(grid.cell(pos).unwrap().wall_count(), 4);
        }
    }

    #[test]
    fn carve_opens_both_sides() {
        let mut grid = Grid::new(3).unwrap();
        let a = Pos::new(1, 1);
        assert!(grid.carve(a, Dir::East));
        assert!(grid.is_open(a, Dir::East));
        assert!(grid.is_open(Pos::new(2, 1), Dir::West));
        assert_eq!(grid.openings(), 1);
        assert!(grid.walls_symmetric());

        // already open
        assert!(!grid.carve(Pos::new(2, 1), Dir::West));
        assert_eq!(grid.openings(), 1);
    }

    #[test]
    fn carve_never_crosses_the_border() {
        let mut grid = Grid::new(3).unwrap();
        assert!(!grid.carve(Pos::new(0, 0), Dir::North));
        assert!(!grid.carve(Pos::new(0, 0), Dir::West));
        assert!(!grid.carve(Pos::new(2, 2), Dir::East));
        assert!(grid.has_wall(Pos::new(0, 0), Dir::North));
        assert_eq!(grid.openings(), 0);
    }

    #[test]
    fn chebyshev_distance() {
        assert_eq!(Pos::new(5, 5).chebyshev(Pos::new(9, 9)), 4);
        assert_eq!(Pos::new(5, 5).chebyshev(Pos::new(7, 6)), 2);
        assert_eq!(Pos::new(0, 3).chebyshev(Pos::new(0, 3)), 0);
    }
}
