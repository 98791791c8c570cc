use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::MazeError;
use crate::grid::{Dir, Grid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BraidReport {
    /// Cells drawn, `floor(fraction * N²)`.
    pub sampled: usize,
    /// Wall pairs actually removed.
    pub opened: usize,
}

pub fn validate_fraction(fraction: f64) -> Result<f64, MazeError> {
    if fraction.is_finite() && (0.0..=1.0).contains(&fraction) {
        Ok(fraction)
    } else {
        Err(MazeError::InvalidBraidFraction { fraction })
    }
}

/// Best-effort loop insertion over an already carved maze.
///
/// Samples `floor(fraction * N²)` cells with replacement and, for each, picks
/// one of the walls still standing on that cell. Border walls are candidates
/// too; picking one is a no-op, so small grids can open fewer pairs than
/// requested. Only openings are ever added, so connectivity is preserved.
pub fn braid(grid: &mut Grid, fraction: f64, rng: &mut impl Rng) -> Result<BraidReport, MazeError> {
    let fraction = validate_fraction(fraction)?;
    let sampled = (fraction * grid.cell_count() as f64).floor() as usize;
    let mut report = BraidReport {
        sampled,
        opened: 0,
    };

    let mut standing = Vec::with_capacity(4);
    for _ in 0..sampled {
        let pos = grid.pos_at(rng.gen_range(0..grid.cell_count()));
        standing.clear();
        standing.extend(Dir::ALL.iter().copied().filter(|d| grid.has_wall(pos, *d)));
        let Some(&dir) = standing.choose(rng) else {
            continue;
        };
        if grid.carve(pos, dir) {
            report.opened += 1;
        }
    }

    debug!(
        fraction,
        sampled = report.sampled,
        opened = report.opened,
        "braided maze"
    );
    Ok(report)
}
