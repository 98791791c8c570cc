use std::io::{self, Write};
use std::time::Instant;

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::game::{Game, ScoreBoard};
use crate::grid::{Dir, Pos};
use crate::maze::Maze;
use crate::traversal::{Traversal, TraversalState};

const CELL_W: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tile {
    Wall,
    Floor,
}

/// Expands the cell grid into a `(2N+1)²` tile map: cells on odd
/// coordinates, walls and corners on even ones.
fn tiles(maze: &Maze) -> Vec<Vec<Tile>> {
    let grid = maze.grid();
    let side = grid.size() * 2 + 1;
    let mut out = vec![vec![Tile::Wall; side]; side];
    for pos in grid.positions() {
        let tx = pos.x * 2 + 1;
        let ty = pos.y * 2 + 1;
        out[ty][tx] = Tile::Floor;
        if grid.neighbor(pos, Dir::East).is_some() && grid.is_open(pos, Dir::East) {
            out[ty][tx + 1] = Tile::Floor;
        }
        if grid.neighbor(pos, Dir::South).is_some() && grid.is_open(pos, Dir::South) {
            out[ty + 1][tx] = Tile::Floor;
        }
    }
    out
}

fn tile_pos(tx: usize, ty: usize) -> Option<Pos> {
    if tx % 2 == 1 && ty % 2 == 1 {
        Some(Pos::new(tx / 2, ty / 2))
    } else {
        None
    }
}

/// Plain-text picture of a maze: `#` walls, `S` start, `G` goal and an
/// optional `@` for the player.
pub fn ascii(maze: &Maze, player: Option<Pos>) -> String {
    let map = tiles(maze);
    let mut out = String::with_capacity(map.len() * (map.len() + 1));
    for (ty, row) in map.iter().enumerate() {
        for (tx, tile) in row.iter().enumerate() {
            let ch = match (tile_pos(tx, ty), tile) {
                (Some(pos), _) if Some(pos) == player => '@',
                (Some(pos), _) if pos == maze.goal() => 'G',
                (Some(pos), _) if pos == maze.start() => 'S',
                (_, Tile::Wall) => '#',
                (_, Tile::Floor) => ' ',
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

/// Cells whose picture a tile is part of. Walls belong to both sides,
/// corners to up to four cells.
fn owners(tx: usize, ty: usize, size: usize) -> impl Iterator<Item = Pos> {
    fn span(t: usize, size: usize) -> Vec<usize> {
        if t % 2 == 1 {
            vec![t / 2]
        } else {
            let mut v = Vec::with_capacity(2);
            if t / 2 >= 1 {
                v.push(t / 2 - 1);
            }
            if t / 2 < size {
                v.push(t / 2);
            }
            v
        }
    }
    let xs = span(tx, size);
    let ys = span(ty, size);
    ys.into_iter()
        .flat_map(move |y| xs.clone().into_iter().map(move |x| Pos::new(x, y)))
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Goal,
    Wall,
    Floor,
    Hidden,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

fn cell_for(traversal: &Traversal, map: &[Vec<Tile>], tx: usize, ty: usize) -> Cell {
    let maze = traversal.maze();
    let visible = owners(tx, ty, maze.size()).any(|p| traversal.is_visible(p));
    if !visible {
        return Cell {
            glyph: Glyph::Hidden,
            color: Color::DarkGrey,
        };
    }
    match tile_pos(tx, ty) {
        Some(pos) if pos == traversal.position() => Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        },
        Some(pos) if pos == maze.goal() => Cell {
            glyph: Glyph::Goal,
            color: Color::Green,
        },
        _ => match map[ty][tx] {
            Tile::Wall => Cell {
                glyph: Glyph::Wall,
                color: Color::Blue,
            },
            Tile::Floor => Cell {
                glyph: Glyph::Floor,
                color: Color::Reset,
            },
        },
    }
}

/// Diffing terminal renderer; only cells that changed since the last frame
/// are written.
pub struct Renderer {
    map: Vec<Vec<Tile>>,
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(maze: &Maze) -> Self {
        let map = tiles(maze);
        let side = map.len();
        Self {
            map,
            last: vec![
                Cell {
                    glyph: Glyph::Floor,
                    color: Color::Reset,
                };
                side * side
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Call after the maze has been replaced.
    pub fn reset(&mut self, out: &mut impl Write, maze: &Maze) -> io::Result<()> {
        *self = Renderer::new(maze);
        out.queue(Clear(ClearType::All))?;
        Ok(())
    }

    fn side(&self) -> usize {
        self.map.len()
    }

    pub fn render(
        &mut self,
        out: &mut impl Write,
        game: &Game,
        scores: &ScoreBoard,
        now: Instant,
    ) -> io::Result<()> {
        let side = self.side();
        let needed_h = (side + 2) as u16;
        let needed_w = (side * CELL_W) as u16;

        out.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            out.queue(Print(msg))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }

        let hud = hud_line(game, scores, now);
        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&hud))?;
            out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        let traversal = game.traversal();
        for ty in 0..side {
            for tx in 0..side {
                let cell = cell_for(traversal, &self.map, tx, ty);
                let idx = ty * side + tx;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(out, tx, ty, cell)?;
                }
            }
        }
        self.needs_full = false;

        out.flush()?;
        Ok(())
    }

    fn draw_cell(&self, out: &mut impl Write, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "😃",
            Glyph::Goal => "🏁",
            Glyph::Wall => "██",
            Glyph::Floor => "  ",
            Glyph::Hidden => "░░",
        };
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        out.queue(MoveTo(x_pos, y_pos))?;
        out.queue(SetForegroundColor(cell.color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                out.queue(Print(' '))?;
            }
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

fn hud_line(game: &Game, scores: &ScoreBoard, now: Instant) -> String {
    let state = game.state();
    let hint = match state {
        TraversalState::Won => "n: next level",
        TraversalState::Lost => "r: retry",
        _ => "q to quit",
    };
    format!(
        "Level: {}  Moves: {}  Best: {}  Time: {}s  Score: {}/{}  [{}]  ({})",
        game.level(),
        game.traversal().moves(),
        game.shortest(),
        game.time_left(now).as_secs(),
        scores.total,
        scores.best_possible,
        state.name(),
        hint
    )
}
