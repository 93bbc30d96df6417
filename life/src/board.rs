// board.rs - Square cell grid and the Conway generation rule

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::{LifeError, Result};

/// Board size used when no setting says otherwise.
pub const DEFAULT_BOARD_SIZE: usize = 20;

/// A `size` x `size` grid stored row-major (`index = y * size + x`).
///
/// The grid edge is hard: cells outside `[0, size)` do not exist and never
/// count as neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

/// Wire shape accepted on deserialization, validated into a [`Board`].
#[derive(Deserialize)]
struct RawBoard {
    size: i64,
    cells: Vec<u8>,
}

impl TryFrom<RawBoard> for Board {
    type Error = LifeError;

    fn try_from(raw: RawBoard) -> Result<Self> {
        let size = usize::try_from(raw.size).map_err(|_| LifeError::InvalidSize(raw.size))?;
        let cells = raw
            .cells
            .into_iter()
            .map(Cell::try_from)
            .collect::<Result<Vec<_>>>()?;
        Board::with_cells(size, cells)
    }
}

fn invalid_size(size: usize) -> LifeError {
    LifeError::InvalidSize(i64::try_from(size).unwrap_or(i64::MAX))
}

fn cell_count(size: usize) -> Result<usize> {
    size.checked_mul(size).ok_or_else(|| invalid_size(size))
}

/// `size * size` cells of `fill`. Allocation failure is an `InvalidSize`.
fn filled(size: usize, fill: Cell) -> Result<Vec<Cell>> {
    let len = cell_count(size)?;
    let mut cells = Vec::new();
    cells.try_reserve_exact(len).map_err(|_| invalid_size(size))?;
    cells.resize(len, fill);
    Ok(cells)
}

impl Board {
    /// All-dead board.
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self { size, cells: filled(size, Cell::Dead)? })
    }

    pub fn with_cells(size: usize, cells: Vec<Cell>) -> Result<Self> {
        if cells.len() != cell_count(size)? {
            return Err(LifeError::SizeMismatch { size, len: cells.len() });
        }
        Ok(Self { size, cells })
    }

    /// Every cell alive or dead with equal probability.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self> {
        let mut board = Board::new(size)?;
        board.randomize(rng);
        Ok(board)
    }

    /// Parses rows of `#` (alive) and `.` (dead). The row count must equal
    /// every row's width.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let size = rows.len();
        let len = rows.iter().map(|row| row.chars().count()).sum();
        if rows.iter().any(|row| row.chars().count() != size) {
            return Err(LifeError::SizeMismatch { size, len });
        }

        let mut cells = Vec::with_capacity(len);
        for ch in rows.iter().flat_map(|row| row.chars()) {
            cells.push(match ch {
                '#' => Cell::Alive,
                '.' => Cell::Dead,
                other => return Err(LifeError::InvalidGlyph(other)),
            });
        }
        Board::with_cells(size, cells)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_alive())
    }

    fn index(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.size || y >= self.size {
            return Err(LifeError::OutOfBounds { x, y, size: self.size });
        }
        Ok(y * self.size + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Result<Cell> {
        Ok(self.cells[self.index(x, y)?])
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) -> Result<()> {
        let index = self.index(x, y)?;
        self.cells[index] = cell;
        Ok(())
    }

    pub fn toggle(&mut self, x: usize, y: usize) -> Result<()> {
        let index = self.index(x, y)?;
        self.cells[index] = self.cells[index].toggled();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Dead);
    }

    /// Redraws every cell independently, 50/50 alive or dead. Size is kept.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in &mut self.cells {
            *cell = Cell::from(rng.gen_bool(0.5));
        }
    }

    /// Replaces size and cells together; the board is untouched on error.
    pub fn apply_cells(&mut self, size: usize, cells: Vec<Cell>) -> Result<()> {
        *self = Board::with_cells(size, cells)?;
        Ok(())
    }

    /// New board with `margin` cells of `fill` on every side and `self` centered.
    pub fn extended(&self, fill: Cell, margin: usize) -> Result<Board> {
        let size = margin
            .checked_mul(2)
            .and_then(|border| border.checked_add(self.size))
            .ok_or_else(|| LifeError::InvalidSize(i64::MAX))?;
        let mut cells = filled(size, fill)?;
        for (y, row) in self.cells.chunks(self.size.max(1)).enumerate() {
            let start = (y + margin) * size + margin;
            cells[start..start + row.len()].copy_from_slice(row);
        }
        Ok(Board { size, cells })
    }

    /// Live neighbors of (x, y) among the in-grid positions around it.
    fn live_neighbors(&self, x: usize, y: usize) -> usize {
        let last = self.size - 1;
        let mut count = 0;
        for ny in y.saturating_sub(1)..=(y + 1).min(last) {
            let row = &self.cells[ny * self.size..(ny + 1) * self.size];
            for nx in x.saturating_sub(1)..=(x + 1).min(last) {
                if (nx, ny) != (x, y) && row[nx].is_alive() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Advances one generation in place. Every cell is computed from the
    /// current grid; the result replaces it in a single swap.
    pub fn next_generation(&mut self) {
        if self.size == 0 {
            return;
        }

        let mut next = Vec::with_capacity(self.cells.len());
        for y in 0..self.size {
            for x in 0..self.size {
                let alive = self.cells[y * self.size + x].is_alive();
                next.push(Cell::from(matches!(
                    (alive, self.live_neighbors(x, y)),
                    (true, 2) | (true, 3) | (false, 3)
                )));
            }
        }
        self.cells = next;
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size.max(1)) {
            for cell in row {
                f.write_str(if cell.is_alive() { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn alive_at(size: usize, cells: &[(usize, usize)]) -> Board {
        let mut board = Board::new(size).unwrap();
        for &(x, y) in cells {
            board.set(x, y, Cell::Alive).unwrap();
        }
        board
    }

    #[test]
    fn empty_board_is_a_fixed_point() {
        for size in [0, 1, 2, 5, 17] {
            let mut board = Board::new(size).unwrap();
            board.next_generation();
            assert_eq!(board, Board::new(size).unwrap());
        }
    }

    #[test]
    fn isolated_cell_dies_anywhere() {
        for size in 1..6 {
            for y in 0..size {
                for x in 0..size {
                    let mut board = alive_at(size, &[(x, y)]);
                    board.next_generation();
                    assert!(board.is_empty(), "({x}, {y}) survived on size {size}");
                }
            }
        }
    }

    #[test]
    fn blinker_oscillates_with_period_two() {
        let vertical = alive_at(10, &[(4, 3), (4, 4), (4, 5)]);
        let horizontal = alive_at(10, &[(3, 4), (4, 4), (5, 4)]);

        let mut board = vertical.clone();
        board.next_generation();
        assert_eq!(board, horizontal);
        board.next_generation();
        assert_eq!(board, vertical);
    }

    #[test]
    fn corner_does_not_wrap() {
        let mut board = alive_at(3, &[(0, 0)]);
        board.next_generation();
        assert!(board.is_empty());

        // On a torus (2,2), (0,2) and (2,0) would all neighbor (0,0) and birth it.
        let mut board = alive_at(3, &[(2, 2), (0, 2), (2, 0)]);
        board.next_generation();
        assert_eq!(board.get(0, 0).unwrap(), Cell::Dead);
    }

    #[test]
    fn block_in_corner_is_still_life() {
        let block = alive_at(4, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let mut board = block.clone();
        board.next_generation();
        assert_eq!(board, block);
    }

    #[test]
    fn rule_reads_only_the_previous_generation() {
        // One glider step.
        let mut board = Board::from_rows(&[
            ".#..",
            "..#.",
            "###.",
            "....",
        ])
        .unwrap();
        board.next_generation();
        assert_eq!(
            board.to_string(),
            "....\n#.#.\n.##.\n.#..\n"
        );
    }

    #[test]
    fn toggle_twice_restores_every_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let original = Board::random(6, &mut rng).unwrap();
        for y in 0..6 {
            for x in 0..6 {
                let mut board = original.clone();
                board.toggle(x, y).unwrap();
                assert_ne!(board.get(x, y).unwrap(), original.get(x, y).unwrap());
                board.toggle(x, y).unwrap();
                assert_eq!(board, original);
            }
        }
    }

    #[test]
    fn toggle_touches_only_one_cell() {
        let mut board = Board::new(4).unwrap();
        board.toggle(3, 1).unwrap();
        assert_eq!(board.population(), 1);
        assert_eq!(board.get(3, 1).unwrap(), Cell::Alive);
    }

    #[test]
    fn out_of_bounds_access_is_rejected() {
        let mut board = Board::new(3).unwrap();
        assert_eq!(
            board.get(3, 0),
            Err(LifeError::OutOfBounds { x: 3, y: 0, size: 3 })
        );
        assert_eq!(
            board.toggle(0, 7),
            Err(LifeError::OutOfBounds { x: 0, y: 7, size: 3 })
        );
        assert!(board.is_empty());
    }

    #[test]
    fn unallocatable_size_is_an_error() {
        assert_eq!(
            Board::new(4_000_000_000),
            Err(LifeError::InvalidSize(4_000_000_000))
        );
        assert!(matches!(Board::new(usize::MAX), Err(LifeError::InvalidSize(_))));

        let board = Board::new(2).unwrap();
        assert!(matches!(
            board.extended(Cell::Dead, 2_000_000_000),
            Err(LifeError::InvalidSize(_))
        ));
    }

    #[test]
    fn mismatched_cells_are_rejected() {
        assert_eq!(
            Board::with_cells(3, vec![Cell::Dead; 8]),
            Err(LifeError::SizeMismatch { size: 3, len: 8 })
        );

        let mut board = alive_at(2, &[(1, 1)]);
        let before = board.clone();
        assert!(board.apply_cells(4, vec![Cell::Alive; 15]).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn apply_cells_replaces_size() {
        let mut board = Board::new(2).unwrap();
        board.apply_cells(3, vec![Cell::Alive; 9]).unwrap();
        assert_eq!(board.size(), 3);
        assert_eq!(board.population(), 9);
    }

    #[test]
    fn clear_keeps_size() {
        let mut board = Board::with_cells(3, vec![Cell::Alive; 9]).unwrap();
        board.clear();
        assert_eq!(board.size(), 3);
        assert!(board.is_empty());
    }

    #[test]
    fn extended_centers_original() {
        let board = Board::from_rows(&["#.", ".#"]).unwrap();
        let padded = board.extended(Cell::Alive, 1).unwrap();
        assert_eq!(padded.to_string(), "####\n##.#\n#.##\n####\n");
        assert_eq!(board.size(), 2);

        let same = board.extended(Cell::Dead, 0).unwrap();
        assert_eq!(same, board);
    }

    #[test]
    fn random_board_keeps_size_and_mixes_cells() {
        let mut rng = StdRng::seed_from_u64(42);
        let board = Board::random(32, &mut rng).unwrap();
        assert_eq!(board.cells().len(), 32 * 32);
        let population = board.population();
        assert!(population > 300 && population < 724, "population {population}");
    }

    #[test]
    fn serializes_cells_as_raw_integers() {
        let board = alive_at(2, &[(1, 0)]);
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"{"size":2,"cells":[0,1,0,0]}"#);
        assert_eq!(serde_json::from_str::<Board>(&json).unwrap(), board);
    }

    #[test]
    fn deserialization_validates_through_constructor() {
        let negative = serde_json::from_str::<Board>(r#"{"size":-1,"cells":[]}"#);
        assert!(negative.unwrap_err().to_string().contains("invalid board size -1"));

        let short = serde_json::from_str::<Board>(r#"{"size":2,"cells":[0,1,0]}"#);
        assert!(short.is_err());

        let bad_cell = serde_json::from_str::<Board>(r#"{"size":1,"cells":[2]}"#);
        assert!(bad_cell.unwrap_err().to_string().contains("raw cell value 2"));
    }

    #[test]
    fn rows_round_trip_through_display() {
        let rows = ["#..", ".#.", "..#"];
        let board = Board::from_rows(&rows).unwrap();
        assert_eq!(board.to_string(), "#..\n.#.\n..#\n");
        assert_eq!(
            Board::from_rows(&["#.", "."]),
            Err(LifeError::SizeMismatch { size: 2, len: 3 })
        );

        let bad_glyph = Board::from_rows(&["x"]).unwrap_err();
        assert_eq!(bad_glyph, LifeError::InvalidGlyph('x'));
        assert_eq!(bad_glyph.to_string(), "unexpected character 'x' in board text");
    }
}
