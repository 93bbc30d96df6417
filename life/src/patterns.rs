// patterns.rs - Bundled presets, each on a board of its own size

use crate::board::Board;
use crate::cell::Cell;
use crate::error::Result;

/// A named starting pattern. `cells` lists the alive positions as (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub size: usize,
    pub cells: &'static [(usize, usize)],
}

impl Preset {
    pub fn board(&self) -> Result<Board> {
        let mut board = Board::new(self.size)?;
        for &(x, y) in self.cells {
            board.set(x, y, Cell::Alive)?;
        }
        Ok(board)
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "Glider",
        size: 12,
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Preset {
        name: "Blinker",
        size: 5,
        cells: &[(2, 1), (2, 2), (2, 3)],
    },
    Preset {
        name: "Toad",
        size: 6,
        cells: &[(2, 2), (3, 2), (4, 2), (1, 3), (2, 3), (3, 3)],
    },
    Preset {
        name: "Beacon",
        size: 6,
        cells: &[(1, 1), (2, 1), (1, 2), (2, 2), (3, 3), (4, 3), (3, 4), (4, 4)],
    },
    Preset {
        name: "Pulsar",
        size: 17,
        cells: &[
            // Top half
            (4, 2), (5, 2), (6, 2), (10, 2), (11, 2), (12, 2),
            (2, 4), (7, 4), (9, 4), (14, 4),
            (2, 5), (7, 5), (9, 5), (14, 5),
            (2, 6), (7, 6), (9, 6), (14, 6),
            (4, 7), (5, 7), (6, 7), (10, 7), (11, 7), (12, 7),
            // Bottom half (mirrored)
            (4, 9), (5, 9), (6, 9), (10, 9), (11, 9), (12, 9),
            (2, 10), (7, 10), (9, 10), (14, 10),
            (2, 11), (7, 11), (9, 11), (14, 11),
            (2, 12), (7, 12), (9, 12), (14, 12),
            (4, 14), (5, 14), (6, 14), (10, 14), (11, 14), (12, 14),
        ],
    },
    Preset {
        name: "R-pentomino",
        size: 20,
        cells: &[(10, 10), (11, 10), (11, 9), (10, 11), (9, 11)],
    },
    Preset {
        name: "Gosper Glider Gun",
        size: 40,
        cells: &[
            (1, 5), (2, 5), (1, 6), (2, 6),
            (11, 5), (11, 6), (11, 7), (12, 4), (12, 8), (13, 3), (13, 9),
            (14, 3), (14, 9), (15, 6), (16, 4), (16, 8), (17, 5), (17, 6),
            (17, 7), (18, 6), (21, 3), (21, 4), (21, 5), (22, 3), (22, 4),
            (22, 5), (23, 2), (23, 6), (25, 1), (25, 2), (25, 6), (25, 7),
            (35, 3), (35, 4), (36, 3), (36, 4),
        ],
    },
];

/// Case-insensitive lookup by name.
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_fits_its_board() {
        for preset in PRESETS {
            let board = preset.board().unwrap();
            assert_eq!(board.size(), preset.size, "{}", preset.name);
            assert_eq!(board.population(), preset.cells.len(), "{}", preset.name);
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find("gosper glider gun").unwrap().name, "Gosper Glider Gun");
        assert!(find("spaceship").is_none());
    }

    #[test]
    fn oscillators_repeat() {
        for (name, period) in [("Blinker", 2), ("Toad", 2), ("Beacon", 2), ("Pulsar", 3)] {
            let start = find(name).unwrap().board().unwrap();
            let mut board = start.clone();
            board.next_generation();
            assert_ne!(board, start, "{name}");
            for _ in 1..period {
                board.next_generation();
            }
            assert_eq!(board, start, "{name}");
        }
    }
}
