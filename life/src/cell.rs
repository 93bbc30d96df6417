// cell.rs - Two-valued cell state

use serde::{Deserialize, Serialize};

use crate::error::LifeError;

/// A single cell. Serialized as its raw value: 1 alive, 0 dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Cell {
    #[default]
    Dead = 0,
    Alive = 1,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    pub fn toggled(self) -> Self {
        match self {
            Cell::Alive => Cell::Dead,
            Cell::Dead => Cell::Alive,
        }
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive { Cell::Alive } else { Cell::Dead }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        cell as u8
    }
}

impl TryFrom<u8> for Cell {
    type Error = LifeError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Cell::Dead),
            1 => Ok(Cell::Alive),
            other => Err(LifeError::InvalidCell(other)),
        }
    }
}
