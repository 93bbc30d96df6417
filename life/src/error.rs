// error.rs - Error taxonomy shared by the board and the playback controller

use thiserror::Error;

use crate::state::{Command, PlaybackState};

pub type Result<T> = std::result::Result<T, LifeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifeError {
    /// Negative size, or a side length whose cells cannot be allocated.
    #[error("invalid board size {0}")]
    InvalidSize(i64),

    #[error("cell sequence of length {len} does not match a {size}x{size} board")]
    SizeMismatch { size: usize, len: usize },

    #[error("cell ({x}, {y}) is outside a {size}x{size} board")]
    OutOfBounds { x: usize, y: usize, size: usize },

    #[error("raw cell value {0} is neither 0 nor 1")]
    InvalidCell(u8),

    #[error("unexpected character {0:?} in board text")]
    InvalidGlyph(char),

    #[error("speed must be a number, got {0}")]
    InvalidSpeed(f64),

    #[error("`{command}` is not available while {state}")]
    InvalidCommand {
        state: PlaybackState,
        command: Command,
    },
}
