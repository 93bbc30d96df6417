//! Conway's Game of Life on a bounded square board, with a playback
//! controller that steps it on a timer.
//!
//! [`Board`] holds the cells and the generation rule. [`PlaybackController`]
//! owns a board, exposes play/stop/next/pause/resume through a fixed
//! transition table, and publishes the board, speed and button enablement
//! to any number of [`Subscription`]s.

mod board;
mod cell;
mod controller;
mod error;
mod observable;
pub mod patterns;
mod state;

pub use board::{Board, DEFAULT_BOARD_SIZE};
pub use cell::Cell;
pub use controller::{
    BASE_INTERVAL, DEFAULT_SPEED, PlaybackController, SPEED_RANGE, SpeedSink, tick_interval,
};
pub use error::{LifeError, Result};
pub use observable::{BACKLOG, Observable, Subscription};
pub use patterns::Preset;
pub use state::{Command, Effect, Enablement, PlaybackState};
