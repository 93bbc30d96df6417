// state.rs - Playback modes and the (state, command) transition table

use std::fmt;

/// Playback mode. The controller starts `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// Commands that go through the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Play,
    Stop,
    Next,
    Pause,
    Resume,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Play,
        Command::Stop,
        Command::Next,
        Command::Pause,
        Command::Resume,
    ];
}

/// Side effect the controller performs when a transition is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartTimer,
    StopTimer,
    Advance,
    Nothing,
}

impl PlaybackState {
    /// `None` means the command has no meaning in this state.
    pub const fn transition(self, command: Command) -> Option<(PlaybackState, Effect)> {
        use Command::*;
        use PlaybackState::*;

        match (self, command) {
            (Stopped, Play) => Some((Running, Effect::StartTimer)),
            (Stopped, Next) => Some((Stopped, Effect::Advance)),
            // Documented no-ops.
            (Stopped, Pause | Resume) => Some((Stopped, Effect::Nothing)),
            (Stopped, Stop) => None,

            (Running, Stop) => Some((Stopped, Effect::StopTimer)),
            (Running, Pause) => Some((Paused, Effect::StopTimer)),
            (Running, Play | Next | Resume) => None,

            (Paused, Resume) => Some((Running, Effect::StartTimer)),
            (Paused, Play | Stop | Next | Pause) => None,
        }
    }

    pub const fn accepts(self, command: Command) -> bool {
        self.transition(command).is_some()
    }
}

/// Which of the user-facing buttons the current state allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enablement {
    pub can_play: bool,
    pub can_stop: bool,
    pub can_next: bool,
}

impl Enablement {
    pub const fn of(state: PlaybackState) -> Self {
        Self {
            can_play: state.accepts(Command::Play),
            can_stop: state.accepts(Command::Stop),
            can_next: state.accepts(Command::Next),
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Running => "running",
            PlaybackState::Paused => "paused",
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Command::Play => "play",
            Command::Stop => "stop",
            Command::Next => "next",
            Command::Pause => "pause",
            Command::Resume => "resume",
        })
    }
}
