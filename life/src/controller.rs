// controller.rs - Playback state machine driving one board on a repeating timer

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rand::Rng;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::error::{LifeError, Result};
use crate::observable::{Observable, Subscription};
use crate::patterns::Preset;
use crate::state::{Command, Effect, Enablement, PlaybackState};

/// Shortest tick interval, reached at full speed.
pub const BASE_INTERVAL: f64 = 0.05;
/// Extra interval added as speed drops to zero.
pub const SPEED_RANGE: f64 = 0.8;
pub const DEFAULT_SPEED: f64 = 0.5;

/// Timer period for a speed in `[0, 1]`.
pub fn tick_interval(speed: f64) -> Duration {
    Duration::from_secs_f64(BASE_INTERVAL + (1.0 - speed.clamp(0.0, 1.0)) * SPEED_RANGE)
}

/// Receives the speed every time it changes. Fire and forget.
pub trait SpeedSink: Send {
    fn store(&mut self, speed: f64);
}

impl<F: FnMut(f64) + Send> SpeedSink for F {
    fn store(&mut self, speed: f64) {
        self(speed)
    }
}

/// Aborts the task when dropped.
#[derive(Debug)]
struct TaskGuard(JoinHandle<()>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Debug)]
struct Timer {
    id: u64,
    _task: TaskGuard,
}

struct Inner {
    state: Observable<PlaybackState>,
    can_play: Observable<bool>,
    can_stop: Observable<bool>,
    can_next: Observable<bool>,
    board: Observable<Board>,
    speed: Observable<f64>,
    generation: Observable<u64>,
    speed_sink: Option<Box<dyn SpeedSink>>,
    timer: Option<Timer>,
    timers_started: u64,
    size_watch: Option<TaskGuard>,
}

impl Inner {
    fn publish_enablement(&mut self) {
        let enablement = Enablement::of(*self.state.get());
        self.can_play.set(enablement.can_play);
        self.can_stop.set(enablement.can_stop);
        self.can_next.set(enablement.can_next);
    }

    fn advance(&mut self) {
        self.board.update(Board::next_generation);
        self.generation.update(|generation| *generation += 1);
    }

    fn replace_board(&mut self, board: Board) {
        self.board.set(board);
        self.generation.set(0);
    }

    /// Whether `id` still names the live timer.
    fn owns_timer(&self, id: u64) -> bool {
        self.timer.as_ref().is_some_and(|timer| timer.id == id)
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    // Every critical section leaves `Inner` consistent, so a panic elsewhere
    // does not invalidate it.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn checked_speed(speed: f64) -> Result<f64> {
    if speed.is_nan() {
        return Err(LifeError::InvalidSpeed(speed));
    }
    let clamped = speed.clamp(0.0, 1.0);
    if clamped != speed {
        warn!(speed, clamped, "speed outside [0, 1], clamping");
    }
    Ok(clamped)
}

/// Owns one board and the play/stop/next/pause/resume state machine.
///
/// Cloning yields another handle to the same controller. Commands are
/// serialized on an internal lock; ticks from the timer take the same lock,
/// so once `stop` or `pause` returns no further generation is applied.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Mutex<Inner>>,
    runtime: Handle,
}

impl PlaybackController {
    /// Starts `Stopped`. The timer runs on `runtime`.
    pub fn new(runtime: Handle, board: Board, speed: f64) -> Self {
        let speed = checked_speed(speed).unwrap_or_else(|err| {
            warn!(%err, "falling back to default speed");
            DEFAULT_SPEED
        });
        let state = PlaybackState::default();
        let enablement = Enablement::of(state);

        let inner = Inner {
            state: Observable::new(state),
            can_play: Observable::new(enablement.can_play),
            can_stop: Observable::new(enablement.can_stop),
            can_next: Observable::new(enablement.can_next),
            board: Observable::new(board),
            speed: Observable::new(speed),
            generation: Observable::new(0),
            speed_sink: None,
            timer: None,
            timers_started: 0,
            size_watch: None,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            runtime,
        }
    }

    pub fn with_speed_sink(self, sink: impl SpeedSink + 'static) -> Self {
        lock(&self.inner).speed_sink = Some(Box::new(sink));
        self
    }

    /// Resets the board to an empty one whenever `sizes` yields a new size.
    ///
    /// Values already queued are applied before this returns; later ones are
    /// picked up by a task on the controller's runtime.
    pub fn follow_board_size(&self, mut sizes: Subscription<usize>) {
        if let Some(size) = sizes.latest() {
            if let Err(err) = self.resize_board(size) {
                warn!(%err, size, "ignoring board size setting");
            }
        }

        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        let task = self.runtime.spawn(async move {
            while let Some(size) = sizes.recv().await {
                let Some(shared) = weak.upgrade() else { break };
                if let Err(err) = resize(&mut lock(&shared), size) {
                    warn!(%err, size, "ignoring board size setting");
                }
            }
        });
        lock(&self.inner).size_watch = Some(TaskGuard(task));
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    // -- State machine --------------------------------------------------------

    pub fn play(&self) -> Result<()> {
        self.execute(Command::Play)
    }

    pub fn stop(&self) -> Result<()> {
        self.execute(Command::Stop)
    }

    pub fn next(&self) -> Result<()> {
        self.execute(Command::Next)
    }

    pub fn pause(&self) -> Result<()> {
        self.execute(Command::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.execute(Command::Resume)
    }

    /// Runs `command` through the transition table.
    ///
    /// A command the current state does not accept is logged and returned as
    /// [`LifeError::InvalidCommand`]; nothing changes.
    pub fn execute(&self, command: Command) -> Result<()> {
        let mut inner = self.lock();
        let state = *inner.state.get();

        let Some((next, effect)) = state.transition(command) else {
            warn!(%state, %command, "command not available, ignoring");
            return Err(LifeError::InvalidCommand { state, command });
        };
        debug!(%state, %command, %next, ?effect, "transition");

        if effect == Effect::StopTimer {
            inner.timer = None;
        }
        inner.state.set(next);
        inner.publish_enablement();

        match effect {
            Effect::StartTimer => self.start_timer(&mut inner),
            Effect::Advance => inner.advance(),
            Effect::StopTimer | Effect::Nothing => {}
        }
        Ok(())
    }

    fn start_timer(&self, inner: &mut Inner) {
        let period = tick_interval(*inner.speed.get());
        inner.timers_started += 1;
        let id = inner.timers_started;
        let weak = Arc::downgrade(&self.inner);

        let first = Instant::now() + period;

        let task = self.runtime.spawn(async move {
            let mut ticks = time::interval_at(first, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let Some(shared) = weak.upgrade() else { break };
                let mut inner = lock(&shared);
                // A stop may have won the lock while this tick was waiting.
                if !inner.owns_timer(id) {
                    break;
                }
                inner.advance();
                debug!(generation = *inner.generation.get(), "tick");
            }
        });

        debug!(id, ?period, "timer started");
        inner.timer = Some(Timer { id, _task: TaskGuard(task) });
    }

    // -- Board edits, valid in any state --------------------------------------

    /// Flips one cell. Does not interrupt playback.
    pub fn toggle_cell(&self, x: usize, y: usize) -> Result<()> {
        let mut inner = self.lock();
        inner.board.get().get(x, y)?;
        inner.board.update(|board| board.toggle(x, y))
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.board.update(Board::clear);
        inner.generation.set(0);
    }

    pub fn randomize(&self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    pub fn randomize_with<R: Rng + ?Sized>(&self, rng: &mut R) {
        let mut inner = self.lock();
        inner.board.update(|board| board.randomize(rng));
        inner.generation.set(0);
        info!(population = inner.board.get().population(), "board randomized");
    }

    pub fn load_preset(&self, preset: &Preset) -> Result<()> {
        let board = preset.board()?;
        info!(preset = preset.name, size = board.size(), "loading preset");
        self.load_board(board);
        Ok(())
    }

    /// Replaces size and cells with `board`'s.
    pub fn load_board(&self, board: Board) {
        let mut inner = self.lock();
        info!(size = board.size(), population = board.population(), "loading board");
        inner.replace_board(board);
    }

    /// Replaces the board with an empty one of `size`; the old pattern is lost.
    pub fn resize_board(&self, size: usize) -> Result<()> {
        resize(&mut self.lock(), size)
    }

    /// Takes effect the next time the timer starts.
    ///
    /// The speed sink runs after the controller lock is released, so it may
    /// call back into the controller. A change made from inside the sink is
    /// applied but not passed to the sink again.
    pub fn change_speed(&self, speed: f64) -> Result<()> {
        let speed = checked_speed(speed)?;
        let mut sink = {
            let mut inner = self.lock();
            inner.speed.set(speed);
            inner.speed_sink.take()
        };
        debug!(speed, "speed changed");

        if let Some(sink) = sink.as_mut() {
            sink.store(speed);
        }
        if sink.is_some() {
            let mut inner = self.lock();
            if inner.speed_sink.is_none() {
                inner.speed_sink = sink;
            }
        }
        Ok(())
    }

    // -- Snapshots -------------------------------------------------------------

    pub fn state(&self) -> PlaybackState {
        *self.lock().state.get()
    }

    pub fn enablement(&self) -> Enablement {
        Enablement::of(self.state())
    }

    pub fn board(&self) -> Board {
        self.lock().board.get().clone()
    }

    pub fn speed(&self) -> f64 {
        *self.lock().speed.get()
    }

    /// Generations advanced since the board was last replaced or cleared.
    pub fn generation(&self) -> u64 {
        *self.lock().generation.get()
    }

    // -- Observers -------------------------------------------------------------

    pub fn observe_board(&self) -> Subscription<Board> {
        self.lock().board.subscribe()
    }

    pub fn observe_speed(&self) -> Subscription<f64> {
        self.lock().speed.subscribe()
    }

    pub fn observe_can_play(&self) -> Subscription<bool> {
        self.lock().can_play.subscribe()
    }

    pub fn observe_can_stop(&self) -> Subscription<bool> {
        self.lock().can_stop.subscribe()
    }

    pub fn observe_can_next(&self) -> Subscription<bool> {
        self.lock().can_next.subscribe()
    }

    pub fn observe_state(&self) -> Subscription<PlaybackState> {
        self.lock().state.subscribe()
    }

    pub fn observe_generation(&self) -> Subscription<u64> {
        self.lock().generation.subscribe()
    }
}

fn resize(inner: &mut Inner, size: usize) -> Result<()> {
    let board = Board::new(size)?;
    info!(size, "board resized, pattern discarded");
    inner.replace_board(board);
    Ok(())
}
