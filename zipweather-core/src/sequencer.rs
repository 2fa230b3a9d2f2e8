//! Paces stage transitions so each one stays on screen for a minimum time.
//!
//! Requests are queued and applied strictly in order by a single drain task.
//! The first stage of a sequence is applied at once; every later one waits
//! until [`MIN_STAGE_DURATION`] has passed since the previous stage became
//! current, no matter how quickly the underlying work finished.

use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{
    sync::{broadcast, oneshot},
    task::JoinHandle,
    time::Instant,
};

use crate::stage::{Stage, StageBoard};

pub const MIN_STAGE_DURATION: Duration = Duration::from_millis(1500);

const EVENT_CAPACITY: usize = 32;

/// Notifications published to listeners, in the order they take effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    Shown,
    Hidden,
    Reset,
    Activated(Stage),
}

/// Completes once its stage has been made current.
///
/// Resolves to the instant of activation, or `None` when a reset discarded
/// the request before it was applied.
#[derive(Debug)]
#[must_use = "a stage handle does nothing unless awaited"]
pub struct StageHandle {
    rx: oneshot::Receiver<Instant>,
}

impl Future for StageHandle {
    type Output = Option<Instant>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

#[derive(Debug)]
struct StageRequest {
    stage: Stage,
    done: oneshot::Sender<Instant>,
}

#[derive(Debug)]
struct SequencerState {
    board: StageBoard,
    queue: VecDeque<StageRequest>,
    draining: bool,
    first_stage: bool,
    stage_started: Instant,
    // Bumped by every reset so a drain task from an abandoned sequence stops.
    generation: u64,
    drain_task: Option<JoinHandle<()>>,
}

impl SequencerState {
    fn new() -> Self {
        Self {
            board: StageBoard::default(),
            queue: VecDeque::new(),
            draining: false,
            first_stage: true,
            stage_started: Instant::now(),
            generation: 0,
            drain_task: None,
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<SequencerState>,
    min_duration: Duration,
    events: broadcast::Sender<StageEvent>,
}

/// Cheap to clone; clones share one queue and one board.
#[derive(Debug, Clone)]
pub struct StageSequencer {
    shared: Arc<Shared>,
}

impl Default for StageSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl StageSequencer {
    pub fn new() -> Self {
        Self::with_min_duration(MIN_STAGE_DURATION)
    }

    pub fn with_min_duration(min_duration: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SequencerState::new()),
                min_duration,
                events,
            }),
        }
    }

    /// Queue a transition to `stage`.
    ///
    /// Must be called from within a Tokio runtime: the first request of a
    /// burst spawns the drain task.
    pub fn request_stage(&self, stage: Stage) -> StageHandle {
        let (done, rx) = oneshot::channel();
        let mut state = self.shared.state.lock();

        state.queue.push_back(StageRequest { stage, done });
        tracing::trace!(%stage, queued = state.queue.len(), "stage requested");

        if !state.draining {
            state.draining = true;
            let generation = state.generation;
            let shared = Arc::clone(&self.shared);
            state.drain_task = Some(tokio::spawn(drain(shared, generation)));
        }

        StageHandle { rx }
    }

    /// Drop every queued request, cancel any pending wait and return to idle.
    pub fn reset(&self) {
        let mut state = self.shared.state.lock();

        state.generation = state.generation.wrapping_add(1);
        if let Some(task) = state.drain_task.take() {
            task.abort();
        }
        let discarded = state.queue.len();
        state.queue.clear();
        state.draining = false;
        state.first_stage = true;
        state.stage_started = Instant::now();
        state.board.clear();

        tracing::debug!(discarded, "stage sequence reset");
        let _ = self.shared.events.send(StageEvent::Reset);
    }

    /// Make the progress display visible, starting from a clean sequence.
    pub fn show(&self) {
        if self.is_showing() {
            return;
        }
        self.reset();

        let mut state = self.shared.state.lock();
        state.board.visible = true;
        state.stage_started = Instant::now();
        let _ = self.shared.events.send(StageEvent::Shown);
    }

    /// Hide the progress display. Queued requests keep draining.
    pub fn hide(&self) {
        let mut state = self.shared.state.lock();
        if !state.board.visible {
            return;
        }
        state.board.visible = false;
        let _ = self.shared.events.send(StageEvent::Hidden);
    }

    pub fn is_showing(&self) -> bool {
        self.shared.state.lock().board.visible
    }

    /// Snapshot of the current display state.
    pub fn board(&self) -> StageBoard {
        self.shared.state.lock().board.clone()
    }

    /// Requests queued but not yet picked up by the drain task.
    pub fn pending(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StageEvent> {
        self.shared.events.subscribe()
    }

    pub fn min_duration(&self) -> Duration {
        self.shared.min_duration
    }
}

async fn drain(shared: Arc<Shared>, generation: u64) {
    loop {
        let (request, wait) = {
            let mut state = shared.state.lock();
            if state.generation != generation {
                return;
            }
            let Some(request) = state.queue.pop_front() else {
                state.draining = false;
                state.drain_task = None;
                return;
            };
            let wait = if state.first_stage {
                Duration::ZERO
            } else {
                shared.min_duration.saturating_sub(state.stage_started.elapsed())
            };
            (request, wait)
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let activated_at = {
            let mut state = shared.state.lock();
            if state.generation != generation {
                return;
            }
            state.board.activate(request.stage);
            state.stage_started = Instant::now();
            state.first_stage = false;
            let _ = shared.events.send(StageEvent::Activated(request.stage));
            state.stage_started
        };

        tracing::debug!(stage = %request.stage, waited_ms = wait.as_millis() as u64, "stage activated");

        // The caller may have stopped waiting; that is fine.
        let _ = request.done.send(activated_at);
    }
}
