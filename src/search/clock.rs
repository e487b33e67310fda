use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::board::position::Side;

const MAX_MOVETIME: Duration = Duration::from_secs(24 * 3600);
const MIN_MOVETIME: Duration = Duration::from_millis(350);
// Wake the waiter a little before the budget so the best completed
// iteration's move still reaches the caller within the budget.
const MOVETIME_MARGIN: Duration = Duration::from_millis(100);

const EXPECTED_GAME_MOVES: u64 = 40;
const INCREMENT_ACCUMULATION_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    Infinite,
    Movetime,
    GameTime,
    Depth,
    Nodes,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ClockConfig {
    pub white_ms: u64,
    pub black_ms: u64,
    pub white_inc_ms: u64,
    pub black_inc_ms: u64,
    pub movetime_ms: u64,
    pub depth: u8,
    pub nodes: u64,
}

// Translates a time/depth/node budget into stop predicates the search polls.
// A background waiter flips `done` when the movetime budget lapses or the
// external cancellation signal fires; the search reads it with a plain load.
pub struct Clock {
    mode: ClockMode,
    target_movetime: Duration,
    target_depth: u8,
    target_nodes: u64,
    started_at: Instant,
    done: Arc<AtomicBool>,
    stop_tx: Option<Sender<()>>,
    waiter: Option<JoinHandle<()>>,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            mode: ClockMode::Infinite,
            target_movetime: MAX_MOVETIME,
            target_depth: u8::MAX,
            target_nodes: u64::MAX,
            started_at: Instant::now(),
            done: Arc::new(AtomicBool::new(true)),
            stop_tx: None,
            waiter: None,
        }
    }

    pub fn start(&mut self, turn: Side, fullmove_number: u8, cfg: &ClockConfig, cancel: Arc<AtomicBool>) {
        self.stop();

        self.target_movetime = MAX_MOVETIME;
        self.target_depth = u8::MAX;
        self.target_nodes = u64::MAX;
        self.started_at = Instant::now();
        self.done = Arc::new(AtomicBool::new(false));

        if cfg.movetime_ms != 0 || cfg.white_ms != 0 || cfg.black_ms != 0 {
            if cfg.movetime_ms != 0 {
                self.mode = ClockMode::Movetime;
                self.target_movetime = Duration::from_millis(cfg.movetime_ms);
            } else {
                // Spread the remaining clock over the moves expected to be
                // left, plus the share of the increment not banked.
                self.mode = ClockMode::GameTime;
                let remaining = EXPECTED_GAME_MOVES.saturating_sub(fullmove_number as u64).max(1);
                let (time_ms, inc_ms) = match turn {
                    Side::White => (cfg.white_ms, cfg.white_inc_ms),
                    Side::Black => (cfg.black_ms, cfg.black_inc_ms),
                };
                let budget = time_ms as f64 / remaining as f64
                    + inc_ms as f64 * (1.0 - INCREMENT_ACCUMULATION_RATIO);
                self.target_movetime = Duration::from_millis(budget as u64);
            }
            if self.target_movetime < MIN_MOVETIME {
                self.target_movetime = MIN_MOVETIME;
            }
        } else if cfg.depth != 0 {
            self.mode = ClockMode::Depth;
            self.target_depth = cfg.depth;
        } else if cfg.nodes != 0 {
            self.mode = ClockMode::Nodes;
            self.target_nodes = cfg.nodes;
        } else {
            self.mode = ClockMode::Infinite;
        }

        let deadline = if self.is_timed() {
            Some(self.started_at + self.target_movetime.saturating_sub(MOVETIME_MARGIN))
        } else {
            None
        };

        let done = Arc::clone(&self.done);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        self.stop_tx = Some(stop_tx);
        self.waiter = Some(thread::spawn(move || {
            loop {
                if cancel.load(Ordering::Relaxed) {
                    break;
                }
                let step = match deadline {
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            break;
                        }
                        (deadline - now).min(Duration::from_millis(10))
                    }
                    None => Duration::from_millis(10),
                };
                match stop_rx.recv_timeout(step) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }
            done.store(true, Ordering::SeqCst);
        }));
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(waiter) = self.waiter.take() {
            let _ = waiter.join();
        }
    }

    #[inline(always)]
    pub fn done_by_movetime(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn done_by_depth(&self, depth: u8) -> bool {
        depth > self.target_depth
    }

    #[inline(always)]
    pub fn done_by_nodes(&self, nodes: u64) -> bool {
        nodes > self.target_nodes
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    fn is_timed(&self) -> bool {
        matches!(self.mode, ClockMode::Movetime | ClockMode::GameTime)
    }

    // The wall-clock allocation the iterative-deepening decay scales against;
    // None outside the timed modes.
    pub fn allocated_movetime(&self) -> Option<Duration> {
        if self.is_timed() {
            Some(self.target_movetime)
        } else {
            None
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
