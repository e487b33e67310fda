use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use crate::board::position::{Move, Position};
use crate::error::{EngineError, EngineResult};
use crate::eval::evaluate::evaluate;
use crate::movegen::moves::generate_pseudo_legal;
use crate::search::alphabeta::{PVLine, Searcher, HISTORY_SIZE, INFINITY, MATE_SCORE};
use crate::search::clock::{Clock, ClockConfig};
use crate::search::transposition::{TranspositionTable, DEFAULT_HASH_MB};

// Stable best moves shrink the remaining allocation geometrically; a score
// swing resets it.
const DECAY_STEP: f64 = 0.95;
const DECAY_SWING_NORM: f64 = 0.75;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub hash_mb: usize,
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: DEFAULT_HASH_MB,
            debug: false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct SearchConfig {
    pub clock: ClockConfig,
}

// One completed iteration, streamed to the caller's info sink.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub depth: u8,
    pub score: i32,
    pub time_ms: u64,
    pub nodes: u64,
    pub nps: u64,
    pub pv: Vec<Move>,
}

impl SearchReport {
    // Wire form: info depth <d> score <cp N | mate +-N> time <ms> nodes <n>
    // nps <n> pv <move...>
    pub fn to_uci_line(&self) -> String {
        format!(
            "info depth {} score {} time {} nodes {} nps {} pv {}",
            self.depth,
            self.score_text(),
            self.time_ms,
            self.nodes,
            self.nps,
            self.pv_text(),
        )
    }

    pub fn to_debug_line(&self) -> String {
        let score = if self.score.abs() >= MATE_SCORE {
            format!("#{}{}", if self.score > 0 { "+" } else { "-" }, self.mate_in())
        } else {
            format!("{:+.2}", self.score as f64 / 100.0)
        };
        format!(
            "depth:{} [{}] nodes:{} ({}n/s) t:{}ms\n    {}",
            self.depth, score, self.nodes, self.nps, self.time_ms, self.pv_text(),
        )
    }

    fn score_text(&self) -> String {
        if self.score >= MATE_SCORE {
            format!("mate {}", self.mate_in())
        } else if self.score <= -MATE_SCORE {
            format!("mate -{}", self.mate_in())
        } else {
            format!("cp {}", self.score)
        }
    }

    fn mate_in(&self) -> usize {
        self.pv.len() / 2 + 1
    }

    fn pv_text(&self) -> String {
        self.pv
            .iter()
            .map(|mv| mv.to_text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// The dispatcher: owns the transposition table and the repetition history,
// binds search + clock to an external cancellation signal and an info sink.
pub struct Engine {
    tt: TranspositionTable,
    tt_age: u16,
    history: [u64; HISTORY_SIZE],
    debug: bool,
}

impl Engine {
    pub fn new(cfg: &EngineConfig) -> Self {
        Self {
            tt: TranspositionTable::new(cfg.hash_mb),
            tt_age: 0,
            history: [0; HISTORY_SIZE],
            debug: cfg.debug,
        }
    }

    // Rebuilds the hash table and forgets the game history; used between
    // games and on option changes.
    pub fn reset(&mut self, cfg: &EngineConfig) {
        self.tt = TranspositionTable::new(cfg.hash_mb);
        self.tt_age = 0;
        self.history = [0; HISTORY_SIZE];
        self.debug = cfg.debug;
    }

    pub fn new_position(&mut self, descriptor: &str) -> EngineResult<Position> {
        let pos = Position::from_descriptor(descriptor)?;
        self.history = [0; HISTORY_SIZE];
        self.history[pos.ply() as usize & (HISTORY_SIZE - 1)] = pos.hash();
        Ok(pos)
    }

    // Resolves and plays a long-algebraic move; the position is untouched
    // when the text does not name a legal move.
    pub fn apply_text_move(&mut self, pos: &mut Position, text: &str) -> EngineResult<Move> {
        let mv = pos.parse_move(text)?;
        if !generate_pseudo_legal(pos).contains(&mv) {
            return Err(EngineError::InvalidMoveText(text.to_string()));
        }
        let (undo, legal) = pos.apply(&mv);
        if !legal {
            pos.revert(&mv, undo);
            return Err(EngineError::InvalidMoveText(text.to_string()));
        }
        self.history[pos.ply() as usize & (HISTORY_SIZE - 1)] = pos.hash();
        Ok(mv)
    }

    pub fn evaluate(&self, pos: &Position) -> i32 {
        evaluate(pos, pos.side_to_move())
    }

    // Iterative deepening driver. Streams one report per completed depth
    // through `info`, honors the clock and the external cancellation signal
    // at node granularity, and returns the best completed iteration's move.
    pub fn search(
        &mut self,
        pos: &mut Position,
        cfg: &SearchConfig,
        cancel: Arc<AtomicBool>,
        info: &mut dyn FnMut(&str),
    ) -> EngineResult<Move> {
        let mut clock = Clock::new();
        clock.start(pos.side_to_move(), pos.fullmove_number(), &cfg.clock, cancel);
        self.tt_age = self.tt_age.wrapping_add(1);

        let root_side = pos.side_to_move();
        let mut searcher =
            Searcher::new(&mut self.tt, self.tt_age, &clock, root_side, self.history);

        let started = Instant::now();
        let debug = self.debug;
        let mut best: Option<Move> = None;
        let mut prev_score = 0i32;
        let mut decay = 1.0f64;
        let mut depth = 1u8;

        loop {
            let nodes_before = searcher.nodes;
            let mut pvl = PVLine::new();
            let score = searcher.negamax(pos, &mut pvl, depth as i32, 0, -INFINITY, INFINITY);

            // An interrupted iteration is discarded wholesale.
            if clock.done_by_movetime() || clock.done_by_nodes(searcher.nodes) {
                break;
            }
            let Some(best_of_iter) = pvl.first() else {
                break;
            };

            let stable = best == Some(best_of_iter);
            best = Some(best_of_iter);
            searcher.root_pv_move = Some(best_of_iter);

            let elapsed = started.elapsed();
            let time_ms = elapsed.as_millis() as u64;
            let nodes = searcher.nodes - nodes_before;
            let report = SearchReport {
                depth,
                score,
                time_ms,
                nodes,
                nps: (nodes as u128 * 1_000_000_000 / (elapsed.as_nanos() + 1)) as u64,
                pv: pvl.moves().to_vec(),
            };
            if debug {
                info(&report.to_debug_line());
            } else {
                info(&report.to_uci_line());
            }

            if score == MATE_SCORE {
                break;
            }

            if let Some(allocated) = clock.allocated_movetime() {
                if stable {
                    let swing = (score - prev_score).abs() as f64
                        / prev_score.abs().max(1) as f64
                        / DECAY_SWING_NORM;
                    decay = decay * DECAY_STEP * swing.clamp(DECAY_STEP, 1.0);
                } else {
                    decay = 1.0;
                }
                if started.elapsed().as_secs_f64() > allocated.as_secs_f64() * decay {
                    break;
                }
            }
            prev_score = score;

            if depth == u8::MAX || clock.done_by_depth(depth + 1) {
                break;
            }
            depth += 1;
        }

        clock.stop();
        best.ok_or(EngineError::CannotResolveMove)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
