pub mod board {
    pub mod bitboard;
    pub mod position;
    pub mod zobrist;
}

pub mod movegen {
    pub mod magic;
    pub mod moves;
}

pub mod eval {
    pub mod evaluate;
    pub mod pst;
}

pub mod search {
    pub mod alphabeta;
    pub mod clock;
    pub mod transposition;
}

pub mod engine;
pub mod error;
pub mod perft;

pub use board::position::{Move, Piece, Position, Side, State};
pub use engine::{Engine, EngineConfig, SearchConfig, SearchReport};
pub use error::{EngineError, EngineResult};
pub use search::clock::ClockConfig;

// Attack and zobrist tables build lazily on first use; callers that care
// about first-move latency warm them up front.
pub fn init_tables() {
    movegen::magic::force_init();
    once_cell::sync::Lazy::force(&board::zobrist::ZOBRIST);
}
