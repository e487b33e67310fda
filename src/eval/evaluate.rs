use super::pst::PHASE_TOTAL;
use crate::board::position::{Piece, Position, Side};

pub const BISHOP_PAIR_BONUS: i32 = 50;
pub const TEMPO_BONUS: i32 = 20;

// Static score in centipawns from the perspective of the side to move,
// computed purely from the incremental accumulators: material and tapered
// piece-square sums, the bishop pair, and a midgame-only tempo bonus that
// damps leaf-parity oscillation. `root_side` is the side to move at the
// search root.
pub fn evaluate(pos: &Position, root_side: Side) -> i32 {
    let us = pos.side_to_move();
    let them = us.opposite();

    let material = pos.material(us) - pos.material(them);
    let bishop_pair = bishop_pair_term(pos, us) - bishop_pair_term(pos, them);

    let mut mg = material + pos.psq_mg(us) - pos.psq_mg(them) + bishop_pair;
    let eg = material + pos.psq_eg(us) - pos.psq_eg(them) + bishop_pair;

    if us == root_side {
        mg += TEMPO_BONUS;
    }

    let phase = (pos.phase() as i32).min(PHASE_TOTAL);
    (mg * phase + eg * (PHASE_TOTAL - phase)) / PHASE_TOTAL
}

#[inline(always)]
fn bishop_pair_term(pos: &Position, side: Side) -> i32 {
    if pos.bitboard(side, Piece::Bishop).count_ones() >= 2 {
        BISHOP_PAIR_BONUS
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_is_tempo_only() {
        let pos = Position::startpos();
        assert_eq!(evaluate(&pos, Side::White), TEMPO_BONUS);
        // The non-root side sees a symmetric position with no tempo.
        assert_eq!(evaluate(&pos, Side::Black), 0);
    }

    #[test]
    fn test_material_advantage() {
        // White is a rook up.
        let pos = Position::from_descriptor("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(evaluate(&pos, Side::White) > 400);

        let pos = Position::from_descriptor("4k3/8/8/8/8/8/8/R3K3 b - - 0 1").unwrap();
        assert!(evaluate(&pos, Side::Black) < -400);
    }

    #[test]
    fn test_bishop_pair() {
        let pair = Position::from_descriptor("4k3/8/8/8/8/8/2BB4/4K3 w - - 0 1").unwrap();
        let knight_bishop =
            Position::from_descriptor("4k3/8/8/8/8/8/2NB4/4K3 w - - 0 1").unwrap();
        // Beyond the 30cp material edge of B over N, the pair bonus shows up.
        let diff = evaluate(&pair, Side::White) - evaluate(&knight_bishop, Side::White);
        assert!(diff >= BISHOP_PAIR_BONUS);
    }

    #[test]
    fn test_evaluation_invariant_under_clone() {
        let pos = Position::from_descriptor(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let cloned = pos.clone();
        assert_eq!(evaluate(&pos, Side::White), evaluate(&cloned, Side::White));
    }

    #[test]
    fn test_tapering_moves_with_phase() {
        // A lone king-and-pawn ending is fully endgame-weighted: the pawn on
        // the seventh rank scores its endgame value.
        let pos = Position::from_descriptor("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(pos.phase(), 0);
        let score = evaluate(&pos, Side::White);
        assert!(score > 200, "late pawn should dominate: {score}");
    }

    #[test]
    fn test_accumulators_match_rebuild() {
        // The incremental accumulators equal those of a freshly parsed
        // position after a battery of applies.
        let mut pos = Position::startpos();
        for text in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "g8f6", "e1g1"] {
            let mv = pos.parse_move(text).unwrap();
            let (_, legal) = pos.apply(&mv);
            assert!(legal);
        }
        let rebuilt = Position::from_descriptor(&pos.to_descriptor()).unwrap();
        for side in [Side::White, Side::Black] {
            assert_eq!(pos.material(side), rebuilt.material(side));
            assert_eq!(pos.psq_mg(side), rebuilt.psq_mg(side));
            assert_eq!(pos.psq_eg(side), rebuilt.psq_eg(side));
        }
        assert_eq!(pos.phase(), rebuilt.phase());
        assert_eq!(evaluate(&pos, Side::White), evaluate(&rebuilt, Side::White));
    }
}
