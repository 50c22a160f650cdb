use cozy_chess::{Board, Color, Move, Piece};
use crate::search::eval::piece_cp;

/// Swap-off list SEE using only legal moves to the target square.
/// Returns net material gain in centipawns from the side-to-move perspective,
/// or `None` when `mv` is not a capture.
pub fn see_gain_cp(board: &Board, mv: Move) -> Option<i32> {
    let stm = board.side_to_move();
    let attacker0 = board.piece_on(mv.from)?;
    let captured0 = match board.piece_on(mv.to) {
        Some(_) if board.colors(stm).has(mv.to) => return None, // castling
        Some(p) => p,
        None if attacker0 == Piece::Pawn && mv.from.file() != mv.to.file() => Piece::Pawn,
        None => return None,
    };
    let mut gains: Vec<i32> = vec![piece_cp(captured0)];

    let mut cur = board.clone();
    cur.play(mv);
    let mut side = if stm == Color::White { Color::Black } else { Color::White };
    let mut current_occ_val = piece_cp(mv.promotion.unwrap_or(attacker0));

    loop {
        // Least valuable attacker from 'side' that captures back on mv.to
        let mut best_mv: Option<Move> = None;
        let mut best_attacker_val = i32::MAX;
        cur.generate_moves(|ml| {
            for m in ml {
                if m.to != mv.to { continue; }
                if let (Some(p), Some(c)) = (cur.piece_on(m.from), cur.color_on(m.from)) {
                    if c == side {
                        let v = piece_cp(p);
                        if v < best_attacker_val { best_attacker_val = v; best_mv = Some(m); }
                    }
                }
            }
            false
        });
        let Some(m2) = best_mv else { break };
        // Next gain is the value of the current occupant minus the previous gain
        let prev = gains.last().copied().unwrap_or(0);
        gains.push(current_occ_val - prev);
        cur.play(m2);
        side = if side == Color::White { Color::Black } else { Color::White };
        current_occ_val = best_attacker_val;
    }

    // From the end, choose optimal stopping point
    for i in (0..gains.len().saturating_sub(1)).rev() {
        gains[i] = -(-gains[i]).max(gains[i + 1]);
    }
    Some(gains[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozy_chess::{Board, Square};

    fn find(board: &Board, from: Square, to: Square) -> Move {
        let mut found = None;
        board.generate_moves(|ml| {
            for m in ml { if m.from == from && m.to == to { found = Some(m); break; } }
            found.is_some()
        });
        found.expect("move must be legal in this position")
    }

    #[test]
    fn see_detects_bad_exchange_rook_x_pawn_on_h7() {
        // After Rxh7, ...Kxh7 wins the rook; SEE must be negative.
        let board = Board::from_fen("6k1/2R4p/6p1/8/6K1/6P1/8/8 w - - 3 38", false).unwrap();
        let see = see_gain_cp(&board, find(&board, Square::C7, Square::H7)).expect("capture");
        assert!(see < 0, "SEE should be negative for losing exchange, got {}", see);
    }

    #[test]
    fn see_free_piece_is_its_full_value() {
        let board = Board::from_fen("k7/8/8/8/8/8/3qQ3/7K w - - 0 1", false).unwrap();
        assert_eq!(see_gain_cp(&board, find(&board, Square::E2, Square::D2)), Some(900));
    }

    #[test]
    fn quiet_move_has_no_exchange() {
        let board = Board::default();
        assert_eq!(see_gain_cp(&board, find(&board, Square::E2, Square::E4)), None);
    }
}
