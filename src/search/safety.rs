use cozy_chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves,
    BitBoard, Board, Color, Move, Piece, Square,
};

fn opposite(color: Color) -> Color {
    if color == Color::White { Color::Black } else { Color::White }
}

/// Pieces of color `by` that attack `sq` in the current occupancy.
pub fn attackers(board: &Board, sq: Square, by: Color) -> BitBoard {
    let occ = board.occupied();
    let theirs = board.colors(by);
    let diag = board.pieces(Piece::Bishop) | board.pieces(Piece::Queen);
    let orth = board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    // A pawn of `by` attacks sq iff a pawn of the other color on sq would attack it back
    let pawns = get_pawn_attacks(sq, opposite(by)) & board.pieces(Piece::Pawn);
    let knights = get_knight_moves(sq) & board.pieces(Piece::Knight);
    let kings = get_king_moves(sq) & board.pieces(Piece::King);
    let sliders = (get_bishop_moves(sq, occ) & diag) | (get_rook_moves(sq, occ) & orth);
    (pawns | knights | kings | sliders) & theirs
}

/// A non-king piece that the opponent attacks and its own side does not defend.
pub fn is_hanging(board: &Board, sq: Square) -> bool {
    let (Some(piece), Some(owner)) = (board.piece_on(sq), board.color_on(sq)) else { return false };
    if piece == Piece::King { return false; }
    !attackers(board, sq, opposite(owner)).is_empty() && attackers(board, sq, owner).is_empty()
}

/// Returns true if making `mv` leaves the moved piece hanging: in the
/// resulting position, the opponent has a capture on `mv.to` whose Static
/// Exchange Evaluation is at least `loss_thresh_cp`.
pub fn is_hanging_after_move(board: &Board, mv: Move, loss_thresh_cp: i32) -> bool {
    let mut child = board.clone();
    child.play(mv);
    let mut blunder = false;
    child.generate_moves(|ml| {
        for m2 in ml {
            if m2.to == mv.to {
                if let Some(gain) = crate::search::see::see_gain_cp(&child, m2) {
                    if gain >= loss_thresh_cp { blunder = true; break; }
                }
            }
        }
        blunder
    });
    blunder
}
