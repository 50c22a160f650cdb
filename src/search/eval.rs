use cozy_chess::{Board, Color, Piece, Square};

// Rule-of-thumb values in centipawns (pawn=1, minor=3, rook=5, queen=9).
pub const PAWN: i32 = 100;
pub const KNIGHT: i32 = 300;
pub const BISHOP: i32 = 300;
pub const ROOK: i32 = 500;
pub const QUEEN: i32 = 900;

pub const MATE_SCORE: i32 = 30_000;
pub const DRAW_SCORE: i32 = 0;

/// Whole-point value used for material counting.
pub fn piece_points(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 1,
        Piece::Knight | Piece::Bishop => 3,
        Piece::Rook => 5,
        Piece::Queen => 9,
        Piece::King => 0,
    }
}

pub fn piece_cp(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => 20_000,
    }
}

pub fn count_piece(board: &Board, color: Color, piece: Piece) -> i32 {
    let bb = board.colors(color) & board.pieces(piece);
    bb.into_iter().count() as i32
}

/// Material points for one side (kings excluded).
pub fn material_points(board: &Board, color: Color) -> i32 {
    [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
        .iter()
        .map(|&p| count_piece(board, color, p) * piece_points(p))
        .sum()
}

/// Knights, bishops, rooks and queens of both sides, in points. 62 at the start.
pub fn non_pawn_material(board: &Board) -> i32 {
    [Color::White, Color::Black]
        .iter()
        .map(|&c| material_points(board, c) - count_piece(board, c, Piece::Pawn))
        .sum()
}

// Side-agnostic material in centipawns: positive means White has more material.
pub fn material_eval_cp_side_agnostic(board: &Board) -> i32 {
    (material_points(board, Color::White) - material_points(board, Color::Black)) * PAWN
}

// Material from side-to-move perspective (negamax-friendly)
pub fn material_eval_cp(board: &Board) -> i32 {
    let base = material_eval_cp_side_agnostic(board);
    if board.side_to_move() == Color::White { base } else { -base }
}

fn center_bonus(sq: Square) -> i32 {
    let f = sq.file() as i32;
    let r = sq.rank() as i32;
    if (3..=4).contains(&f) && (3..=4).contains(&r) { 20 }
    else if (2..=5).contains(&f) && (2..=5).contains(&r) { 8 }
    else { 0 }
}

/// Material plus a small bonus for pawns and minor pieces on central squares,
/// from the side to move's perspective.
pub fn eval_cp(board: &Board) -> i32 {
    let mut positional = 0;
    for &color in &[Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let movers = board.colors(color) & (board.pieces(Piece::Pawn) | board.pieces(Piece::Knight) | board.pieces(Piece::Bishop));
        for sq in movers { positional += sign * center_bonus(sq); }
    }
    let base = material_eval_cp_side_agnostic(board) + positional;
    if board.side_to_move() == Color::White { base } else { -base }
}
