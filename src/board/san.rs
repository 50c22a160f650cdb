use cozy_chess::{Board, Color, Move, Piece, Square};

pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut v = Vec::new();
    board.generate_moves(|ml| { for m in ml { v.push(m); } false });
    v
}

pub fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

pub fn piece_name(piece: Piece) -> &'static str {
    match piece {
        Piece::Pawn => "pawn",
        Piece::Knight => "knight",
        Piece::Bishop => "bishop",
        Piece::Rook => "rook",
        Piece::Queen => "queen",
        Piece::King => "king",
    }
}

pub fn file_char(sq: Square) -> char { (b'a' + sq.file() as u8) as char }
pub fn rank_char(sq: Square) -> char { (b'1' + sq.rank() as u8) as char }

/// `Qxf7#` -> `Qxf7`.
pub fn strip_check_marks(text: &str) -> &str { text.trim_end_matches(|c| c == '+' || c == '#') }

pub fn square_text(sq: Square) -> String {
    let mut s = String::with_capacity(2);
    s.push(file_char(sq));
    s.push(rank_char(sq));
    s
}

/// cozy-chess encodes castling as the king capturing its own rook.
pub fn is_castle(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King) && board.colors(board.side_to_move()).has(mv.to)
}

pub fn is_capture(board: &Board, mv: Move) -> bool {
    if is_castle(board, mv) { return false; }
    let them = if board.side_to_move() == Color::White { Color::Black } else { Color::White };
    if board.colors(them).has(mv.to) { return true; }
    // En passant: diagonal pawn move onto an empty square
    board.piece_on(mv.from) == Some(Piece::Pawn) && mv.from.file() != mv.to.file()
}

/// Captured piece, if any. En passant reports a pawn.
pub fn captured_piece(board: &Board, mv: Move) -> Option<Piece> {
    if !is_capture(board, mv) { return None; }
    Some(board.piece_on(mv.to).unwrap_or(Piece::Pawn))
}

/// Standard coordinate notation (`e1g1` for castling, as external engines expect).
pub fn uci_text(board: &Board, mv: Move) -> String {
    let to = if is_castle(board, mv) {
        let file = if mv.to.file() as u8 > mv.from.file() as u8 { cozy_chess::File::G } else { cozy_chess::File::C };
        Square::new(file, mv.from.rank())
    } else {
        mv.to
    };
    let mut s = square_text(mv.from);
    s.push_str(&square_text(to));
    if let Some(p) = mv.promotion { s.push(piece_letter(p).to_ascii_lowercase()); }
    s
}

pub fn gives_check(board: &Board, mv: Move) -> bool {
    let mut child = board.clone();
    child.play(mv);
    !child.checkers().is_empty()
}

pub fn san(board: &Board, mv: Move) -> String {
    let mut out = String::with_capacity(8);
    let piece = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
    if is_castle(board, mv) {
        out.push_str(if mv.to.file() as u8 > mv.from.file() as u8 { "O-O" } else { "O-O-O" });
    } else if piece == Piece::Pawn {
        if is_capture(board, mv) {
            out.push(file_char(mv.from));
            out.push('x');
        }
        out.push_str(&square_text(mv.to));
        if let Some(p) = mv.promotion {
            out.push('=');
            out.push(piece_letter(p));
        }
    } else {
        out.push(piece_letter(piece));
        let rivals: Vec<Move> = legal_moves(board)
            .into_iter()
            .filter(|m| m.to == mv.to && m.from != mv.from && board.piece_on(m.from) == Some(piece))
            .collect();
        if !rivals.is_empty() {
            let same_file = rivals.iter().any(|m| m.from.file() == mv.from.file());
            let same_rank = rivals.iter().any(|m| m.from.rank() == mv.from.rank());
            if !same_file {
                out.push(file_char(mv.from));
            } else if !same_rank {
                out.push(rank_char(mv.from));
            } else {
                out.push_str(&square_text(mv.from));
            }
        }
        if is_capture(board, mv) { out.push('x'); }
        out.push_str(&square_text(mv.to));
    }
    let mut child = board.clone();
    child.play(mv);
    if !child.checkers().is_empty() {
        out.push(if legal_moves(&child).is_empty() { '#' } else { '+' });
    }
    out
}

fn normalize_san(s: &str) -> String {
    s.trim()
        .trim_end_matches(|c| matches!(c, '!' | '?' | '.' | ',' | ';'))
        .chars()
        .filter(|c| !matches!(c, '+' | '#' | '='))
        .map(|c| if c == '0' { 'O' } else { c })
        .collect()
}

/// Parses SAN (`Nf3`, `exd5`, `O-O`, `e8=Q`) or coordinate notation (`g1f3`).
/// Case-insensitive SAN is accepted only when it resolves to a single move.
pub fn parse_move(board: &Board, text: &str) -> Option<Move> {
    let moves = legal_moves(board);
    let wanted = normalize_san(text);
    if wanted.is_empty() { return None; }

    let lower = wanted.to_ascii_lowercase();
    if let Some(&m) = moves.iter().find(|&&m| uci_text(board, m) == lower) { return Some(m); }

    let sans: Vec<(Move, String)> = moves.iter().map(|&m| (m, normalize_san(&san(board, m)))).collect();
    if let Some((m, _)) = sans.iter().find(|(_, s)| *s == wanted) { return Some(*m); }

    let mut loose = sans.iter().filter(|(_, s)| s.eq_ignore_ascii_case(&wanted));
    match (loose.next(), loose.next()) {
        (Some((m, _)), None) => Some(*m),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(board: &Board, uci: &str) -> Move {
        legal_moves(board).into_iter().find(|&m| uci_text(board, m) == uci).expect("move must be legal")
    }

    #[test]
    fn san_for_startpos_moves() {
        let b = Board::default();
        assert_eq!(san(&b, find(&b, "e2e4")), "e4");
        assert_eq!(san(&b, find(&b, "g1f3")), "Nf3");
    }

    #[test]
    fn castling_is_reported_in_standard_notation() {
        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", false).unwrap();
        let short = find(&b, "e1g1");
        let long = find(&b, "e1c1");
        assert_eq!(san(&b, short), "O-O");
        assert_eq!(san(&b, long), "O-O-O");
        assert_eq!(parse_move(&b, "0-0"), Some(short));
    }

    #[test]
    fn knights_disambiguate_by_file() {
        let b = Board::from_fen("k7/8/8/8/8/8/8/1N3N1K w - - 0 1", false).unwrap();
        assert_eq!(san(&b, find(&b, "b1d2")), "Nbd2");
        assert_eq!(san(&b, find(&b, "f1d2")), "Nfd2");
    }

    #[test]
    fn promotion_and_mate_suffix() {
        let b = Board::from_fen("k7/7P/1K6/8/8/8/8/8 w - - 0 1", false).unwrap();
        assert_eq!(san(&b, find(&b, "h7h8q")), "h8=Q#");
        assert_eq!(parse_move(&b, "h8Q"), Some(find(&b, "h7h8q")));
    }

    #[test]
    fn lowercase_piece_move_resolves_when_unique() {
        let b = Board::default();
        assert_eq!(parse_move(&b, "nf3"), Some(find(&b, "g1f3")));
        assert_eq!(parse_move(&b, "Ke2"), None);
    }
}
