use cozy_chess::{Board as CozyBoard, Color, File, Move, Piece, Rank, Square};
use crate::board::san;
use crate::error::{AdvisorError, AdvisorResult};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Whether the side to move can still play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Ongoing,
    Checkmate,
    Stalemate,
}

/// Immutable position snapshot. Applying a move yields a new value.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool { self.fen() == other.fen() }
}

impl Eq for Position {}

impl Default for Position {
    fn default() -> Self { Self::startpos() }
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: CozyBoard::default() }
    }

    pub fn from_fen(fen: &str) -> AdvisorResult<Self> {
        let fen = fen.trim();
        CozyBoard::from_fen(fen, false)
            .map(|b| Self { board: b })
            .map_err(|e| AdvisorError::InvalidFen { fen: fen.to_string(), reason: format!("{e:?}") })
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    /// FEN fullmove number: starts at 1, increments after Black moves.
    pub fn move_number(&self) -> u16 { self.board.fullmove_number() }

    /// Half-moves since the standard start; increases by one per applied move.
    pub fn ply(&self) -> u32 {
        let base = (self.move_number().max(1) as u32 - 1) * 2;
        if self.side_to_move() == Color::Black { base + 1 } else { base }
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((color, piece))
    }

    pub fn legal_moves(&self) -> Vec<Move> { san::legal_moves(&self.board) }

    pub fn legal_moves_count(&self) -> usize {
        let mut ct = 0usize;
        self.board.generate_moves(|moves| { ct += moves.len(); false });
        ct
    }

    /// Legal moves in SAN, in generation order.
    pub fn legal_moves_san(&self) -> Vec<String> {
        self.legal_moves().into_iter().map(|m| san::san(&self.board, m)).collect()
    }

    pub fn parse_move(&self, text: &str) -> AdvisorResult<Move> {
        san::parse_move(&self.board, text).ok_or_else(|| AdvisorError::IllegalMove { mv: text.trim().to_string() })
    }

    pub fn san(&self, mv: Move) -> String { san::san(&self.board, mv) }

    pub fn uci(&self, mv: Move) -> String { san::uci_text(&self.board, mv) }

    /// Returns the position after `text` (SAN or coordinate notation).
    pub fn apply_move(&self, text: &str) -> AdvisorResult<Position> {
        let mv = self.parse_move(text)?;
        Ok(self.play(mv))
    }

    pub fn play(&self, mv: Move) -> Position {
        let mut board = self.board.clone();
        board.play(mv);
        Position { board }
    }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }

    pub fn game_state(&self) -> GameState {
        if self.legal_moves_count() > 0 { return GameState::Ongoing; }
        if self.in_check() { GameState::Checkmate } else { GameState::Stalemate }
    }

    /// Standard FEN. The en passant square is written only when a legal
    /// en passant capture exists.
    pub fn fen(&self) -> String {
        let b = &self.board;
        let mut out = String::with_capacity(90);
        for (ri, rank) in Rank::ALL.iter().rev().enumerate() {
            let mut empty = 0u8;
            for &file in File::ALL.iter() {
                match self.piece_at(Square::new(file, *rank)) {
                    Some((color, piece)) => {
                        if empty > 0 { out.push((b'0' + empty) as char); empty = 0; }
                        let c = san::piece_letter(piece);
                        out.push(if color == Color::White { c } else { c.to_ascii_lowercase() });
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 { out.push((b'0' + empty) as char); }
            if ri < 7 { out.push('/'); }
        }

        out.push(' ');
        out.push(if b.side_to_move() == Color::White { 'w' } else { 'b' });

        out.push(' ');
        let mut castling = String::new();
        let white = b.castle_rights(Color::White);
        let black = b.castle_rights(Color::Black);
        if white.short.is_some() { castling.push('K'); }
        if white.long.is_some() { castling.push('Q'); }
        if black.short.is_some() { castling.push('k'); }
        if black.long.is_some() { castling.push('q'); }
        if castling.is_empty() { castling.push('-'); }
        out.push_str(&castling);

        out.push(' ');
        match self.en_passant_square() {
            Some(sq) => out.push_str(&san::square_text(sq)),
            None => out.push('-'),
        }

        out.push_str(&format!(" {} {}", b.halfmove_clock(), b.fullmove_number()));
        out
    }

    /// Eight-line text board, White at the bottom, for terminal display.
    pub fn diagram(&self) -> String {
        let mut out = String::new();
        for rank in Rank::ALL.iter().rev() {
            out.push((b'1' + *rank as u8) as char);
            out.push(' ');
            for &file in File::ALL.iter() {
                let c = match self.piece_at(Square::new(file, *rank)) {
                    Some((Color::White, piece)) => san::piece_letter(piece),
                    Some((Color::Black, piece)) => san::piece_letter(piece).to_ascii_lowercase(),
                    None => '.',
                };
                out.push(' ');
                out.push(c);
            }
            out.push('\n');
        }
        out.push_str("   a b c d e f g h");
        out
    }

    fn en_passant_square(&self) -> Option<Square> {
        let file = self.board.en_passant()?;
        let rank = if self.side_to_move() == Color::White { Rank::Sixth } else { Rank::Third };
        let target = Square::new(file, rank);
        let capturable = self.legal_moves().into_iter().any(|m| {
            m.to == target && self.board.piece_on(m.from) == Some(Piece::Pawn) && m.from.file() != m.to.file()
        });
        if capturable { Some(target) } else { None }
    }
}
