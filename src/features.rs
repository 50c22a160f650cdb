//! Symbolic features of a position: phase, material, tactical motifs and
//! overall character. Recomputed for every request from one
//! (Position, EngineEvaluation) pair.

use cozy_chess::{Color, File, Piece, Rank, Square};
use serde::Serialize;

use crate::board::san::{self, piece_name, square_text};
use crate::board::Position;
use crate::engine::EngineEvaluation;
use crate::search::eval::{count_piece, material_eval_cp, material_points, non_pawn_material, piece_points};
use crate::search::{safety, see};

/// Non-pawn material above this is still the opening.
pub const OPENING_NPM_FLOOR: i32 = 54;
/// Non-pawn material at or below this is an endgame.
pub const ENDGAME_NPM_CEILING: i32 = 20;
/// Without queens the endgame starts earlier.
pub const QUEENLESS_ENDGAME_NPM_CEILING: i32 = 26;
/// Engine vs static estimate gap that counts as a tactical signal.
pub const ENGINE_SWING_CP: i32 = 250;
/// Smallest exchange gain (a minor piece) that makes a capture sharp.
pub const SHARP_CAPTURE_GAIN_CP: i32 = 300;
/// Scores beyond this are treated as garbage from the evaluator.
const MAX_SANE_SCORE_CP: i32 = 100_000;
const MAX_LISTED_MOVES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Opening,
    Middlegame,
    Endgame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Openness {
    Open,
    SemiOpen,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Character {
    Open,
    Closed,
    Tactical,
    Balanced,
}

/// Owner of a piece relative to the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    Us,
    Them,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TacticalFlag {
    InCheck,
    CheckAvailable { mv: String },
    /// A capture whose exchange does not lose material.
    CaptureAvailable { mv: String, victim: String, square: String, gain_cp: i32 },
    HangingPiece { square: String, piece: String, value: i32, owner: Owner },
    /// Engine score minus static estimate, side to move's view.
    EngineSwing { delta_cp: i32 },
    MateAvailable { moves: i32 },
    MateThreat { moves: i32 },
}

impl TacticalFlag {
    /// Flags that make a position tactical rather than quiet.
    pub fn is_sharp(&self) -> bool {
        match self {
            TacticalFlag::CaptureAvailable { gain_cp, .. } => *gain_cp >= SHARP_CAPTURE_GAIN_CP,
            _ => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Material {
    pub white: i32,
    pub black: i32,
    pub white_pawns: i32,
    pub black_pawns: i32,
}

impl Material {
    pub fn pawns(&self, color: Color) -> i32 {
        if color == Color::White { self.white_pawns } else { self.black_pawns }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Development {
    /// Knights and bishops of the side to move still on their home squares.
    pub undeveloped_minors: u8,
    /// Pieces of the side to move on d4, e4, d5, e5.
    pub center_presence: u8,
    /// King on its home square and at least one castling right left.
    pub can_castle: bool,
    pub fullmove: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionFeatures {
    pub phase: Phase,
    pub material: Material,
    /// Material points, side to move minus opponent.
    pub balance: i32,
    pub non_pawn_material: i32,
    pub queens_on_board: bool,
    pub flags: Vec<TacticalFlag>,
    pub openness: Openness,
    pub character: Character,
    pub development: Development,
    /// Side to move's view; 0 when no evaluation was available.
    pub engine_score_cp: i32,
    pub engine_mate: Option<i32>,
    pub engine_best_move: Option<String>,
    pub static_cp: i32,
    pub engine_available: bool,
}

impl PositionFeatures {
    pub fn has_flag(&self, pred: impl Fn(&TacticalFlag) -> bool) -> bool { self.flags.iter().any(pred) }
}

const CENTER: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

pub fn detect_phase(non_pawn_material: i32, queens_on_board: bool) -> Phase {
    if non_pawn_material <= ENDGAME_NPM_CEILING || (!queens_on_board && non_pawn_material <= QUEENLESS_ENDGAME_NPM_CEILING) {
        Phase::Endgame
    } else if non_pawn_material > OPENING_NPM_FLOOR && queens_on_board {
        Phase::Opening
    } else {
        Phase::Middlegame
    }
}

fn pawn_on(position: &Position, sq: Square, color: Color) -> bool {
    position.piece_at(sq) == Some((color, Piece::Pawn))
}

pub fn detect_openness(position: &Position) -> Openness {
    let board = position.board();
    let pawns = board.pieces(Piece::Pawn);

    let mut blocked = 0;
    for &file in &[File::C, File::D, File::E, File::F] {
        for &rank in &Rank::ALL[1..7] {
            let sq = Square::new(file, rank);
            let ahead = Square::new(file, Rank::index(rank as usize + 1));
            if pawn_on(position, sq, Color::White) && pawn_on(position, ahead, Color::Black) { blocked += 1; }
        }
    }
    let center_pawns = CENTER.iter().filter(|&&sq| pawns.has(sq)).count();
    if blocked >= 2 || center_pawns >= 3 { return Openness::Closed; }

    let empty_files = File::ALL.iter().filter(|&&f| !pawns.into_iter().any(|sq| sq.file() == f)).count();
    if empty_files >= 2 { Openness::Open } else { Openness::SemiOpen }
}

/// Rule table, first match wins.
pub fn classify_character(openness: Openness, sharp: bool) -> Character {
    const TABLE: &[(fn(Openness, bool) -> bool, Character)] = &[
        (|_, sharp| sharp, Character::Tactical),
        (|o, _| o == Openness::Open, Character::Open),
        (|o, _| o == Openness::Closed, Character::Closed),
    ];
    TABLE.iter().find(|(guard, _)| guard(openness, sharp)).map(|(_, c)| *c).unwrap_or(Character::Balanced)
}

fn development(position: &Position) -> Development {
    let stm = position.side_to_move();
    let (home_rank, king_home) = if stm == Color::White { (Rank::First, Square::E1) } else { (Rank::Eighth, Square::E8) };
    let homes = [(File::B, Piece::Knight), (File::G, Piece::Knight), (File::C, Piece::Bishop), (File::F, Piece::Bishop)];
    let undeveloped = homes.iter().filter(|&&(f, p)| position.piece_at(Square::new(f, home_rank)) == Some((stm, p))).count();
    let center = CENTER.iter().filter(|&&sq| matches!(position.piece_at(sq), Some((c, _)) if c == stm)).count();
    let rights = position.board().castle_rights(stm);
    let can_castle = position.piece_at(king_home) == Some((stm, Piece::King)) && (rights.short.is_some() || rights.long.is_some());
    Development {
        undeveloped_minors: undeveloped as u8,
        center_presence: center as u8,
        can_castle,
        fullmove: position.move_number(),
    }
}

fn sanitize(evaluation: Option<&EngineEvaluation>) -> Option<&EngineEvaluation> {
    evaluation.filter(|e| e.score_cp.abs() <= MAX_SANE_SCORE_CP && e.mate_in != Some(0))
}

fn tactical_flags(position: &Position, evaluation: Option<&EngineEvaluation>, static_cp: i32) -> Vec<TacticalFlag> {
    let board = position.board();
    let stm = position.side_to_move();
    let mut flags = Vec::new();

    if position.in_check() { flags.push(TacticalFlag::InCheck); }

    if let Some(e) = evaluation {
        match e.mate_for(stm) {
            Some(m) if m > 0 => flags.push(TacticalFlag::MateAvailable { moves: m }),
            Some(m) if m < 0 => flags.push(TacticalFlag::MateThreat { moves: -m }),
            _ => {
                let delta = e.score_for(stm) - static_cp;
                if delta.abs() >= ENGINE_SWING_CP { flags.push(TacticalFlag::EngineSwing { delta_cp: delta }); }
            }
        }
    }

    let mut checks = Vec::new();
    let mut captures: Vec<(i32, TacticalFlag)> = Vec::new();
    for mv in position.legal_moves() {
        if let Some(gain) = see::see_gain_cp(board, mv) {
            if gain >= 0 {
                let victim = san::captured_piece(board, mv).unwrap_or(Piece::Pawn);
                captures.push((gain, TacticalFlag::CaptureAvailable {
                    mv: position.san(mv),
                    victim: piece_name(victim).to_string(),
                    square: square_text(mv.to),
                    gain_cp: gain,
                }));
            }
        }
        if checks.len() < MAX_LISTED_MOVES && san::gives_check(board, mv) {
            checks.push(TacticalFlag::CheckAvailable { mv: position.san(mv) });
        }
    }
    // Stable: equal gains keep generation order
    captures.sort_by_key(|(gain, _)| -gain);
    flags.extend(captures.into_iter().take(MAX_LISTED_MOVES).map(|(_, f)| f));
    flags.extend(checks);

    for sq in board.occupied() {
        if safety::is_hanging(board, sq) {
            if let Some((color, piece)) = position.piece_at(sq) {
                flags.push(TacticalFlag::HangingPiece {
                    square: square_text(sq),
                    piece: piece_name(piece).to_string(),
                    value: piece_points(piece),
                    owner: if color == stm { Owner::Us } else { Owner::Them },
                });
            }
        }
    }
    flags
}

/// Pure and total: a missing or nonsensical evaluation yields neutral
/// engine-derived fields.
pub fn extract(position: &Position, evaluation: Option<&EngineEvaluation>) -> PositionFeatures {
    let board = position.board();
    let stm = position.side_to_move();
    let evaluation = sanitize(evaluation);

    let material = Material {
        white: material_points(board, Color::White),
        black: material_points(board, Color::Black),
        white_pawns: count_piece(board, Color::White, Piece::Pawn),
        black_pawns: count_piece(board, Color::Black, Piece::Pawn),
    };
    let balance = if stm == Color::White { material.white - material.black } else { material.black - material.white };
    let npm = non_pawn_material(board);
    let queens_on_board = !board.pieces(Piece::Queen).is_empty();
    let static_cp = material_eval_cp(board);

    let flags = tactical_flags(position, evaluation, static_cp);
    let openness = detect_openness(position);
    let sharp = flags.iter().any(TacticalFlag::is_sharp);

    PositionFeatures {
        phase: detect_phase(npm, queens_on_board),
        material,
        balance,
        non_pawn_material: npm,
        queens_on_board,
        character: classify_character(openness, sharp),
        flags,
        openness,
        development: development(position),
        engine_score_cp: evaluation.map(|e| e.score_for(stm)).unwrap_or(0),
        engine_mate: evaluation.and_then(|e| e.mate_for(stm)),
        engine_best_move: evaluation.and_then(|e| e.best_move.clone()),
        static_cp,
        engine_available: evaluation.is_some(),
    }
}
