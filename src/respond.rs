//! Response generators, one per intent, plus the structured `Response` they
//! produce. Generators read a frozen [`Request`] and never fail; problems
//! become plan-only, game-over or apology responses.

use cozy_chess::{Color, Piece, Rank, Square};
use serde::Serialize;

use crate::board::{san, GameState, Position};
use crate::engine::EngineEvaluation;
use crate::error::AdvisorError;
use crate::features::{Character, Phase, PositionFeatures};
use crate::goals::{GoalHierarchy, Horizon};
use crate::search::safety;
use crate::selector::{self, Alternative};

/// Balanced-position window for the suggested approach, side to move's view.
pub const EQUAL_WINDOW_CP: i32 = 30;
pub const DECISIVE_CP: i32 = 200;
/// Opponent SEE gain on the destination square that counts as dropping a piece.
const BLUNDER_THRESHOLD_CP: i32 = 100;

pub const HELP_TEXT: &str = "I can help with:\n\
- \"What's the best move?\" for a recommendation with reasoning\n\
- \"What's the plan?\" for the strategic goals\n\
- \"Explain Nf3\" or \"Why e4?\" to analyse a specific move\n\
- \"Any tactics?\" for immediate opportunities and threats\n\
- \"Evaluate the position\" for an assessment\n\
Commands: \"move <san|uci>\" plays a move, \"fen <fen>\" sets up a position.";

/// Everything a generator may look at for one request.
#[derive(Clone, Debug)]
pub struct Request {
    pub position: Position,
    /// `Err` when the evaluator failed; features are neutral in that case.
    pub evaluation: Result<EngineEvaluation, AdvisorError>,
    pub features: PositionFeatures,
    pub hierarchy: GoalHierarchy,
}

impl Request {
    fn engine(&self) -> Option<&EngineEvaluation> { self.evaluation.as_ref().ok() }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    MoveRecommendation { mv: String, reasoning: String, strategy: String, alternatives: Vec<Alternative> },
    /// A goal-level answer without a move, used when the evaluator failed.
    PlanOnly { reason: String, plan: String, next_step: String },
    StrategyAdvice { content: String, rationale: String, next_step: String, additional_options: Vec<String> },
    TacticalAdvice { content: String, moves: Vec<String>, others: Vec<String> },
    PositionEvaluation { evaluation: String, position_type: String, suggested_approach: String },
    MoveExplanation { mv: String, explanation: String, evaluation_before: Option<String>, evaluation_after: Option<String> },
    GameOver { result: String, winner: Option<String> },
    Help { text: String },
    Apology { reason: String },
}

pub fn help() -> Response { Response::Help { text: HELP_TEXT.to_string() } }

fn plan_only(request: &Request, reason: String) -> Response {
    Response::PlanOnly {
        reason,
        plan: request.hierarchy.long_term().description.clone(),
        next_step: request.hierarchy.medium_term().description.clone(),
    }
}

fn game_over(position: &Position) -> Option<Response> {
    match position.game_state() {
        GameState::Ongoing => None,
        GameState::Checkmate => {
            let winner = if position.side_to_move() == Color::White { "Black" } else { "White" };
            Some(Response::GameOver { result: "checkmate".into(), winner: Some(winner.into()) })
        }
        GameState::Stalemate => Some(Response::GameOver { result: "stalemate".into(), winner: None }),
    }
}

/// Game-over or plan-only answer for a request that has no move to offer.
fn no_move(request: &Request, err: &AdvisorError) -> Response {
    if let Some(over) = game_over(&request.position) { return over; }
    match err {
        AdvisorError::NoLegalMove => plan_only(request, "the engine did not suggest a move".into()),
        other => plan_only(request, other.to_string().to_lowercase()),
    }
}

pub fn recommend_move(request: &Request) -> Response {
    let evaluation = match &request.evaluation {
        Ok(e) => e,
        Err(err) => return no_move(request, err),
    };
    match selector::select(evaluation, &request.hierarchy) {
        Ok(rec) => Response::MoveRecommendation {
            mv: rec.mv,
            reasoning: rec.rationale,
            strategy: rec.plan,
            alternatives: rec.alternatives,
        },
        Err(err) => no_move(request, &err),
    }
}

pub fn explain_strategy(request: &Request) -> Response {
    let h = &request.hierarchy;
    let long = h.long_term();
    Response::StrategyAdvice {
        content: long.description.clone(),
        rationale: long.rationale.clone(),
        next_step: h.medium_term().description.clone(),
        additional_options: h.alternatives(Horizon::Long).iter().map(|g| g.description.clone()).collect(),
    }
}

pub fn find_tactics(request: &Request) -> Response {
    let short = request.hierarchy.short_term();
    let Some(first) = short.first() else {
        return Response::TacticalAdvice {
            content: "No immediate tactical opportunities found.".into(),
            moves: Vec::new(),
            others: Vec::new(),
        };
    };
    Response::TacticalAdvice {
        content: first.description.clone(),
        moves: short.iter().filter_map(|g| g.mv.clone()).collect(),
        others: short[1..].iter().map(|g| g.description.clone()).collect(),
    }
}

fn character_label(c: Character) -> &'static str {
    match c {
        Character::Open => "Open",
        Character::Closed => "Closed",
        Character::Tactical => "Tactical",
        Character::Balanced => "Balanced",
    }
}

fn phase_label(p: Phase) -> &'static str {
    match p {
        Phase::Opening => "opening",
        Phase::Middlegame => "middlegame",
        Phase::Endgame => "endgame",
    }
}

/// Advice keyed on the side-to-move score and the position's character.
pub fn suggest_approach(features: &PositionFeatures) -> String {
    if let Some(m) = features.engine_mate {
        return if m > 0 {
            "There's a forced mate. Follow the tactical sequence.".into()
        } else {
            "Your opponent has a forced mate. Look for the most stubborn defense.".into()
        };
    }
    let score = features.engine_score_cp;
    let text = if score.abs() < EQUAL_WINDOW_CP {
        match features.character {
            Character::Open => "The position is roughly equal and open. Focus on piece activity and creating imbalances.",
            Character::Closed => "The position is roughly equal but closed. Consider a positional maneuver or breakthrough.",
            Character::Tactical => "The position is balanced but tactical. Look for combinations and tactical opportunities.",
            Character::Balanced => "The position is balanced. Focus on improving your worst-placed piece.",
        }
    } else if score > DECISIVE_CP {
        "You have a significant advantage. Simplify the position and avoid unnecessary complications."
    } else if score < -DECISIVE_CP {
        "You are at a disadvantage. Create complications and look for tactical chances."
    } else if score > 0 {
        "You have a slight advantage. Focus on incrementally improving your position."
    } else {
        "You have a slight disadvantage. Focus on equalizing the position through careful defense."
    };
    text.to_string()
}

pub fn evaluate_position(request: &Request) -> Response {
    if let Some(over) = game_over(&request.position) { return over; }
    let f = &request.features;
    let evaluation = match request.engine() {
        Some(e) => format!("{} (White's point of view)", e.display_score()),
        None => {
            let white_cp = if request.position.side_to_move() == Color::White { f.static_cp } else { -f.static_cp };
            format!("engine unavailable; material count {:+.2}", white_cp as f64 / 100.0)
        }
    };
    Response::PositionEvaluation {
        evaluation,
        position_type: format!("{} {}", character_label(f.character), phase_label(f.phase)),
        suggested_approach: suggest_approach(f),
    }
}

fn is_central(sq: Square) -> bool { matches!(sq, Square::D4 | Square::E4 | Square::D5 | Square::E5) }

fn is_minor_home(sq: Square) -> bool {
    matches!(
        sq,
        Square::B1 | Square::G1 | Square::C1 | Square::F1 | Square::B8 | Square::G8 | Square::C8 | Square::F8
    )
}

/// Plain-language facts about `mv` in `position`.
fn move_facts(request: &Request, mv: cozy_chess::Move) -> String {
    let position = &request.position;
    let board = position.board();
    let text = position.san(mv);
    let mover = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
    let us = position.side_to_move();
    let mut facts: Vec<String> = Vec::new();

    if san::is_castle(board, mv) {
        facts.push(format!("The move {} castles, tucking the king away and connecting the rooks.", text));
    } else if let Some(victim) = san::captured_piece(board, mv) {
        facts.push(format!("The move {} captures a {}.", text, san::piece_name(victim)));
    } else {
        facts.push(format!("The move {} repositions your {}.", text, san::piece_name(mover)));
    }
    if san::gives_check(board, mv) {
        facts.push("It gives check to the opponent's king.".into());
    }
    match mover {
        Piece::Pawn => {
            if is_central(mv.to) { facts.push("This move helps control the center.".into()); }
            let seventh = if us == Color::White { Rank::Seventh } else { Rank::Second };
            if mv.to.rank() == seventh { facts.push("This pawn is now one step away from promotion.".into()); }
        }
        Piece::Knight | Piece::Bishop if is_minor_home(mv.from) => {
            facts.push("This develops a piece from its starting position.".into());
        }
        _ => {}
    }
    if !san::is_castle(board, mv) && safety::is_hanging_after_move(board, mv, BLUNDER_THRESHOLD_CP) {
        facts.push(format!("Careful: the {} can be won on {}.", san::piece_name(mover), san::square_text(mv.to)));
    }

    let strip = san::strip_check_marks;
    match request.engine() {
        Some(e) if e.best_move.as_deref().map(strip) == Some(strip(&text)) => {
            facts.push("This is also the engine's top choice.".into());
            // Same binding as the recommendation for this move.
            if let Ok(rec) = selector::select(e, &request.hierarchy) {
                facts.push(rec.rationale);
            }
        }
        engine => {
            if let Some(best) = engine.and_then(|e| e.best_move.as_deref()) {
                facts.push(format!("The engine prefers {}.", best));
            }
            if let Some(goal) = request.hierarchy.iter().find(|g| g.references(&text)) {
                facts.push(format!("It serves the goal: {}.", goal.description));
            }
        }
    }
    facts.join(" ")
}

/// Explains `mv`, or the engine's move when `mv` is `None`.
pub fn explain_move(
    request: &Request,
    mv: Option<&str>,
    evaluate_after: &mut dyn FnMut(&Position) -> Option<EngineEvaluation>,
) -> Response {
    let text = match mv {
        Some(t) => t.to_string(),
        None => match &request.evaluation {
            Ok(e) => match &e.best_move {
                Some(best) => best.clone(),
                None => return no_move(request, &AdvisorError::NoLegalMove),
            },
            Err(err) => return no_move(request, err),
        },
    };
    let parsed = match request.position.parse_move(&text) {
        Ok(m) => m,
        Err(err) => return Response::Apology { reason: err.to_string() },
    };
    let after = request.position.play(parsed);
    let evaluation_before = request.engine().map(EngineEvaluation::display_score);
    let evaluation_after = evaluation_before.as_ref().and_then(|_| evaluate_after(&after)).map(|e| e.display_score());
    Response::MoveExplanation {
        mv: request.position.san(parsed),
        explanation: move_facts(request, parsed),
        evaluation_before,
        evaluation_after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features;
    use crate::goals;

    fn request(fen: &str, evaluation: Result<EngineEvaluation, AdvisorError>) -> Request {
        let position = Position::from_fen(fen).unwrap();
        let features = features::extract(&position, evaluation.as_ref().ok());
        let hierarchy = goals::build(&features, position.side_to_move());
        Request { position, evaluation, features, hierarchy }
    }

    #[test]
    fn approach_thresholds() {
        let mut f = request(crate::board::START_FEN, Ok(EngineEvaluation::neutral())).features;
        f.engine_score_cp = 250;
        assert!(suggest_approach(&f).starts_with("You have a significant advantage"));
        f.engine_score_cp = -250;
        assert!(suggest_approach(&f).starts_with("You are at a disadvantage"));
        f.engine_score_cp = 50;
        assert!(suggest_approach(&f).starts_with("You have a slight advantage"));
        f.engine_score_cp = -50;
        assert!(suggest_approach(&f).starts_with("You have a slight disadvantage"));
        f.engine_mate = Some(2);
        assert!(suggest_approach(&f).starts_with("There's a forced mate"));
    }

    #[test]
    fn explains_development_and_center() {
        let req = request(crate::board::START_FEN, Ok(EngineEvaluation::with_best_move(20, "e4")));
        let mut after = |_: &Position| Some(EngineEvaluation::with_best_move(25, "e5"));
        match explain_move(&req, Some("e4"), &mut after) {
            Response::MoveExplanation { explanation, evaluation_before, evaluation_after, .. } => {
                assert!(explanation.contains("helps control the center"));
                assert!(explanation.contains("engine's top choice"));
                assert_eq!(evaluation_before.as_deref(), Some("+0.20"));
                assert_eq!(evaluation_after.as_deref(), Some("+0.25"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match explain_move(&req, Some("Nf3"), &mut after) {
            Response::MoveExplanation { explanation, .. } => {
                assert!(explanation.contains("develops a piece"));
                assert!(explanation.contains("The engine prefers e4."));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn explaining_the_engine_move_matches_the_recommendation() {
        let mut req = request(crate::board::START_FEN, Ok(EngineEvaluation::with_best_move(0, "a3")));
        req.features.character = Character::Balanced;
        req.features.development.can_castle = false;
        req.features.development.center_presence = 4;
        req.features.development.undeveloped_minors = 0;
        req.hierarchy = goals::build(&req.features, Color::White);
        assert!(req.hierarchy.medium_term().fallback);

        let rec = match &req.evaluation {
            Ok(e) => selector::select(e, &req.hierarchy).unwrap(),
            Err(e) => panic!("{e}"),
        };
        assert_eq!(rec.bound, Horizon::Long);
        match explain_move(&req, None, &mut |_| None) {
            Response::MoveExplanation { mv, explanation, .. } => {
                assert_eq!(mv, "a3");
                assert!(explanation.contains(&rec.rationale), "{explanation}");
                assert!(!explanation.contains("Ensure king safety"), "{explanation}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn illegal_move_apologises() {
        let req = request(crate::board::START_FEN, Ok(EngineEvaluation::neutral()));
        let resp = explain_move(&req, Some("e5"), &mut |_| None);
        assert_eq!(resp, Response::Apology { reason: "Illegal move: e5".into() });
    }

    #[test]
    fn stalemate_is_game_over() {
        let req = request("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", Ok(EngineEvaluation::neutral()));
        assert_eq!(recommend_move(&req), Response::GameOver { result: "stalemate".into(), winner: None });
    }
}
