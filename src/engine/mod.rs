//! Position evaluation collaborators.
//!
//! The advisor only sees the [`Evaluator`] trait. [`uci::UciEngine`] drives an
//! external UCI process; [`builtin::BuiltinEvaluator`] is a shallow in-process
//! material search used when no engine binary is configured.

pub mod builtin;
pub mod uci;

use cozy_chess::Color;
use serde::Serialize;
use std::time::Duration;

use crate::board::Position;
use crate::error::AdvisorResult;

/// Raw engine output for one position. Scores are from White's point of view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EngineEvaluation {
    pub score_cp: i32,
    /// Suggested move in SAN.
    pub best_move: Option<String>,
    /// Full moves to mate; positive when White mates.
    pub mate_in: Option<i32>,
    pub depth: Option<u32>,
    /// Principal variation in SAN.
    pub pv: Vec<String>,
}

impl EngineEvaluation {
    /// Score 0, no move, no mate.
    pub fn neutral() -> Self { Self::default() }

    pub fn with_best_move(score_cp: i32, best_move: &str) -> Self {
        Self { score_cp, best_move: Some(best_move.to_string()), ..Self::default() }
    }

    pub fn score_for(&self, color: Color) -> i32 {
        if color == Color::White { self.score_cp } else { -self.score_cp }
    }

    pub fn mate_for(&self, color: Color) -> Option<i32> {
        self.mate_in.map(|m| if color == Color::White { m } else { -m })
    }

    /// `+0.35`, `-1.20`, `#3` or `#-2`, White's point of view.
    pub fn display_score(&self) -> String {
        match self.mate_in {
            Some(m) => format!("#{}", m),
            None => format!("{:+.2}", self.score_cp as f64 / 100.0),
        }
    }
}

pub trait Evaluator {
    fn name(&self) -> &str;

    /// Blocks for at most roughly `budget`; fails with `EngineUnavailable`
    /// or `EngineTimeout`.
    fn evaluate(&mut self, position: &Position, budget: Duration) -> AdvisorResult<EngineEvaluation>;
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn name(&self) -> &str { (**self).name() }
    fn evaluate(&mut self, position: &Position, budget: Duration) -> AdvisorResult<EngineEvaluation> {
        (**self).evaluate(position, budget)
    }
}

/// Replays coordinate moves from `position`, stopping at the first one that
/// is not legal, and returns them in SAN.
pub fn uci_line_to_san(position: &Position, moves: &[String]) -> Vec<String> {
    let mut cur = position.clone();
    let mut out = Vec::with_capacity(moves.len());
    for text in moves {
        let Ok(mv) = cur.parse_move(text) else { break };
        out.push(cur.san(mv));
        cur = cur.play(mv);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_display_uses_pawn_units() {
        assert_eq!(EngineEvaluation::with_best_move(35, "e4").display_score(), "+0.35");
        assert_eq!(EngineEvaluation { score_cp: -120, ..Default::default() }.display_score(), "-1.20");
        assert_eq!(EngineEvaluation { mate_in: Some(-2), ..Default::default() }.display_score(), "#-2");
    }

    #[test]
    fn perspective_flips_for_black() {
        let e = EngineEvaluation { score_cp: 50, mate_in: Some(3), ..Default::default() };
        assert_eq!(e.score_for(Color::Black), -50);
        assert_eq!(e.mate_for(Color::Black), Some(-3));
    }

    #[test]
    fn uci_line_stops_at_illegal_move() {
        let line: Vec<String> = ["e2e4", "e7e5", "e4e5"].iter().map(|s| s.to_string()).collect();
        assert_eq!(uci_line_to_san(&Position::startpos(), &line), vec!["e4", "e5"]);
    }
}
