use std::time::Duration;
use log::debug;

use crate::board::Position;
use crate::engine::{EngineEvaluation, Evaluator};
use crate::error::AdvisorResult;
use crate::search::alphabeta::Searcher;

pub const DEFAULT_DEPTH: u32 = 3;
/// Hard cap so a slow machine cannot stall a request past its budget.
const NODE_LIMIT: u64 = 2_000_000;

/// In-process evaluator backed by the shallow material searcher.
pub struct BuiltinEvaluator {
    depth: u32,
}

impl Default for BuiltinEvaluator {
    fn default() -> Self { Self { depth: DEFAULT_DEPTH } }
}

impl BuiltinEvaluator {
    pub fn with_depth(depth: u32) -> Self { Self { depth: depth.clamp(1, DEFAULT_DEPTH) } }
}

impl Evaluator for BuiltinEvaluator {
    fn name(&self) -> &str { "builtin" }

    fn evaluate(&mut self, position: &Position, budget: Duration) -> AdvisorResult<EngineEvaluation> {
        let mut searcher = Searcher::default();
        searcher.set_movetime(budget);
        searcher.set_node_limit(NODE_LIMIT);
        let res = searcher.search(position.board(), self.depth);
        debug!("builtin search depth={} nodes={} score={}", res.depth, res.nodes, res.score_cp);

        let white = position.side_to_move() == cozy_chess::Color::White;
        let flip = |v: i32| if white { v } else { -v };
        let pv_uci: Vec<String> = {
            let mut cur = position.clone();
            let mut out = Vec::new();
            for &m in &res.pv {
                out.push(cur.uci(m));
                cur = cur.play(m);
            }
            out
        };
        let mate_in = res.mate_in().filter(|&m| m != 0).map(flip);
        Ok(EngineEvaluation {
            score_cp: if mate_in.is_some() { 0 } else { flip(res.score_cp) },
            best_move: res.bestmove.map(|m| position.san(m)),
            mate_in,
            depth: if res.depth > 0 { Some(res.depth) } else { None },
            pv: crate::engine::uci_line_to_san(position, &pv_uci),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_free_queen_for_black() {
        let p = Position::from_fen("k7/8/8/8/8/8/3qQ3/7K b - - 0 1").unwrap();
        let e = BuiltinEvaluator::with_depth(2).evaluate(&p, Duration::from_secs(5)).unwrap();
        assert_eq!(e.best_move.as_deref(), Some("Qxe2"));
        assert!(e.score_cp < -500, "black should be clearly better, got {}", e.score_cp);
    }

    #[test]
    fn no_move_in_checkmate() {
        let p = Position::from_fen("k6Q/8/1K6/8/8/8/8/8 b - - 0 1").unwrap();
        let e = BuiltinEvaluator::default().evaluate(&p, Duration::from_secs(5)).unwrap();
        assert!(e.best_move.is_none());
    }
}
