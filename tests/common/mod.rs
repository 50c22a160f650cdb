#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use brainmate::{Advisor, AdvisorError, AdvisorResult, EngineEvaluation, Evaluator, Position};

/// Always returns the same evaluation and counts how often it was asked.
pub struct FixedEvaluator {
    pub evaluation: EngineEvaluation,
    pub calls: Rc<Cell<usize>>,
}

impl FixedEvaluator {
    pub fn new(evaluation: EngineEvaluation) -> Self { Self { evaluation, calls: Rc::new(Cell::new(0)) } }
}

impl Evaluator for FixedEvaluator {
    fn name(&self) -> &str { "fixed" }
    fn evaluate(&mut self, _: &Position, _: Duration) -> AdvisorResult<EngineEvaluation> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.evaluation.clone())
    }
}

pub struct TimeoutEvaluator;

impl Evaluator for TimeoutEvaluator {
    fn name(&self) -> &str { "timeout" }
    fn evaluate(&mut self, _: &Position, budget: Duration) -> AdvisorResult<EngineEvaluation> {
        Err(AdvisorError::EngineTimeout { millis: budget.as_millis() as u64 })
    }
}

pub struct PanickingEvaluator;

impl Evaluator for PanickingEvaluator {
    fn name(&self) -> &str { "panicking" }
    fn evaluate(&mut self, _: &Position, _: Duration) -> AdvisorResult<EngineEvaluation> {
        panic!("evaluator blew up")
    }
}

pub fn advisor_with(evaluation: EngineEvaluation) -> Advisor {
    Advisor::new(Box::new(FixedEvaluator::new(evaluation)), Duration::from_millis(50))
}

pub fn timeout_advisor() -> Advisor { Advisor::new(Box::new(TimeoutEvaluator), Duration::from_millis(50)) }

pub const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Positions across phases and characters.
pub const FENS: &[&str] = &[
    START,
    "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
    "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 w kq - 4 5",
    "r2q1rk1/pp2bppp/2n1pn2/3p4/3P4/2NBPN2/PP3PPP/R2Q1RK1 w - - 0 10",
    "rnbqkb1r/ppp2ppp/4pn2/3pP3/3P4/8/PPP2PPP/RNBQKBNR w KQkq - 1 4",
    "8/5pk1/6p1/8/3R4/6P1/5PK1/8 w - - 0 40",
    "8/8/4k3/8/8/4K3/8/8 w - - 0 60",
    "4k3/8/8/8/8/8/8/4K2R w K - 0 1",
    "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 30",
    "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
    "k7/8/1K6/8/8/8/8/7Q w - - 0 1",
    "3qk3/8/8/8/8/8/8/3QK3 w - - 0 1",
];
