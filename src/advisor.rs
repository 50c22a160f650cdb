//! Request pipeline: position + evaluation -> features -> goals -> intent ->
//! response. Nothing here keeps state between requests except the session's
//! current position.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use log::{debug, error, warn};
use serde::Serialize;

use crate::board::Position;
use crate::config::EngineConfig;
use crate::engine::{EngineEvaluation, Evaluator};
use crate::error::{AdvisorError, AdvisorResult};
use crate::features::{self, PositionFeatures};
use crate::format::format;
use crate::goals::{self, GoalHierarchy};
use crate::respond::{self, Request, Response};
use crate::router;
use crate::selector::{self, Recommendation};

/// Structured analysis of one position, for JSON output.
#[derive(Clone, Debug, Serialize)]
pub struct Analysis {
    pub fen: String,
    pub legal_moves: Vec<String>,
    pub evaluation: Option<EngineEvaluation>,
    pub engine_error: Option<String>,
    pub features: PositionFeatures,
    pub hierarchy: GoalHierarchy,
    pub recommendation: Option<Recommendation>,
    pub approach: String,
}

pub struct Advisor {
    evaluator: Box<dyn Evaluator>,
    budget: Duration,
}

impl Advisor {
    pub fn new(evaluator: Box<dyn Evaluator>, budget: Duration) -> Self { Self { evaluator, budget } }

    pub fn from_config(config: &EngineConfig) -> Self { Self::new(config.open_evaluator(), config.budget()) }

    pub fn evaluator_name(&self) -> &str { self.evaluator.name() }

    /// Evaluates `position`, discarding a suggested move that is not legal there.
    fn evaluate(&mut self, position: &Position) -> AdvisorResult<EngineEvaluation> {
        let mut evaluation = self.evaluator.evaluate(position, self.budget).map_err(|e| {
            warn!("{} failed: {}", self.evaluator.name(), e);
            e
        })?;
        if let Some(mv) = evaluation.best_move.take() {
            match position.parse_move(&mv) {
                Ok(m) => evaluation.best_move = Some(position.san(m)),
                Err(_) => warn!("discarding illegal engine move {} in {}", mv, position.fen()),
            }
        }
        Ok(evaluation)
    }

    fn request(&mut self, position: &Position) -> Request {
        let evaluation = self.evaluate(position);
        let features = features::extract(position, evaluation.as_ref().ok());
        let hierarchy = goals::build(&features, position.side_to_move());
        Request { position: position.clone(), evaluation, features, hierarchy }
    }

    /// Structured answer to `raw` about `position`.
    pub fn answer(&mut self, raw: &str, position: &Position) -> Response {
        let intent = router::classify(raw);
        debug!("classified {:?} as {:?}", raw, intent);
        if !intent.needs_engine() {
            return respond::help();
        }
        let request = self.request(position);
        let (evaluator, budget) = (&mut self.evaluator, self.budget);
        let mut evaluate_after = |p: &Position| evaluator.evaluate(p, budget).ok();
        router::route(&intent, &request, &mut evaluate_after)
    }

    /// Like [`Advisor::answer`], but a panic inside the request becomes an
    /// apology instead of unwinding into the caller.
    pub fn answer_guarded(&mut self, raw: &str, position: &Position) -> Response {
        panic::catch_unwind(AssertUnwindSafe(|| self.answer(raw, position))).unwrap_or_else(|_| {
            error!("request {:?} panicked", raw);
            Response::Apology { reason: "an internal error occurred".into() }
        })
    }

    /// Never fails; every problem is rendered as text.
    pub fn handle_question(&mut self, raw: &str, position: &Position) -> String {
        format(&self.answer_guarded(raw, position))
    }

    pub fn handle_position_change(&self, new_fen: &str) -> AdvisorResult<Position> {
        let position = Position::from_fen(new_fen)?;
        debug!("position set to {}", position.fen());
        Ok(position)
    }

    pub fn analyze(&mut self, position: &Position) -> Analysis {
        let request = self.request(position);
        let recommendation = request.evaluation.as_ref().ok().and_then(|e| selector::select(e, &request.hierarchy).ok());
        Analysis {
            fen: position.fen(),
            legal_moves: position.legal_moves_san(),
            approach: respond::suggest_approach(&request.features),
            engine_error: request.evaluation.as_ref().err().map(AdvisorError::to_string),
            evaluation: request.evaluation.ok(),
            features: request.features,
            hierarchy: request.hierarchy,
            recommendation,
        }
    }
}

impl std::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor").field("evaluator", &self.evaluator.name()).field("budget", &self.budget).finish()
    }
}

/// Owns the current position. A failed move or FEN change leaves it as it was.
pub struct Session {
    advisor: Advisor,
    position: Position,
}

impl Session {
    pub fn new(advisor: Advisor) -> Self { Self::with_position(advisor, Position::startpos()) }

    pub fn with_position(advisor: Advisor, position: Position) -> Self { Self { advisor, position } }

    pub fn current_position(&self) -> &Position { &self.position }

    pub fn advisor(&mut self) -> &mut Advisor { &mut self.advisor }

    pub fn legal_moves(&self) -> Vec<String> { self.position.legal_moves_san() }

    /// Applies `text` (SAN or coordinate notation) and returns the move in SAN.
    pub fn apply_move(&mut self, text: &str) -> AdvisorResult<String> {
        let mv = self.position.parse_move(text)?;
        let played = self.position.san(mv);
        self.position = self.position.play(mv);
        debug!("played {} -> {}", played, self.position.fen());
        Ok(played)
    }

    pub fn set_fen(&mut self, fen: &str) -> AdvisorResult<()> {
        self.position = self.advisor.handle_position_change(fen)?;
        Ok(())
    }

    pub fn ask(&mut self, question: &str) -> String {
        let position = self.position.clone();
        self.advisor.handle_question(question, &position)
    }

    /// `move <x>` plays a move, `fen <x>` replaces the position, anything
    /// else is a question.
    pub fn respond(&mut self, line: &str) -> String {
        let line = line.trim();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match head.to_ascii_lowercase().as_str() {
            "move" if !rest.trim().is_empty() => match self.apply_move(rest.trim()) {
                Ok(played) => format!("Played {}. Position: {}", played, self.position.fen()),
                Err(e) => e.to_string(),
            },
            "fen" if !rest.trim().is_empty() => match self.set_fen(rest) {
                Ok(()) => format!("Position set: {}", self.position.fen()),
                Err(e) => e.to_string(),
            },
            _ => self.ask(line),
        }
    }
}
