use thiserror::Error;

/// Failures that can reach the advisor boundary.
///
/// None of these escape `Advisor::handle_question`; they are rendered as
/// user-facing text there. `handle_position_change` and `Session` surface
/// `InvalidFen` / `IllegalMove` to the caller with the held position untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisorError {
    #[error("Invalid FEN: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Illegal move: {mv}")]
    IllegalMove { mv: String },

    #[error("Engine unavailable: {reason}")]
    EngineUnavailable { reason: String },

    #[error("Engine timed out after {millis} ms")]
    EngineTimeout { millis: u64 },

    /// The evaluation carried no candidate move (checkmate, stalemate, or an
    /// engine that answered `bestmove (none)`).
    #[error("No legal move available")]
    NoLegalMove,
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;
