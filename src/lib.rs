// Chess strategy assistant: goal planning and question routing over an engine
pub mod error;
pub mod board;
pub mod search;
pub mod engine;
pub mod config;
pub mod features;
pub mod goals;
pub mod selector;
pub mod router;
pub mod respond;
pub mod format;
pub mod advisor;

pub use advisor::{Advisor, Analysis, Session};
pub use board::Position;
pub use engine::{EngineEvaluation, Evaluator};
pub use error::{AdvisorError, AdvisorResult};
