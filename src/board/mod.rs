pub mod cozy;
pub mod san;

pub use cozy::{GameState, Position, START_FEN};
