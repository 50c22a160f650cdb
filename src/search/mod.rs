pub mod alphabeta;
pub mod eval;
pub mod safety;
pub mod see;
