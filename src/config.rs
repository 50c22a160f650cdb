use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::builtin::{BuiltinEvaluator, DEFAULT_DEPTH};
use crate::engine::uci::{discover_engine, UciEngine};
use crate::engine::Evaluator;

/// Evaluation settings. Defaults, then environment, then command-line flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// External UCI engine binary; `None` means discover, then fall back to builtin.
    pub path: Option<PathBuf>,
    /// Skip the external engine entirely.
    pub builtin_only: bool,
    pub movetime_ms: u64,
    /// Extra wait past `movetime_ms` before a search counts as timed out.
    pub timeout_margin_ms: u64,
    pub hash_mb: usize,
    pub threads: usize,
    pub builtin_depth: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: None,
            builtin_only: false,
            movetime_ms: 200,
            timeout_margin_ms: 2_000,
            hash_mb: 64,
            threads: 1,
            builtin_depth: DEFAULT_DEPTH,
        }
    }
}

fn env_parse_u64(name: &str) -> Option<u64> { std::env::var(name).ok().and_then(|s| s.trim().parse().ok()) }
fn env_parse_usize(name: &str) -> Option<usize> { std::env::var(name).ok().and_then(|s| s.trim().parse().ok()) }

impl EngineConfig {
    /// Defaults overridden by `BRAINMATE_ENGINE` (or `STOCKFISH_PATH`),
    /// `BRAINMATE_MOVETIME_MS`, `BRAINMATE_HASH_MB` and `BRAINMATE_THREADS`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.path = std::env::var_os("BRAINMATE_ENGINE")
            .or_else(|| std::env::var_os("STOCKFISH_PATH"))
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        if let Some(ms) = env_parse_u64("BRAINMATE_MOVETIME_MS") { cfg.movetime_ms = ms; }
        if let Some(mb) = env_parse_usize("BRAINMATE_HASH_MB") { cfg.hash_mb = mb; }
        if let Some(t) = env_parse_usize("BRAINMATE_THREADS") { cfg.threads = t.max(1); }
        cfg
    }

    pub fn budget(&self) -> Duration { Duration::from_millis(self.movetime_ms.max(1)) }

    /// Spawns the configured (or discovered) UCI engine, falling back to the
    /// builtin evaluator when none can be started.
    pub fn open_evaluator(&self) -> Box<dyn Evaluator> {
        if !self.builtin_only {
            if let Some(path) = self.path.clone().or_else(discover_engine) {
                match UciEngine::spawn(&path, self) {
                    Ok(engine) => return Box::new(engine),
                    Err(e) => warn!("{}; using builtin evaluator", e),
                }
            } else {
                info!("no UCI engine found; using builtin evaluator");
            }
        }
        Box::new(BuiltinEvaluator::with_depth(self.builtin_depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_only_never_spawns() {
        let cfg = EngineConfig { builtin_only: true, path: Some(PathBuf::from("/nonexistent/engine")), ..Default::default() };
        assert_eq!(cfg.open_evaluator().name(), "builtin");
    }

    #[test]
    fn missing_binary_falls_back() {
        let cfg = EngineConfig { path: Some(PathBuf::from("/nonexistent/engine")), ..Default::default() };
        assert_eq!(cfg.open_evaluator().name(), "builtin");
    }
}
