use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use cozy_chess::Color;
use log::{debug, info, warn};

use crate::board::Position;
use crate::config::EngineConfig;
use crate::engine::{uci_line_to_san, EngineEvaluation, Evaluator};
use crate::error::{AdvisorError, AdvisorResult};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
const READY_TIMEOUT: Duration = Duration::from_secs(2);
const STOP_GRACE: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UciScore {
    Cp(i32),
    Mate(i32),
}

/// The fields of an `info` line the advisor cares about. Scores are from the
/// side to move's point of view, as UCI reports them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InfoLine {
    pub depth: Option<u32>,
    pub multipv: Option<u32>,
    pub score: Option<UciScore>,
    pub pv: Vec<String>,
}

pub fn parse_info_line(line: &str) -> Option<InfoLine> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("info") { return None; }
    let mut info = InfoLine::default();
    while let Some(tok) = tokens.next() {
        match tok {
            "depth" => info.depth = tokens.next().and_then(|s| s.parse().ok()),
            "multipv" => info.multipv = tokens.next().and_then(|s| s.parse().ok()),
            "score" => {
                info.score = match (tokens.next(), tokens.next().and_then(|s| s.parse::<i32>().ok())) {
                    (Some("cp"), Some(v)) => Some(UciScore::Cp(v)),
                    (Some("mate"), Some(v)) => Some(UciScore::Mate(v)),
                    _ => None,
                };
            }
            // pv runs to the end of the line
            "pv" => { info.pv = tokens.by_ref().map(|s| s.to_string()).collect(); }
            "string" => break,
            _ => {}
        }
    }
    Some(info)
}

/// `Some(None)` for `bestmove (none)` / `bestmove 0000`.
pub fn parse_bestmove(line: &str) -> Option<Option<String>> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") { return None; }
    match tokens.next() {
        Some("(none)") | Some("0000") | None => Some(None),
        Some(mv) => Some(Some(mv.to_string())),
    }
}

/// Client side of the UCI protocol over an external engine process.
///
/// Engine stdout is read on a helper thread so every wait can be bounded with
/// `recv_timeout`.
pub struct UciEngine {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    lines: Receiver<String>,
    name: String,
    margin: Duration,
}

impl UciEngine {
    pub fn spawn(path: &Path, config: &EngineConfig) -> AdvisorResult<Self> {
        let unavailable = |reason: String| AdvisorError::EngineUnavailable { reason };
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| unavailable(format!("failed to start {}: {e}", path.display())))?;
        let stdin = child.stdin.take().ok_or_else(|| unavailable("no stdin handle".into()))?;
        let stdout = child.stdout.take().ok_or_else(|| unavailable("no stdout handle".into()))?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() { break; }
            }
        });

        let mut engine = Self {
            child,
            stdin: BufWriter::new(stdin),
            lines: rx,
            name: path.display().to_string(),
            margin: Duration::from_millis(config.timeout_margin_ms),
        };
        engine.send("uci")?;
        let id = engine.wait_for(|l| l == "uciok", HANDSHAKE_TIMEOUT)?;
        if let Some(name) = id.iter().find_map(|l| l.strip_prefix("id name ")) {
            engine.name = name.trim().to_string();
        }
        engine.send(&format!("setoption name Hash value {}", config.hash_mb))?;
        engine.send(&format!("setoption name Threads value {}", config.threads))?;
        engine.sync()?;
        info!("UCI engine ready: {}", engine.name);
        Ok(engine)
    }

    fn send(&mut self, cmd: &str) -> AdvisorResult<()> {
        debug!("uci> {}", cmd);
        writeln!(self.stdin, "{cmd}")
            .and_then(|_| self.stdin.flush())
            .map_err(|e| AdvisorError::EngineUnavailable { reason: format!("write failed: {e}") })
    }

    /// Collects lines until `done` matches one; the matching line is included.
    fn wait_for(&mut self, done: impl Fn(&str) -> bool, timeout: Duration) -> AdvisorResult<Vec<String>> {
        let deadline = Instant::now() + timeout;
        let mut seen = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    let finished = done(&line);
                    seen.push(line);
                    if finished { return Ok(seen); }
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(AdvisorError::EngineTimeout { millis: timeout.as_millis() as u64 });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(AdvisorError::EngineUnavailable { reason: "engine process exited".into() });
                }
            }
        }
    }

    /// Drops output left over from an abandoned search and waits for `readyok`.
    fn sync(&mut self) -> AdvisorResult<()> {
        while self.lines.try_recv().is_ok() {}
        self.send("isready")?;
        self.wait_for(|l| l == "readyok", READY_TIMEOUT).map(|_| ())
    }
}

impl Evaluator for UciEngine {
    fn name(&self) -> &str { &self.name }

    fn evaluate(&mut self, position: &Position, budget: Duration) -> AdvisorResult<EngineEvaluation> {
        self.sync()?;
        self.send(&format!("position fen {}", position.fen()))?;
        self.send(&format!("go movetime {}", budget.as_millis().max(1)))?;

        let lines = match self.wait_for(|l| l.starts_with("bestmove"), budget + self.margin) {
            Ok(lines) => lines,
            Err(AdvisorError::EngineTimeout { .. }) => {
                warn!("engine {} exceeded {:?}; stopping search", self.name, budget + self.margin);
                let _ = self.send("stop");
                let _ = self.wait_for(|l| l.starts_with("bestmove"), STOP_GRACE);
                return Err(AdvisorError::EngineTimeout { millis: (budget + self.margin).as_millis() as u64 });
            }
            Err(e) => return Err(e),
        };

        let mut last: Option<InfoLine> = None;
        let mut best: Option<String> = None;
        for line in &lines {
            if let Some(info) = parse_info_line(line) {
                if info.score.is_some() && info.multipv.unwrap_or(1) == 1 { last = Some(info); }
            } else if let Some(bm) = parse_bestmove(line) {
                best = bm;
            }
        }

        let sign = if position.side_to_move() == Color::White { 1 } else { -1 };
        let mut eval = EngineEvaluation::neutral();
        if let Some(info) = last {
            match info.score {
                Some(UciScore::Cp(v)) => eval.score_cp = sign * v,
                Some(UciScore::Mate(m)) => eval.mate_in = Some(sign * m),
                None => {}
            }
            eval.depth = info.depth;
            eval.pv = uci_line_to_san(position, &info.pv);
        }
        eval.best_move = best.and_then(|mv| match position.parse_move(&mv) {
            Ok(m) => Some(position.san(m)),
            Err(_) => {
                warn!("engine suggested illegal move {}", mv);
                None
            }
        });
        Ok(eval)
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.send("quit");
        let deadline = Instant::now() + Duration::from_millis(500);
        while Instant::now() < deadline {
            if let Ok(Some(_)) = self.child.try_wait() { return; }
            thread::sleep(Duration::from_millis(20));
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Common install locations, then every directory on `PATH`.
pub fn discover_engine() -> Option<PathBuf> {
    let fixed = ["./stockfish", "/usr/local/bin/stockfish", "/usr/bin/stockfish", "/usr/games/stockfish", "/opt/homebrew/bin/stockfish"];
    let in_path = std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).map(|d| d.join("stockfish")).collect::<Vec<_>>())
        .unwrap_or_default();
    fixed.iter().map(PathBuf::from).chain(in_path).find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cp_info_line() {
        let info = parse_info_line("info depth 12 seldepth 18 multipv 1 score cp 35 nodes 1000 nps 50000 pv e2e4 e7e5 g1f3").unwrap();
        assert_eq!(info.depth, Some(12));
        assert_eq!(info.score, Some(UciScore::Cp(35)));
        assert_eq!(info.pv, vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn parses_mate_and_bounds() {
        let info = parse_info_line("info depth 5 score mate -2 lowerbound pv h7h8q").unwrap();
        assert_eq!(info.score, Some(UciScore::Mate(-2)));
        assert!(parse_info_line("bestmove e2e4").is_none());
    }

    #[test]
    fn bestmove_none_means_no_move() {
        assert_eq!(parse_bestmove("bestmove (none)"), Some(None));
        assert_eq!(parse_bestmove("bestmove e2e4 ponder e7e5"), Some(Some("e2e4".to_string())));
        assert_eq!(parse_bestmove("info depth 1"), None);
    }
}
