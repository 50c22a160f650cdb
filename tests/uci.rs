#![cfg(unix)]

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use brainmate::config::EngineConfig;
use brainmate::engine::uci::UciEngine;
use brainmate::{AdvisorError, Evaluator, Position};
use pretty_assertions::assert_eq;

// Writing an executable while another test thread forks can fail with ETXTBSY.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// A shell script speaking just enough UCI; `on_go` runs for every `go`.
fn scripted_engine(name: &str, on_go: &str) -> UciEngine {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = std::env::temp_dir().join(format!("brainmate-uci-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path: PathBuf = dir.join(name);
    let script = format!(
        "#!/bin/sh\n\
         while read -r line; do\n\
           case \"$line\" in\n\
             uci) echo 'id name Scripted'; echo 'uciok' ;;\n\
             isready) echo 'readyok' ;;\n\
             go*) {on_go} ;;\n\
             stop) echo 'bestmove e7e5' ;;\n\
             quit) exit 0 ;;\n\
           esac\n\
         done\n"
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    let config = EngineConfig { timeout_margin_ms: 100, ..EngineConfig::default() };
    UciEngine::spawn(&path, &config).unwrap()
}

fn after_e4() -> Position { Position::from_fen(common::FENS[1]).unwrap() }

#[test]
fn handshake_reads_engine_name() {
    let engine = scripted_engine("named", "echo 'bestmove e7e5'");
    assert_eq!(engine.name(), "Scripted");
}

#[test]
fn black_to_move_score_is_reported_for_white() {
    let mut engine = scripted_engine("cp", "echo 'info depth 8 score cp 50 pv e7e5 g1f3'; echo 'bestmove e7e5'");
    let e = engine.evaluate(&after_e4(), Duration::from_millis(50)).unwrap();
    assert_eq!(e.score_cp, -50);
    assert_eq!(e.depth, Some(8));
    assert_eq!(e.best_move.as_deref(), Some("e5"));
    assert_eq!(e.pv, vec!["e5".to_string(), "Nf3".to_string()]);

    // A second request on the same process still works.
    let again = engine.evaluate(&after_e4(), Duration::from_millis(50)).unwrap();
    assert_eq!(again.score_cp, -50);
}

#[test]
fn black_to_move_mate_is_reported_for_white() {
    let mut engine = scripted_engine("mate", "echo 'info depth 3 score mate 2 pv e7e5'; echo 'bestmove e7e5'");
    let e = engine.evaluate(&after_e4(), Duration::from_millis(50)).unwrap();
    assert_eq!(e.mate_in, Some(-2));
}

#[test]
fn bestmove_none_is_no_move() {
    let mut engine = scripted_engine("none", "echo 'info depth 1 score cp 0'; echo 'bestmove (none)'");
    let e = engine.evaluate(&after_e4(), Duration::from_millis(50)).unwrap();
    assert_eq!(e.best_move, None);
}

#[test]
fn illegal_bestmove_is_dropped() {
    let mut engine = scripted_engine("illegal", "echo 'info depth 4 score cp 10'; echo 'bestmove e2e4'");
    let e = engine.evaluate(&after_e4(), Duration::from_millis(50)).unwrap();
    assert_eq!(e.best_move, None);
    assert_eq!(e.score_cp, -10);
}

#[test]
fn silent_search_times_out_and_is_stopped() {
    let mut engine = scripted_engine("silent", ":");
    let budget = Duration::from_millis(50);
    let started = Instant::now();
    let err = engine.evaluate(&after_e4(), budget).unwrap_err();
    let elapsed = started.elapsed();
    assert_eq!(err, AdvisorError::EngineTimeout { millis: 150 });
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");

    // The `bestmove` sent after `stop` is drained and the process stays usable.
    let err = engine.evaluate(&after_e4(), budget).unwrap_err();
    assert!(matches!(err, AdvisorError::EngineTimeout { .. }));
}
