mod common;

use brainmate::{EngineEvaluation, Position, Session};
use common::*;

#[test]
fn every_legal_move_round_trips() {
    for fen in FENS {
        let start = Position::from_fen(fen).unwrap();
        for san in start.legal_moves_san() {
            let mut session = Session::with_position(advisor_with(EngineEvaluation::neutral()), start.clone());
            session.apply_move(&san).unwrap_or_else(|e| panic!("{san} in {fen}: {e}"));
            let after = session.current_position();
            assert_ne!(after.side_to_move(), start.side_to_move(), "{san} in {fen}");
            assert_eq!(after.ply(), start.ply() + 1, "{san} in {fen}");
        }
    }
}

#[test]
fn coordinate_and_castling_moves() {
    let mut session = Session::new(advisor_with(EngineEvaluation::neutral()));
    assert_eq!(session.apply_move("e2e4").unwrap(), "e4");

    let mut session = Session::with_position(advisor_with(EngineEvaluation::neutral()), Position::from_fen(FENS[7]).unwrap());
    assert_eq!(session.apply_move("O-O").unwrap(), "O-O");
    assert_eq!(session.current_position().fen(), "4k3/8/8/8/8/8/8/5RK1 b - - 1 1");
}

#[test]
fn failed_changes_leave_position_alone() {
    let mut session = Session::new(advisor_with(EngineEvaluation::neutral()));
    let before = session.current_position().clone();
    assert_eq!(session.respond("move e5"), "Illegal move: e5");
    assert!(session.respond("fen not/a/fen w - - 0 1").starts_with("Invalid FEN"));
    assert_eq!(session.current_position(), &before);
}

#[test]
fn fen_command_replaces_position() {
    let mut session = Session::new(advisor_with(EngineEvaluation::neutral()));
    let reply = session.respond(&format!("fen {}", FENS[5]));
    assert_eq!(reply, format!("Position set: {}", FENS[5]));
    assert_eq!(session.current_position().fen(), FENS[5]);
}
