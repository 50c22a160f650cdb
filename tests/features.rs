mod common;

use brainmate::features::{self, detect_openness, Character, Openness, Owner, Phase, TacticalFlag};
use brainmate::{EngineEvaluation, Position};

fn pos(fen: &str) -> Position { Position::from_fen(fen).unwrap() }

#[test]
fn phases() {
    assert_eq!(features::extract(&Position::startpos(), None).phase, Phase::Opening);
    let queenless = pos("r4rk1/pp2bppp/2n1pn2/3p4/3P4/2NBPN2/PP3PPP/R4RK1 w - - 0 12");
    assert_eq!(features::extract(&queenless, None).phase, Phase::Middlegame);
    assert_eq!(features::extract(&pos(common::FENS[5]), None).phase, Phase::Endgame);
}

#[test]
fn start_position_is_quiet() {
    let f = features::extract(&Position::startpos(), Some(&EngineEvaluation::with_best_move(20, "e4")));
    assert!(f.flags.is_empty(), "{:?}", f.flags);
    assert_eq!(f.balance, 0);
    assert_eq!(f.non_pawn_material, 62);
    assert_eq!(f.character, Character::Balanced);
    assert_eq!(f.development.undeveloped_minors, 4);
    assert!(f.development.can_castle);
}

#[test]
fn queen_takes_pawn_guarded_by_pawn_is_not_favorable() {
    let f = features::extract(&pos("4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1"), None);
    assert!(!f.has_flag(|fl| matches!(fl, TacticalFlag::CaptureAvailable { mv, .. } if mv == "Qxd5")), "{:?}", f.flags);
}

#[test]
fn check_and_hanging_rook() {
    let f = features::extract(&pos("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1"), None);
    assert!(f.has_flag(|fl| *fl == TacticalFlag::InCheck));
    assert!(f.has_flag(|fl| matches!(fl, TacticalFlag::HangingPiece { square, owner: Owner::Them, .. } if square == "e2")));
    assert!(f.has_flag(|fl| matches!(fl, TacticalFlag::CaptureAvailable { mv, gain_cp: 500, .. } if mv == "Kxe2")));
    assert_eq!(f.character, Character::Tactical);
    assert_eq!(f.balance, -5);
}

#[test]
fn engine_swing_and_mates() {
    let swing = features::extract(&Position::startpos(), Some(&EngineEvaluation::with_best_move(400, "e4")));
    assert!(swing.has_flag(|fl| *fl == TacticalFlag::EngineSwing { delta_cp: 400 }));
    assert_eq!(swing.character, Character::Tactical);

    // Black to move, White mates in 2: a threat for the side to move.
    let e = EngineEvaluation { mate_in: Some(2), ..Default::default() };
    let threat = features::extract(&pos(common::FENS[1]), Some(&e));
    assert_eq!(threat.engine_mate, Some(-2));
    assert!(threat.has_flag(|fl| *fl == TacticalFlag::MateThreat { moves: 2 }));
}

#[test]
fn openness() {
    assert_eq!(detect_openness(&pos(common::FENS[4])), Openness::Closed);
    assert_eq!(detect_openness(&pos(common::FENS[8])), Openness::Open);
    assert_eq!(detect_openness(&Position::startpos()), Openness::SemiOpen);
}

#[test]
fn black_perspective_balance() {
    // Black to move, up a queen.
    let f = features::extract(&pos("3qk3/8/8/8/8/8/8/4K3 b - - 0 1"), None);
    assert_eq!(f.balance, 9);
    assert_eq!(f.material.black, 9);
    assert_eq!(f.material.white, 0);
}

#[test]
fn winning_a_single_pawn_is_not_sharp() {
    let f = features::extract(&pos("4k3/8/4p3/3p4/2P1P3/1P3P2/8/4K3 w - - 0 1"), None);
    assert!(f.has_flag(|fl| matches!(fl, TacticalFlag::CaptureAvailable { mv, gain_cp: 100, .. } if mv == "cxd5")), "{:?}", f.flags);
    assert!(!f.flags.iter().any(TacticalFlag::is_sharp), "{:?}", f.flags);
    assert_eq!(f.openness, Openness::Open);
    assert_eq!(f.character, Character::Open);
}
