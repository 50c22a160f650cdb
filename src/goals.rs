//! Three-horizon goal hierarchy derived from position features.
//!
//! Goals come from a static, ordered rule table plus one short-term goal per
//! tactical flag. Matching entries are ranked by priority, then by kind
//! (strategic before positional before reactive), then by table order. The
//! hierarchy is rebuilt from scratch for every request.

use cozy_chess::Color;
use serde::Serialize;

use crate::features::{Character, Owner, Phase, PositionFeatures, TacticalFlag};

pub const FALLBACK_LONG: &str = "Develop pieces and control the center";
pub const FALLBACK_MEDIUM: &str = "Ensure king safety";
/// Alternatives kept per horizon besides the active goal.
pub const MAX_ALTERNATIVES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Long,
    Medium,
    Short,
}

/// Tie-break order at equal priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Strategic,
    Positional,
    Reactive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Goal {
    pub horizon: Horizon,
    pub kind: GoalKind,
    pub description: String,
    pub rationale: String,
    /// Higher is more important.
    pub priority: i32,
    /// Move in SAN that carries out the goal, if there is one.
    pub mv: Option<String>,
    /// Generic goal used because no rule matched.
    pub fallback: bool,
}

impl Goal {
    fn fallback(horizon: Horizon, description: &str) -> Self {
        Goal {
            horizon,
            kind: GoalKind::Strategic,
            description: description.to_string(),
            rationale: "No specific feature of the position dominates.".to_string(),
            priority: 0,
            mv: None,
            fallback: true,
        }
    }

    /// True when the goal's move is `san`, ignoring check marks.
    pub fn references(&self, san: &str) -> bool {
        let strip = crate::board::san::strip_check_marks;
        self.mv.as_deref().map_or(false, |m| strip(m) == strip(san))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GoalHierarchy {
    long: Vec<Goal>,
    medium: Vec<Goal>,
    short: Vec<Goal>,
}

impl GoalHierarchy {
    pub fn goals(&self, horizon: Horizon) -> &[Goal] {
        match horizon {
            Horizon::Long => &self.long,
            Horizon::Medium => &self.medium,
            Horizon::Short => &self.short,
        }
    }

    pub fn active(&self, horizon: Horizon) -> Option<&Goal> { self.goals(horizon).first() }

    pub fn alternatives(&self, horizon: Horizon) -> &[Goal] {
        let goals = self.goals(horizon);
        if goals.is_empty() { goals } else { &goals[1..] }
    }

    /// Never empty.
    pub fn long_term(&self) -> &Goal { &self.long[0] }

    /// Never empty.
    pub fn medium_term(&self) -> &Goal { &self.medium[0] }

    pub fn short_term(&self) -> &[Goal] { &self.short }

    pub fn iter(&self) -> impl Iterator<Item = &Goal> {
        self.long.iter().chain(self.medium.iter()).chain(self.short.iter())
    }
}

struct GoalRule {
    horizon: Horizon,
    kind: GoalKind,
    priority: i32,
    description: &'static str,
    rationale: &'static str,
    applies: fn(&PositionFeatures, Color) -> bool,
}

fn ahead(f: &PositionFeatures) -> bool { f.balance > 3 }
fn behind(f: &PositionFeatures) -> bool { f.balance < -3 }

const GOAL_RULES: &[GoalRule] = &[
    // Long-term
    GoalRule {
        horizon: Horizon::Long, kind: GoalKind::Strategic, priority: 10,
        description: "Convert the forced mate",
        rationale: "The engine sees a forced mate for you.",
        applies: |f, _| matches!(f.engine_mate, Some(m) if m > 0),
    },
    GoalRule {
        horizon: Horizon::Long, kind: GoalKind::Strategic, priority: 8,
        description: "Develop pieces and control the center",
        rationale: "In the opening, fast development and central control decide the middlegame.",
        applies: |f, _| f.phase == Phase::Opening,
    },
    GoalRule {
        horizon: Horizon::Long, kind: GoalKind::Strategic, priority: 7,
        description: "Ensure king safety",
        rationale: "With queens on the board an uncastled king is a target.",
        applies: |f, _| f.phase == Phase::Opening,
    },
    GoalRule {
        horizon: Horizon::Long, kind: GoalKind::Strategic, priority: 8,
        description: "Trade pieces to simplify into a winning endgame",
        rationale: "You are clearly up material; every trade makes the extra material count for more.",
        applies: |f, _| f.phase == Phase::Middlegame && ahead(f),
    },
    GoalRule {
        horizon: Horizon::Long, kind: GoalKind::Strategic, priority: 8,
        description: "Create complications and tactical opportunities",
        rationale: "You are down material; quiet play favors your opponent.",
        applies: |f, _| f.phase == Phase::Middlegame && behind(f),
    },
    GoalRule {
        horizon: Horizon::Long, kind: GoalKind::Strategic, priority: 7,
        description: "Improve piece positioning and create weaknesses in the opponent's camp",
        rationale: "Material is roughly level, so the better-coordinated side will pull ahead.",
        applies: |f, _| f.phase == Phase::Middlegame && !ahead(f) && !behind(f),
    },
    GoalRule {
        horizon: Horizon::Long, kind: GoalKind::Strategic, priority: 8,
        description: "Activate the king and create passed pawns",
        rationale: "In the endgame the king is a fighting piece and passed pawns win games.",
        applies: |f, stm| f.phase == Phase::Endgame && f.material.pawns(stm) > 0,
    },
    GoalRule {
        horizon: Horizon::Long, kind: GoalKind::Strategic, priority: 8,
        description: "Activate the king and eliminate the opponent's pawns",
        rationale: "Without pawns of your own, the draw comes from removing theirs.",
        applies: |f, stm| f.phase == Phase::Endgame && f.material.pawns(stm) == 0,
    },
    GoalRule {
        horizon: Horizon::Long, kind: GoalKind::Strategic, priority: 7,
        description: "Exchange pieces but not pawns",
        rationale: "With a clear advantage in the endgame, fewer pieces leave the defender fewer resources.",
        applies: |f, _| f.phase == Phase::Endgame && f.engine_score_cp > 200,
    },
    // Medium-term
    GoalRule {
        horizon: Horizon::Medium, kind: GoalKind::Positional, priority: 6,
        description: "Castle to safety",
        rationale: "The king is still in the center and most minor pieces are out.",
        applies: |f, _| f.phase != Phase::Endgame && f.development.can_castle && f.development.undeveloped_minors <= 2,
    },
    GoalRule {
        horizon: Horizon::Medium, kind: GoalKind::Positional, priority: 6,
        description: "Centralize the king",
        rationale: "With little material left the king belongs in the middle of the board.",
        applies: |f, _| f.phase == Phase::Endgame,
    },
    GoalRule {
        horizon: Horizon::Medium, kind: GoalKind::Positional, priority: 5,
        description: "Control the center with pawns or pieces",
        rationale: "You have fewer than two pieces on the central squares.",
        applies: |f, _| f.phase != Phase::Endgame && f.development.center_presence < 2,
    },
    GoalRule {
        horizon: Horizon::Medium, kind: GoalKind::Positional, priority: 5,
        description: "Prepare a pawn break to open lines",
        rationale: "The pawn structure is locked; a timely break frees your pieces.",
        applies: |f, _| f.character == Character::Closed,
    },
    GoalRule {
        horizon: Horizon::Medium, kind: GoalKind::Positional, priority: 5,
        description: "Occupy open files with rooks",
        rationale: "Open files are highways for the rooks.",
        applies: |f, _| f.character == Character::Open && f.phase != Phase::Endgame,
    },
    GoalRule {
        horizon: Horizon::Medium, kind: GoalKind::Positional, priority: 4,
        description: "Develop minor pieces",
        rationale: "Knights and bishops are still on their starting squares.",
        applies: |f, _| f.development.fullmove <= 10 && f.development.undeveloped_minors > 0,
    },
    GoalRule {
        horizon: Horizon::Medium, kind: GoalKind::Reactive, priority: 4,
        description: "Keep pieces coordinated and watch for tactics",
        rationale: "The position is sharp; loose pieces get punished.",
        applies: |f, _| f.character == Character::Tactical,
    },
    GoalRule {
        horizon: Horizon::Medium, kind: GoalKind::Positional, priority: 3,
        description: "Improve your worst-placed piece",
        rationale: "Nothing forcing is happening, so small improvements add up.",
        applies: |f, _| f.character == Character::Balanced && f.phase == Phase::Middlegame,
    },
];

fn short_goal(kind: GoalKind, priority: i32, description: String, rationale: &str, mv: Option<String>) -> Goal {
    Goal { horizon: Horizon::Short, kind, description, rationale: rationale.to_string(), priority, mv, fallback: false }
}

/// One short-term goal per tactical flag.
fn goals_from_flags(features: &PositionFeatures) -> Vec<Goal> {
    let best = features.engine_best_move.clone();
    let capture_on = |square: &str| {
        features.flags.iter().find_map(|f| match f {
            TacticalFlag::CaptureAvailable { mv, square: s, .. } if s == square => Some(mv.clone()),
            _ => None,
        })
    };
    let mut taken_squares: Vec<&str> = Vec::new();
    let mut out = Vec::new();

    for flag in &features.flags {
        if let TacticalFlag::HangingPiece { square, piece, value, owner: Owner::Them } = flag {
            taken_squares.push(square.as_str());
            out.push(short_goal(
                GoalKind::Reactive, value + 4,
                format!("Capture the undefended {} on {}", piece, square),
                "Nothing protects it.",
                capture_on(square),
            ));
        }
    }

    for flag in &features.flags {
        let goal = match flag {
            TacticalFlag::InCheck => short_goal(GoalKind::Reactive, 10, "Get out of check".into(), "Your king is attacked.", None),
            TacticalFlag::MateAvailable { moves } => short_goal(
                GoalKind::Strategic, 10, format!("Deliver mate in {}", moves), "The engine has found a forced mate.", best.clone(),
            ),
            TacticalFlag::MateThreat { .. } => short_goal(
                GoalKind::Reactive, 9, "Defend against the mating threat".into(), "Your opponent threatens a forced mate.", best.clone(),
            ),
            TacticalFlag::CaptureAvailable { square, .. } if taken_squares.contains(&square.as_str()) => continue,
            TacticalFlag::CaptureAvailable { mv, victim, square, gain_cp } if *gain_cp > 0 => short_goal(
                GoalKind::Reactive, 3 + gain_cp / 100, format!("Win the {} on {} with {}", victim, square, mv),
                "The exchange comes out ahead in material.", Some(mv.clone()),
            ),
            TacticalFlag::CaptureAvailable { mv, .. } => short_goal(
                GoalKind::Reactive, 2, format!("Consider the even exchange {}", mv), "Trading changes the balance of the position.", Some(mv.clone()),
            ),
            TacticalFlag::HangingPiece { square, piece, value, owner: Owner::Us } => short_goal(
                GoalKind::Reactive, value + 3, format!("Protect the {} on {}", piece, square), "It is attacked and undefended.", None,
            ),
            TacticalFlag::HangingPiece { .. } => continue,
            TacticalFlag::CheckAvailable { mv } => short_goal(
                GoalKind::Reactive, 5, format!("Give check with {}", mv), "Checks force the opponent's reply.", Some(mv.clone()),
            ),
            TacticalFlag::EngineSwing { delta_cp } if *delta_cp > 0 => short_goal(
                GoalKind::Reactive, 6, "Find the tactical shot in this position".into(),
                "The engine rates the position well above the material count.", best.clone(),
            ),
            TacticalFlag::EngineSwing { .. } => short_goal(
                GoalKind::Reactive, 6, "Neutralize the opponent's threat".into(),
                "The engine rates the position well below the material count.", best.clone(),
            ),
        };
        out.push(goal);
    }
    out
}

fn rank(goals: &mut Vec<(usize, Goal)>) {
    goals.sort_by(|(ia, a), (ib, b)| {
        b.priority.cmp(&a.priority).then(a.kind.cmp(&b.kind)).then(ia.cmp(ib))
    });
}

/// Pure and total. Long- and medium-term lists are never empty.
pub fn build(features: &PositionFeatures, side_to_move: Color) -> GoalHierarchy {
    let mut candidates: Vec<(usize, Goal)> = GOAL_RULES
        .iter()
        .enumerate()
        .filter(|(_, r)| (r.applies)(features, side_to_move))
        .map(|(i, r)| {
            (i, Goal {
                horizon: r.horizon,
                kind: r.kind,
                description: r.description.to_string(),
                rationale: r.rationale.to_string(),
                priority: r.priority,
                mv: None,
                fallback: false,
            })
        })
        .collect();
    let base = GOAL_RULES.len();
    candidates.extend(goals_from_flags(features).into_iter().enumerate().map(|(i, g)| (base + i, g)));
    rank(&mut candidates);

    let pick = |horizon: Horizon| -> Vec<Goal> {
        candidates
            .iter()
            .filter(|(_, g)| g.horizon == horizon)
            .take(1 + MAX_ALTERNATIVES)
            .map(|(_, g)| g.clone())
            .collect()
    };
    let mut long = pick(Horizon::Long);
    let mut medium = pick(Horizon::Medium);
    let short = pick(Horizon::Short);
    if long.is_empty() { long.push(Goal::fallback(Horizon::Long, FALLBACK_LONG)); }
    if medium.is_empty() { medium.push(Goal::fallback(Horizon::Medium, FALLBACK_MEDIUM)); }
    GoalHierarchy { long, medium, short }
}
