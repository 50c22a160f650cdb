//! Picks the move to recommend and ties it to the goal hierarchy.

use serde::Serialize;

use crate::engine::EngineEvaluation;
use crate::error::{AdvisorError, AdvisorResult};
use crate::goals::{Goal, GoalHierarchy, GoalKind, Horizon};

pub const MAX_RECOMMENDATION_ALTERNATIVES: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Alternative {
    pub horizon: Horizon,
    pub description: String,
    pub mv: Option<String>,
    pub rationale: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// SAN, as validated by the evaluator adapter.
    pub mv: String,
    pub rationale: String,
    /// Description of the active long-term goal.
    pub plan: String,
    /// Horizon of the goal the move was bound to.
    pub bound: Horizon,
    pub alternatives: Vec<Alternative>,
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn kind_word(kind: GoalKind) -> &'static str {
    match kind {
        GoalKind::Strategic => "strategic",
        GoalKind::Positional => "positional",
        GoalKind::Reactive => "immediate",
    }
}

fn rationale_for(mv: &str, bound: &Goal, long: &Goal) -> String {
    let head = match bound.horizon {
        Horizon::Short => format!("{} addresses the immediate need to {}. {}", mv, lower_first(&bound.description), bound.rationale),
        Horizon::Medium => format!("{} works toward the {} goal: {}.", mv, kind_word(bound.kind), lower_first(&bound.description)),
        Horizon::Long => format!("{} is the engine's choice and fits the overall plan.", mv),
    };
    format!("{} This supports the long-term plan: {}.", head, lower_first(&long.description))
}

fn alternative(goal: &Goal) -> Alternative {
    let rationale = match &goal.mv {
        Some(mv) => format!("{} would {}.", mv, lower_first(&goal.description)),
        None => goal.rationale.clone(),
    };
    Alternative { horizon: goal.horizon, description: goal.description.clone(), mv: goal.mv.clone(), rationale }
}

/// The engine's best move, explained in terms of the hierarchy.
///
/// Binding order: an active short-term goal whose move is the recommended
/// one, else the medium-term goal unless it is only a fallback, else the
/// long-term goal.
pub fn select(evaluation: &EngineEvaluation, hierarchy: &GoalHierarchy) -> AdvisorResult<Recommendation> {
    let mv = evaluation.best_move.clone().ok_or(AdvisorError::NoLegalMove)?;
    let long = hierarchy.long_term();
    let medium = hierarchy.medium_term();

    let bound = hierarchy
        .short_term()
        .iter()
        .find(|g| g.references(&mv))
        .or_else(|| (!medium.fallback).then_some(medium))
        .unwrap_or(long);

    let alternatives = hierarchy
        .short_term()
        .iter()
        .filter(|g| !std::ptr::eq(*g, bound) && !g.references(&mv))
        .chain(hierarchy.alternatives(Horizon::Medium))
        .chain(hierarchy.alternatives(Horizon::Long))
        .take(MAX_RECOMMENDATION_ALTERNATIVES)
        .map(alternative)
        .collect();

    Ok(Recommendation {
        rationale: rationale_for(&mv, bound, long),
        plan: long.description.clone(),
        bound: bound.horizon,
        mv,
        alternatives,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_first_handles_empty() {
        assert_eq!(lower_first(""), "");
        assert_eq!(lower_first("Develop pieces"), "develop pieces");
    }
}
