//! Text templates for [`Response`]. Pure: same response, same text.

use std::fmt::Write;

use crate::respond::Response;

/// Strategy alternatives listed under a strategy answer.
const LISTED_OPTIONS: usize = 2;

pub fn format(response: &Response) -> String {
    match response {
        Response::MoveRecommendation { mv, reasoning, strategy, alternatives } => {
            let mut out = format!("I recommend: {}\n\nReasoning: {}\n\nThis supports the strategy: {}", mv, reasoning, strategy);
            if !alternatives.is_empty() {
                out.push_str("\n\nAlso worth considering:");
                for alt in alternatives {
                    let _ = write!(out, "\n- {}: {}", alt.description, alt.rationale);
                }
            }
            out
        }
        Response::PlanOnly { reason, plan, next_step } => format!(
            "I can't recommend a specific move right now ({}).\n\nStrategic plan: {}\nNext step: {}",
            reason, plan, next_step
        ),
        Response::StrategyAdvice { content, rationale, next_step, additional_options } => {
            let mut out = format!("Strategic advice: {}\n{}\n\nNext step: {}", content, rationale, next_step);
            if !additional_options.is_empty() {
                out.push_str("\n\nAlternative strategies to consider:");
                for (i, option) in additional_options.iter().take(LISTED_OPTIONS).enumerate() {
                    let _ = write!(out, "\n{}. {}", i + 1, option);
                }
            }
            out
        }
        Response::TacticalAdvice { content, moves, others } => {
            let mut out = format!("Tactical opportunity: {}", content);
            if !moves.is_empty() {
                let _ = write!(out, "\nCandidate moves: {}", moves.join(", "));
            }
            if !others.is_empty() {
                let _ = write!(out, "\nAlso: {}", others.join("; "));
            }
            out
        }
        Response::PositionEvaluation { evaluation, position_type, suggested_approach } => format!(
            "Position evaluation: {}\nPosition type: {}\n\nSuggested approach: {}",
            evaluation, position_type, suggested_approach
        ),
        Response::MoveExplanation { mv, explanation, evaluation_before, evaluation_after } => {
            let change = match (evaluation_before, evaluation_after) {
                (Some(before), Some(after)) => format!("{} -> {}", before, after),
                _ => "unavailable".to_string(),
            };
            format!("Analysis of {}:\n\n{}\n\nEvaluation change: {}", mv, explanation, change)
        }
        Response::GameOver { result, winner } => match winner {
            Some(w) => format!("Game over: {}. {} wins.", result, w),
            None => format!("Game over: {}. The game is drawn.", result),
        },
        Response::Help { text } => text.clone(),
        Response::Apology { reason } => format!("Sorry, I couldn't answer that: {}", reason),
    }
}
