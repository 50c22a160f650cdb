//! Keyword-based intent classification and dispatch to response generators.

use serde::Serialize;

use crate::board::Position;
use crate::engine::EngineEvaluation;
use crate::respond::{self, Request, Response};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    RecommendMove,
    ExplainStrategy,
    /// `None` explains the engine's own move.
    ExplainMove { mv: Option<String> },
    EvaluatePosition,
    FindTactics,
    Unrecognized { text: String },
}

impl Intent {
    /// Intents whose answer needs no engine evaluation.
    pub fn needs_engine(&self) -> bool { !matches!(self, Intent::Unrecognized { .. }) }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Token {
    Required,
    Ignored,
}

struct Rule {
    /// Every group must match; any keyword within a group suffices.
    groups: &'static [&'static [&'static str]],
    token: Token,
    intent: fn(Option<String>) -> Intent,
}

const RULES: &[Rule] = &[
    Rule { groups: &[&["explain"]], token: Token::Required, intent: |mv| Intent::ExplainMove { mv } },
    Rule { groups: &[&["why"]], token: Token::Required, intent: |mv| Intent::ExplainMove { mv } },
    Rule {
        groups: &[&["best move", "what should i play", "recommend", "suggest"]],
        token: Token::Ignored,
        intent: |_| Intent::RecommendMove,
    },
    Rule { groups: &[&["strateg", "plan", "goal"]], token: Token::Ignored, intent: |_| Intent::ExplainStrategy },
    Rule { groups: &[&["tactic", "opportunit", "threat"]], token: Token::Ignored, intent: |_| Intent::FindTactics },
    Rule {
        groups: &[&["evaluat", "assess", "who is better", "position"]],
        token: Token::Ignored,
        intent: |_| Intent::EvaluatePosition,
    },
    Rule { groups: &[&["explain"], &["move"]], token: Token::Ignored, intent: |_| Intent::ExplainMove { mv: None } },
];

fn is_file(c: u8) -> bool { (b'a'..=b'h').contains(&c) }
fn is_rank(c: u8) -> bool { (b'1'..=b'8').contains(&c) }

fn is_uci_token(tok: &str) -> bool {
    let b = tok.as_bytes();
    (b.len() == 4 || (b.len() == 5 && b"nbrq".contains(&b[4])))
        && is_file(b[0]) && is_rank(b[1]) && is_file(b[2]) && is_rank(b[3])
}

/// `[NBRQK]?[a-h]?[1-8]?x?[a-h][1-8](=?[NBRQ])?[+#]?` or castling.
fn is_san_token(tok: &str) -> bool {
    let body = tok.trim_end_matches(|c| c == '+' || c == '#');
    if matches!(body, "O-O" | "O-O-O" | "0-0" | "0-0-0") { return true; }
    let mut b = body.as_bytes();

    if let [rest @ .., p] = b {
        if b"NBRQ".contains(p) {
            b = rest.strip_suffix(b"=").unwrap_or(rest);
            // promotion must follow a destination square
            if !matches!(b.last(), Some(r) if is_rank(*r)) { return false; }
        }
    }
    if let [first, rest @ ..] = b {
        if b"NBRQK".contains(first) { b = rest; }
    }
    let [head @ .., f, r] = b else { return false };
    if !is_file(*f) || !is_rank(*r) { return false; }
    let head = head.strip_suffix(b"x").unwrap_or(head);
    match head {
        [] => true,
        [c] => is_file(*c) || is_rank(*c),
        [c, d] => is_file(*c) && is_rank(*d),
        _ => false,
    }
}

/// First move-like token of `text`, case preserved, surrounding punctuation
/// and annotation marks stripped.
pub fn extract_move_token(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_start_matches(|c: char| !c.is_ascii_alphanumeric())
                .trim_end_matches(|c: char| matches!(c, '?' | '!' | '.' | ',' | ';' | ':' | ')' | '"' | '\''))
        })
        .find(|w| is_uci_token(w) || is_san_token(w))
        .map(str::to_string)
}

/// Total: every input, including the empty string, maps to one intent.
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();
    let token = extract_move_token(text);
    RULES
        .iter()
        .find(|rule| {
            rule.groups.iter().all(|group| group.iter().any(|kw| lower.contains(kw)))
                && (rule.token == Token::Ignored || token.is_some())
        })
        .map(|rule| (rule.intent)(token.clone()))
        .unwrap_or_else(|| Intent::Unrecognized { text: text.to_string() })
}

/// Runs the generator for `intent`. `evaluate_after` is used only when a
/// move explanation wants the evaluation of the position after the move.
pub fn route(
    intent: &Intent,
    request: &Request,
    evaluate_after: &mut dyn FnMut(&Position) -> Option<EngineEvaluation>,
) -> Response {
    match intent {
        Intent::RecommendMove => respond::recommend_move(request),
        Intent::ExplainStrategy => respond::explain_strategy(request),
        Intent::ExplainMove { mv } => respond::explain_move(request, mv.as_deref(), evaluate_after),
        Intent::EvaluatePosition => respond::evaluate_position(request),
        Intent::FindTactics => respond::find_tactics(request),
        Intent::Unrecognized { .. } => respond::help(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn san_tokens() {
        for t in ["e4", "Nf3", "exd5", "Nbd2", "R1e2", "Qh4+", "h8=Q#", "e8Q", "O-O", "O-O-O+", "Qa1xh8"] {
            assert!(is_san_token(t), "{t}");
        }
        for t in ["hello", "4", "move", "e9", "Ke", "=Q", "xe4x"] {
            assert!(!is_san_token(t), "{t}");
        }
    }

    #[test]
    fn uci_tokens() {
        assert!(is_uci_token("e2e4"));
        assert!(is_uci_token("e7e8q"));
        assert!(!is_uci_token("e7e8k"));
        assert!(!is_uci_token("e2e9"));
    }

    #[test]
    fn token_keeps_case_and_drops_punctuation() {
        assert_eq!(extract_move_token("Why Nf3?"), Some("Nf3".to_string()));
        assert_eq!(extract_move_token("explain (e2e4), please"), Some("e2e4".to_string()));
        assert_eq!(extract_move_token("is Qxf7# good!?"), Some("Qxf7#".to_string()));
        assert_eq!(extract_move_token("no moves here"), None);
    }
}
