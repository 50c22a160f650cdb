use cozy_chess::{Board, Move, Piece};
use crate::search::eval::{eval_cp, piece_cp, DRAW_SCORE, MATE_SCORE};
use std::time::{Duration, Instant};

// Scores beyond this are mate scores.
pub const MATE_BOUND: i32 = MATE_SCORE - 1_000;
const QSEARCH_MAX_PLY: u32 = 8;

#[derive(Default, Debug, Clone)]
pub struct SearchResult {
    pub bestmove: Option<Move>,
    /// Side-to-move perspective.
    pub score_cp: i32,
    pub nodes: u64,
    pub depth: u32,
    pub pv: Vec<Move>,
}

impl SearchResult {
    /// Full moves to mate: positive when the side to move mates.
    pub fn mate_in(&self) -> Option<i32> {
        if self.score_cp >= MATE_BOUND {
            Some((MATE_SCORE - self.score_cp + 1) / 2)
        } else if self.score_cp <= -MATE_BOUND {
            Some(-(MATE_SCORE + self.score_cp + 1) / 2)
        } else {
            None
        }
    }
}

/// Fixed-depth material searcher with a capture-only quiescence tail.
pub struct Searcher {
    pub(crate) nodes: u64,
    node_limit: u64,
    deadline: Option<Instant>,
    aborted: bool,
}

impl Default for Searcher {
    fn default() -> Self {
        Self { nodes: 0, node_limit: u64::MAX, deadline: None, aborted: false }
    }
}

fn mvv_lva(board: &Board, m: Move) -> i32 {
    let victim = board.piece_on(m.to).map(piece_cp).unwrap_or(0);
    let attacker = board.piece_on(m.from).map(piece_cp).unwrap_or(0);
    victim * 10 - attacker / 10
}

fn is_capture(board: &Board, m: Move) -> bool {
    let stm = board.side_to_move();
    match board.color_on(m.to) {
        Some(c) => c != stm,
        None => board.piece_on(m.from) == Some(Piece::Pawn) && m.from.file() != m.to.file(),
    }
}

fn ordered_moves(board: &Board, first: Option<Move>) -> Vec<Move> {
    let mut moves: Vec<Move> = Vec::with_capacity(64);
    board.generate_moves(|ml| { for m in ml { moves.push(m); } false });
    // Stable sort keeps generation order among quiet moves
    moves.sort_by_key(|&m| if is_capture(board, m) { -mvv_lva(board, m) } else { 0 });
    if let Some(f) = first {
        if let Some(pos) = moves.iter().position(|&m| m == f) {
            let m = moves.remove(pos);
            moves.insert(0, m);
        }
    }
    moves
}

impl Searcher {
    pub fn set_node_limit(&mut self, nodes: u64) { self.node_limit = nodes; }
    pub fn set_movetime(&mut self, budget: Duration) { self.deadline = Some(Instant::now() + budget); }

    fn should_stop(&mut self) -> bool {
        if self.aborted { return true; }
        if self.nodes >= self.node_limit { self.aborted = true; }
        if let Some(dl) = self.deadline { if Instant::now() >= dl { self.aborted = true; } }
        self.aborted
    }

    fn eval_terminal(&self, board: &Board, ply: i32) -> i32 {
        if board.checkers().is_empty() { DRAW_SCORE } else { -MATE_SCORE + ply }
    }

    fn qsearch(&mut self, board: &Board, mut alpha: i32, beta: i32, qply: u32) -> i32 {
        self.nodes += 1;
        // Stand pat
        let stand = eval_cp(board);
        if stand >= beta || qply >= QSEARCH_MAX_PLY { return stand.min(beta); }
        if stand > alpha { alpha = stand; }

        let caps: Vec<Move> = ordered_moves(board, None).into_iter().filter(|&m| is_capture(board, m)).collect();
        for m in caps {
            let mut child = board.clone();
            child.play(m);
            let score = -self.qsearch(&child, -beta, -alpha, qply + 1);
            if score >= beta { return beta; }
            if score > alpha { alpha = score; }
        }
        alpha
    }

    fn alphabeta(&mut self, board: &Board, depth: u32, mut alpha: i32, beta: i32, ply: i32, pv: &mut Vec<Move>) -> i32 {
        pv.clear();
        if self.should_stop() { return 0; }
        self.nodes += 1;
        let moves = ordered_moves(board, None);
        if moves.is_empty() { return self.eval_terminal(board, ply); }
        if board.halfmove_clock() >= 100 { return DRAW_SCORE; }
        if depth == 0 { return self.qsearch(board, alpha, beta, 0); }

        let mut child_pv = Vec::new();
        for m in moves {
            let mut child = board.clone();
            child.play(m);
            let score = -self.alphabeta(&child, depth - 1, -beta, -alpha, ply + 1, &mut child_pv);
            if self.aborted { return 0; }
            if score >= beta { return beta; }
            if score > alpha {
                alpha = score;
                pv.clear();
                pv.push(m);
                pv.extend_from_slice(&child_pv);
            }
        }
        alpha
    }

    /// Searches exactly `depth` plies. Returns `None` if stopped early.
    pub fn search_depth(&mut self, board: &Board, depth: u32, first: Option<Move>) -> Option<SearchResult> {
        let depth = depth.max(1);
        let moves = ordered_moves(board, first);
        if moves.is_empty() {
            return Some(SearchResult { bestmove: None, score_cp: self.eval_terminal(board, 0), nodes: self.nodes, depth, pv: Vec::new() });
        }

        let mut alpha = -MATE_SCORE - 1;
        let beta = MATE_SCORE + 1;
        let mut best: Option<(Move, i32, Vec<Move>)> = None;
        let mut child_pv = Vec::new();
        for m in moves {
            let mut child = board.clone();
            child.play(m);
            let score = -self.alphabeta(&child, depth - 1, -beta, -alpha, 1, &mut child_pv);
            if self.aborted { return None; }
            if best.as_ref().map_or(true, |(_, bs, _)| score > *bs) {
                let mut pv = vec![m];
                pv.extend_from_slice(&child_pv);
                best = Some((m, score, pv));
            }
            if score > alpha { alpha = score; }
        }
        let (m, score, pv) = best?;
        Some(SearchResult { bestmove: Some(m), score_cp: score, nodes: self.nodes, depth, pv })
    }

    /// Iterative deepening up to `max_depth`; keeps the deepest completed iteration.
    pub fn search(&mut self, board: &Board, max_depth: u32) -> SearchResult {
        self.nodes = 0;
        self.aborted = false;
        let mut last = SearchResult::default();
        for depth in 1..=max_depth.max(1) {
            match self.search_depth(board, depth, last.bestmove) {
                Some(res) => {
                    let mate = res.mate_in().is_some();
                    last = res;
                    if mate { break; }
                }
                None => break,
            }
        }
        last.nodes = self.nodes;
        last
    }
}
