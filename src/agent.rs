//! Move selection under a wall-clock budget
//!
//! The driver deepens an alpha-beta search pass by pass for as long as the
//! time guard allows, keeping the last completed pass's ratings. Each pass
//! rates every legal move with the trap-potential evaluator; equal movers
//! are separated afterwards by a fixed shallow pass with the four-potential
//! evaluator.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use std::time::Instant;

use crate::board::{Board, Player};
use crate::evaluate::{
    FourPotential, TrapPotential, GUARANTEED_WIN, SCORE_MAX, SCORE_MIN, SHOULD_LOSE,
};
use crate::search::{minimax, ChildGenerator, SearchReport};
use crate::{HEIGHT, WIDTH};

/// Depth of the first deepening pass
pub const INITIAL_SEARCH_DEPTH: u32 = 6;
/// Fixed depth of the tie-break pass; never time-bounded
pub const TIE_BREAK_DEPTH: u32 = 4;

// Deepening guard factors. The game branches seven ways, so the next pass
// may need a multiple of the time the finished ones took; a pass also
// cannot be cancelled once started.
const RELAXED_GROWTH_FACTOR: u64 = 3;
const STRICT_GROWTH_FACTOR: u64 = 6;
// Bank cushion required before a pass may eat into banked time, and the
// rounds during which the bank is never touched at all.
const BANK_RESERVE_MOVES: u64 = 5;
const BANK_SAFE_ROUNDS: u32 = 2;

/// Everything the driver may read about the current turn
///
/// Assembled fresh by the caller every turn; the driver never mutates it.
#[derive(Clone, Debug)]
pub struct MatchState {
    pub board: Board,
    /// Extra time the move may dip into before disqualification
    pub timebank_ms: u64,
    pub time_per_move_ms: u64,
    /// One round per two moves, starting at 1
    pub round: u32,
}

/// Time elapsed since the current turn started
///
/// Injected into [`choose_move`] so the deepening loop's stopping condition
/// can be tested without touching the wall clock.
pub trait TurnClock {
    fn elapsed_ms(&self) -> u64;
}

/// The real thing: milliseconds since construction
pub struct WallClock {
    started: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl TurnClock for WallClock {
    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum SelectionError {
    /// The caller asked for a move on a board that has none; the rules
    /// layer should have ended the game before this point
    #[error("asked to pick a move, but the board has no legal moves")]
    NoLegalMoves,
    /// Every rated move should produce a best candidate; reaching this is
    /// an internal invariant violation, distinct from an empty move list
    #[error("no best move found among {0} rated moves")]
    BestMoveNotFound(usize),
}

/// Expands a position into its successors in ascending column order
///
/// The fixed order keeps pruning behaviour, and with it tie patterns,
/// reproducible between runs.
pub struct MoveGenerator;

impl ChildGenerator<Board> for MoveGenerator {
    fn children(&self, board: &Board) -> Vec<Board> {
        board
            .legal_moves()
            .into_iter()
            .map(|column| board.apply(column))
            .collect()
    }
}

/// Picks the move the agent believes maximizes its winning chances within
/// the turn's time budget
///
/// Returns the 0-indexed column to play.
pub fn choose_move(
    match_state: &MatchState,
    clock: &impl TurnClock,
) -> Result<usize, SelectionError> {
    let board = &match_state.board;
    let me = board.current_player();
    let moves = board.legal_moves();

    if moves.is_empty() {
        return Err(SelectionError::NoLegalMoves);
    }
    if moves.len() == 1 {
        // nothing to weigh up
        return Ok(moves[0]);
    }

    let remaining_cells = (WIDTH * HEIGHT - board.num_moves()) as u32;
    let mut ratings = vec![SCORE_MIN; moves.len()];
    let mut depth = INITIAL_SEARCH_DEPTH;

    loop {
        debug!(depth, "starting deepening pass");

        // Root subtrees are independent: each gets a fresh window, so they
        // may run in parallel without bounds leaking between siblings.
        let reports: Vec<SearchReport> = moves
            .par_iter()
            .map(|&column| {
                let child = board.apply(column);
                // the opponent replies first, one ply below the root
                minimax(
                    &child,
                    &TrapPotential,
                    &MoveGenerator,
                    depth,
                    false,
                    me,
                    SCORE_MIN,
                    SCORE_MAX,
                )
            })
            .collect();

        for (rating, report) in ratings.iter_mut().zip(reports.iter()) {
            *rating = report.score;
        }

        if let Some(index) = reports.iter().position(|report| report.score == GUARANTEED_WIN) {
            debug!(
                column = moves[index],
                "found a route to a guaranteed win, breaking off search"
            );
            return Ok(moves[index]);
        }

        let elapsed = clock.elapsed_ms();
        debug!(depth, elapsed_ms = elapsed, "finished deepening pass");

        if reports.iter().all(|report| report.exhausted) {
            debug!("every root subtree is exhausted, the outcome is settled");
            break;
        }
        if depth >= remaining_cells {
            // deeper passes cannot reach positions this one missed
            break;
        }
        if !should_deepen(match_state, elapsed) {
            break;
        }
        depth += 1;
    }

    let highest = match ratings.iter().copied().max() {
        Some(highest) => highest,
        None => return Err(SelectionError::BestMoveNotFound(0)),
    };
    if highest == SHOULD_LOSE {
        warn!("every examined move loses against perfect play");
    }

    let candidates: Vec<usize> = moves
        .iter()
        .zip(ratings.iter())
        .filter(|(_, &rating)| rating == highest)
        .map(|(&column, _)| column)
        .collect();

    match candidates.len() {
        0 => Err(SelectionError::BestMoveNotFound(moves.len())),
        1 => Ok(candidates[0]),
        _ => break_tie(board, me, &candidates),
    }
}

// Separates equally rated moves with a shallow pass of the denser
// four-potential evaluator. First seen wins exact ties.
fn break_tie(board: &Board, me: Player, candidates: &[usize]) -> Result<usize, SelectionError> {
    debug!(
        ?candidates,
        "moves yielding equal results, separating with the four-potential rater"
    );

    let mut best: Option<(usize, i32)> = None;
    for &column in candidates {
        let child = board.apply(column);
        let report = minimax(
            &child,
            &FourPotential,
            &MoveGenerator,
            TIE_BREAK_DEPTH,
            false,
            me,
            SCORE_MIN,
            SCORE_MAX,
        );
        debug!(column, score = report.score, "tie-break rating");
        match best {
            Some((_, score)) if report.score <= score => {}
            _ => best = Some((column, report.score)),
        }
    }

    best.map(|(column, _)| column)
        .ok_or_else(|| SelectionError::BestMoveNotFound(candidates.len()))
}

// A pass may only start while ample margin remains: the relaxed bound
// applies once the bank holds a healthy cushion and the opening rounds are
// over, the strict bound covers the worst-case sevenfold blow-up alone.
fn should_deepen(match_state: &MatchState, elapsed_ms: u64) -> bool {
    let banked = elapsed_ms * RELAXED_GROWTH_FACTOR < match_state.time_per_move_ms
        && match_state.timebank_ms > BANK_RESERVE_MOVES * match_state.time_per_move_ms
        && match_state.round > BANK_SAFE_ROUNDS;
    let strict = elapsed_ms * STRICT_GROWTH_FACTOR < match_state.time_per_move_ms;
    banked || strict
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    use std::cell::Cell as StdCell;

    use crate::board::Player;
    use crate::{HEIGHT, WIDTH};

    // Clock stuck at the start of the turn: the guard always allows more.
    struct FrozenClock;
    impl TurnClock for FrozenClock {
        fn elapsed_ms(&self) -> u64 {
            0
        }
    }

    // Clock past every budget: the guard stops after the first pass.
    struct ExpiredClock;
    impl TurnClock for ExpiredClock {
        fn elapsed_ms(&self) -> u64 {
            60_000
        }
    }

    struct CountingClock {
        reads: StdCell<u32>,
    }
    impl TurnClock for CountingClock {
        fn elapsed_ms(&self) -> u64 {
            self.reads.set(self.reads.get() + 1);
            60_000
        }
    }

    fn match_state(board: Board) -> MatchState {
        MatchState {
            board,
            timebank_ms: 10_000,
            time_per_move_ms: 500,
            round: 5,
        }
    }

    // Fills a column with a harmless X X O O X X stack.
    fn fill_column(board: &mut Board, column: usize) -> Result<()> {
        for i in 0..HEIGHT {
            let player = if i % 4 < 2 { Player::One } else { Player::Two };
            board.drop_coin(column, player)?;
        }
        Ok(())
    }

    #[test]
    fn full_board_is_an_error() -> Result<()> {
        let board = Board::from_drops("123456712345671234567123456712345671234567")?;
        assert!(board.is_full());
        assert_eq!(
            choose_move(&match_state(board), &ExpiredClock),
            Err(SelectionError::NoLegalMoves)
        );
        Ok(())
    }

    #[test]
    fn single_legal_move_skips_the_search() -> Result<()> {
        let mut board = Board::new();
        for column in (0..WIDTH).filter(|&column| column != 3) {
            fill_column(&mut board, column)?;
        }
        assert_eq!(board.winner(), None);
        assert_eq!(board.legal_moves(), vec![3]);

        let clock = CountingClock {
            reads: StdCell::new(0),
        };
        assert_eq!(choose_move(&match_state(board), &clock), Ok(3));
        // no deepening pass ever finished, so the clock was never consulted
        assert_eq!(clock.reads.get(), 0);
        Ok(())
    }

    #[test]
    fn takes_an_immediate_win() -> Result<()> {
        // One's three stacked coins in column 1 win on the spot
        let board = Board::from_drops("121212")?;
        assert_eq!(choose_move(&match_state(board), &ExpiredClock), Ok(0));
        Ok(())
    }

    #[test]
    fn blocks_an_imminent_horizontal_loss() -> Result<()> {
        // Two owns columns 1-3 of the bottom row; One must answer in 4
        let board = Board::from_drops("717263")?;
        assert_eq!(board.current_player(), Player::One);
        assert_eq!(choose_move(&match_state(board), &ExpiredClock), Ok(3));
        Ok(())
    }

    #[test]
    fn blocks_an_imminent_vertical_loss() -> Result<()> {
        // Two's stack of three in column 1 wins unless One lands on top
        let board = Board::from_drops("212131")?;
        assert_eq!(board.current_player(), Player::One);
        assert_eq!(choose_move(&match_state(board), &ExpiredClock), Ok(0));
        Ok(())
    }

    #[test]
    fn prefers_winning_over_blocking() -> Result<()> {
        // both sides hold three in a row through column 4; One is to move
        let board = Board::from_drops("112233")?;
        assert_eq!(choose_move(&match_state(board), &ExpiredClock), Ok(3));
        Ok(())
    }

    #[test]
    fn near_full_board_terminates_with_a_frozen_clock() -> Result<()> {
        // two open columns left; the depth ceiling ends the loop even
        // though the guard would always allow another pass
        let board = Board::from_drops("1234567123456712345671234567123456712345")?;
        let column = choose_move(&match_state(board), &FrozenClock)?;
        assert!(column == 5 || column == 6);
        Ok(())
    }

    #[test]
    fn tie_break_is_deterministic() -> Result<()> {
        let first = choose_move(&match_state(Board::new()), &ExpiredClock)?;
        let second = choose_move(&match_state(Board::new()), &ExpiredClock)?;
        assert_eq!(first, second);
        assert!(first < WIDTH);
        Ok(())
    }

    #[test]
    fn guard_respects_the_bank_and_the_opening_rounds() {
        let mut state = match_state(Board::new());

        // relaxed bound: inside a third of the allowance with a full bank
        assert!(should_deepen(&state, 150));
        // strict bound alone fails at that pace once the bank is low
        state.timebank_ms = 1_000;
        assert!(!should_deepen(&state, 150));
        // the bank is off limits during the opening rounds
        state.timebank_ms = 10_000;
        state.round = 1;
        assert!(!should_deepen(&state, 150));
        // a very quick pass satisfies the strict bound regardless
        assert!(should_deepen(&state, 50));
    }
}
