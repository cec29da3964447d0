//! Static evaluation of Connect 4 positions
//!
//! Two raters share the terminal sentinels: [`TrapPotential`] is the cheap,
//! tactically aware rater driving the main search, [`FourPotential`] is the
//! denser rater reserved for breaking ties between equal moves.

use crate::board::{Board, Cell, Player};
use crate::search::Evaluator;
use crate::traps::{column_progressions, locate_traps};
use crate::{HEIGHT, WIDTH};

/// Lower pruning bound, below any reachable score
pub const SCORE_MIN: i32 = -999_999;
/// Upper pruning bound, above any reachable score
pub const SCORE_MAX: i32 = 999_999;

/// Score of a position the evaluated player has won
pub const GUARANTEED_WIN: i32 = 1_000;
/// Score of a position the evaluated player has lost
pub const SHOULD_LOSE: i32 = -1_000;
/// Score of a drawn position
pub const NEUTRAL: i32 = 0;

// Heuristic estimates stay strictly inside the terminal sentinels so a
// proven result can never be confused with a guess.
const HEURISTIC_CEIL: i32 = GUARANTEED_WIN - 1;
const HEURISTIC_FLOOR: i32 = SHOULD_LOSE + 1;

// Tunable weights; only their relative ordering carries meaning. Vertical
// alignments weigh less than horizontal and diagonal ones, gravity already
// guarantees their supporting coins are stacked.
const TRAP_HEIGHT_WEIGHT: i32 = 1;
const FOUR_WEIGHT_VERTICAL: i32 = 1;
const FOUR_WEIGHT_HORIZONTAL: i32 = 2;
const FOUR_WEIGHT_DIAGONAL: i32 = 2;

/// Scores a finished game, or `None` while it is still live
pub fn evaluate_terminal(board: &Board, positive: Player) -> Option<i32> {
    match board.winner() {
        Some(winner) if winner == positive => Some(GUARANTEED_WIN),
        Some(_) => Some(SHOULD_LOSE),
        None if board.is_full() => Some(NEUTRAL),
        None => None,
    }
}

/// The primary rater: sums the board's trap slots, weighting each by how
/// close its column is to reaching it
///
/// A trap needing no further coins is the most urgent signal a position
/// can carry short of a finished four. Slots trapping both players serve
/// neither side exclusively and are skipped.
pub struct TrapPotential;

impl Evaluator<Board> for TrapPotential {
    fn evaluate(&self, board: &Board, positive: Player) -> i32 {
        if let Some(score) = evaluate_terminal(board, positive) {
            return score;
        }

        let progressions = column_progressions(board);
        let mut rating = 0;
        for trap in locate_traps(board) {
            let beneficiary = match trap.beneficiary.exclusive_player() {
                Some(player) => player,
                None => continue,
            };
            // coins that must land in the column before the slot is reachable
            let still_needed = (trap.row - progressions[trap.column]) as i32;
            let points = (HEIGHT as i32 - still_needed) * TRAP_HEIGHT_WEIGHT;
            if beneficiary == positive {
                rating += points;
            } else {
                rating -= points;
            }
        }
        rating.max(HEURISTIC_FLOOR).min(HEURISTIC_CEIL)
    }
}

// Window directions paired with their weights. All eight are derived the
// same way; a window only counts while it fits on the board.
const FOUR_DIRECTIONS: [(i32, i32, i32); 8] = [
    (1, 0, FOUR_WEIGHT_HORIZONTAL),
    (-1, 0, FOUR_WEIGHT_HORIZONTAL),
    (0, 1, FOUR_WEIGHT_VERTICAL),
    (0, -1, FOUR_WEIGHT_VERTICAL),
    (1, 1, FOUR_WEIGHT_DIAGONAL),
    (-1, -1, FOUR_WEIGHT_DIAGONAL),
    (1, -1, FOUR_WEIGHT_DIAGONAL),
    (-1, 1, FOUR_WEIGHT_DIAGONAL),
];

/// The tie-break rater: credits every coin that can still become part of a
/// four, denser alignments scoring higher
///
/// Walks every occupied cell in full, which makes it noticeably more
/// expensive per call than [`TrapPotential`].
pub struct FourPotential;

impl Evaluator<Board> for FourPotential {
    fn evaluate(&self, board: &Board, positive: Player) -> i32 {
        if let Some(score) = evaluate_terminal(board, positive) {
            return score;
        }

        let mut rating = 0;
        for column in 0..WIDTH as i32 {
            for row in 0..HEIGHT as i32 {
                let player = match board.get(column as usize, row as usize) {
                    Cell::Taken(player) => player,
                    // nothing sits above the first gap of a column
                    Cell::Empty => break,
                };
                let modifier = if player == positive { 1 } else { -1 };

                for &(dc, dr, weight) in FOUR_DIRECTIONS.iter() {
                    if board.cell_at(column + 3 * dc, row + 3 * dr).is_none() {
                        continue;
                    }
                    // one credit for this coin, one more per friendly coin
                    // already in the window, unless an opposing coin blocks it
                    let mut contribution = weight;
                    let mut blocked = false;
                    for step in 1..4 {
                        match board.get((column + step * dc) as usize, (row + step * dr) as usize) {
                            Cell::Taken(other) if other == player => contribution += weight,
                            Cell::Taken(_) => {
                                blocked = true;
                                break;
                            }
                            Cell::Empty => {}
                        }
                    }
                    if !blocked {
                        rating += modifier * contribution;
                    }
                }
            }
        }
        rating.max(HEURISTIC_FLOOR).min(HEURISTIC_CEIL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn terminal_win_and_loss_are_sentinels() -> Result<()> {
        let board = Board::from_drops("1212121")?;
        assert_eq!(evaluate_terminal(&board, Player::One), Some(GUARANTEED_WIN));
        assert_eq!(evaluate_terminal(&board, Player::Two), Some(SHOULD_LOSE));
        assert_eq!(TrapPotential.evaluate(&board, Player::One), GUARANTEED_WIN);
        assert_eq!(FourPotential.evaluate(&board, Player::Two), SHOULD_LOSE);
        Ok(())
    }

    #[test]
    fn full_board_without_winner_is_neutral() -> Result<()> {
        let board = Board::from_drops("123456712345671234567123456712345671234567")?;
        assert!(board.is_full());
        assert_eq!(board.winner(), None);
        assert_eq!(evaluate_terminal(&board, Player::One), Some(NEUTRAL));
        assert_eq!(TrapPotential.evaluate(&board, Player::One), NEUTRAL);
        assert_eq!(FourPotential.evaluate(&board, Player::Two), NEUTRAL);
        Ok(())
    }

    #[test]
    fn live_board_has_no_terminal_score() -> Result<()> {
        let board = Board::from_drops("44")?;
        assert_eq!(evaluate_terminal(&board, Player::One), None);
        Ok(())
    }

    #[test]
    fn heuristics_stay_strictly_inside_the_sentinels() -> Result<()> {
        let boards = [
            Board::new(),
            Board::from_drops("4")?,
            Board::from_drops("445")?,
            Board::from_drops("12345671234567")?,
            Board::from_drops("432345654")?,
        ];
        for board in boards.iter() {
            assert_eq!(board.winner(), None);
            for &player in [Player::One, Player::Two].iter() {
                let trap_score = TrapPotential.evaluate(board, player);
                let four_score = FourPotential.evaluate(board, player);
                assert!(trap_score > SHOULD_LOSE && trap_score < GUARANTEED_WIN);
                assert!(four_score > SHOULD_LOSE && four_score < GUARANTEED_WIN);
            }
        }
        Ok(())
    }

    #[test]
    fn empty_board_is_even() {
        let board = Board::new();
        assert_eq!(TrapPotential.evaluate(&board, Player::One), 0);
        assert_eq!(TrapPotential.evaluate(&board, Player::Two), 0);
        assert_eq!(
            FourPotential.evaluate(&board, Player::One),
            -FourPotential.evaluate(&board, Player::Two)
        );
    }

    #[test]
    fn reachable_traps_outscore_distant_ones() -> Result<()> {
        // the same three-in-a-row, once on the floor and once on a pedestal
        let mut grounded = Board::new();
        for column in 0..3 {
            grounded.drop_coin(column, Player::One)?;
        }

        let mut raised = Board::new();
        for column in 0..3 {
            raised.drop_coin(column, Player::Two)?;
            raised.drop_coin(column, Player::One)?;
        }
        raised.drop_coin(4, Player::Two)?;
        raised.drop_coin(5, Player::Two)?;

        // grounded: the trap at (3, 0) needs no coins; raised: the trap at
        // (3, 1) needs one first, with Two's counterweight elsewhere
        let grounded_score = TrapPotential.evaluate(&grounded, Player::One);
        let raised_score = TrapPotential.evaluate(&raised, Player::One);
        assert!(grounded_score > 0);
        assert!(grounded_score > raised_score);
        Ok(())
    }

    #[test]
    fn unblocked_opponent_trap_drags_the_rating_down() -> Result<()> {
        // Two's vertical three traps the landing slot of column 1
        let board = Board::from_drops("212131")?;
        assert!(TrapPotential.evaluate(&board, Player::One) < 0);
        assert!(TrapPotential.evaluate(&board, Player::Two) > 0);
        Ok(())
    }

    #[test]
    fn centre_opening_rates_no_worse_than_the_edge() -> Result<()> {
        let centre = Board::new().apply(3);
        let edge = Board::new().apply(0);
        assert!(
            FourPotential.evaluate(&centre, Player::One)
                >= FourPotential.evaluate(&edge, Player::One)
        );
        assert!(
            TrapPotential.evaluate(&centre, Player::One)
                >= TrapPotential.evaluate(&edge, Player::One)
        );
        Ok(())
    }

    #[test]
    fn evaluating_twice_gives_identical_results() -> Result<()> {
        let board = Board::from_drops("44523")?;
        assert_eq!(
            TrapPotential.evaluate(&board, Player::One),
            TrapPotential.evaluate(&board, Player::One)
        );
        assert_eq!(
            FourPotential.evaluate(&board, Player::Two),
            FourPotential.evaluate(&board, Player::Two)
        );
        Ok(())
    }
}
