//! A generic minimax game tree search with alpha-beta pruning
//!
//! The algorithm knows nothing about Connect 4: callers supply the board
//! type together with an [`Evaluator`] and a [`ChildGenerator`], so any two
//! player zero-sum game fits. See
//! <https://en.wikipedia.org/wiki/Alpha%E2%80%93beta_pruning>

use crate::board::Player;

/// Scores a position from the given player's perspective without lookahead
pub trait Evaluator<B> {
    fn evaluate(&self, board: &B, perspective: Player) -> i32;
}

/// Produces every position reachable in one move, in the game's natural
/// move order
///
/// Returning no children marks the position as terminal; the search then
/// falls back to the evaluator.
pub trait ChildGenerator<B> {
    fn children(&self, board: &B) -> Vec<B>;
}

/// The outcome of one bounded-depth search
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SearchReport {
    pub score: i32,
    /// True when every line below this node ran to a terminal position with
    /// no pruning cutoff. Searched with unrestricted bounds, such a score is
    /// the proven game value rather than a depth-limited estimate.
    pub exhausted: bool,
}

/// Minimax with alpha-beta pruning over a caller-supplied evaluator and
/// child generator
///
/// `lower` and `upper` seed the pruning window and should normally be below
/// and above every score the evaluator can produce. Levels alternate
/// between maximizing and minimizing on behalf of `perspective`, starting
/// with `maximizing` at this node. Children are visited in generator
/// order, so equal inputs always prune and score identically.
pub fn minimax<B, E, G>(
    board: &B,
    evaluator: &E,
    generator: &G,
    depth: u32,
    maximizing: bool,
    perspective: Player,
    mut lower: i32,
    mut upper: i32,
) -> SearchReport
where
    E: Evaluator<B>,
    G: ChildGenerator<B>,
{
    let children = generator.children(board);
    if children.is_empty() {
        // terminal: the evaluator's word is final
        return SearchReport {
            score: evaluator.evaluate(board, perspective),
            exhausted: true,
        };
    }
    if depth == 0 {
        // depth limit cut a live position short
        return SearchReport {
            score: evaluator.evaluate(board, perspective),
            exhausted: false,
        };
    }

    let mut exhausted = true;
    let mut value;
    if maximizing {
        value = lower;
        for child in children.iter() {
            let report = minimax(child, evaluator, generator, depth - 1, false, perspective, lower, upper);
            exhausted &= report.exhausted;
            if report.score > value {
                value = report.score;
            }
            if value > lower {
                lower = value;
            }
            if lower >= upper {
                // a perfect opponent never lets play reach the siblings
                exhausted = false;
                break;
            }
        }
    } else {
        value = upper;
        for child in children.iter() {
            let report = minimax(child, evaluator, generator, depth - 1, true, perspective, lower, upper);
            exhausted &= report.exhausted;
            if report.score < value {
                value = report.score;
            }
            if value < upper {
                upper = value;
            }
            if lower >= upper {
                exhausted = false;
                break;
            }
        }
    }

    SearchReport {
        score: value,
        exhausted,
    }
}
