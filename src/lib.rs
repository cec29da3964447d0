//! A time-budgeted agent for playing the board game 'Connect 4'
//!
//! Unlike a perfect solver, this agent answers within a per-move wall-clock
//! allowance: it deepens an alpha-beta minimax search pass by pass for as
//! long as the time guard permits, rates reachable positions by their trap
//! structure, and separates equally rated moves with a denser
//! four-potential pass.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_bot::{choose_move, Board, MatchState, WallClock};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! // three stacked coins each; the side to move wins in the first column
//! let match_state = MatchState {
//!     board: Board::from_drops("121212")?,
//!     timebank_ms: 10_000,
//!     time_per_move_ms: 500,
//!     round: 3,
//! };
//! let best_move = choose_move(&match_state, &WallClock::start())?;
//!
//! assert_eq!(best_move, 0);
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod board;

pub mod traps;

pub mod evaluate;

pub mod search;

pub mod agent;


/// The width of the game board in tiles
pub const WIDTH: usize = 7;

/// The height of the game board in tiles
pub const HEIGHT: usize = 6;

// ensure that a four-in-a-row fits on the board in every direction
const_assert!(WIDTH >= 4 && HEIGHT >= 4);

pub use agent::{choose_move, MatchState, MoveGenerator, SelectionError, TurnClock, WallClock};
pub use board::{Board, Cell, Player};
pub use evaluate::{evaluate_terminal, FourPotential, TrapPotential};
pub use search::{minimax, ChildGenerator, Evaluator, SearchReport};
pub use traps::{column_progressions, locate_traps, Beneficiary, TrappedSlot};
