//! Locates trap slots: empty cells that would complete a four-in-a-row
//! for whoever drops a coin there

use crate::board::{Board, Cell, Player};
use crate::{HEIGHT, WIDTH};

/// Who profits from a trap slot
///
/// Distinct from [`Cell`]: `Both` classifies a slot that finishes a four
/// for either side, it is never a board occupant.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Beneficiary {
    One,
    Two,
    Both,
}

impl Beneficiary {
    /// The single player who profits, or `None` for a shared trap
    pub fn exclusive_player(self) -> Option<Player> {
        match self {
            Beneficiary::One => Some(Player::One),
            Beneficiary::Two => Some(Player::Two),
            Beneficiary::Both => None,
        }
    }
}

/// An empty cell that completes a four-in-a-row when filled
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct TrappedSlot {
    pub column: usize,
    /// Height of the slot from the bottom of its column
    pub row: usize,
    pub beneficiary: Beneficiary,
}

// The lines scanned as windows through a candidate slot. The vertical line
// is handled separately: gravity leaves only one shape for it.
const WINDOW_LINES: [(i32, i32); 3] = [(1, 0), (1, 1), (1, -1)];

/// Finds every trapped slot on the board, bottom-to-top within each column
pub fn locate_traps(board: &Board) -> Vec<TrappedSlot> {
    let mut traps = Vec::new();
    for column in 0..WIDTH {
        for row in 0..HEIGHT {
            if let Some(beneficiary) = slot_trapped_by(board, column, row) {
                traps.push(TrappedSlot {
                    column,
                    row,
                    beneficiary,
                });
            }
        }
    }
    traps
}

/// Number of coins already stacked in each column
pub fn column_progressions(board: &Board) -> [usize; WIDTH] {
    let mut progressions = [0; WIDTH];
    for (column, progression) in progressions.iter_mut().enumerate() {
        *progression = board.column_height(column);
    }
    progressions
}

fn slot_trapped_by(board: &Board, column: usize, row: usize) -> Option<Beneficiary> {
    // an occupied slot cannot be trapped
    if !board.get(column, row).is_empty() {
        return None;
    }

    let mut traps_one = false;
    let mut traps_two = false;

    // every four-window through this slot on the horizontal and both
    // diagonal lines, each direction derived the same way
    for &(dc, dr) in WINDOW_LINES.iter() {
        for start in -3..=0 {
            match window_owner(board, column as i32, row as i32, dc, dr, start) {
                Some(Player::One) => traps_one = true,
                Some(Player::Two) => traps_two = true,
                None => {}
            }
        }
    }

    // vertical: three coins of one colour directly beneath make this slot
    // the landing spot of a four
    if row >= 3 {
        if let Cell::Taken(player) = board.get(column, row - 1) {
            if board.get(column, row - 2) == Cell::Taken(player)
                && board.get(column, row - 3) == Cell::Taken(player)
            {
                match player {
                    Player::One => traps_one = true,
                    Player::Two => traps_two = true,
                }
            }
        }
    }

    match (traps_one, traps_two) {
        (true, true) => Some(Beneficiary::Both),
        (true, false) => Some(Beneficiary::One),
        (false, true) => Some(Beneficiary::Two),
        (false, false) => None,
    }
}

// The player owning all three occupied cells of the window starting `start`
// steps from the probed slot along (dc, dr), if the window lies on the
// board and contains no other empty cell and no second colour.
fn window_owner(board: &Board, column: i32, row: i32, dc: i32, dr: i32, start: i32) -> Option<Player> {
    let mut owner: Option<Player> = None;
    for step in 0..4 {
        let offset = start + step;
        if offset == 0 {
            // the probed slot itself
            continue;
        }
        match board.cell_at(column + offset * dc, row + offset * dr)? {
            Cell::Empty => return None,
            Cell::Taken(player) => match owner {
                None => owner = Some(player),
                Some(existing) if existing == player => {}
                Some(_) => return None,
            },
        }
    }
    owner
}
