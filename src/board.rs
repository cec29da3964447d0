use anyhow::{anyhow, Result};

use std::fmt;

use crate::{HEIGHT, WIDTH};

/// One of the two sides of a match
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

/// The occupant of a single board slot
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Cell {
    Empty,
    Taken(Player),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// A Connect 4 position
///
/// # Notes
/// `Board` is a value type: applying a move produces a new board and never
/// mutates the one handed out. Within a column coins always form a
/// contiguous stack starting at the bottom row.
#[derive(Clone, Debug)]
pub struct Board {
    cells: [Cell; WIDTH * HEIGHT], // cells are stored left-to-right, bottom-to-top
    heights: [usize; WIDTH],
    num_moves: usize,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; WIDTH * HEIGHT],
            heights: [0; WIDTH],
            num_moves: 0,
        }
    }

    /// Replays a string of 1-indexed column digits, alternating players
    pub fn from_drops<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column @ 1..=WIDTH) => {
                    if board.winner().is_some() {
                        return Err(anyhow!("Invalid position, game is over"));
                    }
                    let player = board.current_player();
                    board.drop_coin(column - 1, player)?;
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(board)
    }

    pub fn get(&self, column: usize, row: usize) -> Cell {
        self.cells[column + WIDTH * row]
    }

    /// Bounds-checked access, for line walks that may step off the board
    pub fn cell_at(&self, column: i32, row: i32) -> Option<Cell> {
        if column < 0 || column >= WIDTH as i32 || row < 0 || row >= HEIGHT as i32 {
            None
        } else {
            Some(self.get(column as usize, row as usize))
        }
    }

    pub fn column_height(&self, column: usize) -> usize {
        self.heights[column]
    }

    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    pub fn is_full(&self) -> bool {
        self.num_moves == WIDTH * HEIGHT
    }

    pub fn playable(&self, column: usize) -> bool {
        column < WIDTH && self.heights[column] < HEIGHT
    }

    /// Whoever moves next, derived from coin parity
    pub fn current_player(&self) -> Player {
        if self.num_moves % 2 == 0 {
            Player::One
        } else {
            Player::Two
        }
    }

    /// The playable columns in ascending order; empty once the game is decided
    pub fn legal_moves(&self) -> Vec<usize> {
        if self.winner().is_some() {
            return Vec::new();
        }
        (0..WIDTH).filter(|&column| self.playable(column)).collect()
    }

    /// Drops a coin of the given colour, ignoring turn order
    ///
    /// Used by parsers and position setup; regular play goes through
    /// [`apply`](Board::apply).
    pub fn drop_coin(&mut self, column: usize, player: Player) -> Result<()> {
        if column >= WIDTH {
            return Err(anyhow!(
                "Invalid move, column {} out of range. Columns must be between 1 and {}",
                column + 1,
                WIDTH
            ));
        }
        if !self.playable(column) {
            return Err(anyhow!("Invalid move, column {} full", column + 1));
        }
        self.cells[column + WIDTH * self.heights[column]] = Cell::Taken(player);
        self.heights[column] += 1;
        self.num_moves += 1;
        Ok(())
    }

    /// Plays the current player's coin into a column, producing the new board
    pub fn apply(&self, column: usize) -> Board {
        debug_assert!(self.playable(column), "apply() requires a playable column");
        let mut next = self.clone();
        let player = next.current_player();
        next.cells[column + WIDTH * next.heights[column]] = Cell::Taken(player);
        next.heights[column] += 1;
        next.num_moves += 1;
        next
    }

    /// Checked 1-indexed variant of [`apply`](Board::apply) for move input
    pub fn play_checked(&self, column_one_indexed: usize) -> Result<Board> {
        if column_one_indexed < 1 || column_one_indexed > WIDTH {
            return Err(anyhow!(
                "Invalid move, column {} out of range. Columns must be between 1 and {}",
                column_one_indexed,
                WIDTH
            ));
        }
        let column = column_one_indexed - 1;
        if !self.playable(column) {
            return Err(anyhow!("Invalid move, column {} full", column_one_indexed));
        }
        Ok(self.apply(column))
    }

    /// Scans every four-in-a-row window for a winner
    pub fn winner(&self) -> Option<Player> {
        // east, north, north-east, south-east; every window is counted once
        // from its starting cell
        const LINES: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

        for column in 0..WIDTH {
            for row in 0..HEIGHT {
                let player = match self.get(column, row) {
                    Cell::Taken(player) => player,
                    Cell::Empty => continue,
                };
                for &(dc, dr) in LINES.iter() {
                    let aligned = (1..4).all(|step| {
                        self.cell_at(column as i32 + step * dc, row as i32 + step * dr)
                            == Some(Cell::Taken(player))
                    });
                    if aligned {
                        return Some(player);
                    }
                }
            }
        }
        None
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in (0..HEIGHT).rev() {
            for column in 0..WIDTH {
                let glyph = match self.get(column, row) {
                    Cell::Empty => '.',
                    Cell::Taken(Player::One) => 'X',
                    Cell::Taken(Player::Two) => 'O',
                };
                write!(f, "{}", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
