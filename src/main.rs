use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

use std::io::{stdin, stdout, Write};

use connect4_bot::*;

// Riddles-style budget: a bank to dip into plus a fixed per-move allowance
const TIMEBANK_MS: u64 = 10_000;
const TIME_PER_MOVE_MS: u64 = 500;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let stdin = stdin();
    let mut board = Board::new();

    println!("Welcome to Connect 4\n");

    let mut ai_players = (false, false);

    // choose AI control of player 1
    loop {
        let mut buffer = String::new();
        print!("Is player 1 AI controlled? y/n: ");
        stdout().flush().expect("failed to flush to stdout!");
        stdin.read_line(&mut buffer)?;
        match buffer.to_lowercase().chars().next() {
            Some(_letter @ 'y') => {
                ai_players.0 = true;
                break;
            }
            Some(_letter @ 'n') => break,
            _ => println!("Unknown answer given"),
        }
    }

    // choose AI control of player 2
    loop {
        let mut buffer = String::new();
        print!("Is player 2 AI controlled? y/n: ");
        stdout().flush().expect("failed to flush to stdout!");
        stdin.read_line(&mut buffer)?;
        match buffer.to_lowercase().chars().next() {
            Some(_letter @ 'y') => {
                ai_players.1 = true;
                break;
            }
            Some(_letter @ 'n') => break,
            _ => println!("Unknown answer given"),
        }
    }

    let mut timebank_ms = TIMEBANK_MS;

    // game loop
    loop {
        display(&board).expect("Failed to draw board!");

        if let Some(winner) = board.winner() {
            match winner {
                Player::One => println!("Player 1 wins!"),
                Player::Two => println!("Player 2 wins!"),
            }
            break;
        }
        if board.is_full() {
            println!("Draw!");
            break;
        }

        let ai_turn = match board.current_player() {
            Player::One => ai_players.0,
            Player::Two => ai_players.1,
        };

        let next_move = if ai_turn {
            // AI player
            let spinner = ProgressBar::new_spinner();
            spinner.set_message("AI is thinking...");
            spinner.enable_steady_tick(100);

            // slow down play if both players are AI
            if ai_players == (true, true) {
                std::thread::sleep(std::time::Duration::new(1, 0));
            }

            let clock = WallClock::start();
            let match_state = MatchState {
                board: board.clone(),
                timebank_ms,
                time_per_move_ms: TIME_PER_MOVE_MS,
                round: board.num_moves() as u32 / 2 + 1,
            };
            let column = choose_move(&match_state, &clock)?;
            let elapsed = clock.elapsed_ms();
            spinner.finish_and_clear();

            // the bank refills each turn and drains by thinking time
            timebank_ms = (timebank_ms + TIME_PER_MOVE_MS)
                .saturating_sub(elapsed)
                .min(TIMEBANK_MS);

            println!("AI plays column {} in {} ms", column + 1, elapsed);
            column + 1

        // human player
        } else {
            print!("Move input > ");
            stdout().flush().expect("Failed to flush to stdout!");
            let mut input_str = String::new();
            stdin.read_line(&mut input_str)?;

            match input_str.trim().parse::<usize>() {
                Err(_) => {
                    println!("Invalid number: {}", input_str);
                    continue;
                }
                Ok(column) => column,
            }
        };

        match board.play_checked(next_move) {
            Ok(next) => board = next,
            Err(err) => {
                println!("{}", err);
                // try the move again
                continue;
            }
        }
    }
    Ok(())
}

fn display(board: &Board) -> Result<()> {
    let mut stdout = stdout();

    let cols: String = (1..=WIDTH).map(|x| x.to_string()).collect();
    stdout.queue(PrintStyledContent(style(cols + "\n")))?;
    for _ in 0..HEIGHT {
        stdout.queue(PrintStyledContent(style("\n")))?;
    }
    stdout.flush()?;

    let (origin_x, origin_y) = crossterm::cursor::position()?;

    for row in 0..HEIGHT {
        for column in 0..WIDTH {
            let (pos_x, pos_y) = (origin_x + column as u16, origin_y - row as u16);

            stdout
                .queue(MoveTo(pos_x, pos_y))?
                .queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(Color::DarkBlue)
                        .with(match board.get(column, row) {
                            Cell::Taken(Player::One) => Color::Red,
                            Cell::Taken(Player::Two) => Color::Yellow,
                            Cell::Empty => Color::DarkBlue,
                        }),
                ))?;
        }
    }
    stdout
        .queue(MoveTo(origin_x + WIDTH as u16, origin_y))?
        .queue(PrintStyledContent(style("\n")))?;
    stdout.flush()?;
    Ok(())
}
