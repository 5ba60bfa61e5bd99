pub mod tictactoe;

pub use tictactoe::{TicTacToe, TicTacToeAction, TicTacToeState};

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Games {
    TicTacToe,
}
