use crate::mcts::{Board, Reward};
use std::collections::HashMap;
use std::fmt;

pub const BOARD_SIZE: usize = 3;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Claim a cell, numbered 0-8 from the top left, row by row
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TicTacToeAction {
    Place(u8),
}

#[derive(PartialEq, Debug)]
enum CheckForWinResult {
    Winner(u8),
    Stalemate,
    Ongoing,
}

fn check_for_win(board: &[Cell; BOARD_SIZE * BOARD_SIZE]) -> CheckForWinResult {
    for line in LINES.iter() {
        if let Cell::Filled(player) = board[line[0]] {
            if board[line[1]] == board[line[0]] && board[line[2]] == board[line[0]] {
                return CheckForWinResult::Winner(player);
            }
        }
    }
    if board.iter().all(|&cell| cell != Cell::Empty) {
        return CheckForWinResult::Stalemate;
    }
    CheckForWinResult::Ongoing
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
enum Cell {
    Empty,
    Filled(u8),
}

/// Player 0 moves first
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TicTacToeState {
    board: [Cell; BOARD_SIZE * BOARD_SIZE],
    next_player: u8,
}

impl TicTacToeState {
    /// Plays `cells` in order from the empty board. `None` if any move is illegal.
    pub fn from_moves(cells: &[u8]) -> Option<TicTacToeState> {
        let mut state = TicTacToe.initial_state();
        for cell in cells {
            state = TicTacToe.next_state(&state, &TicTacToeAction::Place(*cell))?;
        }
        Some(state)
    }

    pub fn next_player(&self) -> u8 {
        self.next_player
    }

    /// The player occupying `cell`, if any
    pub fn occupant(&self, cell: usize) -> Option<u8> {
        match self.board.get(cell) {
            Some(Cell::Filled(player)) => Some(*player),
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<u8> {
        match check_for_win(&self.board) {
            CheckForWinResult::Winner(player) => Some(player),
            _ => None,
        }
    }
}

impl fmt::Display for TicTacToeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                let symbol = match self.board[y * BOARD_SIZE + x] {
                    Cell::Empty => "◦",
                    Cell::Filled(0) => "●",
                    Cell::Filled(_) => "◯",
                };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct TicTacToe;

impl TicTacToe {
    pub fn initial_state(&self) -> TicTacToeState {
        TicTacToeState {
            board: [Cell::Empty; BOARD_SIZE * BOARD_SIZE],
            next_player: 0,
        }
    }
}

impl Board for TicTacToe {
    type State = TicTacToeState;
    type Action = TicTacToeAction;
    type Player = u8;

    fn current_player(&self, state: &TicTacToeState) -> u8 {
        state.next_player
    }

    fn legal_actions(&self, state: &TicTacToeState) -> Vec<TicTacToeAction> {
        if check_for_win(&state.board) != CheckForWinResult::Ongoing {
            return Vec::new();
        }
        (0..BOARD_SIZE * BOARD_SIZE)
            .filter(|&i| state.board[i] == Cell::Empty)
            .map(|i| TicTacToeAction::Place(i as u8))
            .collect()
    }

    fn next_state(
        &self,
        state: &TicTacToeState,
        action: &TicTacToeAction,
    ) -> Option<TicTacToeState> {
        let TicTacToeAction::Place(cell) = action;
        let cell = *cell as usize;
        if cell >= state.board.len()
            || state.board[cell] != Cell::Empty
            || check_for_win(&state.board) != CheckForWinResult::Ongoing
        {
            return None;
        }
        let mut board = state.board;
        board[cell] = Cell::Filled(state.next_player);
        Some(TicTacToeState {
            board,
            next_player: (state.next_player + 1) % 2,
        })
    }

    fn is_ended(&self, state: &TicTacToeState) -> bool {
        check_for_win(&state.board) != CheckForWinResult::Ongoing
    }

    fn win_values(&self, state: &TicTacToeState) -> Option<HashMap<u8, Reward>> {
        match check_for_win(&state.board) {
            CheckForWinResult::Winner(0) => Some(HashMap::from([(0, 1.0), (1, 0.0)])),
            CheckForWinResult::Winner(_) => Some(HashMap::from([(0, 0.0), (1, 1.0)])),
            CheckForWinResult::Stalemate => Some(HashMap::from([(0, 0.5), (1, 0.5)])),
            CheckForWinResult::Ongoing => None,
        }
    }
}
