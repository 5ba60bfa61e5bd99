pub mod games;
pub mod mcts;
