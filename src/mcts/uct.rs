//! Upper Confidence bound applied to Trees.

use super::Reward;

/// Scores a child from its parent's point of view.
///
/// `maximizing` is true when the player to move at the parent is the one the search is run
/// for. Otherwise the opponent is choosing, and the child is scored on `1 - win rate`.
///
/// `visits` must be non-zero: unvisited children are expanded before they are ever scored.
pub fn uct_score(
    wins: Reward,
    visits: u32,
    parent_visits: u32,
    constant: f64,
    maximizing: bool,
) -> f64 {
    debug_assert!(visits > 0, "UCT evaluated on an unvisited node");
    let visits = visits as f64;
    let win_rate = wins / visits;
    let exploitation = if maximizing { win_rate } else { 1.0 - win_rate };
    let exploration = (2.0 * (parent_visits as f64).ln() / visits).sqrt();
    exploitation + constant * exploration
}
