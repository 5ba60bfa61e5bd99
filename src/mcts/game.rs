use super::Reward;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

///
/// The rules of a two-player, perfect-information, turn-based game.
///
/// The search never looks inside a state; everything it knows about the game comes
/// through this trait. States are treated as immutable values.
pub trait Board {
    type State: Clone;
    type Action: Debug + Clone + Eq + Hash;
    /// A player identifier, such as a colour or a seat number.
    type Player: Debug + Copy + Eq + Hash;

    fn current_player(&self, state: &Self::State) -> Self::Player;

    /// All moves available from `state`. Empty if and only if the state has ended.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// The state reached by playing `action` in `state`.
    ///
    /// Returns `None` if the board rejects the action.
    fn next_state(&self, state: &Self::State, action: &Self::Action) -> Option<Self::State>;

    fn is_ended(&self, state: &Self::State) -> bool;

    /// Reward per player for an ended state: 1.0 for a win, 0.5 for a tie, 0.0 for a loss.
    ///
    /// Returns `None` if the state has not ended.
    fn win_values(&self, state: &Self::State) -> Option<HashMap<Self::Player, Reward>>;
}
