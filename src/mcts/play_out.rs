use super::error::{MctsError, Result};
use super::game::Board;
use super::Reward;
use log::{error, trace};
use rand::Rng;

/// Plays uniformly random moves from `state` until the game ends, returning the ended state.
pub fn play_out<B: Board, R: Rng + ?Sized>(
    board: &B,
    state: B::State,
    rng: &mut R,
) -> Result<B::State> {
    let mut cur_state = state;
    while !board.is_ended(&cur_state) {
        let permitted_actions = board.legal_actions(&cur_state);
        if permitted_actions.is_empty() {
            error!("Play out reached a state with no legal actions that has not ended");
            return Err(MctsError::InconsistentTerminal {
                ended: false,
                legal_count: 0,
            });
        }
        let action = &permitted_actions[rng.gen_range(0..permitted_actions.len())];
        cur_state = match board.next_state(&cur_state, action) {
            Some(next) => next,
            None => {
                error!("Board rejected {:?} during play out", action);
                return Err(MctsError::IllegalAction {
                    action: format!("{:?}", action),
                });
            }
        };
    }
    Ok(cur_state)
}

/// The reward `player` received in an ended state, checked to be within [0, 1].
pub fn reward_for<B: Board>(board: &B, state: &B::State, player: B::Player) -> Result<Reward> {
    let win_values = match board.win_values(state) {
        Some(values) => values,
        None => {
            error!("Board has no win values for a state the search treats as ended");
            return Err(MctsError::NotEnded);
        }
    };
    let reward = match win_values.get(&player) {
        Some(reward) => *reward,
        None => {
            error!("Win values are missing player {:?}", player);
            return Err(MctsError::MissingReward {
                player: format!("{:?}", player),
            });
        }
    };
    if !(0.0..=1.0).contains(&reward) {
        error!("Reward {} for {:?} is outside [0, 1]", reward, player);
        return Err(MctsError::RewardOutOfRange {
            player: format!("{:?}", player),
            reward,
        });
    }
    trace!("Reward for {:?} is {}", player, reward);
    Ok(reward)
}
