//! Monte Carlo Tree Search with UCT selection and uniformly random play outs.

pub mod config;
pub mod error;
pub mod game;
pub mod node;
pub mod play_out;
pub mod tree;
pub mod uct;

pub use config::{BestTurnPolicy, MctsConfig};
pub use error::{MctsError, Result};
pub use game::Board;
pub use node::{Node, NodeId};
pub use tree::{Selection, Tree};

use log::{debug, error, info};
use play_out::{play_out, reward_for};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Reward for one player in one simulated game: 1.0 win, 0.5 tie, 0.0 loss
pub type Reward = f64;

///
/// Builds the search tree for the player to move in `state`.
///
/// Runs `config.iterations` rounds of selection and expansion, play out and
/// backpropagation. Stops early as soon as selection reaches an ended position, unless
/// `stop_on_terminal` is off, in which case only an exhausted root stops the loop.
///
/// Fails with `MctsError::NoLegalActions` if `state` has already ended, without ever asking
/// the board for a next state.
pub fn think<B: Board, R: Rng + ?Sized>(
    board: &B,
    state: &B::State,
    config: &MctsConfig,
    rng: &mut R,
) -> Result<Tree<B::Action>> {
    config.validate()?;
    if board.is_ended(state) {
        return Err(MctsError::NoLegalActions);
    }
    let root_actions = board.legal_actions(state);
    if root_actions.is_empty() {
        error!("Board reports a state that has not ended but has no legal actions");
        return Err(MctsError::InconsistentTerminal {
            ended: false,
            legal_count: 0,
        });
    }

    let identity = board.current_player(state);
    let mut tree = Tree::new(root_actions);

    for iteration in 0..config.iterations {
        let (leaf, end_state) = match tree.select_and_expand(
            board,
            state,
            identity,
            config.exploration_constant,
            rng,
        )? {
            Selection::Expanded {
                node,
                state: leaf_state,
            } => (node, play_out(board, leaf_state, rng)?),
            Selection::Terminal {
                node,
                state: leaf_state,
            } => {
                if node == NodeId::ROOT || config.stop_on_terminal {
                    debug!(
                        "Stopping after {} iterations: selection reached an ended position",
                        iteration
                    );
                    break;
                }
                (node, leaf_state)
            }
        };
        let reward = reward_for(board, &end_state, identity)?;
        tree.propagate_reward(leaf, reward);
    }

    debug!(
        "Search for {:?} finished: {} nodes, {} root visits",
        identity,
        tree.len(),
        tree.root().visits()
    );
    tree.trace_log_children();
    Ok(tree)
}

/// Searches from `state` and commits to a move using `config.policy`.
pub fn calculate_best_turn<B: Board, R: Rng + ?Sized>(
    board: &B,
    state: &B::State,
    config: &MctsConfig,
    rng: &mut R,
) -> Result<B::Action> {
    let tree = think(board, state, config, rng)?;
    let action = tree
        .best_pick(config.policy)
        .ok_or(MctsError::NoLegalActions)?;
    info!(
        "Chose {:?} after {} simulations",
        action,
        tree.root().visits() - 1
    );
    Ok(action)
}

/// Like `calculate_best_turn`, with the random source seeded from `config.seed`.
pub fn decide_with_config<B: Board>(
    board: &B,
    state: &B::State,
    config: &MctsConfig,
) -> Result<B::Action> {
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    calculate_best_turn(board, state, config, &mut rng)
}

/// Picks a move for the player to move in `state` with the default configuration.
pub fn decide<B: Board>(board: &B, state: &B::State) -> Result<B::Action> {
    decide_with_config(board, state, &MctsConfig::default())
}
