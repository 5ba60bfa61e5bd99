use super::error::{MctsError, Result};
use super::game::Board;
use super::node::{Node, NodeId};
use super::uct::uct_score;
use super::{BestTurnPolicy, Reward};
use log::{error, log_enabled, trace, Level};
use rand::Rng;
use std::fmt::Debug;
use std::hash::Hash;

/// Where a walk from the root stopped
#[derive(Debug, PartialEq)]
pub enum Selection<StateType> {
    /// A new child was created; `state` is its position.
    Expanded { node: NodeId, state: StateType },
    /// The walk reached an ended position and nothing could be expanded.
    Terminal { node: NodeId, state: StateType },
}

/// Next step of the walk for the current node
enum Walk<ActionType> {
    Expand(ActionType),
    Descend(ActionType, NodeId),
    Terminal,
}

/// Search tree for a single decision. Nodes live in an arena and refer to each other by
/// `NodeId`; the root is always `NodeId::ROOT`.
#[derive(Debug)]
pub struct Tree<ActionType: Debug + Clone + Eq + Hash> {
    nodes: Vec<Node<ActionType>>,
}

impl<ActionType: Debug + Clone + Eq + Hash> Tree<ActionType> {
    pub fn new(root_actions: Vec<ActionType>) -> Tree<ActionType> {
        Tree {
            nodes: vec![Node::new_root(root_actions)],
        }
    }

    pub fn root(&self) -> &Node<ActionType> {
        self.get(NodeId::ROOT)
    }

    /// # Panics
    /// Panics if the id is not from this tree.
    pub fn get(&self, id: NodeId) -> &Node<ActionType> {
        &self.nodes[id.index()]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<ActionType> {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<ActionType>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    fn add_child(
        &mut self,
        parent: NodeId,
        action: ActionType,
        legal_actions: Vec<ActionType>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(Node::new_child(parent, action.clone(), legal_actions));
        self.get_mut(parent).insert_child(action, id);
        id
    }

    ///
    /// Walks down from the root until a node with untried actions is found, and expands one
    /// of them at random. Fully expanded nodes are passed through by UCT, scored for
    /// `identity` when it is their player's move and against it otherwise.
    ///
    /// Collaborator output is checked before the new child is added, so a failed expansion
    /// leaves the tree unchanged.
    pub fn select_and_expand<B, R>(
        &mut self,
        board: &B,
        root_state: &B::State,
        identity: B::Player,
        constant: f64,
        rng: &mut R,
    ) -> Result<Selection<B::State>>
    where
        B: Board<Action = ActionType>,
        R: Rng + ?Sized,
    {
        let mut current = NodeId::ROOT;
        let mut state = root_state.clone();

        loop {
            let walk = {
                let node = self.get(current);
                if let Some(action) = node.sample_untried(rng) {
                    Walk::Expand(action)
                } else if node.children().is_empty() {
                    Walk::Terminal
                } else {
                    let maximizing = board.current_player(&state) == identity;
                    match self.best_child(current, constant, maximizing) {
                        Some((action, child)) => Walk::Descend(action, child),
                        None => Walk::Terminal,
                    }
                }
            };

            match walk {
                Walk::Expand(action) => {
                    let next = apply(board, &state, &action)?;
                    let legal_actions = board.legal_actions(&next);
                    let ended = board.is_ended(&next);
                    if ended != legal_actions.is_empty() {
                        error!(
                            "After {:?} board reports ended = {} with {} legal actions",
                            action,
                            ended,
                            legal_actions.len()
                        );
                        return Err(MctsError::InconsistentTerminal {
                            ended,
                            legal_count: legal_actions.len(),
                        });
                    }
                    trace!("Expanding {:?} below {:?}", action, current);
                    let child = self.add_child(current, action, legal_actions);
                    return Ok(Selection::Expanded {
                        node: child,
                        state: next,
                    });
                }
                Walk::Descend(action, child) => {
                    state = apply(board, &state, &action)?;
                    current = child;
                }
                Walk::Terminal => {
                    trace!("Selection reached ended node {:?}", current);
                    return Ok(Selection::Terminal {
                        node: current,
                        state,
                    });
                }
            }
        }
    }

    /// The child with the highest UCT score. Ties go to the child expanded first.
    pub fn best_child(
        &self,
        parent: NodeId,
        constant: f64,
        maximizing: bool,
    ) -> Option<(ActionType, NodeId)> {
        let parent_node = self.get(parent);
        let mut best: Option<(&ActionType, NodeId, f64)> = None;
        for (action, child_id) in parent_node.children() {
            let child = self.get(*child_id);
            let score = if child.visits() == 0 {
                f64::INFINITY
            } else {
                uct_score(
                    child.wins(),
                    child.visits(),
                    parent_node.visits(),
                    constant,
                    maximizing,
                )
            };
            trace!(
                "UCT action: {:?}, wins: {}, visits: {}, parent_visits: {}, maximizing: {}, score: {}",
                action,
                child.wins(),
                child.visits(),
                parent_node.visits(),
                maximizing,
                score
            );
            if best.map_or(true, |(_, _, best_score)| score > best_score) {
                best = Some((action, *child_id, score));
            }
        }
        best.map(|(action, id, _)| (action.clone(), id))
    }

    /// Adds `reward` to every node from `from` up to and including the root.
    pub fn propagate_reward(&mut self, from: NodeId, reward: Reward) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visit(reward);
            current = node.parent();
        }
    }

    /// The move to commit to, or `None` if the root was never expanded.
    pub fn best_pick(&self, policy: BestTurnPolicy) -> Option<ActionType> {
        let mut best: Option<(&ActionType, f64)> = None;
        for (action, child_id) in self.root().children() {
            let child = self.get(*child_id);
            let value = match policy {
                BestTurnPolicy::HighestWinRate => child.win_rate(),
                BestTurnPolicy::MostVisits => child.visits() as f64,
            };
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((action, value));
            }
        }
        best.map(|(action, _)| action.clone())
    }

    pub fn trace_log_children(&self) {
        if !log_enabled!(Level::Trace) {
            return;
        }
        let mut stack: Vec<(NodeId, usize)> = self
            .root()
            .children()
            .iter()
            .rev()
            .map(|(_, id)| (*id, 0))
            .collect();
        while let Some((id, level)) = stack.pop() {
            let node = self.get(id);
            trace!(
                "{} {:?} {:.3}/{} ({:.6})",
                "         |-".repeat(level),
                node.parent_action(),
                node.wins(),
                node.visits(),
                node.win_rate()
            );
            stack.extend(node.children().iter().rev().map(|(_, child)| (*child, level + 1)));
        }
    }
}

fn apply<B: Board>(board: &B, state: &B::State, action: &B::Action) -> Result<B::State> {
    board.next_state(state, action).ok_or_else(|| {
        error!("Board rejected {:?} from its own legal actions", action);
        MctsError::IllegalAction {
            action: format!("{:?}", action),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::injectable_board::{InjectableBoard, TestAction, TestState};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_way_root() -> TestState {
        TestState::with_actions(vec![
            TestAction::WinInXTurns(2),
            TestAction::WinInXTurns(3),
        ])
    }

    ///
    /// Test that selection expands an untried root action before anything else
    ///
    #[test]
    fn test_selection_basic() {
        let board = InjectableBoard::default();
        let root_state = two_way_root();
        let mut tree = Tree::new(board.legal_actions(&root_state));
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let selection = tree
            .select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
            .unwrap();
        let Selection::Expanded { node, state } = selection else {
            panic!("Expected an expansion");
        };
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(node).parent(), Some(NodeId::ROOT));
        assert_eq!(state.next_player_id, 1);
        assert_eq!(tree.root().untried_actions().len(), 1);
        let action = *tree.get(node).parent_action().unwrap();
        assert!(!tree.root().untried_actions().contains(&action));
        assert_eq!(tree.get(node).untried_actions().len(), 1);
    }

    ///
    /// Test that every untried action is expanded before any child is descended into
    ///
    #[test]
    fn test_selection_prefers_untried_over_uct() {
        let board = InjectableBoard::default();
        let root_state = TestState::with_actions(vec![
            TestAction::WinInXTurns(1),
            TestAction::WinInXTurns(2),
            TestAction::WinInXTurns(3),
        ]);
        let mut tree = Tree::new(board.legal_actions(&root_state));
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..3 {
            let selection = tree
                .select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
                .unwrap();
            let Selection::Expanded { node, .. } = selection else {
                panic!("Expected an expansion");
            };
            assert_eq!(tree.get(node).parent(), Some(NodeId::ROOT));
            tree.propagate_reward(node, 0.0);
        }
        assert!(tree.root().fully_expanded());

        let selection = tree
            .select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
            .unwrap();
        let Selection::Expanded { node, .. } = selection else {
            panic!("Expected an expansion");
        };
        let parent = tree.get(node).parent().unwrap();
        assert_ne!(parent, NodeId::ROOT);
        assert_eq!(tree.get(parent).parent(), Some(NodeId::ROOT));
    }

    ///
    /// Test that the walk descends into the child UCT prefers
    ///
    #[test]
    fn test_selection_multiple_expanded() {
        let board = InjectableBoard::default();
        let root_state = two_way_root();
        let mut tree = Tree::new(board.legal_actions(&root_state));
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        for _ in 0..2 {
            tree.select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
                .unwrap();
        }
        // Same visits, but one has only lost
        let good = tree.child_for(TestAction::WinInXTurns(2));
        let bad = tree.child_for(TestAction::WinInXTurns(3));
        tree.propagate_reward(good, 1.0);
        tree.propagate_reward(bad, 0.0);

        let selection = tree
            .select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
            .unwrap();
        let Selection::Expanded { node, .. } = selection else {
            panic!("Expected an expansion");
        };
        assert_eq!(tree.get(node).parent(), Some(good));
        assert_eq!(
            tree.get(node).parent_action(),
            Some(&TestAction::WinInXTurns(1))
        );
    }

    #[test]
    fn test_opponent_picks_child_worst_for_identity() {
        let board = InjectableBoard::default();
        let root_state = two_way_root();
        let mut tree = Tree::new(board.legal_actions(&root_state));
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..2 {
            tree.select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
                .unwrap();
        }
        let good = tree.child_for(TestAction::WinInXTurns(2));
        let bad = tree.child_for(TestAction::WinInXTurns(3));
        tree.propagate_reward(good, 1.0);
        tree.propagate_reward(bad, 0.0);

        // Player 0 moves at the root, so searching for player 1 makes the root an opponent node
        let selection = tree
            .select_and_expand(&board, &root_state, 1, 2.0, &mut rng)
            .unwrap();
        let Selection::Expanded { node, .. } = selection else {
            panic!("Expected an expansion");
        };
        assert_eq!(tree.get(node).parent(), Some(bad));
    }

    #[test]
    fn test_selection_terminal_root() {
        let board = InjectableBoard::default();
        let mut root_state = TestState::with_actions(vec![]);
        root_state.ended = true;
        let mut tree = Tree::new(board.legal_actions(&root_state));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let selection = tree
            .select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
            .unwrap();
        assert_eq!(
            selection,
            Selection::Terminal {
                node: NodeId::ROOT,
                state: root_state
            }
        );
        assert_eq!(board.next_state_calls(), 0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_selection_reaches_terminal_child() {
        let board = InjectableBoard::default();
        let root_state = TestState::with_actions(vec![TestAction::Win]);
        let mut tree = Tree::new(board.legal_actions(&root_state));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let Selection::Expanded { node, state } = tree
            .select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
            .unwrap()
        else {
            panic!("Expected an expansion");
        };
        assert!(tree.get(node).terminal());
        tree.propagate_reward(node, 1.0);

        let selection = tree
            .select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
            .unwrap();
        assert_eq!(selection, Selection::Terminal { node, state });
    }

    #[test]
    fn test_expansion_rejected_action_leaves_tree_unchanged() {
        let board = InjectableBoard::default();
        let root_state = TestState::with_actions(vec![TestAction::Rejected]);
        let mut tree = Tree::new(board.legal_actions(&root_state));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = tree.select_and_expand(&board, &root_state, 0, 2.0, &mut rng);
        assert!(matches!(result, Err(MctsError::IllegalAction { .. })));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().untried_actions().len(), 1);
    }

    #[test]
    fn test_expansion_child_actions() {
        let board = InjectableBoard::default();
        let root_state = TestState::with_actions(vec![TestAction::NextTurnInjectActionCount(5)]);
        let mut tree = Tree::new(board.legal_actions(&root_state));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let Selection::Expanded { node, .. } = tree
            .select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
            .unwrap()
        else {
            panic!("Expected an expansion");
        };
        assert_eq!(tree.get(node).untried_actions().len(), 5);
    }

    #[test]
    fn test_propagate_one_path() {
        let board = InjectableBoard::default();
        let root_state = TestState::with_actions(vec![TestAction::WinInXTurns(2)]);
        let mut tree = Tree::new(board.legal_actions(&root_state));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut leaf = NodeId::ROOT;
        for _ in 0..3 {
            if let Selection::Expanded { node, .. } = tree
                .select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
                .unwrap()
            {
                leaf = node;
                tree.propagate_reward(node, 0.0);
            }
        }
        let before: Vec<(u32, f64)> = tree.iter().map(|(_, n)| (n.visits(), n.wins())).collect();

        // Using a slightly unusual reward to be more certain this was the reward applied
        const REWARD: f64 = 0.8;
        tree.propagate_reward(leaf, REWARD);

        for ((_, node), (visits, wins)) in tree.iter().zip(before) {
            assert_eq!(node.visits(), visits + 1);
            assert!((node.wins() - (wins + REWARD)).abs() < 1e-12);
        }
        assert_eq!(tree.root().visits(), 5);
    }

    #[test]
    fn test_propagate_skips_off_path_nodes() {
        let board = InjectableBoard::default();
        let root_state = two_way_root();
        let mut tree = Tree::new(board.legal_actions(&root_state));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..2 {
            tree.select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
                .unwrap();
        }
        let good = tree.child_for(TestAction::WinInXTurns(2));
        let other = tree.child_for(TestAction::WinInXTurns(3));
        tree.propagate_reward(good, 0.5);

        assert_eq!(tree.get(good).visits(), 1);
        assert_eq!(tree.get(good).wins(), 0.5);
        assert_eq!(tree.get(other).visits(), 0);
        assert_eq!(tree.root().visits(), 2);
        assert_eq!(tree.root().wins(), 0.5);
    }

    #[test]
    fn test_best_pick_policies() {
        let board = InjectableBoard::default();
        let root_state = two_way_root();
        let mut tree = Tree::new(board.legal_actions(&root_state));
        assert_eq!(tree.best_pick(BestTurnPolicy::HighestWinRate), None);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..2 {
            tree.select_and_expand(&board, &root_state, 0, 2.0, &mut rng)
                .unwrap();
        }
        let rare = tree.child_for(TestAction::WinInXTurns(2));
        let common = tree.child_for(TestAction::WinInXTurns(3));
        tree.propagate_reward(rare, 1.0);
        for _ in 0..4 {
            tree.propagate_reward(common, 0.5);
        }

        assert_eq!(
            tree.best_pick(BestTurnPolicy::HighestWinRate),
            Some(TestAction::WinInXTurns(2))
        );
        assert_eq!(
            tree.best_pick(BestTurnPolicy::MostVisits),
            Some(TestAction::WinInXTurns(3))
        );
    }

    impl Tree<TestAction> {
        fn child_for(&self, action: TestAction) -> NodeId {
            self.root().child(&action).unwrap()
        }
    }
}
