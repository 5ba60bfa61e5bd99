use super::Reward;
use linked_hash_set::LinkedHashSet;
use rand::Rng;
use std::fmt::Debug;
use std::hash::Hash;

/// Index of a node in its tree's arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// One reachable position, identified by the move that led to it from its parent.
///
/// `wins` is the sum of the searching player's rewards over `visits` simulations, so
/// `0 <= wins <= visits` holds after every visit.
#[derive(Debug)]
pub struct Node<ActionType: Debug + Clone + Eq + Hash> {
    parent: Option<NodeId>,
    parent_action: Option<ActionType>,
    /// In expansion order
    children: Vec<(ActionType, NodeId)>,
    untried_actions: LinkedHashSet<ActionType>,
    visits: u32,
    wins: Reward,
}

impl<ActionType: Debug + Clone + Eq + Hash> Node<ActionType> {
    /// The root counts itself as visited once so that its children's UCT terms are defined.
    pub fn new_root(legal_actions: Vec<ActionType>) -> Node<ActionType> {
        Node {
            parent: None,
            parent_action: None,
            children: Vec::new(),
            untried_actions: untried_set(legal_actions),
            visits: 1,
            wins: 0.0,
        }
    }

    pub fn new_child(
        parent: NodeId,
        action: ActionType,
        legal_actions: Vec<ActionType>,
    ) -> Node<ActionType> {
        Node {
            parent: Some(parent),
            parent_action: Some(action),
            children: Vec::new(),
            untried_actions: untried_set(legal_actions),
            visits: 0,
            wins: 0.0,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn parent_action(&self) -> Option<&ActionType> {
        self.parent_action.as_ref()
    }

    pub fn children(&self) -> &[(ActionType, NodeId)] {
        &self.children
    }

    pub fn child(&self, action: &ActionType) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(child_action, _)| child_action == action)
            .map(|(_, id)| *id)
    }

    pub fn untried_actions(&self) -> &LinkedHashSet<ActionType> {
        &self.untried_actions
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn wins(&self) -> Reward {
        self.wins
    }

    pub fn win_rate(&self) -> Reward {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / self.visits as f64
        }
    }

    pub fn fully_expanded(&self) -> bool {
        self.untried_actions.is_empty() && !self.children.is_empty()
    }

    /// No untried actions and no children: the position has ended.
    pub fn terminal(&self) -> bool {
        self.untried_actions.is_empty() && self.children.is_empty()
    }

    /// Picks an untried action uniformly at random without consuming it.
    pub fn sample_untried<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ActionType> {
        if self.untried_actions.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.untried_actions.len());
        self.untried_actions.iter().nth(index).cloned()
    }

    pub(crate) fn insert_child(&mut self, action: ActionType, child: NodeId) {
        if !self.untried_actions.remove(&action) {
            panic!("Inserting child for an action that was not untried: {:?}", action);
        }
        self.children.push((action, child));
    }

    pub(crate) fn visit(&mut self, reward: Reward) {
        self.visits += 1;
        self.wins += reward;
    }
}

fn untried_set<ActionType: Eq + Hash>(actions: Vec<ActionType>) -> LinkedHashSet<ActionType> {
    let mut untried = LinkedHashSet::new();
    for action in actions {
        untried.insert(action);
    }
    untried
}
