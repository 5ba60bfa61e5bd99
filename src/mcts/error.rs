use thiserror::Error;

/// Errors that can stop a search
#[derive(Error, Debug)]
pub enum MctsError {
    /// The state handed to the search has already ended.
    #[error("No legal actions available")]
    NoLegalActions,

    #[error("Board rejected an action it listed as legal: {action}")]
    IllegalAction { action: String },

    #[error("Board reports ended = {ended} but {legal_count} legal actions")]
    InconsistentTerminal { ended: bool, legal_count: usize },

    #[error("Win values requested for a state that has not ended")]
    NotEnded,

    #[error("No reward for player {player}")]
    MissingReward { player: String },

    #[error("Reward {reward} for player {player} is outside [0, 1]")]
    RewardOutOfRange { player: String, reward: f64 },

    #[error("Invalid search configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not parse search configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl MctsError {
    /// True for errors caused by a `Board` breaking its contract
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            MctsError::IllegalAction { .. }
                | MctsError::InconsistentTerminal { .. }
                | MctsError::NotEnded
                | MctsError::MissingReward { .. }
                | MctsError::RewardOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MctsError>;
