use super::error::{MctsError, Result};
use serde::Deserialize;

/// How the committed move is picked from the root's children once the search is done.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum BestTurnPolicy {
    /// Highest `wins / visits`, with no exploration term
    #[default]
    HighestWinRate,
    MostVisits,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    /// Simulations per decision
    pub iterations: usize,
    /// `C` in the UCT formula
    pub exploration_constant: f64,
    pub policy: BestTurnPolicy,
    /// Seed for the search's random source. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Stop the whole search the first time selection reaches an ended state. When `false`,
    /// an ended state below the root is scored as its own play out and the search carries on.
    pub stop_on_terminal: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            iterations: 1000,
            exploration_constant: 2.0,
            policy: BestTurnPolicy::HighestWinRate,
            seed: None,
            stop_on_terminal: true,
        }
    }
}

impl MctsConfig {
    pub fn with_iterations(iterations: usize) -> Self {
        MctsConfig {
            iterations,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_stop_on_terminal(mut self, stop_on_terminal: bool) -> Self {
        self.stop_on_terminal = stop_on_terminal;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: MctsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(MctsError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        // The root starts with one visit and gains one per iteration
        if self.iterations >= u32::MAX as usize {
            return Err(MctsError::InvalidConfig(format!(
                "iterations must be below {}, got {}",
                u32::MAX,
                self.iterations
            )));
        }
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(MctsError::InvalidConfig(format!(
                "exploration_constant must be finite and non-negative, got {}",
                self.exploration_constant
            )));
        }
        Ok(())
    }
}
