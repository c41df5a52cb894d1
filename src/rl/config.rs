//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

use super::reward::RewardConfig;

/// Configuration for tabular Q-learning
///
/// # Example
///
/// ```rust
/// use qsnake::rl::QLearningConfig;
///
/// let config = QLearningConfig {
///     max_episodes: 500,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QLearningConfig {
    /// Initial learning rate
    ///
    /// Default: 0.3
    pub alpha: f64,

    /// Discount factor for the best next-state value, fixed for the run
    ///
    /// Default: 0.2
    pub gamma: f64,

    /// Initial exploration rate for the epsilon-greedy policy
    ///
    /// Default: 0.2
    pub epsilon: f64,

    /// Amount subtracted from alpha after every terminal episode
    pub alpha_decay: f64,

    /// Alpha never decays below this value
    pub alpha_floor: f64,

    /// Amount subtracted from epsilon after every terminal episode
    pub epsilon_decay: f64,

    /// Epsilon never decays below this value
    pub epsilon_floor: f64,

    /// Training stops after this many terminal episodes
    ///
    /// Default: 2500
    pub max_episodes: usize,

    pub rewards: RewardConfig,
}

impl QLearningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(format!("alpha must be in [0, 1], got {}", self.alpha));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(format!("epsilon must be in [0, 1], got {}", self.epsilon));
        }

        if self.alpha_decay < 0.0 || self.epsilon_decay < 0.0 {
            return Err("decay steps must be non-negative".to_string());
        }

        if self.alpha_floor < 0.0 || self.alpha_floor > self.alpha {
            return Err(format!(
                "alpha_floor must be in [0, alpha], got {}",
                self.alpha_floor
            ));
        }

        if self.epsilon_floor < 0.0 || self.epsilon_floor > self.epsilon {
            return Err(format!(
                "epsilon_floor must be in [0, epsilon], got {}",
                self.epsilon_floor
            ));
        }

        if self.max_episodes == 0 {
            return Err("max_episodes must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            gamma: 0.2,
            epsilon: 0.2,
            alpha_decay: 0.0003,
            alpha_floor: 0.01,
            epsilon_decay: 0.0002,
            epsilon_floor: 0.0003,
            max_episodes: 2500,
            rewards: RewardConfig::training(),
        }
    }
}

/// Learning and exploration rates that decay over the run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub alpha: f64,
    pub gamma: f64,
    pub epsilon: f64,
}

impl Hyperparameters {
    pub fn from_config(config: &QLearningConfig) -> Self {
        Self {
            alpha: config.alpha,
            gamma: config.gamma,
            epsilon: config.epsilon,
        }
    }

    /// Linear decay applied once per terminal episode, clamped at the floors
    pub fn decay(&mut self, config: &QLearningConfig) {
        if self.alpha > config.alpha_floor {
            self.alpha = (self.alpha - config.alpha_decay).max(config.alpha_floor);
        }
        if self.epsilon > config.epsilon_floor {
            self.epsilon = (self.epsilon - config.epsilon_decay).max(config.epsilon_floor);
        }
    }
}
