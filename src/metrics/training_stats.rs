//! Progress tracking for Q-learning runs
//!
//! Keeps a rolling window of finished episodes for the periodic progress
//! line, the full score history for smoothing, and the latest learning and
//! exploration rates.

use std::collections::VecDeque;

/// One finished episode as seen by the trainer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub reward: f64,
    pub ticks: usize,
    pub score: u32,
}

/// Rolling training statistics
///
/// # Example
///
/// ```rust
/// use qsnake::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
/// stats.record_episode(40.0, 150, 1);
/// stats.record_params(0.2997, 0.1998);
///
/// assert_eq!(stats.best_score(), 1);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    recent: VecDeque<EpisodeSummary>,
    capacity: usize,
    score_history: Vec<u32>,
    best_score: u32,
    ticks_total: usize,
    alpha: f64,
    epsilon: f64,
}

impl TrainingStats {
    /// `capacity` is the number of recent episodes averaged over
    pub fn new(capacity: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            score_history: Vec::new(),
            best_score: 0,
            ticks_total: 0,
            alpha: 0.0,
            epsilon: 0.0,
        }
    }

    pub fn record_episode(&mut self, reward: f64, ticks: usize, score: u32) {
        if self.recent.len() == self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(EpisodeSummary {
            reward,
            ticks,
            score,
        });

        self.score_history.push(score);
        self.best_score = self.best_score.max(score);
        self.ticks_total += ticks;
    }

    /// Learning and exploration rates after the latest decay
    pub fn record_params(&mut self, alpha: f64, epsilon: f64) {
        self.alpha = alpha;
        self.epsilon = epsilon;
    }

    fn recent_mean(&self, field: impl Fn(&EpisodeSummary) -> f64) -> f64 {
        if self.recent.is_empty() {
            return 0.0;
        }
        self.recent.iter().map(field).sum::<f64>() / self.recent.len() as f64
    }

    pub fn mean_reward(&self) -> f64 {
        self.recent_mean(|e| e.reward)
    }

    pub fn mean_ticks(&self) -> f64 {
        self.recent_mean(|e| e.ticks as f64)
    }

    pub fn mean_score(&self) -> f64 {
        self.recent_mean(|e| f64::from(e.score))
    }

    /// Trailing `window`-episode mean of the score history. Empty until
    /// `window` episodes have finished.
    pub fn running_average(&self, window: usize) -> Vec<f64> {
        if window == 0 {
            return Vec::new();
        }
        self.score_history
            .windows(window)
            .map(|w| w.iter().map(|&s| f64::from(s)).sum::<f64>() / window as f64)
            .collect()
    }

    pub fn score_history(&self) -> &[u32] {
        &self.score_history
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn episodes(&self) -> usize {
        self.score_history.len()
    }

    pub fn ticks_total(&self) -> usize {
        self.ticks_total
    }

    /// One-line progress report
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Ticks: {} | Reward: {:.2} | Score: {:.2} | Best: {} | Len: {:.1} | Alpha: {:.4} | Epsilon: {:.4}",
            self.episodes(),
            self.ticks_total,
            self.mean_reward(),
            self.mean_score(),
            self.best_score,
            self.mean_ticks(),
            self.alpha,
            self.epsilon,
        )
    }
}
