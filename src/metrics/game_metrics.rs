use std::time::{Duration, Instant};

/// Per-session counters for the interactive modes
#[derive(Debug, Clone)]
pub struct GameMetrics {
    session_start: Instant,
    elapsed: Duration,
    pub high_score: u32,
    pub episodes_played: u32,
    score_sum: u64,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            session_start: Instant::now(),
            elapsed: Duration::ZERO,
            high_score: 0,
            episodes_played: 0,
            score_sum: 0,
        }
    }

    /// Refresh the session clock; called once per rendered frame
    pub fn update(&mut self) {
        self.elapsed = self.session_start.elapsed();
    }

    pub fn restart_clock(&mut self) {
        self.session_start = Instant::now();
        self.elapsed = Duration::ZERO;
    }

    pub fn on_episode_end(&mut self, final_score: u32) {
        self.episodes_played += 1;
        self.score_sum += u64::from(final_score);
        self.high_score = self.high_score.max(final_score);
    }

    pub fn mean_score(&self) -> f64 {
        match self.episodes_played {
            0 => 0.0,
            n => self.score_sum as f64 / f64::from(n),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Session time as `MM:SS`
    pub fn format_time(&self) -> String {
        format_clock(self.elapsed)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
