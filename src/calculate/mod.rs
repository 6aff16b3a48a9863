//! Statistics calculation engine.
//!
//! Computes derived metrics from aggregated profiles and raw matches:
//! - Skill-tier segmentation of players and matches
//! - Rank histograms and percentiles
//! - Character popularity
//! - Character win rates with binomial confidence intervals

mod binomial;
mod distribution;
mod segmentation;
mod win_rate;

pub use binomial::*;
pub use distribution::*;
pub use segmentation::*;
pub use win_rate::*;

/// Calculate win rate from wins and games played.
pub fn calculate_win_rate(wins: usize, games: usize) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_win_rate() {
        assert!((calculate_win_rate(5, 6) - 0.833).abs() < 0.01);
        assert_eq!(calculate_win_rate(0, 0), 0.0);
        assert_eq!(calculate_win_rate(3, 6), 0.5);
    }
}
