//! Per-tree search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Counters accumulated by one search tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Simulations run.
    pub simulations: u64,

    /// Nodes evaluated and given children.
    pub expansions: u64,

    /// Simulations that ended on an already-terminal node.
    pub terminal_hits: u64,

    /// Deepest node reached, relative to the tree root.
    pub max_depth: u16,

    /// Total time spent searching (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate simulations per second.
    #[must_use]
    pub fn simulations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.simulations as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }

    /// Fold another tree's counters into this one.
    pub fn merge(&mut self, other: &SearchStats) {
        self.simulations += other.simulations;
        self.expansions += other.expansions;
        self.terminal_hits += other.terminal_hits;
        self.max_depth = self.max_depth.max(other.max_depth);
        self.time_us += other.time_us;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_simulations_per_second() {
        let mut stats = SearchStats::new();
        assert_eq!(stats.simulations_per_second(), 0.0);
        stats.simulations = 1000;
        stats.time_us = 1_000_000;
        assert_eq!(stats.simulations_per_second(), 1000.0);
    }

    #[test]
    fn test_stats_merge() {
        let mut a = SearchStats {
            simulations: 10,
            expansions: 4,
            terminal_hits: 1,
            max_depth: 3,
            time_us: 100,
        };
        let b = SearchStats {
            simulations: 5,
            expansions: 2,
            terminal_hits: 0,
            max_depth: 7,
            time_us: 50,
        };
        a.merge(&b);
        assert_eq!(a.simulations, 15);
        assert_eq!(a.max_depth, 7);
        assert_eq!(a.time_us, 150);
        assert_eq!(a.expansions, 6);
    }

    #[test]
    fn test_stats_serialization() {
        let stats = SearchStats {
            simulations: 42,
            ..SearchStats::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        let deserialized: SearchStats = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, deserialized);
    }
}
