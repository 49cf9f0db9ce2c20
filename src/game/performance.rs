//! Step statistics and timing
//!
//! Every `Engine::step` produces a [`StepStats`] record. The
//! [`PerformanceMonitor`] keeps a rolling window of step durations and rates
//! them against the real-time budget of one physics timestep.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::util::vec2::Vec2;

/// Counters for a single step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StepStats {
    /// Steps since the last reset, including this one
    pub tick: u64,
    /// Active bodies that took part in gravity
    pub gravity_bodies: usize,
    /// Arena nodes in the last tree build
    pub tree_nodes: usize,
    /// Pairs produced by detection
    pub collisions_detected: usize,
    /// Pairs that were still live when dispatched
    pub collisions_handled: usize,
    pub black_holes_retired: usize,
    pub black_hole_spawned: bool,
    pub wave_advanced: bool,
    /// Entities after cleanup
    pub entities: usize,
    /// Kinetic energy of the active gravity bodies after cleanup
    pub kinetic_energy: f32,
    /// Linear momentum of the active gravity bodies after cleanup
    pub momentum: Vec2,
    pub duration: Duration,
}

/// Performance status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceStatus {
    /// Under 30% of the budget
    Excellent,
    /// Under 70% of the budget
    Good,
    /// Under 100% of the budget
    Warning,
    /// Steps take longer than the simulated time they cover
    Critical,
}

impl PerformanceStatus {
    /// Whether the engine keeps up with real time
    pub fn is_real_time(&self) -> bool {
        !matches!(self, PerformanceStatus::Critical)
    }
}

/// Performance monitor that tracks step durations
pub struct PerformanceMonitor {
    /// Rolling window of step durations
    step_durations: VecDeque<Duration>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Real-time budget for one step
    budget: Duration,
    status: PerformanceStatus,
    step_start: Option<Instant>,
}

impl PerformanceMonitor {
    pub fn new(dt: f32) -> Self {
        Self {
            step_durations: VecDeque::with_capacity(120),
            max_samples: 120,
            budget: Duration::from_secs_f32(dt.max(f32::EPSILON)),
            status: PerformanceStatus::Excellent,
            step_start: None,
        }
    }

    /// Start timing a step
    pub fn step_start(&mut self) {
        self.step_start = Some(Instant::now());
    }

    /// End timing a step and return its duration
    pub fn step_end(&mut self) -> Duration {
        let duration = self
            .step_start
            .take()
            .map(|start| start.elapsed())
            .unwrap_or(Duration::ZERO);
        self.record_step(duration);
        duration
    }

    fn record_step(&mut self, duration: Duration) {
        self.step_durations.push_back(duration);
        while self.step_durations.len() > self.max_samples {
            self.step_durations.pop_front();
        }
        self.update_status();
    }

    fn update_status(&mut self) {
        if self.step_durations.len() < 10 {
            // Not enough data yet
            return;
        }

        let ratio = self.budget_usage_percent() / 100.0;
        self.status = if ratio < 0.3 {
            PerformanceStatus::Excellent
        } else if ratio < 0.7 {
            PerformanceStatus::Good
        } else if ratio < 1.0 {
            PerformanceStatus::Warning
        } else {
            PerformanceStatus::Critical
        };
    }

    pub fn average_step_duration(&self) -> Duration {
        if self.step_durations.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.step_durations.iter().sum();
        sum / self.step_durations.len() as u32
    }

    /// 95th percentile step duration
    pub fn p95_step_duration(&self) -> Duration {
        let mut sorted: Vec<_> = self.step_durations.iter().copied().collect();
        sorted.sort();
        let idx = (sorted.len() as f32 * 0.95) as usize;
        sorted
            .get(idx.min(sorted.len().saturating_sub(1)))
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    pub fn status(&self) -> PerformanceStatus {
        self.status
    }

    /// Budget usage as percentage (0-100+)
    pub fn budget_usage_percent(&self) -> f32 {
        self.average_step_duration().as_secs_f32() / self.budget.as_secs_f32() * 100.0
    }

    pub fn clear(&mut self) {
        self.step_durations.clear();
        self.status = PerformanceStatus::Excellent;
        self.step_start = None;
    }

    /// Human-readable status line
    pub fn status_message(&self) -> String {
        format!(
            "{:?} - {:.1}% budget, avg {:?}, p95 {:?}",
            self.status,
            self.budget_usage_percent(),
            self.average_step_duration(),
            self.p95_step_duration()
        )
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(crate::game::constants::physics::DT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 100 Hz gives a round 10ms budget
    const DT: f32 = 0.01;

    #[test]
    fn test_performance_monitor_new() {
        let monitor = PerformanceMonitor::new(DT);
        assert_eq!(monitor.status(), PerformanceStatus::Excellent);
        assert_eq!(monitor.average_step_duration(), Duration::ZERO);
        assert_eq!(monitor.p95_step_duration(), Duration::ZERO);
    }

    #[test]
    fn test_status_needs_enough_samples() {
        let mut monitor = PerformanceMonitor::new(DT);
        for _ in 0..5 {
            monitor.record_step(Duration::from_millis(50));
        }
        assert_eq!(monitor.status(), PerformanceStatus::Excellent);
    }

    #[test]
    fn test_status_levels() {
        let cases = [
            (1, PerformanceStatus::Excellent),
            (5, PerformanceStatus::Good),
            (8, PerformanceStatus::Warning),
            (15, PerformanceStatus::Critical),
        ];
        for (millis, expected) in cases {
            let mut monitor = PerformanceMonitor::new(DT);
            for _ in 0..20 {
                monitor.record_step(Duration::from_millis(millis));
            }
            assert_eq!(monitor.status(), expected, "{}ms", millis);
        }
        assert!(PerformanceStatus::Warning.is_real_time());
        assert!(!PerformanceStatus::Critical.is_real_time());
    }

    #[test]
    fn test_window_is_bounded() {
        let mut monitor = PerformanceMonitor::new(DT);
        for _ in 0..500 {
            monitor.record_step(Duration::from_micros(10));
        }
        assert_eq!(monitor.step_durations.len(), 120);
        monitor.clear();
        assert!(monitor.step_durations.is_empty());
    }

    #[test]
    fn test_step_timing() {
        let mut monitor = PerformanceMonitor::new(DT);
        monitor.step_start();
        std::thread::sleep(Duration::from_millis(1));
        let elapsed = monitor.step_end();
        assert!(elapsed >= Duration::from_millis(1));
        assert!(!monitor.status_message().is_empty());
    }
}
