use instant::Instant;

/// Which phase of the scene tick is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SystemPhase {
    Clicks = 0,
    Fish = 1,
    Pellets = 2,
    Snapshots = 3,
}

impl SystemPhase {
    pub const COUNT: usize = 4;

    pub const ALL: [SystemPhase; Self::COUNT] =
        [Self::Clicks, Self::Fish, Self::Pellets, Self::Snapshots];

    pub fn label(self) -> &'static str {
        match self {
            Self::Clicks => "Clicks",
            Self::Fish => "Fish",
            Self::Pellets => "Pellets",
            Self::Snapshots => "Snapshots",
        }
    }
}

/// EMA smoothing factor for phase durations.
const EMA_ALPHA: f64 = 0.1;

/// Per-phase timing with exponential moving average smoothing.
pub struct SystemTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; SystemPhase::COUNT],
    start: Instant,
}

impl SystemTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; SystemPhase::COUNT],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes.
    pub fn end(&mut self, phase: SystemPhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    /// Fold a measured duration into the phase average.
    pub fn record(&mut self, phase: SystemPhase, elapsed_us: f64) {
        let slot = &mut self.durations_us[phase as usize];
        *slot = *slot * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }

    /// One-line breakdown for logs, e.g. `Clicks 1.2us | Fish 30.0us | ...`.
    pub fn summary(&self) -> String {
        SystemPhase::ALL
            .iter()
            .map(|&p| format!("{} {:.1}us", p.label(), self.durations_us[p as usize]))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Default for SystemTimers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_converges_toward_samples() {
        let mut timers = SystemTimers::new();
        for _ in 0..200 {
            timers.record(SystemPhase::Fish, 50.0);
        }
        assert!((timers.durations_us[SystemPhase::Fish as usize] - 50.0).abs() < 0.01);
        assert_eq!(timers.durations_us[SystemPhase::Clicks as usize], 0.0);
        assert!((timers.total_us() - 50.0).abs() < 0.01);
        assert!(timers.summary().contains("Fish 50.0us"));
    }
}
