pub mod ring;
pub mod timer;

use self::ring::RingBuffer;
use self::timer::SystemTimers;

/// Number of frame times kept for rolling stats.
const FRAME_HISTORY_LEN: usize = 300;
/// How often to log frame stats (seconds).
const LOG_INTERVAL: f64 = 5.0;

/// Rolling frame statistics for the headless host, logged periodically.
pub struct FrameStats {
    /// Rolling window of frame times (seconds).
    pub frame_times: RingBuffer<f64>,

    pub fps: f64,
    pub frame_time_avg: f64,
    pub frame_time_min: f64,
    pub frame_time_max: f64,

    /// Per-phase timers, filled in by the host around each scene phase.
    pub system_timers: SystemTimers,

    pub frame_count: u64,
    pub tick_count: u64,
    log_timer: f64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_times: RingBuffer::new(FRAME_HISTORY_LEN),
            fps: 0.0,
            frame_time_avg: 0.0,
            frame_time_min: 0.0,
            frame_time_max: 0.0,
            system_timers: SystemTimers::new(),
            frame_count: 0,
            tick_count: 0,
            log_timer: 0.0,
        }
    }

    /// Record a frame time and refresh the rolling stats. Returns true when
    /// a periodic log line was written.
    pub fn record_frame(&mut self, dt: f64) -> bool {
        self.frame_count += 1;
        self.frame_times.push(dt);

        let len = self.frame_times.len();
        let (mut sum, mut min, mut max) = (0.0, f64::MAX, 0.0f64);
        for &t in self.frame_times.iter() {
            sum += t;
            min = min.min(t);
            max = max.max(t);
        }
        self.frame_time_avg = sum / len as f64;
        self.frame_time_min = min;
        self.frame_time_max = max;
        self.fps = if self.frame_time_avg > 0.0 {
            1.0 / self.frame_time_avg
        } else {
            0.0
        };

        self.log_timer += dt;
        if self.log_timer < LOG_INTERVAL {
            return false;
        }
        self.log_timer = 0.0;
        log::info!(
            "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | frames: {} | ticks: {}",
            self.fps,
            self.frame_time_avg * 1000.0,
            self.frame_time_min * 1000.0,
            self.frame_time_max * 1000.0,
            self.frame_count,
            self.tick_count,
        );
        log::debug!("Phases: {}", self.system_timers.summary());
        true
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_track_window() {
        let mut stats = FrameStats::new();
        assert!(!stats.record_frame(0.010));
        assert!(!stats.record_frame(0.030));
        assert!((stats.frame_time_avg - 0.020).abs() < 1e-9);
        assert_eq!(stats.frame_time_min, 0.010);
        assert_eq!(stats.frame_time_max, 0.030);
        assert!((stats.fps - 50.0).abs() < 1e-6);
    }

    #[test]
    fn logs_once_per_interval() {
        let mut stats = FrameStats::new();
        let logged = (0..700).filter(|_| stats.record_frame(1.0 / 60.0)).count();
        // 700 frames at 60 fps is a bit under 12 seconds.
        assert_eq!(logged, 2);
    }
}
