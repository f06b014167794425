use glam::Vec3;

use super::steering::perpendicular;
use crate::config::FishConfig;

/// How the tail should move this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TailMotion {
    /// Gentle sway around the anchor.
    Resting,
    /// Swimming wave. `speed_factor` is in [0.2, 1.0].
    Swimming { speed_factor: f32 },
}

impl TailMotion {
    pub const MIN_SPEED_FACTOR: f32 = 0.2;

    pub fn swimming(speed: f32, max_speed: f32) -> Self {
        let factor = if max_speed > 0.0 { speed / max_speed } else { 0.0 };
        Self::Swimming {
            speed_factor: factor.clamp(Self::MIN_SPEED_FACTOR, 1.0),
        }
    }
}

/// Spacing multiplier for segment `index` of `count`. Strictly decreasing,
/// 1.0 at the root and approaching `min_taper` at the tip.
pub fn taper(index: usize, count: usize, exponent: f32, min_taper: f32) -> f32 {
    let t = index as f32 / count.max(1) as f32;
    min_taper + (1.0 - min_taper) * (1.0 - t).powf(exponent)
}

/// Pull `point` back toward `anchor` if it sits further than `max_len + tolerance`.
pub fn constrain(anchor: Vec3, point: Vec3, max_len: f32, tolerance: f32) -> Vec3 {
    let offset = point - anchor;
    let dist = offset.length();
    if dist > max_len + tolerance {
        anchor + offset * (max_len / dist)
    } else {
        point
    }
}

/// Ordered tail segments trailing the head. Segment 0 follows the head,
/// segment `i` follows segment `i - 1`.
#[derive(Debug, Clone)]
pub struct Chain {
    segments: Vec<Vec3>,
}

impl Chain {
    /// Lay the segments out in a straight line behind `head`.
    pub fn new(head: Vec3, heading: Vec3, config: &FishConfig) -> Self {
        let count = config.segment_count;
        let mut segments = Vec::with_capacity(count);
        let mut prev = head;
        for i in 0..count {
            prev -= heading * Self::spacing(i, config);
            segments.push(prev);
        }
        Self { segments }
    }

    /// Rest distance between segment `index` and its predecessor.
    pub fn spacing(index: usize, config: &FishConfig) -> f32 {
        config.segment_spacing
            * taper(
                index,
                config.segment_count,
                config.taper_exponent,
                config.min_taper,
            )
    }

    pub fn segments(&self) -> &[Vec3] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Advance every segment one tick, root to tip, in a single pass.
    ///
    /// Each segment reads its predecessor's position *after* that predecessor
    /// was updated and corrected this tick, so the distance constraint
    /// propagates all the way down the tail.
    pub fn update(
        &mut self,
        head: Vec3,
        heading: Vec3,
        motion: TailMotion,
        elapsed: f32,
        config: &FishConfig,
    ) {
        let count = self.segments.len();
        let side = perpendicular(heading);
        let mut prev = head;

        for (i, segment) in self.segments.iter_mut().enumerate() {
            let spacing = Self::spacing(i, config);
            let t = i as f32 / count as f32;
            let phase_lag = i as f32 * config.tail_phase_step;

            let base = prev - heading * spacing;

            let lateral = match motion {
                TailMotion::Resting => {
                    (elapsed * config.sway_frequency + phase_lag).sin()
                        * config.rest_tail_amplitude
                        * (1.0 - t)
                }
                TailMotion::Swimming { speed_factor } => {
                    (elapsed * config.tail_wave_frequency - phase_lag).sin()
                        * config.tail_wave_amplitude
                        * speed_factor
                        * (1.0 - t * 0.6)
                }
            };

            let eased = segment.lerp(base + side * lateral, config.segment_ease);
            *segment = constrain(prev, eased, spacing, config.chain_tolerance);
            prev = *segment;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FishConfig {
        FishConfig {
            segment_count: 8,
            segment_spacing: 0.5,
            ..FishConfig::default()
        }
    }

    fn assert_connected(chain: &Chain, head: Vec3, config: &FishConfig) {
        let mut prev = head;
        for (i, &seg) in chain.segments().iter().enumerate() {
            let limit = Chain::spacing(i, config) + config.chain_tolerance;
            let dist = seg.distance(prev);
            assert!(
                dist <= limit + 1e-5,
                "segment {i} is {dist} from predecessor, limit {limit}"
            );
            prev = seg;
        }
    }

    #[test]
    fn taper_strictly_decreases() {
        let config = config();
        let spacings: Vec<f32> = (0..config.segment_count)
            .map(|i| Chain::spacing(i, &config))
            .collect();
        assert!((spacings[0] - config.segment_spacing).abs() < 1e-6);
        for pair in spacings.windows(2) {
            assert!(pair[1] < pair[0], "{spacings:?}");
        }
        assert!(*spacings.last().unwrap() > config.segment_spacing * config.min_taper);
    }

    #[test]
    fn initial_layout_is_behind_head() {
        let config = config();
        let chain = Chain::new(Vec3::ZERO, Vec3::Z, &config);
        assert_eq!(chain.len(), 8);
        for pair in chain.segments().windows(2) {
            assert!(pair[1].z < pair[0].z);
        }
        assert_connected(&chain, Vec3::ZERO, &config);
    }

    #[test]
    fn constrain_pulls_back_only_when_stretched() {
        let anchor = Vec3::ZERO;
        let near = Vec3::new(0.2, 0.0, 0.0);
        assert_eq!(constrain(anchor, near, 0.5, 1e-3), near);

        let far = Vec3::new(0.0, 0.0, 3.0);
        let pulled = constrain(anchor, far, 0.5, 1e-3);
        assert!((pulled - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn head_teleport_does_not_stretch_tail() {
        let config = config();
        let mut chain = Chain::new(Vec3::ZERO, Vec3::Z, &config);
        let head = Vec3::new(6.0, 0.0, -4.0);
        chain.update(head, Vec3::X, TailMotion::swimming(2.0, 2.5), 0.5, &config);
        assert_connected(&chain, head, &config);
    }

    #[test]
    fn sharp_turns_keep_tail_attached() {
        let config = config();
        let mut head = Vec3::ZERO;
        let mut chain = Chain::new(head, Vec3::Z, &config);
        let dt = 1.0 / 60.0;

        for tick in 0..600 {
            let elapsed = tick as f32 * dt;
            // Reverse direction every half second.
            let heading = if (tick / 30) % 2 == 0 { Vec3::Z } else { -Vec3::Z };
            head += heading * 3.0 * dt;
            let motion = if tick % 200 < 50 {
                TailMotion::Resting
            } else {
                TailMotion::swimming(3.0, 2.5)
            };
            chain.update(head, heading, motion, elapsed, &config);
            assert_connected(&chain, head, &config);
        }
    }

    #[test]
    fn speed_factor_is_clamped() {
        assert_eq!(
            TailMotion::swimming(0.0, 2.0),
            TailMotion::Swimming { speed_factor: 0.2 }
        );
        assert_eq!(
            TailMotion::swimming(10.0, 2.0),
            TailMotion::Swimming { speed_factor: 1.0 }
        );
    }
}
