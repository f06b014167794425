use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fish::BehaviorState;

/// Errors raised while building or loading a [`FishConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bounds on {axis} axis are empty: min {min} must be less than max {max}")]
    InvalidBounds { axis: char, min: f32, max: f32 },
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be in (0, 1], got {value}")]
    NotAFraction { field: &'static str, value: f32 },
    #[error("{field} must be in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("boundary buffer {buffer} leaves no room inside bounds")]
    BufferTooWide { buffer: f32 },
    #[error("segment count must be at least 1")]
    NoSegments,
    #[error("a fish cannot start in {state} without a target")]
    UnreachableInitialState { state: BehaviorState },
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Axis-aligned world bounds on the horizontal (X/Z) plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_x: -10.0,
            max_x: 10.0,
            min_z: -10.0,
            max_z: 10.0,
        }
    }
}

impl Bounds {
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_z + self.max_z) * 0.5,
        )
    }

    /// Bounds pulled in by `margin` on every side.
    pub fn shrink(&self, margin: f32) -> Self {
        Self {
            min_x: self.min_x + margin,
            max_x: self.max_x - margin,
            min_z: self.min_z + margin,
            max_z: self.max_z - margin,
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.z >= self.min_z && p.z <= self.max_z
    }

    /// Clamp X and Z into the bounds. Y is left alone.
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y,
            p.z.clamp(self.min_z, self.max_z),
        )
    }
}

/// Per-fish tuning. Flat so a tuning panel or a JSON file can fill it in.
///
/// Distances are world units, speeds are units/second, durations seconds.
/// `*_ease` and `heading_smoothing` are per-tick interpolation fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FishConfig {
    pub bounds: Bounds,
    /// Height of the plane the fish swims on.
    pub ground_y: f32,
    /// Vision probe must stay this far inside the bounds.
    pub boundary_buffer: f32,

    pub arrival_threshold: f32,
    pub eat_duration: f32,
    pub rest_duration: f32,

    pub max_speed: f32,
    pub max_steer_force: f32,
    pub slowing_radius: f32,

    pub vision_distance: f32,
    /// Seconds between wander target refreshes.
    pub wander_interval: f32,
    /// How far ahead of the head a new wander target is projected.
    pub wander_distance: f32,
    /// Radius of the random disc added to the projected point.
    pub wander_radius: f32,

    pub wiggle_frequency: f32,
    pub wiggle_amplitude: f32,
    /// Velocity multiplier applied every tick while eating.
    pub eat_damping: f32,

    pub sway_frequency: f32,
    pub sway_amplitude: f32,
    /// Vertical bob while resting or talking.
    pub bob_amplitude: f32,
    pub head_ease: f32,

    pub segment_count: usize,
    pub segment_spacing: f32,
    pub taper_exponent: f32,
    /// Spacing factor the taper approaches at the tail tip.
    pub min_taper: f32,
    pub segment_ease: f32,
    pub heading_smoothing: f32,
    pub tail_wave_frequency: f32,
    pub tail_wave_amplitude: f32,
    /// Phase lag between neighbouring segments, radians.
    pub tail_phase_step: f32,
    pub rest_tail_amplitude: f32,
    pub chain_tolerance: f32,

    /// Seed for the fish's RNG. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for FishConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            ground_y: 0.0,
            boundary_buffer: 1.5,
            arrival_threshold: 0.4,
            eat_duration: 2.0,
            rest_duration: 3.0,
            max_speed: 2.5,
            max_steer_force: 0.12,
            slowing_radius: 2.5,
            vision_distance: 3.0,
            wander_interval: 4.0,
            wander_distance: 4.0,
            wander_radius: 2.0,
            wiggle_frequency: 3.0,
            wiggle_amplitude: 0.25,
            eat_damping: 0.98,
            sway_frequency: 1.5,
            sway_amplitude: 0.15,
            bob_amplitude: 0.05,
            head_ease: 0.1,
            segment_count: 12,
            segment_spacing: 0.35,
            taper_exponent: 1.5,
            min_taper: 0.35,
            segment_ease: 0.5,
            heading_smoothing: 0.15,
            tail_wave_frequency: 6.0,
            tail_wave_amplitude: 0.12,
            tail_phase_step: 0.6,
            rest_tail_amplitude: 0.05,
            chain_tolerance: 1e-3,
            rng_seed: None,
        }
    }
}

impl FishConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_finite()?;

        let b = &self.bounds;
        if !(b.min_x < b.max_x) {
            return Err(ConfigError::InvalidBounds {
                axis: 'x',
                min: b.min_x,
                max: b.max_x,
            });
        }
        if !(b.min_z < b.max_z) {
            return Err(ConfigError::InvalidBounds {
                axis: 'z',
                min: b.min_z,
                max: b.max_z,
            });
        }

        for (field, value) in [
            ("arrival_threshold", self.arrival_threshold),
            ("eat_duration", self.eat_duration),
            ("rest_duration", self.rest_duration),
            ("max_speed", self.max_speed),
            ("max_steer_force", self.max_steer_force),
            ("slowing_radius", self.slowing_radius),
            ("wander_interval", self.wander_interval),
            ("segment_spacing", self.segment_spacing),
            ("taper_exponent", self.taper_exponent),
            ("chain_tolerance", self.chain_tolerance),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        for (field, value) in [
            ("boundary_buffer", self.boundary_buffer),
            ("vision_distance", self.vision_distance),
            ("wander_distance", self.wander_distance),
            ("wander_radius", self.wander_radius),
            ("wiggle_frequency", self.wiggle_frequency),
            ("wiggle_amplitude", self.wiggle_amplitude),
            ("sway_frequency", self.sway_frequency),
            ("sway_amplitude", self.sway_amplitude),
            ("bob_amplitude", self.bob_amplitude),
            ("tail_wave_frequency", self.tail_wave_frequency),
            ("tail_wave_amplitude", self.tail_wave_amplitude),
            ("rest_tail_amplitude", self.rest_tail_amplitude),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        for (field, value) in [
            ("head_ease", self.head_ease),
            ("segment_ease", self.segment_ease),
            ("heading_smoothing", self.heading_smoothing),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::NotAFraction { field, value });
            }
        }

        if !(0.0..=1.0).contains(&self.eat_damping) {
            return Err(ConfigError::OutOfUnitRange {
                field: "eat_damping",
                value: self.eat_damping,
            });
        }
        // A taper of 1.0 would stop the spacing from shrinking toward the tip.
        if !(0.0..1.0).contains(&self.min_taper) {
            return Err(ConfigError::OutOfUnitRange {
                field: "min_taper",
                value: self.min_taper,
            });
        }

        let inner = b.shrink(self.boundary_buffer);
        if !(inner.min_x < inner.max_x && inner.min_z < inner.max_z) {
            return Err(ConfigError::BufferTooWide {
                buffer: self.boundary_buffer,
            });
        }

        if self.segment_count == 0 {
            return Err(ConfigError::NoSegments);
        }

        Ok(())
    }

    fn check_finite(&self) -> Result<(), ConfigError> {
        let b = &self.bounds;
        for (field, value) in [
            ("bounds.min_x", b.min_x),
            ("bounds.max_x", b.max_x),
            ("bounds.min_z", b.min_z),
            ("bounds.max_z", b.max_z),
            ("ground_y", self.ground_y),
            ("boundary_buffer", self.boundary_buffer),
            ("arrival_threshold", self.arrival_threshold),
            ("eat_duration", self.eat_duration),
            ("rest_duration", self.rest_duration),
            ("max_speed", self.max_speed),
            ("max_steer_force", self.max_steer_force),
            ("slowing_radius", self.slowing_radius),
            ("vision_distance", self.vision_distance),
            ("wander_interval", self.wander_interval),
            ("wander_distance", self.wander_distance),
            ("wander_radius", self.wander_radius),
            ("wiggle_frequency", self.wiggle_frequency),
            ("wiggle_amplitude", self.wiggle_amplitude),
            ("eat_damping", self.eat_damping),
            ("sway_frequency", self.sway_frequency),
            ("sway_amplitude", self.sway_amplitude),
            ("bob_amplitude", self.bob_amplitude),
            ("head_ease", self.head_ease),
            ("segment_spacing", self.segment_spacing),
            ("taper_exponent", self.taper_exponent),
            ("min_taper", self.min_taper),
            ("segment_ease", self.segment_ease),
            ("heading_smoothing", self.heading_smoothing),
            ("tail_wave_frequency", self.tail_wave_frequency),
            ("tail_wave_amplitude", self.tail_wave_amplitude),
            ("tail_phase_step", self.tail_phase_step),
            ("rest_tail_amplitude", self.rest_tail_amplitude),
            ("chain_tolerance", self.chain_tolerance),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        Ok(())
    }

    /// Bounds the wander target and vision probe must respect.
    pub fn inner_bounds(&self) -> Bounds {
        self.bounds.shrink(self.boundary_buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(FishConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let mut config = FishConfig::default();
        config.bounds.min_z = 5.0;
        config.bounds.max_z = 5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBounds { axis: 'z', .. })
        ));
    }

    #[test]
    fn rejects_non_positive_durations() {
        let mut config = FishConfig::default();
        config.rest_duration = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "rest_duration", .. })
        ));

        let mut config = FishConfig::default();
        config.eat_duration = -1.0;
        assert!(config.validate().is_err());

        let mut config = FishConfig::default();
        config.max_speed = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut config = FishConfig::default();
        config.max_speed = f32::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "max_speed", .. })
        ));

        let mut config = FishConfig::default();
        config.ground_y = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "ground_y", .. })
        ));

        let mut config = FishConfig::default();
        config.bounds.max_x = f32::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "bounds.max_x", .. })
        ));
    }

    #[test]
    fn rejects_bad_fractions() {
        let mut config = FishConfig::default();
        config.segment_ease = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotAFraction { field: "segment_ease", .. })
        ));

        let mut config = FishConfig::default();
        config.eat_damping = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_buffer_wider_than_world() {
        let mut config = FishConfig::default();
        config.boundary_buffer = 10.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BufferTooWide { .. })
        ));
    }

    #[test]
    fn rejects_empty_chain() {
        let mut config = FishConfig::default();
        config.segment_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NoSegments)));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: FishConfig =
            serde_json::from_str(r#"{ "max_speed": 4.0, "segment_count": 6 }"#).unwrap();
        assert_eq!(config.max_speed, 4.0);
        assert_eq!(config.segment_count, 6);
        assert_eq!(config.rest_duration, FishConfig::default().rest_duration);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn clamp_keeps_height() {
        let bounds = Bounds::default();
        let p = bounds.clamp(Vec3::new(50.0, 3.0, -50.0));
        assert_eq!(p, Vec3::new(10.0, 3.0, -10.0));
        assert!(bounds.contains(p));
    }
}
