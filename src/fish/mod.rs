//! The fish agent: a behavior state machine driving a steered head and a
//! tapering tail chain.
//!
//! One [`Fish::tick`] per frame runs, strictly in order:
//! 1. behavior transitions ([`behavior`])
//! 2. head steering and integration ([`movement`])
//! 3. heading smoothing and the tail pass ([`chain`])
//!
//! The host reads positions back through the accessors and owns everything
//! visual. Nothing here touches a scene graph.

pub mod behavior;
pub mod chain;
pub mod movement;
pub mod state;
pub mod steering;

use std::collections::VecDeque;

use glam::Vec3;

use crate::config::{ConfigError, FishConfig};
use chain::Chain;
pub use state::{BehaviorState, StationaryAnchor, Target, TargetId};
use state::WanderState;

/// Called exactly once per Eat → Rest transition with the eaten target.
pub type ConsumeCallback = Box<dyn FnMut(Target) + Send + Sync>;

/// A single autonomous fish.
pub struct Fish {
    config: FishConfig,

    state: BehaviorState,
    /// Seconds spent in the current state.
    state_timer: f32,
    /// Last elapsed time seen by `tick`.
    elapsed: f32,

    head: Vec3,
    velocity: Vec3,
    /// Low-pass filtered facing, unit length, horizontal.
    heading: Vec3,

    current_target: Option<Target>,
    queue: VecDeque<Target>,
    next_target_id: u32,

    anchor: Option<StationaryAnchor>,
    wander: WanderState,
    chain: Chain,

    rng: fastrand::Rng,
    on_consume: Option<ConsumeCallback>,
}

impl Fish {
    /// Create a wandering fish at `position` (clamped onto the ground plane).
    pub fn new(config: FishConfig, position: Vec3) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.rng_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let head = ground(&config, config.bounds.clamp(sanitize(position, &config)));
        let heading = steering::FORWARD;
        let chain = Chain::new(head, heading, &config);

        Ok(Self {
            config,
            state: BehaviorState::Wander,
            state_timer: 0.0,
            elapsed: 0.0,
            head,
            velocity: Vec3::ZERO,
            heading,
            current_target: None,
            queue: VecDeque::new(),
            next_target_id: 0,
            anchor: None,
            wander: WanderState::default(),
            chain,
            rng,
            on_consume: None,
        })
    }

    /// Create a fish that starts in `initial`. Approach and Eat need a target
    /// and are rejected.
    pub fn with_state(
        config: FishConfig,
        position: Vec3,
        initial: BehaviorState,
    ) -> Result<Self, ConfigError> {
        let mut fish = Self::new(config, position)?;
        if initial != BehaviorState::Wander && !fish.force_state(initial) {
            return Err(ConfigError::UnreachableInitialState { state: initial });
        }
        Ok(fish)
    }

    pub fn set_on_consume(&mut self, callback: impl FnMut(Target) + Send + Sync + 'static) {
        self.on_consume = Some(Box::new(callback));
    }

    /// Swap in new tuning. The tail is re-laid if its length changed.
    pub fn set_config(&mut self, config: FishConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let relayout = config.segment_count != self.config.segment_count;
        self.config = config;

        self.velocity = self.velocity.clamp_length_max(self.config.max_speed);
        if !self.state.is_stationary() {
            self.head = ground(&self.config, self.config.bounds.clamp(self.head));
        }
        if relayout {
            self.chain = Chain::new(self.head, self.heading, &self.config);
        }
        Ok(())
    }

    /// Advance behavior, steering and the tail by one frame.
    pub fn tick(&mut self, dt: f32, elapsed: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed = if elapsed.is_finite() {
            elapsed
        } else {
            self.elapsed + dt
        };

        self.update_behavior(dt);
        self.update_movement(dt, self.elapsed);
        self.update_heading();

        let motion = if self.state.is_stationary() {
            chain::TailMotion::Resting
        } else {
            chain::TailMotion::swimming(self.velocity.length(), self.config.max_speed)
        };
        self.chain
            .update(self.head, self.heading, motion, self.elapsed, &self.config);
    }

    /// Hand the fish a new food target.
    ///
    /// The point is clamped into the world bounds and dropped onto the ground
    /// plane. If nothing is pending it becomes the current target (and a
    /// wandering fish starts approaching at once); otherwise it is queued.
    /// Returns the target as accepted.
    pub fn add_target(&mut self, point: Vec3) -> Target {
        let position = ground(
            &self.config,
            self.config.bounds.clamp(sanitize(point, &self.config)),
        );
        if steering::flat(position - point).length_squared() > 0.0 {
            log::debug!("target {point} clamped to {position}");
        }

        let target = Target {
            id: TargetId(self.next_target_id),
            position,
        };
        self.next_target_id = self.next_target_id.wrapping_add(1);

        if self.current_target.is_none() && self.queue.is_empty() {
            self.current_target = Some(target);
            if self.state == BehaviorState::Wander {
                self.enter(BehaviorState::Approach);
            }
        } else {
            self.queue.push_back(target);
        }
        target
    }

    /// Drop every target and go back to wandering, immediately.
    pub fn reset(&mut self) {
        self.current_target = None;
        self.queue.clear();
        self.anchor = None;
        self.wander.clear();
        self.enter(BehaviorState::Wander);
    }

    /// Enter Talk from Wander or Rest. Returns true if the state changed.
    pub fn start_talking(&mut self) -> bool {
        match self.state {
            BehaviorState::Wander | BehaviorState::Rest => {
                self.enter_stationary(BehaviorState::Talk);
                true
            }
            _ => false,
        }
    }

    /// Leave Talk, resuming the next target if any. Returns true if the state
    /// changed.
    pub fn stop_talking(&mut self) -> bool {
        if self.state != BehaviorState::Talk {
            return false;
        }
        self.exit_stationary();
        true
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn head_position(&self) -> Vec3 {
        self.head
    }

    pub fn head_velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Smoothed facing direction, unit length.
    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    pub fn segments(&self) -> &[Vec3] {
        self.chain.segments()
    }

    /// Rest distance between segment `index` and its predecessor.
    pub fn segment_spacing(&self, index: usize) -> f32 {
        Chain::spacing(index, &self.config)
    }

    pub fn current_target(&self) -> Option<Target> {
        self.current_target
    }

    /// Pending targets in arrival order, excluding the current one.
    pub fn queued_targets(&self) -> impl ExactSizeIterator<Item = &Target> + '_ {
        self.queue.iter()
    }

    pub fn anchor(&self) -> Option<StationaryAnchor> {
        self.anchor
    }

    pub fn stationary_position(&self) -> Option<Vec3> {
        self.anchor.map(|a| a.position)
    }

    pub fn stationary_direction(&self) -> Option<Vec3> {
        self.anchor.map(|a| a.direction)
    }

    /// Current wander destination, if one has been picked.
    pub fn wander_target(&self) -> Option<Vec3> {
        self.wander.target
    }

    pub fn config(&self) -> &FishConfig {
        &self.config
    }
}

/// Put a point on the swim plane.
fn ground(config: &FishConfig, mut p: Vec3) -> Vec3 {
    p.y = config.ground_y;
    p
}

/// Replace non-finite coordinates with the world center.
fn sanitize(p: Vec3, config: &FishConfig) -> Vec3 {
    let center = config.bounds.center();
    Vec3::new(
        if p.x.is_finite() { p.x } else { center.x },
        if p.y.is_finite() { p.y } else { config.ground_y },
        if p.z.is_finite() { p.z } else { center.y },
    )
}
