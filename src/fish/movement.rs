use glam::Vec3;

use super::state::BehaviorState;
use super::steering;
use super::Fish;

impl Fish {
    /// Move the head according to the current state.
    pub(super) fn update_movement(&mut self, dt: f32, elapsed: f32) {
        match self.state {
            BehaviorState::Rest | BehaviorState::Talk => self.sway(elapsed),
            BehaviorState::Wander => {
                let target = self.wander_destination(dt);
                self.steer_toward(target, dt, None);
            }
            BehaviorState::Approach => {
                if let Some(target) = self.current_target {
                    let phase = elapsed * self.config.wiggle_frequency;
                    self.steer_toward(target.position, dt, Some(phase));
                }
            }
            BehaviorState::Eat => {
                // Coast on what's left, no new steering.
                self.velocity *= self.config.eat_damping;
                self.integrate(dt);
            }
        }
    }

    /// Blend the instantaneous facing into the smoothed heading.
    pub(super) fn update_heading(&mut self) {
        let instant = match self.anchor {
            Some(anchor) => Some(anchor.direction),
            None => steering::direction_of(self.velocity),
        };
        if let Some(instant) = instant {
            self.heading =
                steering::smooth_heading(self.heading, instant, self.config.heading_smoothing);
        }
    }

    /// Arrival steering toward `target`, optionally with a lateral wiggle.
    fn steer_toward(&mut self, target: Vec3, dt: f32, wiggle_phase: Option<f32>) {
        let cfg = &self.config;
        let mut desired = steering::arrive(self.head, target, cfg.max_speed, cfg.slowing_radius);
        if let Some(phase) = wiggle_phase {
            desired = steering::wiggle(desired, phase, cfg.wiggle_amplitude);
        }
        self.velocity =
            steering::apply_steering(self.velocity, desired, cfg.max_steer_force, cfg.max_speed);
        self.integrate(dt);
    }

    /// Integrate velocity, clamp to bounds, pin to the ground plane.
    fn integrate(&mut self, dt: f32) {
        let mut head = self.config.bounds.clamp(self.head + self.velocity * dt);
        head.y = self.config.ground_y;
        self.head = head;
    }

    /// Ease toward a point swaying sideways (and bobbing) around the anchor.
    fn sway(&mut self, elapsed: f32) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let cfg = &self.config;
        let phase = elapsed * cfg.sway_frequency;

        let mut target =
            anchor.position + steering::perpendicular(anchor.direction) * phase.sin() * cfg.sway_amplitude;
        target.y = cfg.ground_y + (phase * 0.5).sin() * cfg.bob_amplitude;

        self.head = cfg.bounds.clamp(self.head.lerp(target, cfg.head_ease));
        self.velocity = Vec3::ZERO;
    }

    /// Current wander destination, re-picked when it goes stale.
    fn wander_destination(&mut self, dt: f32) -> Vec3 {
        self.wander.timer += dt;

        let inner = self.config.inner_bounds();
        let probe = self.head + self.heading * self.config.vision_distance;
        let probe_blocked = !inner.contains(probe);

        let stale = match self.wander.target {
            None => true,
            Some(target) => {
                self.wander.timer >= self.config.wander_interval
                    || steering::horizontal_distance(self.head, target)
                        < self.config.arrival_threshold
                    || !self.config.bounds.contains(target)
                    || (probe_blocked && !self.wander.homing)
            }
        };

        match self.wander.target {
            Some(target) if !stale => target,
            _ => self.pick_wander_target(probe_blocked),
        }
    }

    /// Project ahead (or toward world center when the probe is blocked) and
    /// add a random offset within the wander disc.
    fn pick_wander_target(&mut self, homing: bool) -> Vec3 {
        let cfg = &self.config;
        let inner = cfg.inner_bounds();

        let direction = if homing {
            let c = cfg.bounds.center();
            let center = Vec3::new(c.x, cfg.ground_y, c.y);
            steering::direction_of(center - self.head).unwrap_or(self.heading)
        } else {
            self.heading
        };

        let jitter = steering::random_in_disc(&mut self.rng) * cfg.wander_radius;
        let projected = self.head + direction * cfg.wander_distance;
        let mut target = inner.clamp(projected + Vec3::new(jitter.x, 0.0, jitter.y));
        target.y = cfg.ground_y;

        log::trace!("fish: new wander target {target} (homing: {homing})");
        self.wander.target = Some(target);
        self.wander.timer = 0.0;
        self.wander.homing = homing;
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Bounds, FishConfig};

    fn fish_at(position: Vec3) -> Fish {
        let config = FishConfig {
            rng_seed: Some(9),
            ..FishConfig::default()
        };
        Fish::new(config, position).unwrap()
    }

    #[test]
    fn blocked_probe_turns_toward_center() {
        // Near the +X wall, facing it.
        let mut fish = fish_at(Vec3::new(8.0, 0.0, 0.0));
        fish.heading = Vec3::X;

        let target = fish.wander_destination(1.0 / 60.0);
        assert!(fish.wander.homing);
        assert!(target.x < 8.0, "target {target} not biased inward");
        assert!(fish.config().inner_bounds().contains(target));
    }

    #[test]
    fn wander_target_refreshes_on_interval() {
        let mut fish = fish_at(Vec3::ZERO);
        let first = fish.wander_destination(0.0);
        assert_eq!(fish.wander_destination(0.1), first);

        let interval = fish.config().wander_interval;
        let second = fish.wander_destination(interval);
        assert_ne!(second, first);
        assert_eq!(fish.wander.timer, 0.0);
    }

    #[test]
    fn reaching_wander_target_picks_another() {
        let mut fish = fish_at(Vec3::ZERO);
        let old = Vec3::new(2.0, 0.0, 2.0);
        fish.wander.target = Some(old);
        fish.wander.timer = 0.0;
        fish.head = old;

        let next = fish.wander_destination(1.0 / 60.0);
        assert_ne!(next, old);
        assert_eq!(fish.wander_target(), Some(next));
        assert_eq!(fish.wander.timer, 0.0);
    }

    #[test]
    fn shrunken_world_drops_outside_wander_target() {
        let mut fish = fish_at(Vec3::ZERO);
        let old = Vec3::new(6.0, 0.0, 6.0);
        fish.wander.target = Some(old);
        fish.wander.timer = 0.0;

        let mut config = fish.config().clone();
        config.bounds = Bounds {
            min_x: -4.0,
            max_x: 4.0,
            min_z: -4.0,
            max_z: 4.0,
        };
        // Keep the vision probe inside so only the bounds rule applies.
        config.vision_distance = 1.0;
        fish.set_config(config).unwrap();

        let next = fish.wander_destination(1.0 / 60.0);
        assert_ne!(next, old);
        assert!(!fish.wander.homing);
        assert!(fish.config().inner_bounds().contains(next));
    }

    #[test]
    fn homing_target_is_kept_while_probe_blocked() {
        let mut fish = fish_at(Vec3::new(8.0, 0.0, 0.0));
        fish.heading = Vec3::X;
        let first = fish.wander_destination(0.0);
        assert_eq!(fish.wander_destination(0.1), first);
    }

    #[test]
    fn eat_coasts_and_decays() {
        let mut fish = fish_at(Vec3::ZERO);
        fish.add_target(Vec3::new(0.0, 0.0, 5.0));
        fish.force_state(BehaviorState::Eat);
        fish.velocity = Vec3::new(0.0, 0.0, 1.0);

        let before = fish.head_position();
        fish.update_movement(0.1, 0.0);
        assert!((fish.head_velocity().z - fish.config().eat_damping).abs() < 1e-6);
        assert!(fish.head_position().z > before.z);
    }

    #[test]
    fn moving_states_stay_on_ground() {
        let mut fish = fish_at(Vec3::ZERO);
        fish.head.y = 0.4;
        fish.update_movement(1.0 / 60.0, 0.0);
        assert_eq!(fish.head_position().y, fish.config().ground_y);
    }

    #[test]
    fn heading_holds_when_velocity_vanishes() {
        let mut fish = fish_at(Vec3::ZERO);
        fish.heading = Vec3::X;
        fish.velocity = Vec3::ZERO;
        fish.update_heading();
        assert_eq!(fish.heading(), Vec3::X);

        fish.velocity = Vec3::new(0.0, 0.0, 2.0);
        fish.update_heading();
        assert!(fish.heading().z > 0.0 && fish.heading().x > 0.0);
        assert!((fish.heading().length() - 1.0).abs() < 1e-5);
    }
}
