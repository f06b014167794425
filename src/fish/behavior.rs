use super::state::{BehaviorState, StationaryAnchor};
use super::steering;
use super::Fish;

impl Fish {
    /// Timer-driven and proximity-driven transitions. Runs first in a tick.
    pub(super) fn update_behavior(&mut self, dt: f32) {
        self.state_timer += dt;

        match self.state {
            BehaviorState::Wander => {
                if self.current_target.is_none() {
                    self.current_target = self.queue.pop_front();
                }
                if self.current_target.is_some() {
                    self.enter(BehaviorState::Approach);
                }
            }
            BehaviorState::Approach => match self.current_target {
                Some(target) => {
                    let dist = steering::horizontal_distance(self.head, target.position);
                    if dist < self.config.arrival_threshold {
                        self.enter(BehaviorState::Eat);
                    }
                }
                None => self.enter(BehaviorState::Wander),
            },
            BehaviorState::Eat => {
                if self.state_timer >= self.config.eat_duration {
                    self.consume();
                    self.enter_stationary(BehaviorState::Rest);
                }
            }
            BehaviorState::Rest => {
                if self.state_timer >= self.config.rest_duration {
                    self.exit_stationary();
                }
            }
            // Only stop_talking ends it.
            BehaviorState::Talk => {}
        }
    }

    /// Switch state and restart the state timer.
    pub(super) fn enter(&mut self, next: BehaviorState) {
        if next != self.state {
            log::debug!("fish: {} -> {}", self.state, next);
        }
        self.state = next;
        self.state_timer = 0.0;
    }

    /// Anchor the fish where it is, facing where it was going, and switch to
    /// `next` (Rest or Talk).
    pub(super) fn enter_stationary(&mut self, next: BehaviorState) {
        debug_assert!(next.is_stationary());
        let mut position = self.head;
        position.y = self.config.ground_y;

        self.anchor = Some(StationaryAnchor {
            position,
            direction: steering::fallback_direction(self.velocity, self.heading),
        });
        self.velocity = glam::Vec3::ZERO;
        self.enter(next);
    }

    /// Drop the anchor and resume: current target first, then the queue,
    /// otherwise wander.
    pub(super) fn exit_stationary(&mut self) {
        self.anchor = None;
        if self.current_target.is_none() {
            self.current_target = self.queue.pop_front();
        }

        if self.current_target.is_some() {
            self.enter(BehaviorState::Approach);
        } else {
            self.wander.clear();
            self.enter(BehaviorState::Wander);
        }
    }

    /// Release the current target and notify the host.
    fn consume(&mut self) {
        let Some(target) = self.current_target.take() else {
            return;
        };
        log::debug!("fish: consumed target {:?} at {}", target.id, target.position);
        if let Some(callback) = self.on_consume.as_mut() {
            callback(target);
        }
    }

    /// Debug override. Refuses states whose preconditions are not met.
    /// Returns true if the state changed.
    ///
    /// - `Wander`: the current target goes back to the front of the queue.
    /// - `Approach`: needs a current or queued target.
    /// - `Eat`: needs a current target.
    /// - `Rest` / `Talk`: anchors the fish where it is.
    pub fn force_state(&mut self, next: BehaviorState) -> bool {
        if next == self.state {
            return false;
        }

        match next {
            BehaviorState::Wander => {
                self.anchor = None;
                if let Some(target) = self.current_target.take() {
                    self.queue.push_front(target);
                }
                self.wander.clear();
                self.enter(BehaviorState::Wander);
            }
            BehaviorState::Approach => {
                if self.current_target.is_none() {
                    self.current_target = self.queue.pop_front();
                }
                if self.current_target.is_none() {
                    return false;
                }
                self.anchor = None;
                self.enter(BehaviorState::Approach);
            }
            BehaviorState::Eat => {
                if self.current_target.is_none() {
                    return false;
                }
                self.anchor = None;
                self.enter(BehaviorState::Eat);
            }
            BehaviorState::Rest | BehaviorState::Talk => self.enter_stationary(next),
        }
        log::info!("fish: forced into {next}");
        true
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::config::FishConfig;

    fn fish() -> Fish {
        let config = FishConfig {
            rng_seed: Some(1),
            ..FishConfig::default()
        };
        Fish::new(config, Vec3::ZERO).unwrap()
    }

    #[test]
    fn wander_pops_queue_when_idle() {
        let mut fish = fish();
        fish.start_talking();
        let a = fish.add_target(Vec3::new(1.0, 0.0, 0.0));
        let b = fish.add_target(Vec3::new(2.0, 0.0, 0.0));
        // Drop Talk without resuming, leaving the current target queued.
        assert!(fish.force_state(BehaviorState::Wander));
        assert_eq!(fish.queued_targets().map(|t| t.id).collect::<Vec<_>>(), vec![a.id, b.id]);

        fish.update_behavior(1.0 / 60.0);
        assert_eq!(fish.state(), BehaviorState::Approach);
        assert_eq!(fish.current_target().map(|t| t.id), Some(a.id));
        assert_eq!(fish.queued_targets().len(), 1);
    }

    #[test]
    fn forced_states_check_preconditions() {
        let mut fish = fish();
        assert!(!fish.force_state(BehaviorState::Approach));
        assert!(!fish.force_state(BehaviorState::Eat));
        assert!(!fish.force_state(BehaviorState::Wander));
        assert_eq!(fish.state(), BehaviorState::Wander);

        fish.add_target(Vec3::new(3.0, 0.0, 0.0));
        assert!(fish.force_state(BehaviorState::Eat));
        assert_eq!(fish.state(), BehaviorState::Eat);

        assert!(fish.force_state(BehaviorState::Rest));
        assert!(fish.anchor().is_some());
        assert!(fish.force_state(BehaviorState::Approach));
        assert!(fish.anchor().is_none());
    }

    #[test]
    fn stationary_capture_uses_velocity_then_heading() {
        let mut fish = fish();
        fish.velocity = Vec3::new(-2.0, 0.0, 0.0);
        fish.enter_stationary(BehaviorState::Rest);
        assert_eq!(fish.stationary_direction(), Some(Vec3::new(-1.0, 0.0, 0.0)));
        assert_eq!(fish.head_velocity(), Vec3::ZERO);

        fish.exit_stationary();
        fish.heading = Vec3::new(0.0, 0.0, -1.0);
        fish.enter_stationary(BehaviorState::Talk);
        assert_eq!(fish.stationary_direction(), Some(Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn approach_without_target_falls_back_to_wander() {
        let mut fish = fish();
        fish.state = BehaviorState::Approach;
        fish.update_behavior(0.1);
        assert_eq!(fish.state(), BehaviorState::Wander);
    }

    #[test]
    fn eat_fires_callback_then_rests() {
        let mut fish = fish();
        let (tx, rx) = std::sync::mpsc::channel();
        fish.set_on_consume(move |t| {
            let _ = tx.send(t.id);
        });
        let target = fish.add_target(Vec3::new(0.1, 0.0, 0.1));
        fish.update_behavior(0.0);
        assert_eq!(fish.state(), BehaviorState::Eat);

        let eat = fish.config().eat_duration;
        fish.update_behavior(eat * 0.5);
        assert_eq!(fish.state(), BehaviorState::Eat);
        assert!(rx.try_recv().is_err());

        fish.update_behavior(eat * 0.5);
        assert_eq!(fish.state(), BehaviorState::Rest);
        assert_eq!(rx.try_recv().ok(), Some(target.id));
        assert!(rx.try_recv().is_err());
    }
}
