//! Host side of the fish core: an `hecs` world holding fish and the food
//! pellet markers that stand in for their targets.
//!
//! The scene is what a renderer would own. It feeds pointer clicks to the
//! fish, keeps one pellet entity per accepted target, despawns pellets as
//! they are eaten, and exposes plain snapshots for drawing.

use std::sync::mpsc::{self, Receiver, Sender};

use glam::Vec3;
use thiserror::Error;

use crate::config::{ConfigError, FishConfig};
use crate::fish::{BehaviorState, Fish, TargetId};

/// Max food pellets in the tank at once. Clicks past this are ignored.
pub const MAX_PELLETS: usize = 16;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("entity {0:?} is not a fish")]
    NoSuchFish(hecs::Entity),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Fish name for logs and tooltips.
#[derive(Debug, Clone)]
pub struct FishName(pub String);

/// World position of a marker.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec3);

/// Visual marker for a target owned by `owner`.
#[derive(Debug, Clone, Copy)]
pub struct Pellet {
    pub owner: hecs::Entity,
    pub target: TargetId,
}

/// Everything a renderer needs to draw one fish.
#[derive(Debug, Clone)]
pub struct FishSnapshot {
    pub entity: hecs::Entity,
    pub name: String,
    pub state: BehaviorState,
    pub head: Vec3,
    pub heading: Vec3,
    pub segments: Vec<Vec3>,
    pub target: Option<Vec3>,
}

pub struct Scene {
    world: hecs::World,
    clicks_tx: Sender<Vec3>,
    clicks_rx: Receiver<Vec3>,
    eaten_tx: Sender<(hecs::Entity, TargetId)>,
    eaten_rx: Receiver<(hecs::Entity, TargetId)>,
    // Reused each tick.
    eaten_buf: Vec<(hecs::Entity, TargetId)>,
    despawn_buf: Vec<hecs::Entity>,
    elapsed: f32,
}

impl Scene {
    pub fn new() -> Self {
        let (clicks_tx, clicks_rx) = mpsc::channel();
        let (eaten_tx, eaten_rx) = mpsc::channel();
        Self {
            world: hecs::World::new(),
            clicks_tx,
            clicks_rx,
            eaten_tx,
            eaten_rx,
            eaten_buf: Vec::with_capacity(MAX_PELLETS),
            despawn_buf: Vec::with_capacity(MAX_PELLETS),
            elapsed: 0.0,
        }
    }

    /// Spawn a fish and wire its consume callback to pellet cleanup.
    pub fn spawn_fish(
        &mut self,
        name: impl Into<String>,
        config: FishConfig,
        position: Vec3,
    ) -> Result<hecs::Entity, ConfigError> {
        let mut fish = Fish::new(config, position)?;
        let entity = self.world.reserve_entity();

        let eaten = self.eaten_tx.clone();
        fish.set_on_consume(move |target| {
            // Receiver lives as long as the scene; a failed send means it's gone.
            let _ = eaten.send((entity, target.id));
        });

        let name = name.into();
        log::info!("Spawned fish {name} at {}", fish.head_position());
        self.world.spawn_at(entity, (fish, FishName(name)));
        Ok(entity)
    }

    /// Sender for pointer clicks. Safe to hand to another thread; clicks are
    /// applied at the start of the next tick.
    pub fn click_sender(&self) -> Sender<Vec3> {
        self.clicks_tx.clone()
    }

    /// Place food at `point` for the nearest fish. Returns the pellet entity,
    /// or `None` if there are no fish or the pellet cap is reached.
    pub fn click(&mut self, point: Vec3) -> Option<hecs::Entity> {
        if self.pellet_count() >= MAX_PELLETS {
            log::debug!("Pellet cap reached, ignoring click at {point}");
            return None;
        }

        let owner = self
            .world
            .query::<&Fish>()
            .iter()
            .map(|(entity, fish)| (entity, fish.head_position().distance_squared(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, _)| entity)?;

        let target = self.world.query_one_mut::<&mut Fish>(owner).ok()?.add_target(point);
        let pellet = self.world.spawn((
            Pellet {
                owner,
                target: target.id,
            },
            Position(target.position),
        ));
        Some(pellet)
    }

    /// Apply every click queued through [`Scene::click_sender`].
    pub fn drain_clicks(&mut self) -> usize {
        let mut placed = 0;
        while let Ok(point) = self.clicks_rx.try_recv() {
            if self.click(point).is_some() {
                placed += 1;
            }
        }
        placed
    }

    /// Tick every fish.
    pub fn update_fish(&mut self, dt: f32) {
        self.elapsed += dt;
        let elapsed = self.elapsed;
        for (_, fish) in self.world.query_mut::<&mut Fish>() {
            fish.tick(dt, elapsed);
        }
    }

    /// Despawn pellets whose targets were eaten this tick.
    pub fn despawn_eaten(&mut self) -> usize {
        self.eaten_buf.clear();
        while let Ok(eaten) = self.eaten_rx.try_recv() {
            self.eaten_buf.push(eaten);
        }
        if self.eaten_buf.is_empty() {
            return 0;
        }

        self.despawn_buf.clear();
        for (entity, pellet) in self.world.query::<&Pellet>().iter() {
            if self
                .eaten_buf
                .iter()
                .any(|&(owner, id)| owner == pellet.owner && id == pellet.target)
            {
                self.despawn_buf.push(entity);
            }
        }
        self.despawn_all_marked()
    }

    /// Full tick: clicks, fish, pellet cleanup.
    pub fn tick(&mut self, dt: f32) {
        self.drain_clicks();
        self.update_fish(dt);
        self.despawn_eaten();
    }

    /// Reset one fish and clear its pellets.
    pub fn reset_fish(&mut self, entity: hecs::Entity) -> Result<(), SceneError> {
        self.fish_mut(entity)?.reset();

        self.despawn_buf.clear();
        for (pellet_entity, pellet) in self.world.query::<&Pellet>().iter() {
            if pellet.owner == entity {
                self.despawn_buf.push(pellet_entity);
            }
        }
        let cleared = self.despawn_all_marked();
        log::info!("Reset fish {entity:?}, cleared {cleared} pellets");
        Ok(())
    }

    pub fn start_talking(&mut self, entity: hecs::Entity) -> Result<bool, SceneError> {
        Ok(self.fish_mut(entity)?.start_talking())
    }

    pub fn stop_talking(&mut self, entity: hecs::Entity) -> Result<bool, SceneError> {
        Ok(self.fish_mut(entity)?.stop_talking())
    }

    pub fn force_state(
        &mut self,
        entity: hecs::Entity,
        state: BehaviorState,
    ) -> Result<bool, SceneError> {
        Ok(self.fish_mut(entity)?.force_state(state))
    }

    /// Hot-swap tuning for one fish.
    pub fn set_config(&mut self, entity: hecs::Entity, config: FishConfig) -> Result<(), SceneError> {
        self.fish_mut(entity)?.set_config(config)?;
        Ok(())
    }

    /// Read access to one fish.
    pub fn with_fish<R>(
        &self,
        entity: hecs::Entity,
        f: impl FnOnce(&Fish) -> R,
    ) -> Result<R, SceneError> {
        let fish = self
            .world
            .get::<&Fish>(entity)
            .map_err(|_| SceneError::NoSuchFish(entity))?;
        Ok(f(&fish))
    }

    /// Fill `out` with one snapshot per fish.
    pub fn build_snapshots(&self, out: &mut Vec<FishSnapshot>) {
        out.clear();
        for (entity, (fish, name)) in self.world.query::<(&Fish, &FishName)>().iter() {
            out.push(FishSnapshot {
                entity,
                name: name.0.clone(),
                state: fish.state(),
                head: fish.head_position(),
                heading: fish.heading(),
                segments: fish.segments().to_vec(),
                target: fish.current_target().map(|t| t.position),
            });
        }
    }

    /// Fill `out` with every pellet position.
    pub fn pellet_positions(&self, out: &mut Vec<Vec3>) {
        out.clear();
        out.extend(
            self.world
                .query::<(&Pellet, &Position)>()
                .iter()
                .map(|(_, (_, pos))| pos.0),
        );
    }

    pub fn pellet_count(&self) -> usize {
        self.world.query::<&Pellet>().iter().count()
    }

    pub fn fish_count(&self) -> usize {
        self.world.query::<&Fish>().iter().count()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn fish_mut(&mut self, entity: hecs::Entity) -> Result<&mut Fish, SceneError> {
        self.world
            .query_one_mut::<&mut Fish>(entity)
            .map_err(|_| SceneError::NoSuchFish(entity))
    }

    fn despawn_all_marked(&mut self) -> usize {
        let count = self.despawn_buf.len();
        for entity in self.despawn_buf.drain(..) {
            let _ = self.world.despawn(entity);
        }
        count
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
