//! Autonomous fish for small interactive scenes: a behavior state machine,
//! steering, and a tapering tail chain, plus a headless `hecs` scene host.

pub mod config;
pub mod debug;
pub mod fish;
pub mod scene;

pub use config::{Bounds, ConfigError, FishConfig};
pub use fish::{BehaviorState, Fish, StationaryAnchor, Target, TargetId};
pub use scene::{FishSnapshot, Scene, SceneError};
