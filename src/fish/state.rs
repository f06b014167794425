use glam::Vec3;

/// Current behavior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BehaviorState {
    Wander,
    Approach,
    Eat,
    Rest,
    Talk,
}

impl BehaviorState {
    pub const ALL: [BehaviorState; 5] = [
        Self::Wander,
        Self::Approach,
        Self::Eat,
        Self::Rest,
        Self::Talk,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Wander => "Wander",
            Self::Approach => "Approach",
            Self::Eat => "Eat",
            Self::Rest => "Rest",
            Self::Talk => "Talk",
        }
    }

    /// Rest and Talk hold the fish around a captured anchor.
    pub fn is_stationary(self) -> bool {
        matches!(self, Self::Rest | Self::Talk)
    }
}

impl std::fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Per-fish handle for an accepted target, handed back on consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

/// A food target the fish owns from acceptance until it is eaten or reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: TargetId,
    /// Clamped to the world bounds and projected onto the ground plane.
    pub position: Vec3,
}

/// Position and heading recorded on entering Rest or Talk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationaryAnchor {
    pub position: Vec3,
    /// Unit length, horizontal.
    pub direction: Vec3,
}

/// Accumulated state for the wander behavior.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WanderState {
    pub target: Option<Vec3>,
    /// Seconds since the target was last picked.
    pub timer: f32,
    /// Current target was biased toward world center by the vision probe.
    pub homing: bool,
}

impl WanderState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
