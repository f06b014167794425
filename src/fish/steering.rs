//! Steering math shared by every moving state.
//!
//! Everything here works on the horizontal plane: inputs are flattened
//! (Y zeroed) before use and outputs never carry a vertical component.

use glam::{Vec2, Vec3};

/// Default facing when neither velocity nor a stored heading is usable.
pub const FORWARD: Vec3 = Vec3::Z;

/// Squared speed below which a velocity has no meaningful direction.
const MIN_DIRECTION_SQ: f32 = 1e-8;

/// Drop the vertical component.
#[inline]
pub fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance measured on the horizontal plane.
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    flat(b - a).length()
}

/// Unit horizontal direction of `v`, or `None` if it is too short to trust.
pub fn direction_of(v: Vec3) -> Option<Vec3> {
    let v = flat(v);
    let len_sq = v.length_squared();
    if len_sq > MIN_DIRECTION_SQ && len_sq.is_finite() {
        Some(v / len_sq.sqrt())
    } else {
        None
    }
}

/// Heading to record when the fish stops: live velocity, then the previous
/// heading, then [`FORWARD`].
pub fn fallback_direction(velocity: Vec3, previous: Vec3) -> Vec3 {
    direction_of(velocity)
        .or_else(|| direction_of(previous))
        .unwrap_or(FORWARD)
}

/// Horizontal unit vector 90° to the left of `dir`.
#[inline]
pub fn perpendicular(dir: Vec3) -> Vec3 {
    Vec3::new(-dir.z, 0.0, dir.x)
}

/// Desired velocity toward `target`, slowing linearly inside `slowing_radius`.
pub fn arrive(position: Vec3, target: Vec3, max_speed: f32, slowing_radius: f32) -> Vec3 {
    let to_target = flat(target - position);
    let distance = to_target.length();
    if distance < 1e-4 {
        return Vec3::ZERO;
    }

    let speed = if distance < slowing_radius {
        max_speed * (distance / slowing_radius)
    } else {
        max_speed
    };

    to_target / distance * speed
}

/// Bend a desired velocity sideways by `sin(phase) * amplitude` while
/// keeping its magnitude.
pub fn wiggle(desired: Vec3, phase: f32, amplitude: f32) -> Vec3 {
    let speed = desired.length();
    let Some(dir) = direction_of(desired) else {
        return desired;
    };
    let bent = dir + perpendicular(dir) * (phase.sin() * amplitude);
    direction_of(bent).map_or(desired, |d| d * speed)
}

/// One steering step: turn toward `desired` by at most `max_force`, then cap
/// the result at `max_speed`.
pub fn apply_steering(velocity: Vec3, desired: Vec3, max_force: f32, max_speed: f32) -> Vec3 {
    let force = (desired - velocity).clamp_length_max(max_force);
    flat(velocity + force).clamp_length_max(max_speed)
}

/// Low-pass filter on the heading. Keeps `old` if the blend degenerates.
pub fn smooth_heading(old: Vec3, instant: Vec3, smoothing: f32) -> Vec3 {
    direction_of(old.lerp(instant, smoothing)).unwrap_or(old)
}

/// Uniform random point inside the unit disc.
pub fn random_in_disc(rng: &mut fastrand::Rng) -> Vec2 {
    let angle = rng.f32() * std::f32::consts::TAU;
    let r = rng.f32().sqrt();
    Vec2::new(angle.cos(), angle.sin()) * r
}
