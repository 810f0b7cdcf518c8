//! Streetbound - An arcade city driving game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (vehicle control, missions, traffic, weather, effects)
//! - `persistence`: Save/load of the player's progress
//! - `settings`: Session configuration (seed, city layout, timestep)
//! - `tuning`: Data-driven game balance
//!
//! Rigid-body physics, rendering and raw input capture live outside this crate.
//! The simulation talks to physics through [`sim::PhysicsWorld`] and hands the
//! renderer a [`sim::RenderSnapshot`] each frame.

pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Default fixed simulation timestep (60 Hz, matches the physics step)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted by any per-tick update
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// City layout defaults
    pub const CITY_SIZE: u32 = 15;
    pub const BLOCK_SIZE: f32 = 60.0;
    pub const ROAD_WIDTH: f32 = 14.0;

    /// Number of ambient traffic cars
    pub const TRAFFIC_AGENT_COUNT: usize = 30;

    /// Tire smoke pool capacity
    pub const SMOKE_CAPACITY: usize = 50;

    /// Car every player owns from the start
    pub const STARTER_CAR: &str = "starter";
}

/// Elapsed time as a usable delta: NaN/inf and negative values become zero
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.max(0.0) } else { 0.0 }
}

/// [`sanitize_dt`] further capped at `MAX_FRAME_DT` (for frame-rate driven effects)
#[inline]
pub fn clamp_frame_dt(dt: f32) -> f32 {
    sanitize_dt(dt).min(consts::MAX_FRAME_DT)
}

/// Heading (yaw, radians) of a ground-plane direction; 0 faces +Z
#[inline]
pub fn heading_of(dir: Vec3) -> f32 {
    dir.x.atan2(dir.z)
}

/// Unit forward vector for a heading; inverse of [`heading_of`]
#[inline]
pub fn forward_from_heading(heading: f32) -> Vec3 {
    Vec3::new(heading.sin(), 0.0, heading.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_dt() {
        assert_eq!(sanitize_dt(-1.0), 0.0);
        assert_eq!(sanitize_dt(f32::NAN), 0.0);
        assert_eq!(sanitize_dt(f32::INFINITY), 0.0);
        assert_eq!(sanitize_dt(45.0), 45.0);
        assert_eq!(clamp_frame_dt(5.0), consts::MAX_FRAME_DT);
        assert!((clamp_frame_dt(0.016) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_heading_roundtrip() {
        for &h in &[0.0_f32, 0.5, -1.2, 3.0] {
            let back = heading_of(forward_from_heading(h));
            assert!((back - h).abs() < 1e-5, "{h} -> {back}");
        }
    }
}
