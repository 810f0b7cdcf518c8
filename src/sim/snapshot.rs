//! Read-only per-frame view for the renderer and HUD
//!
//! Built fresh from the simulation each frame; holds copies, never references,
//! so the host can keep or serialize it freely.

use glam::Vec3;
use serde::Serialize;

use super::physics::BodyPose;
use super::state::{MissionOutcome, Weather};
use super::vehicle::VehicleRuntimeState;
use super::weather::Atmosphere;

/// Mission HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionHud {
    pub mission_id: String,
    pub title: String,
    /// Marker position of the checkpoint being driven to
    pub checkpoint: Vec3,
    /// 0-based index of that checkpoint
    pub checkpoint_index: usize,
    pub checkpoint_count: usize,
    pub time_remaining: f32,
}

/// One visible smoke puff
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmokeSprite {
    pub position: Vec3,
    pub scale: f32,
}

/// Traffic car transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrafficSprite {
    pub id: u32,
    pub pose: BodyPose,
}

/// Everything the render/HUD side reads for one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub car_id: String,
    pub vehicle: VehicleRuntimeState,
    pub smoke: Vec<SmokeSprite>,
    pub traffic: Vec<TrafficSprite>,
    pub weather: Weather,
    pub atmosphere: Atmosphere,
    pub mission: Option<MissionHud>,
    pub last_outcome: Option<MissionOutcome>,
    pub money: i64,
    /// Speed as shown on the HUD (whole km/h, unsigned)
    pub speed_display: u32,
    pub speeding: bool,
    pub police_pursuit: bool,
    pub wanted_level: u8,
}
