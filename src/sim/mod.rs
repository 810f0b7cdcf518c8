//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (separate streams for world, weather and smoke)
//! - Stable iteration order (by agent/slot index)
//! - No rendering or platform dependencies; physics only through [`PhysicsWorld`]

pub mod catalog;
pub mod mission;
pub mod particles;
pub mod physics;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod traffic;
pub mod vehicle;
pub mod weather;
pub mod world;

pub use catalog::{Catalog, Mission, MissionKind, VehicleSpec};
pub use particles::{SmokeEmitter, SmokeParticle, SmokePool};
pub use physics::{ArcadeBody, BodyPose, PhysicsWorld};
pub use snapshot::{MissionHud, RenderSnapshot, SmokeSprite, TrafficSprite};
pub use state::{
    ActionError, CarConfig, CarConfigPatch, GameEvent, GameMode, GameState, MAX_WANTED_LEVEL,
    MissionOutcome, MissionRun, Weather,
};
pub use tick::Simulation;
pub use traffic::{Axis, TrafficAgent};
pub use vehicle::{ControlAction, ControlIntent, DriveCommand, VehicleController, VehicleRuntimeState};
pub use weather::{Atmosphere, SmokeStyle, WeatherCycle};
pub use world::{CityBlock, World, WorldParams, generate_world};
