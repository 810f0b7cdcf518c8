//! Vehicle controller
//!
//! Turns a [`ControlIntent`] into forces for the physics engine and reads the
//! resolved motion back into [`VehicleRuntimeState`].
//!
//! Sign conventions: positive engine force pushes along the car's heading,
//! positive steering turns left, speed is negative while rolling backwards.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::catalog::VehicleSpec;
use super::physics::BodyPose;
use super::state::Weather;
use super::weather::SmokeStyle;
use crate::tuning::VehicleTuning;

/// m/s to km/h
pub const MS_TO_KMH: f32 = 3.6;

/// Normalized player controls for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlIntent {
    pub accelerate: bool,
    /// Brake, or reverse when nearly stopped
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
    pub handbrake: bool,
    /// One-shot: put the car back on the spawn point
    pub reset: bool,
}

/// Force directive for the physics engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveCommand {
    /// Longitudinal drive force (negative = reverse)
    pub engine_force: f32,
    /// Brake force (always opposes motion)
    pub brake_force: f32,
    /// Front wheel angle (radians, positive = left)
    pub steering: f32,
    /// Lateral slip tolerance (1 = normal grip)
    pub slip_multiplier: f32,
}

impl Default for DriveCommand {
    fn default() -> Self {
        Self {
            engine_force: 0.0,
            brake_force: 0.0,
            steering: 0.0,
            slip_multiplier: 1.0,
        }
    }
}

/// What the physics engine should do with the player body this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    Drive(DriveCommand),
    /// Discrete, non-physical move back to spawn with zero velocity
    Teleport(BodyPose),
}

/// Player car state derived from physics each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleRuntimeState {
    /// Signed speed (km/h)
    pub speed_kmh: f32,
    pub pose: BodyPose,
    pub velocity: Vec3,
    /// Brakes or handbrake engaged (drives tire smoke)
    pub braking: bool,
    /// Tire smoke tint for the current weather
    pub smoke: SmokeStyle,
}

/// Input-to-force controller for the player car
#[derive(Debug, Clone)]
pub struct VehicleController {
    steering: f32,
    runtime: VehicleRuntimeState,
}

impl VehicleController {
    pub fn new(spawn: BodyPose) -> Self {
        Self {
            steering: 0.0,
            runtime: VehicleRuntimeState {
                speed_kmh: 0.0,
                pose: spawn,
                velocity: Vec3::ZERO,
                braking: false,
                smoke: SmokeStyle::for_weather(Weather::Sunny),
            },
        }
    }

    pub fn runtime(&self) -> &VehicleRuntimeState {
        &self.runtime
    }

    /// Current front wheel angle
    pub fn steering(&self) -> f32 {
        self.steering
    }

    /// Compute this tick's directive from the controls
    pub fn control(
        &mut self,
        intent: &ControlIntent,
        spec: &VehicleSpec,
        weather: Weather,
        dt: f32,
        tuning: &VehicleTuning,
    ) -> ControlAction {
        let dt = crate::sanitize_dt(dt);
        self.runtime.smoke = SmokeStyle::for_weather(weather);

        if intent.reset {
            let spawn = BodyPose::new(tuning.spawn_position, tuning.spawn_heading);
            log::debug!("Vehicle reset to spawn");
            self.steering = 0.0;
            self.runtime.speed_kmh = 0.0;
            self.runtime.velocity = Vec3::ZERO;
            self.runtime.pose = spawn;
            self.runtime.braking = false;
            return ControlAction::Teleport(spawn);
        }

        // Steering eases toward the requested lock at the car's handling rate
        let max_steer = tuning.max_steer.abs();
        let target = match (intent.steer_left, intent.steer_right) {
            (true, false) => max_steer,
            (false, true) => -max_steer,
            _ => 0.0,
        };
        let rate = finite_or_zero(spec.handling).max(0.0) * tuning.steer_rate_scale;
        let step = rate * dt;
        self.steering += (target - self.steering).clamp(-step, step);
        self.steering = self.steering.clamp(-max_steer, max_steer);

        let speed = self.runtime.speed_kmh;
        let top_speed = finite_or_zero(spec.speed).max(0.0);
        let drive = finite_or_zero(spec.acceleration).max(0.0) * tuning.engine_scale;

        let mut command = DriveCommand {
            steering: self.steering,
            ..Default::default()
        };
        let mut braking = false;

        if intent.brake {
            if speed <= tuning.reverse_threshold_kmh {
                // Nearly stopped: reverse, capped at a fraction of top speed
                if speed > -top_speed * tuning.reverse_ratio {
                    command.engine_force = -drive * tuning.reverse_ratio;
                }
            } else {
                command.brake_force = tuning.brake_force;
                braking = true;
            }
        } else if intent.accelerate && speed < top_speed {
            command.engine_force = drive;
        }

        if intent.handbrake {
            command.brake_force += tuning.handbrake_force;
            command.slip_multiplier = tuning.handbrake_slip.max(1.0);
            braking = true;
        }

        self.runtime.braking = braking;
        ControlAction::Drive(command)
    }

    /// Take the resolved pose/velocity from physics; returns the signed speed (km/h)
    pub fn observe(&mut self, pose: BodyPose, velocity: Vec3) -> f32 {
        let velocity = if velocity.is_finite() { velocity } else { Vec3::ZERO };
        let magnitude = velocity.length() * MS_TO_KMH;
        let sign = if velocity.dot(pose.forward()) < 0.0 { -1.0 } else { 1.0 };
        self.runtime.pose = pose;
        self.runtime.velocity = velocity;
        self.runtime.speed_kmh = magnitude * sign;
        self.runtime.speed_kmh
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}
