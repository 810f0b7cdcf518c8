//! Physics collaborator boundary
//!
//! The simulation never integrates the player car itself. Each tick it hands
//! a [`DriveCommand`] (or a teleport) to a [`PhysicsWorld`], lets the world
//! step, and reads back the resolved pose and velocity. Traffic cars are
//! kinematic: their poses are written, never simulated.
//!
//! [`ArcadeBody`] is a small stand-in world used by the headless driver and
//! tests. It has no collisions; a real engine replaces it in the game.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::vehicle::DriveCommand;
use crate::forward_from_heading;

/// World-space position and heading (yaw, radians, 0 faces +Z)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyPose {
    pub position: Vec3,
    pub heading: f32,
}

impl BodyPose {
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self { position, heading }
    }

    pub fn forward(&self) -> Vec3 {
        forward_from_heading(self.heading)
    }

    /// Right-hand side direction (Y up); heading grows when turning left
    pub fn right(&self) -> Vec3 {
        let f = self.forward();
        Vec3::new(-f.z, 0.0, f.x)
    }
}

/// What the core needs from the physics engine
pub trait PhysicsWorld {
    /// Apply this tick's forces to the player body
    fn drive(&mut self, command: &DriveCommand);
    /// Move the player body instantly and zero its velocity
    fn teleport(&mut self, pose: BodyPose);
    /// Integrate one step
    fn step(&mut self, dt: f32);
    /// Resolved player pose after the last step
    fn player_pose(&self) -> BodyPose;
    /// Resolved player linear velocity (world units per second)
    fn player_velocity(&self) -> Vec3;
    /// World positions of the two rear wheels (left, right)
    fn rear_wheels(&self) -> [Vec3; 2];
    /// Write a kinematic traffic body's pose
    fn set_kinematic_pose(&mut self, _id: u32, _pose: BodyPose) {}
}

/// Minimal arcade integrator: longitudinal forces plus a bicycle steering model
#[derive(Debug, Clone)]
pub struct ArcadeBody {
    pose: BodyPose,
    /// Signed speed along the heading
    forward_speed: f32,
    /// Sideways drift, decays with grip
    lateral_speed: f32,
    command: DriveCommand,
    pub mass: f32,
    pub wheelbase: f32,
    pub track_width: f32,
    /// Rolling resistance + air drag coefficient
    pub drag: f32,
}

impl ArcadeBody {
    pub fn new(pose: BodyPose) -> Self {
        Self {
            pose,
            forward_speed: 0.0,
            lateral_speed: 0.0,
            command: DriveCommand::default(),
            mass: 500.0,
            wheelbase: 2.6,
            track_width: 1.6,
            drag: 0.1,
        }
    }
}

impl PhysicsWorld for ArcadeBody {
    fn drive(&mut self, command: &DriveCommand) {
        self.command = *command;
    }

    fn teleport(&mut self, pose: BodyPose) {
        self.pose = pose;
        self.forward_speed = 0.0;
        self.lateral_speed = 0.0;
        self.command = DriveCommand::default();
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let cmd = self.command;

        let accel = cmd.engine_force / self.mass - self.drag * self.forward_speed;
        self.forward_speed += accel * dt;

        // Brakes oppose motion but never push the car backwards
        let brake = (cmd.brake_force / self.mass) * dt;
        if brake > 0.0 {
            if self.forward_speed.abs() <= brake {
                self.forward_speed = 0.0;
            } else {
                self.forward_speed -= brake * self.forward_speed.signum();
            }
        }

        // Bicycle model yaw rate (positive steering turns left); handbrake slip lets the rear swing out
        let yaw_rate = self.forward_speed * cmd.steering.tan() / self.wheelbase;
        self.pose.heading += yaw_rate * dt;
        let slip = cmd.slip_multiplier.max(1.0);
        self.lateral_speed += yaw_rate * self.forward_speed.abs() * 0.02 * (slip - 1.0) * dt;
        self.lateral_speed *= (1.0 - 8.0 / slip * dt).max(0.0);

        let velocity = self.player_velocity();
        self.pose.position += velocity * dt;
    }

    fn player_pose(&self) -> BodyPose {
        self.pose
    }

    fn player_velocity(&self) -> Vec3 {
        self.pose.forward() * self.forward_speed + self.pose.right() * self.lateral_speed
    }

    fn rear_wheels(&self) -> [Vec3; 2] {
        let axle = self.pose.position - self.pose.forward() * (self.wheelbase / 2.0);
        let half = self.pose.right() * (self.track_width / 2.0);
        [axle - half, axle + half]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_force_moves_forward() {
        let mut body = ArcadeBody::new(BodyPose::default());
        body.drive(&DriveCommand {
            engine_force: 10.0,
            ..Default::default()
        });
        for _ in 0..60 {
            body.step(1.0 / 60.0);
        }
        assert!(body.player_velocity().z > 0.0);
        assert!(body.player_pose().position.z > 0.0);
    }

    #[test]
    fn test_brake_stops_without_reversing() {
        let mut body = ArcadeBody::new(BodyPose::default());
        body.drive(&DriveCommand {
            engine_force: 10.0,
            ..Default::default()
        });
        body.step(1.0);
        body.drive(&DriveCommand {
            brake_force: 1000.0,
            ..Default::default()
        });
        body.step(0.1);
        assert_eq!(body.player_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_teleport_zeroes_velocity() {
        let mut body = ArcadeBody::new(BodyPose::default());
        body.drive(&DriveCommand {
            engine_force: 50.0,
            ..Default::default()
        });
        body.step(1.0);
        body.teleport(BodyPose::new(Vec3::new(5.0, 2.0, 5.0), 1.0));
        assert_eq!(body.player_velocity(), Vec3::ZERO);
        assert_eq!(body.player_pose().position, Vec3::new(5.0, 2.0, 5.0));
    }
}
