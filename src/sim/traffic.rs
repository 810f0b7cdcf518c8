//! Ambient traffic
//!
//! Kinematic cars that drive back and forth along one road: constant speed
//! on a fixed axis, turning around at the city edge. They ignore the player
//! and each other; only static geometry (handled by physics) stands in their way.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::physics::BodyPose;
use crate::heading_of;

/// Ride height traffic bodies are held at
pub const TRAFFIC_RIDE_HEIGHT: f32 = 1.0;

/// World axis a traffic car drives along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Z,
}

/// One kinematic traffic car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficAgent {
    pub id: u32,
    pub axis: Axis,
    /// +1 or -1 along the axis
    pub direction: f32,
    /// Speed magnitude (world units per second)
    pub speed: f32,
    pub position: Vec3,
}

impl TrafficAgent {
    pub fn new(id: u32, axis: Axis, speed: f32, position: Vec3) -> Self {
        Self {
            id,
            axis,
            direction: 1.0,
            speed: speed.abs(),
            position,
        }
    }

    /// Coordinate along the driving axis
    pub fn along(&self) -> f32 {
        match self.axis {
            Axis::X => self.position.x,
            Axis::Z => self.position.z,
        }
    }

    fn along_mut(&mut self) -> &mut f32 {
        match self.axis {
            Axis::X => &mut self.position.x,
            Axis::Z => &mut self.position.z,
        }
    }

    /// Move one tick. Past `half_extent` the car turns around, but only while
    /// still heading outward, so a car that overshoots flips exactly once.
    pub fn advance(&mut self, dt: f32, half_extent: f32) {
        let dt = crate::sanitize_dt(dt);
        let step = self.speed * self.direction * dt;
        *self.along_mut() += step;

        let along = self.along();
        if along.abs() > half_extent && along.signum() == self.direction.signum() {
            self.direction = -self.direction;
        }
    }

    /// Pose for the kinematic body: held at ride height, facing travel direction
    pub fn pose(&self) -> BodyPose {
        let travel = match self.axis {
            Axis::X => Vec3::new(self.direction, 0.0, 0.0),
            Axis::Z => Vec3::new(0.0, 0.0, self.direction),
        };
        BodyPose::new(
            Vec3::new(self.position.x, TRAFFIC_RIDE_HEIGHT, self.position.z),
            heading_of(travel),
        )
    }
}

/// Advance every agent; order does not matter
pub fn advance_all(agents: &mut [TrafficAgent], dt: f32, half_extent: f32) {
    for agent in agents.iter_mut() {
        agent.advance(dt, half_extent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HALF: f32 = 450.0;

    #[test]
    fn test_moves_along_axis_only() {
        let mut agent = TrafficAgent::new(0, Axis::Z, 12.0, Vec3::new(33.5, 1.0, 0.0));
        agent.advance(0.5, HALF);
        assert_eq!(agent.position, Vec3::new(33.5, 1.0, 6.0));
    }

    #[test]
    fn test_bounce_flips_once() {
        let mut agent = TrafficAgent::new(0, Axis::X, 10.0, Vec3::new(HALF - 1.0, 1.0, -26.5));
        agent.advance(1.0, HALF);
        assert_eq!(agent.direction, -1.0);
        assert!((agent.position.x - (HALF + 9.0)).abs() < 1e-4);

        // Still outside the edge but heading back in: no second flip
        agent.advance(0.1, HALF);
        assert_eq!(agent.direction, -1.0);
        agent.advance(1.0, HALF);
        assert_eq!(agent.direction, -1.0);
        assert!(agent.position.x < HALF + 9.0);
    }

    #[test]
    fn test_cross_coordinate_outside_bounds_is_ignored() {
        // Lanes on the outermost road sit beyond the half extent on the other axis
        let mut agent = TrafficAgent::new(0, Axis::X, 10.0, Vec3::new(0.0, 1.0, -483.5));
        for _ in 0..10 {
            agent.advance(0.1, HALF);
        }
        assert_eq!(agent.direction, 1.0);
        assert!((agent.position.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_pose_faces_travel() {
        let mut agent = TrafficAgent::new(0, Axis::Z, 10.0, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(agent.pose().heading, 0.0);
        assert_eq!(agent.pose().position.y, TRAFFIC_RIDE_HEIGHT);
        agent.direction = -1.0;
        assert_eq!(agent.pose().heading, std::f32::consts::PI);

        let mut agent = TrafficAgent::new(1, Axis::X, 10.0, Vec3::ZERO);
        assert_eq!(agent.pose().heading, std::f32::consts::FRAC_PI_2);
        agent.direction = -1.0;
        assert_eq!(agent.pose().heading, -std::f32::consts::FRAC_PI_2);
        assert!(agent.pose().forward().x < -0.999);
    }

    proptest! {
        #[test]
        fn prop_agents_stay_near_bounds(
            start in -HALF..HALF,
            speed in 10.0f32..25.0,
            dts in prop::collection::vec(0.0f32..0.1, 1..2000),
        ) {
            let mut agent = TrafficAgent::new(0, Axis::X, speed, Vec3::new(start, 1.0, 0.0));
            for dt in dts {
                agent.advance(dt, HALF);
                // Overshoot is bounded by a single step
                prop_assert!(agent.along().abs() <= HALF + speed * 0.1 + 1e-3);
                prop_assert!(agent.direction == 1.0 || agent.direction == -1.0);
            }
        }
    }
}
