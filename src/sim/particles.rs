//! Tire smoke particle pool
//!
//! A fixed array of `SMOKE_CAPACITY` slots allocated once. A slot with
//! `life <= 0` is dead and free for reuse; spawning takes the lowest-index
//! dead slot (linear scan) and silently drops the puff when every slot is
//! alive. Nothing here allocates after construction.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::consts::SMOKE_CAPACITY;
use crate::tuning::SmokeTuning;

/// RNG stream for smoke, kept apart from weather and world generation
const SMOKE_STREAM: u64 = 0x5A0C_E5ED;

/// One smoke puff
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmokeParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub scale: f32,
    /// 1.0 at spawn, dead at or below zero
    pub life: f32,
}

impl SmokeParticle {
    fn parked(depth: f32) -> Self {
        Self {
            position: Vec3::new(0.0, depth, 0.0),
            velocity: Vec3::ZERO,
            scale: 0.0,
            life: 0.0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Rendered size; shrinks to zero as life runs out so there is no pop
    #[inline]
    pub fn visible_scale(&self) -> f32 {
        self.scale * self.life.max(0.0)
    }
}

/// Emission signals read from the vehicle after physics
#[derive(Debug, Clone, Copy)]
pub struct SmokeEmitter {
    pub braking: bool,
    pub speed_kmh: f32,
    /// Rear wheel world positions
    pub wheels: [Vec3; 2],
}

/// Fixed-capacity smoke pool
#[derive(Debug, Clone)]
pub struct SmokePool {
    particles: [SmokeParticle; SMOKE_CAPACITY],
    rng: Pcg32,
    /// Puffs dropped because the pool was full
    dropped: u64,
}

impl SmokePool {
    pub fn new(seed: u64, tuning: &SmokeTuning) -> Self {
        Self {
            particles: [SmokeParticle::parked(tuning.parking_depth); SMOKE_CAPACITY],
            rng: Pcg32::seed_from_u64(seed ^ SMOKE_STREAM),
            dropped: 0,
        }
    }

    pub fn particles(&self) -> &[SmokeParticle; SMOKE_CAPACITY] {
        &self.particles
    }

    pub fn alive(&self) -> impl Iterator<Item = &SmokeParticle> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// One tick: spawn from the rear wheels if skidding, then age every live puff
    pub fn update(&mut self, emitter: &SmokeEmitter, dt: f32, tuning: &SmokeTuning) {
        let dt = crate::clamp_frame_dt(dt);

        if emitter.braking && emitter.speed_kmh.abs() > tuning.spawn_speed_kmh {
            for wheel in emitter.wheels {
                self.spawn(wheel, tuning);
            }
        }

        for p in self.particles.iter_mut().filter(|p| p.is_alive()) {
            p.life -= dt * tuning.fade_rate;
            p.position += p.velocity * dt;
            p.scale += dt * tuning.expansion_rate;
            if !p.is_alive() {
                *p = SmokeParticle::parked(tuning.parking_depth);
            }
        }
    }

    /// Claim the lowest-index dead slot; returns the slot used
    pub fn spawn(&mut self, at: Vec3, tuning: &SmokeTuning) -> Option<usize> {
        let Some(slot) = self.particles.iter().position(|p| !p.is_alive()) else {
            self.dropped += 1;
            return None;
        };

        let half = tuning.lateral_spread.abs() / 2.0;
        let scale = if tuning.max_scale > tuning.min_scale {
            self.rng.random_range(tuning.min_scale..tuning.max_scale)
        } else {
            tuning.min_scale
        };
        let velocity = Vec3::new(
            self.rng.random_range(-half..=half),
            self.rng.random::<f32>() * tuning.rise,
            self.rng.random_range(-half..=half),
        );

        self.particles[slot] = SmokeParticle {
            position: Vec3::new(at.x, tuning.ground_height, at.z),
            velocity,
            scale,
            life: 1.0,
        };
        Some(slot)
    }
}
