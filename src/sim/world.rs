//! Seeded city generation
//!
//! Builds the static block layout and the initial traffic from a seed, so the
//! same seed always yields the same city. The grid is `city_size` blocks per
//! side centered on the origin; roads run between blocks.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::BUILDING_COLORS;
use super::traffic::{Axis, TRAFFIC_RIDE_HEIGHT, TrafficAgent};
use crate::settings::Settings;

/// Everything world generation needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldParams {
    pub seed: u64,
    pub city_size: u32,
    pub block_size: f32,
    pub road_width: f32,
    pub agent_count: usize,
    /// Traffic speed range [min, max)
    pub agent_speed: (f32, f32),
    /// Building height range [min, max)
    pub building_height: (f32, f32),
}

impl WorldParams {
    pub fn new(seed: u64, city_size: u32, block_size: f32) -> Self {
        Self {
            seed,
            city_size,
            block_size,
            road_width: crate::consts::ROAD_WIDTH,
            agent_count: crate::consts::TRAFFIC_AGENT_COUNT,
            agent_speed: (10.0, 25.0),
            building_height: (10.0, 50.0),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            road_width: settings.road_width,
            agent_count: settings.traffic_agents,
            ..Self::new(settings.seed, settings.city_size, settings.block_size)
        }
    }

    /// Half the city's edge length
    pub fn half_extent(&self) -> f32 {
        self.city_size as f32 * self.block_size / 2.0
    }

    /// Lane offset from a road's center line
    pub fn lane_offset(&self) -> f32 {
        self.road_width / 4.0
    }
}

/// One built-up city block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityBlock {
    /// Block center at ground level
    pub center: Vec3,
    /// Static sidewalk collider extents (x, y, z)
    pub collider: Vec3,
    pub building_height: f32,
    /// Index into [`BUILDING_COLORS`]
    pub color: usize,
}

/// Generated world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub params: WorldParams,
    pub blocks: Vec<CityBlock>,
    pub agents: Vec<TrafficAgent>,
}

impl World {
    pub fn half_extent(&self) -> f32 {
        self.params.half_extent()
    }
}

/// Generate a city of `city_size` x `city_size` blocks with default traffic
pub fn generate_world(seed: u64, city_size: u32, block_size: f32) -> World {
    generate(WorldParams::new(seed, city_size, block_size))
}

/// Generate a city from explicit parameters
pub fn generate(params: WorldParams) -> World {
    let mut rng = Pcg32::seed_from_u64(params.seed);
    let blocks = generate_blocks(&params, &mut rng);
    let agents = generate_traffic(&params, &mut rng);
    log::info!(
        "Generated city: seed {}, {} blocks, {} traffic cars",
        params.seed,
        blocks.len(),
        agents.len()
    );
    World {
        params,
        blocks,
        agents,
    }
}

fn generate_blocks(params: &WorldParams, rng: &mut Pcg32) -> Vec<CityBlock> {
    let offset = params.half_extent();
    let size = params.block_size;
    let footprint = (size - params.road_width).max(0.0);
    let (min_h, max_h) = params.building_height;

    let mut blocks = Vec::new();
    for x in 0..params.city_size {
        for z in 0..params.city_size {
            let cx = x as f32 * size - offset;
            let cz = z as f32 * size - offset;
            // Keep the spawn area open
            if cx.abs() < size && cz.abs() < size {
                continue;
            }
            let building_height = if max_h > min_h {
                rng.random_range(min_h..max_h)
            } else {
                min_h
            };
            blocks.push(CityBlock {
                center: Vec3::new(cx, 0.0, cz),
                collider: Vec3::new(footprint, 2.0, footprint),
                building_height,
                color: rng.random_range(0..BUILDING_COLORS.len()),
            });
        }
    }
    blocks
}

fn generate_traffic(params: &WorldParams, rng: &mut Pcg32) -> Vec<TrafficAgent> {
    if params.city_size == 0 {
        return Vec::new();
    }
    let offset = params.half_extent();
    let size = params.block_size;
    let span = params.city_size as f32 * size;
    let (min_v, max_v) = params.agent_speed;
    let lane = params.lane_offset();

    (0..params.agent_count)
        .map(|i| {
            let horizontal = rng.random_bool(0.5);
            let road = rng.random_range(0..params.city_size);
            let lane_offset = if rng.random_bool(0.5) { lane } else { -lane };
            let road_line = road as f32 * size - offset - size / 2.0 + lane_offset;
            let along = rng.random::<f32>() * span - offset;
            let speed = if max_v > min_v {
                rng.random_range(min_v..max_v)
            } else {
                min_v
            };

            let (axis, position) = if horizontal {
                (Axis::X, Vec3::new(along, TRAFFIC_RIDE_HEIGHT, road_line))
            } else {
                (Axis::Z, Vec3::new(road_line, TRAFFIC_RIDE_HEIGHT, along))
            };
            TrafficAgent::new(i as u32, axis, speed, position)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_world() {
        let a = generate_world(77, 15, 60.0);
        let b = generate_world(77, 15, 60.0);
        assert_eq!(a.agents, b.agents);
        assert_eq!(a.blocks, b.blocks);

        let c = generate_world(78, 15, 60.0);
        assert_ne!(a.agents, c.agents);
    }

    #[test]
    fn test_spawn_area_is_open() {
        let world = generate_world(1, 15, 60.0);
        // Centers fall on odd multiples of 30, so the 2x2 around the origin is skipped
        assert!(
            world
                .blocks
                .iter()
                .all(|b| !(b.center.x.abs() < 60.0 && b.center.z.abs() < 60.0))
        );
        assert_eq!(world.blocks.len(), 15 * 15 - 4);
        assert!(
            world
                .blocks
                .iter()
                .all(|b| (10.0..50.0).contains(&b.building_height))
        );
        assert!(world.blocks.iter().all(|b| b.color < BUILDING_COLORS.len()));
    }

    #[test]
    fn test_traffic_on_lanes() {
        let world = generate_world(5, 15, 60.0);
        assert_eq!(world.agents.len(), crate::consts::TRAFFIC_AGENT_COUNT);
        let half = world.half_extent();
        for agent in &world.agents {
            assert!((10.0..25.0).contains(&agent.speed));
            assert_eq!(agent.direction, 1.0);
            assert!(agent.along().abs() <= half);

            // Cross coordinate is a road line +- one lane offset
            let cross = match agent.axis {
                Axis::X => agent.position.z,
                Axis::Z => agent.position.x,
            };
            let from_road = (cross + half + 30.0).rem_euclid(60.0);
            let lane = world.params.lane_offset();
            assert!(
                (from_road - lane).abs() < 1e-3 || (from_road - (60.0 - lane)).abs() < 1e-3,
                "cross {cross} not on a lane"
            );
        }
    }

    #[test]
    fn test_params_follow_settings() {
        let settings = Settings {
            seed: 9,
            traffic_agents: 4,
            ..Settings::default()
        };
        let params = WorldParams::from_settings(&settings);
        assert_eq!(params.half_extent(), 450.0);
        assert_eq!(generate(params).agents.len(), 4);
    }

    #[test]
    fn test_empty_city() {
        let world = generate_world(1, 0, 60.0);
        assert!(world.blocks.is_empty());
        assert!(world.agents.is_empty());
    }
}
