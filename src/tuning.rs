//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives here so balance passes
//! can happen in a JSON file instead of code. Missing keys fall back to the
//! shipped defaults.

use std::fs;
use std::path::Path;

use anyhow::Context;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Vehicle controller balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    /// Drive force per point of the car's acceleration stat
    pub engine_scale: f32,
    /// Fraction of forward drive force available in reverse
    pub reverse_ratio: f32,
    /// Forward speed (km/h) below which the backward intent engages reverse
    pub reverse_threshold_kmh: f32,
    /// Service brake force when the backward intent acts as a brake
    pub brake_force: f32,
    /// Rear brake force applied by the handbrake
    pub handbrake_force: f32,
    /// Lateral slip tolerance multiplier while the handbrake is held
    pub handbrake_slip: f32,
    /// Maximum steering angle (radians)
    pub max_steer: f32,
    /// Steering angular rate per point of the car's handling stat (rad/s)
    pub steer_rate_scale: f32,
    /// Spawn position used by the reset intent
    pub spawn_position: Vec3,
    /// Spawn heading (radians) used by the reset intent
    pub spawn_heading: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            engine_scale: 50.0,
            reverse_ratio: 0.5,
            reverse_threshold_kmh: 1.0,
            brake_force: 3000.0,
            handbrake_force: 1500.0,
            handbrake_slip: 2.5,
            max_steer: 0.5,
            steer_rate_scale: 4.0,
            spawn_position: Vec3::new(0.0, 2.0, 0.0),
            spawn_heading: 0.0,
        }
    }
}

/// Mission engine balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionTuning {
    /// Distance (world units) at which a checkpoint counts as reached
    pub checkpoint_radius: f32,
}

impl Default for MissionTuning {
    fn default() -> Self {
        Self {
            checkpoint_radius: 10.0,
        }
    }
}

/// Economy and law-enforcement balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Speed limit (km/h); above it the player is speeding
    pub speed_limit_kmh: f32,
    /// Speed (km/h) that triggers a police pursuit
    pub police_threshold_kmh: f32,
    /// Money granted per full passive-income interval while speeding
    pub passive_income: i64,
    /// Seconds of continuous speeding per passive-income payout
    pub passive_income_interval: f32,
    /// Seconds without a pursuit before the wanted level clears
    pub wanted_cooldown: f32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            speed_limit_kmh: 60.0,
            police_threshold_kmh: 75.0,
            passive_income: 10,
            passive_income_interval: 1.0,
            wanted_cooldown: 10.0,
        }
    }
}

/// Weather cycle balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherTuning {
    /// Simulated seconds between resamples
    pub interval: f32,
    /// Relative weights for sunny, rain, fog
    pub weights: [f32; 3],
}

impl Default for WeatherTuning {
    fn default() -> Self {
        Self {
            interval: 30.0,
            weights: [0.4, 0.3, 0.3],
        }
    }
}

/// Tire smoke balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeTuning {
    /// Minimum |speed| (km/h) for braking to emit smoke
    pub spawn_speed_kmh: f32,
    /// Life lost per second
    pub fade_rate: f32,
    /// Scale gained per second
    pub expansion_rate: f32,
    /// Height smoke is emitted at
    pub ground_height: f32,
    /// Height dead particles are parked at
    pub parking_depth: f32,
    /// Initial scale range
    pub min_scale: f32,
    pub max_scale: f32,
    /// Horizontal velocity spread (total width, centered on zero)
    pub lateral_spread: f32,
    /// Upward velocity range [0, rise)
    pub rise: f32,
}

impl Default for SmokeTuning {
    fn default() -> Self {
        Self {
            spawn_speed_kmh: 20.0,
            fade_rate: 1.0,
            expansion_rate: 3.0,
            ground_height: 0.2,
            parking_depth: -1000.0,
            min_scale: 0.5,
            max_scale: 1.0,
            lateral_spread: 2.0,
            rise: 1.5,
        }
    }
}

/// All balance knobs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub vehicle: VehicleTuning,
    pub mission: MissionTuning,
    pub economy: EconomyTuning,
    pub weather: WeatherTuning,
    pub smoke: SmokeTuning,
}

impl Tuning {
    /// Load tuning overrides from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read tuning file {}", path.display()))?;
        let tuning = Self::from_json(&json)
            .with_context(|| format!("Failed to parse tuning file {}", path.display()))?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Parse tuning from a JSON string; absent keys keep their defaults
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let tuning: Self = serde_json::from_str(json)?;
        anyhow::ensure!(
            tuning.weather.interval > 0.0,
            "weather interval must be positive"
        );
        anyhow::ensure!(
            tuning.weather.weights.iter().all(|w| *w >= 0.0)
                && tuning.weather.weights.iter().sum::<f32>() > 0.0,
            "weather weights must be non-negative with a positive sum"
        );
        anyhow::ensure!(
            tuning.economy.passive_income_interval > 0.0,
            "passive income interval must be positive"
        );
        anyhow::ensure!(
            tuning.smoke.min_scale <= tuning.smoke.max_scale,
            "smoke scale range is inverted"
        );
        Ok(tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "mission": { "checkpoint_radius": 12.5 } }"#).unwrap();
        assert_eq!(tuning.mission.checkpoint_radius, 12.5);
        assert_eq!(tuning.weather.interval, 30.0);
        assert_eq!(tuning.economy.passive_income, 10);
    }

    #[test]
    fn test_rejects_zero_weather_weights() {
        let err = Tuning::from_json(r#"{ "weather": { "weights": [0.0, 0.0, 0.0] } }"#);
        assert!(err.is_err());
    }
}
