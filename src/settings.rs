//! Session settings
//!
//! How a run is set up: world seed, city layout, timestep and where progress
//! is saved. Balance numbers live in [`crate::tuning`] instead.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// World generation seed (traffic layout, building heights)
    pub seed: u64,

    // === City layout ===
    /// Blocks per side
    pub city_size: u32,
    /// Edge length of one block (world units)
    pub block_size: f32,
    /// Road width between blocks
    pub road_width: f32,
    /// Number of ambient traffic cars
    pub traffic_agents: usize,

    // === Loop ===
    /// Fixed simulation timestep (seconds)
    pub sim_dt: f32,
    /// Maximum fixed steps per rendered frame
    pub max_substeps: u32,

    // === Files ===
    /// Save file location
    pub save_path: PathBuf,
    /// Optional tuning override file
    pub tuning_path: Option<PathBuf>,

    /// Length of the headless demo drive (seconds)
    pub demo_seconds: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5EED_CAFE,

            city_size: CITY_SIZE,
            block_size: BLOCK_SIZE,
            road_width: ROAD_WIDTH,
            traffic_agents: TRAFFIC_AGENT_COUNT,

            sim_dt: SIM_DT,
            max_substeps: MAX_SUBSTEPS,

            save_path: PathBuf::from("streetbound-save.json"),
            tuning_path: None,

            demo_seconds: 90.0,
        }
    }
}

impl Settings {
    /// Fixed timestep, falling back to the default when misconfigured
    pub fn effective_sim_dt(&self) -> f32 {
        if self.sim_dt.is_finite() && self.sim_dt > 0.0 {
            self.sim_dt.min(MAX_FRAME_DT)
        } else {
            SIM_DT
        }
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, using defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
