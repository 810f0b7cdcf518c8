//! Save/load of player progress
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic writes (tmp → save) with the previous save rotated to a backup
//! - Corruption recovery: main save, then backup, then a fresh profile
//!
//! Only money, owned cars, the selected car and customizations persist.
//! Everything else (speed, missions, weather, traffic, smoke) resets on launch.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::consts::STARTER_CAR;
use crate::sim::CarConfig;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// The persisted subset of the game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub money: i64,
    pub owned_cars: Vec<String>,
    pub selected_car: String,
    #[serde(default)]
    pub car_configs: BTreeMap<String, CarConfig>,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            money: 0,
            owned_cars: vec![STARTER_CAR.to_string()],
            selected_car: STARTER_CAR.to_string(),
            car_configs: BTreeMap::new(),
        }
    }
}

/// On-disk wrapper
#[derive(Debug, Serialize, Deserialize)]
struct SaveEnvelope {
    version: u32,
    data: SaveData,
}

/// Where saves live
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("bak")
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Write a save: tmp file first, then rotate the old save to backup and rename
    pub fn save(&self, data: &SaveData) -> anyhow::Result<()> {
        let envelope = SaveEnvelope {
            version: SAVE_VERSION,
            data: data.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope).context("Failed to encode save")?;

        let tmp = self.tmp_path();
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write save to {}", tmp.display()))?;
        if self.path.exists() {
            fs::rename(&self.path, self.backup_path())
                .with_context(|| format!("Failed to rotate backup for {}", self.path.display()))?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move save into {}", self.path.display()))?;

        log::info!("Progress saved (money {}, {} cars)", data.money, data.owned_cars.len());
        Ok(())
    }

    /// Load the main save, falling back to the backup, then to a fresh profile
    pub fn load(&self) -> SaveData {
        match read_save(&self.path) {
            Ok(Some(data)) => return data,
            Ok(None) => {
                log::info!("No save at {}, starting fresh", self.path.display());
                return SaveData::default();
            }
            Err(err) => log::warn!("Save unreadable ({err:#}), trying backup"),
        }

        match read_save(&self.backup_path()) {
            Ok(Some(data)) => {
                log::info!("Recovered progress from backup");
                data
            }
            Ok(None) => SaveData::default(),
            Err(err) => {
                log::warn!("Backup unreadable ({err:#}), starting fresh");
                SaveData::default()
            }
        }
    }
}

/// Read and decode one save file; `Ok(None)` when the file does not exist
fn read_save(path: &Path) -> anyhow::Result<Option<SaveData>> {
    if !path.exists() {
        return Ok(None);
    }
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let envelope: SaveEnvelope =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))?;
    anyhow::ensure!(
        envelope.version <= SAVE_VERSION,
        "save version {} is newer than supported {}",
        envelope.version,
        SAVE_VERSION
    );
    Ok(Some(envelope.data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "streetbound-test-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample() -> SaveData {
        let mut data = SaveData::default();
        data.money = 4200;
        data.owned_cars.push("sedan".into());
        data.selected_car = "sedan".into();
        data.car_configs.insert(
            "sedan".into(),
            CarConfig {
                color: "#8b5cf6".into(),
                rim: 1,
                spoiler: 2,
            },
        );
        data
    }

    #[test]
    fn test_save_then_load() {
        let dir = scratch_dir("roundtrip");
        let store = SaveStore::new(dir.join("save.json"));
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
    }

    #[test]
    fn test_missing_save_is_fresh_profile() {
        let dir = scratch_dir("missing");
        let store = SaveStore::new(dir.join("save.json"));
        assert_eq!(store.load(), SaveData::default());
    }

    #[test]
    fn test_corrupt_save_falls_back_to_backup() {
        let dir = scratch_dir("corrupt");
        let store = SaveStore::new(dir.join("save.json"));
        store.save(&sample()).unwrap();

        let mut newer = sample();
        newer.money = 9999;
        store.save(&newer).unwrap();

        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load().money, 4200);
    }

    #[test]
    fn test_future_version_rejected() {
        let dir = scratch_dir("future");
        let path = dir.join("save.json");
        let json = serde_json::json!({ "version": SAVE_VERSION + 1, "data": SaveData::default() });
        fs::write(&path, json.to_string()).unwrap();
        assert!(read_save(&path).is_err());
    }
}
