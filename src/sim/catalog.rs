//! Static game content: car models and missions
//!
//! Loaded once and never mutated at runtime.

use std::collections::HashSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Wheel rim styles offered in the garage
pub const RIM_STYLES: [&str; 4] = ["Standard", "Sport", "Blade", "Solid"];
/// Spoiler types offered in the garage
pub const SPOILER_TYPES: [&str; 3] = ["None", "Lip", "GT Wing"];
/// Paint palette offered in the garage
pub const PAINT_COLORS: [&str; 8] = [
    "#3b82f6", "#ef4444", "#eab308", "#10b981", "#000000", "#ffffff", "#8b5cf6", "#ec4899",
];
/// Whether `color` is on the garage paint palette (hex, any case)
pub fn is_paint_color(color: &str) -> bool {
    PAINT_COLORS.iter().any(|c| c.eq_ignore_ascii_case(color))
}

/// Building facade colors used by world generation
pub const BUILDING_COLORS: [&str; 5] = ["#64748b", "#71717a", "#78716c", "#475569", "#52525b"];

/// Immutable per-model constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub id: String,
    pub name: String,
    pub price: i64,
    /// Top speed (km/h)
    pub speed: f32,
    /// Drive force multiplier
    pub acceleration: f32,
    /// Steering rate multiplier
    pub handling: f32,
    /// Factory paint color
    pub color: String,
    pub width: f32,
    pub length: f32,
    pub height: f32,
}

/// Mission category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionKind {
    Race,
    Delivery,
}

/// A checkpoint mission definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: MissionKind,
    pub reward: i64,
    /// Seconds allowed
    pub time_limit: f32,
    /// Ordered checkpoint positions (never empty)
    pub checkpoints: Vec<Vec3>,
}

impl Mission {
    pub fn last_checkpoint(&self) -> usize {
        self.checkpoints.len().saturating_sub(1)
    }
}

/// All cars and missions known to the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub cars: Vec<VehicleSpec>,
    pub missions: Vec<Mission>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// The shipped content
    pub fn standard() -> Self {
        let car = |id: &str, name: &str, price, speed, acceleration, handling, color: &str, dims: [f32; 3]| {
            VehicleSpec {
                id: id.to_string(),
                name: name.to_string(),
                price,
                speed,
                acceleration,
                handling,
                color: color.to_string(),
                width: dims[0],
                length: dims[1],
                height: dims[2],
            }
        };
        let cars = vec![
            car("starter", "Compact Hatch", 0, 60.0, 15.0, 0.6, "#3b82f6", [1.8, 3.5, 1.4]),
            car("sedan", "Family Sedan", 2500, 80.0, 20.0, 0.5, "#ef4444", [2.0, 4.2, 1.45]),
            car("sport", "Street Racer", 8000, 120.0, 35.0, 0.8, "#eab308", [2.1, 4.0, 1.2]),
            car("super", "Velocita X", 25000, 180.0, 50.0, 0.9, "#10b981", [2.2, 4.4, 1.1]),
        ];

        let missions = vec![
            Mission {
                id: "m1".into(),
                title: "City Sprint".into(),
                description: "Race to the park downtown within the time limit.".into(),
                kind: MissionKind::Race,
                reward: 500,
                time_limit: 45.0,
                checkpoints: vec![
                    Vec3::new(0.0, 2.0, -100.0),
                    Vec3::new(100.0, 2.0, -200.0),
                    Vec3::new(0.0, 2.0, -300.0),
                ],
            },
            Mission {
                id: "m2".into(),
                title: "High Speed Delivery".into(),
                description: "Deliver the package to the outskirts. Do not stop.".into(),
                kind: MissionKind::Delivery,
                reward: 1200,
                time_limit: 60.0,
                checkpoints: vec![Vec3::new(-300.0, 2.0, 300.0)],
            },
            Mission {
                id: "m3".into(),
                title: "Downtown Loop".into(),
                description: "A technical checkpoint race through the city center.".into(),
                kind: MissionKind::Race,
                reward: 800,
                time_limit: 90.0,
                checkpoints: vec![
                    Vec3::new(100.0, 2.0, 100.0),
                    Vec3::new(100.0, 2.0, -100.0),
                    Vec3::new(-100.0, 2.0, -100.0),
                    Vec3::new(-100.0, 2.0, 100.0),
                    Vec3::new(0.0, 2.0, 0.0),
                ],
            },
        ];

        Self { cars, missions }
    }

    /// Parse and validate content from JSON
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.car(crate::consts::STARTER_CAR).is_some(),
            "catalog has no '{}' car",
            crate::consts::STARTER_CAR
        );

        let mut seen = HashSet::new();
        for car in &self.cars {
            anyhow::ensure!(seen.insert(car.id.as_str()), "duplicate car id '{}'", car.id);
            anyhow::ensure!(car.price >= 0, "car '{}' has a negative price", car.id);
        }

        let mut seen = HashSet::new();
        for mission in &self.missions {
            anyhow::ensure!(
                seen.insert(mission.id.as_str()),
                "duplicate mission id '{}'",
                mission.id
            );
            anyhow::ensure!(
                !mission.checkpoints.is_empty(),
                "mission '{}' has no checkpoints",
                mission.id
            );
        }
        Ok(())
    }

    pub fn car(&self, id: &str) -> Option<&VehicleSpec> {
        self.cars.iter().find(|c| c.id == id)
    }

    pub fn mission(&self, id: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.id == id)
    }
}
