//! Game and economy state
//!
//! The single source of truth the other simulation parts read and mutate.
//! All writes go through the named operations below so the invariants hold:
//! - the starter car is always owned
//! - the selected car is always owned
//! - a mission run exists only while the mode is `Playing`
//!
//! Fields that persist across sessions (money, owned cars, selected car,
//! customizations) raise a save request on every change; see [`GameState::take_save`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, RIM_STYLES, SPOILER_TYPES, is_paint_color};
use crate::consts::STARTER_CAR;
use crate::persistence::SaveData;
use crate::tuning::EconomyTuning;

/// Highest wanted level
pub const MAX_WANTED_LEVEL: u8 = 3;

/// High-level screen/mode of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Menu,
    Playing,
    Garage,
    GameOver,
}

/// Current weather
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Sunny,
    Rain,
    Fog,
}

/// Per-car customization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarConfig {
    /// Paint color (hex)
    pub color: String,
    /// Index into [`RIM_STYLES`]
    pub rim: u8,
    /// Index into [`SPOILER_TYPES`]
    pub spoiler: u8,
}

/// Partial customization edit; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarConfigPatch {
    pub color: Option<String>,
    pub rim: Option<u8>,
    pub spoiler: Option<u8>,
}

/// Why a boundary action was refused. State is unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    UnknownCar,
    AlreadyOwned,
    InsufficientFunds,
    CarNotOwned,
    UnknownMission,
    UnknownPaint,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ActionError::UnknownCar => "unknown car",
            ActionError::AlreadyOwned => "car already owned",
            ActionError::InsufficientFunds => "not enough money",
            ActionError::CarNotOwned => "car not owned",
            ActionError::UnknownMission => "unknown mission",
            ActionError::UnknownPaint => "color not on the paint palette",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ActionError {}

/// The one active mission run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRun {
    pub mission_id: String,
    /// Index of the checkpoint being driven to (only ever increases)
    pub checkpoint_index: usize,
    /// Time limit the run was started with (seconds)
    pub time_limit: f32,
    /// Seconds driven so far, summed in f64 so many small steps add up exactly
    pub elapsed: f64,
    /// Seconds left
    pub time_remaining: f32,
    pub completed: bool,
}

impl MissionRun {
    /// Add one step of driving time and refresh the remaining time
    pub(crate) fn spend(&mut self, dt: f32) {
        self.elapsed += f64::from(dt);
        self.time_remaining = (f64::from(self.time_limit) - self.elapsed).max(0.0) as f32;
    }

    /// The limit is used up
    pub fn expired(&self) -> bool {
        self.elapsed >= f64::from(self.time_limit)
    }
}

/// How the last mission run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MissionOutcome {
    Completed { mission_id: String, reward: i64 },
    Failed { mission_id: String },
}

/// Things that happened during a tick, for HUD/audio/analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MissionStarted { mission_id: String },
    CheckpointReached { mission_id: String, index: usize },
    MissionCompleted { mission_id: String, reward: i64 },
    MissionFailed { mission_id: String },
    WeatherChanged { old: Weather, new: Weather },
    CarPurchased { car_id: String, price: i64 },
    PassiveIncome { amount: i64 },
    WantedLevelChanged { level: u8 },
}

/// Authoritative cross-cutting game state
#[derive(Debug, Clone)]
pub struct GameState {
    catalog: Catalog,

    // Persisted
    money: i64,
    owned_cars: Vec<String>,
    selected_car: String,
    car_configs: BTreeMap<String, CarConfig>,

    // Runtime
    mode: GameMode,
    weather: Weather,
    speed_kmh: f32,
    speeding: bool,
    police_pursuit: bool,
    wanted_level: u8,
    wanted_timer: f32,
    passive_timer: f32,
    mission: Option<MissionRun>,
    last_outcome: Option<MissionOutcome>,

    events: Vec<GameEvent>,
    save_pending: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

impl GameState {
    /// Fresh profile: no money, only the starter car
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            money: 0,
            owned_cars: vec![STARTER_CAR.to_string()],
            selected_car: STARTER_CAR.to_string(),
            car_configs: BTreeMap::new(),
            mode: GameMode::Menu,
            weather: Weather::Sunny,
            speed_kmh: 0.0,
            speeding: false,
            police_pursuit: false,
            wanted_level: 0,
            wanted_timer: 0.0,
            passive_timer: 0.0,
            mission: None,
            last_outcome: None,
            events: Vec::new(),
            save_pending: false,
        }
    }

    /// Restore a profile from persisted data, dropping anything inconsistent
    pub fn from_save(catalog: Catalog, save: SaveData) -> Self {
        let mut state = Self::new(catalog);
        state.money = save.money;

        for id in save.owned_cars {
            if state.catalog.car(&id).is_some() && !state.owned_cars.contains(&id) {
                state.owned_cars.push(id);
            }
        }
        if state.owns(&save.selected_car) {
            state.selected_car = save.selected_car;
        } else {
            log::warn!(
                "Saved selection '{}' is not owned, falling back to {}",
                save.selected_car,
                STARTER_CAR
            );
        }
        for (id, mut config) in save.car_configs {
            if state.catalog.car(&id).is_some() {
                clamp_styles(&mut config);
                state.car_configs.insert(id, config);
            }
        }
        state
    }

    /// The persisted subset of the state
    pub fn save_data(&self) -> SaveData {
        SaveData {
            money: self.money,
            owned_cars: self.owned_cars.clone(),
            selected_car: self.selected_car.clone(),
            car_configs: self.car_configs.clone(),
        }
    }

    /// Persisted subset if it changed since the last call
    pub fn take_save(&mut self) -> Option<SaveData> {
        if std::mem::take(&mut self.save_pending) {
            Some(self.save_data())
        } else {
            None
        }
    }

    /// Events raised since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    // === Reads ===

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn money(&self) -> i64 {
        self.money
    }

    pub fn owned_cars(&self) -> &[String] {
        &self.owned_cars
    }

    pub fn owns(&self, car_id: &str) -> bool {
        self.owned_cars.iter().any(|c| c == car_id)
    }

    pub fn selected_car(&self) -> &str {
        &self.selected_car
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn speed_kmh(&self) -> f32 {
        self.speed_kmh
    }

    pub fn is_speeding(&self) -> bool {
        self.speeding
    }

    pub fn police_pursuit(&self) -> bool {
        self.police_pursuit
    }

    pub fn wanted_level(&self) -> u8 {
        self.wanted_level
    }

    pub fn mission_run(&self) -> Option<&MissionRun> {
        self.mission.as_ref()
    }

    pub fn active_mission_id(&self) -> Option<&str> {
        self.mission.as_ref().map(|m| m.mission_id.as_str())
    }

    pub fn last_outcome(&self) -> Option<&MissionOutcome> {
        self.last_outcome.as_ref()
    }

    /// Customization for a car, derived from its spec if never edited
    pub fn car_config(&self, car_id: &str) -> Option<CarConfig> {
        if let Some(config) = self.car_configs.get(car_id) {
            return Some(config.clone());
        }
        self.catalog.car(car_id).map(|spec| CarConfig {
            color: spec.color.clone(),
            rim: 0,
            spoiler: 0,
        })
    }

    // === Economy actions ===

    /// Add (or with a negative amount, remove) money
    pub fn add_money(&mut self, amount: i64) {
        self.money = self.money.saturating_add(amount);
        self.save_pending = true;
    }

    /// Buy a car: must exist, not be owned, and be affordable. Selects it on success.
    pub fn buy_car(&mut self, car_id: &str) -> Result<(), ActionError> {
        let price = self
            .catalog
            .car(car_id)
            .map(|c| c.price)
            .ok_or(ActionError::UnknownCar)?;
        if self.owns(car_id) {
            return Err(ActionError::AlreadyOwned);
        }
        if self.money < price {
            log::debug!("Cannot afford {car_id}: {} < {price}", self.money);
            return Err(ActionError::InsufficientFunds);
        }

        self.money -= price;
        self.owned_cars.push(car_id.to_string());
        self.selected_car = car_id.to_string();
        self.save_pending = true;
        log::info!("Bought {car_id} for {price}, balance {}", self.money);
        self.push_event(GameEvent::CarPurchased {
            car_id: car_id.to_string(),
            price,
        });
        Ok(())
    }

    /// Select an owned car; unowned cars are rejected
    pub fn select_car(&mut self, car_id: &str) -> Result<(), ActionError> {
        if !self.owns(car_id) {
            return Err(ActionError::CarNotOwned);
        }
        if self.selected_car != car_id {
            self.selected_car = car_id.to_string();
            self.save_pending = true;
        }
        Ok(())
    }

    /// Merge a partial edit onto the car's current (or default) customization
    pub fn update_car_config(
        &mut self,
        car_id: &str,
        patch: CarConfigPatch,
    ) -> Result<&CarConfig, ActionError> {
        let mut config = self.car_config(car_id).ok_or(ActionError::UnknownCar)?;
        if patch.color.as_deref().is_some_and(|c| !is_paint_color(c)) {
            log::warn!("Rejected paint {:?} for {car_id}", patch.color);
            return Err(ActionError::UnknownPaint);
        }
        if let Some(color) = patch.color {
            config.color = color;
        }
        if let Some(rim) = patch.rim {
            config.rim = rim;
        }
        if let Some(spoiler) = patch.spoiler {
            config.spoiler = spoiler;
        }
        clamp_styles(&mut config);

        self.save_pending = true;
        self.car_configs.insert(car_id.to_string(), config);
        Ok(&self.car_configs[car_id])
    }

    // === Direct setters ===

    /// Change mode. Leaving `Playing` abandons any active mission and stops accruals.
    pub fn set_game_mode(&mut self, mode: GameMode) {
        if self.mode == mode {
            return;
        }
        if mode != GameMode::Playing {
            if let Some(run) = self.mission.take() {
                log::info!("Mission {} abandoned (mode -> {mode:?})", run.mission_id);
            }
            self.passive_timer = 0.0;
            self.speeding = false;
            self.police_pursuit = false;
        }
        log::debug!("Game mode {:?} -> {mode:?}", self.mode);
        self.mode = mode;
    }

    /// Overwrite the weather, returning the previous value
    pub fn set_weather(&mut self, weather: Weather) -> Weather {
        std::mem::replace(&mut self.weather, weather)
    }

    /// Set the wanted level (clamped to `MAX_WANTED_LEVEL`)
    pub fn set_wanted_level(&mut self, level: u8) {
        let level = level.min(MAX_WANTED_LEVEL);
        if level != self.wanted_level {
            self.wanted_level = level;
            self.push_event(GameEvent::WantedLevelChanged { level });
        }
    }

    /// Record the player's speed for this tick and run the speed-driven accruals:
    /// passive income while speeding outside missions, and the wanted cooldown.
    pub fn publish_speed(&mut self, speed_kmh: f32, dt: f32, tuning: &EconomyTuning) {
        let dt = crate::sanitize_dt(dt);
        self.speed_kmh = if speed_kmh.is_finite() { speed_kmh } else { 0.0 };
        let playing = self.mode == GameMode::Playing;
        let magnitude = self.speed_kmh.abs();
        self.speeding = playing && magnitude > tuning.speed_limit_kmh;
        self.police_pursuit = playing && magnitude > tuning.police_threshold_kmh;

        // Passive income
        if self.speeding && self.mission.is_none() {
            self.passive_timer += dt;
            let interval = tuning.passive_income_interval.max(f32::EPSILON);
            if self.passive_timer >= interval {
                // Every full interval pays once, settled as a single credit
                let due = (self.passive_timer / interval).floor() as i64;
                self.passive_timer = self.passive_timer.rem_euclid(interval);
                let amount = tuning.passive_income.saturating_mul(due);
                self.add_money(amount);
                self.push_event(GameEvent::PassiveIncome { amount });
            }
        } else {
            self.passive_timer = 0.0;
        }

        // Wanted level
        if self.police_pursuit {
            self.wanted_timer = tuning.wanted_cooldown;
            if self.wanted_level == 0 {
                self.set_wanted_level(1);
            }
        } else if self.wanted_level > 0 {
            self.wanted_timer -= dt;
            if self.wanted_timer <= 0.0 {
                self.wanted_timer = 0.0;
                self.set_wanted_level(0);
            }
        }
    }

    // === Mission run (mission engine only) ===

    pub(crate) fn begin_mission(&mut self, mission_id: &str, time_limit: f32) {
        if let Some(prev) = &self.mission {
            log::info!("Mission {} replaced by {mission_id}", prev.mission_id);
        }
        self.mission = Some(MissionRun {
            mission_id: mission_id.to_string(),
            checkpoint_index: 0,
            time_limit,
            elapsed: 0.0,
            time_remaining: time_limit,
            completed: false,
        });
        self.last_outcome = None;
        self.set_game_mode(GameMode::Playing);
        self.push_event(GameEvent::MissionStarted {
            mission_id: mission_id.to_string(),
        });
    }

    pub(crate) fn mission_run_mut(&mut self) -> Option<&mut MissionRun> {
        self.mission.as_mut()
    }

    /// Clear the run and settle it (reward goes to the balance on completion)
    pub(crate) fn end_mission(&mut self, outcome: MissionOutcome) {
        self.mission = None;
        match &outcome {
            MissionOutcome::Completed { mission_id, reward } => {
                self.add_money(*reward);
                self.push_event(GameEvent::MissionCompleted {
                    mission_id: mission_id.clone(),
                    reward: *reward,
                });
            }
            MissionOutcome::Failed { mission_id } => {
                self.push_event(GameEvent::MissionFailed {
                    mission_id: mission_id.clone(),
                });
            }
        }
        self.last_outcome = Some(outcome);
    }
}

fn clamp_styles(config: &mut CarConfig) {
    config.rim = config.rim.min(RIM_STYLES.len() as u8 - 1);
    config.spoiler = config.spoiler.min(SPOILER_TYPES.len() as u8 - 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> GameState {
        let mut state = GameState::default();
        state.set_game_mode(GameMode::Playing);
        state
    }

    #[test]
    fn test_fresh_profile() {
        let state = GameState::default();
        assert_eq!(state.money(), 0);
        assert_eq!(state.owned_cars(), ["starter".to_string()]);
        assert_eq!(state.selected_car(), "starter");
        assert_eq!(state.mode(), GameMode::Menu);
        assert!(state.active_mission_id().is_none());
    }

    #[test]
    fn test_buy_car_exact_funds() {
        let mut state = GameState::default();
        state.add_money(8000);
        state.take_save();

        assert_eq!(state.buy_car("sport"), Ok(()));
        assert_eq!(state.money(), 0);
        assert!(state.owns("sport"));
        assert_eq!(state.selected_car(), "sport");
        assert!(state.take_save().is_some());
    }

    #[test]
    fn test_buy_car_one_short_is_noop() {
        let mut state = GameState::default();
        state.add_money(7999);
        state.take_save();

        assert_eq!(state.buy_car("sport"), Err(ActionError::InsufficientFunds));
        assert_eq!(state.money(), 7999);
        assert!(!state.owns("sport"));
        assert_eq!(state.selected_car(), "starter");
        assert!(state.take_save().is_none());
    }

    #[test]
    fn test_buy_owned_or_unknown() {
        let mut state = GameState::default();
        state.add_money(100_000);
        assert_eq!(state.buy_car("starter"), Err(ActionError::AlreadyOwned));
        assert_eq!(state.buy_car("tank"), Err(ActionError::UnknownCar));
        assert_eq!(state.money(), 100_000);
    }

    #[test]
    fn test_select_unowned_rejected() {
        let mut state = GameState::default();
        assert_eq!(state.select_car("super"), Err(ActionError::CarNotOwned));
        assert_eq!(state.selected_car(), "starter");
        assert_eq!(state.select_car("starter"), Ok(()));
    }

    #[test]
    fn test_update_config_merges() {
        let mut state = GameState::default();
        let config = state
            .update_car_config(
                "sedan",
                CarConfigPatch {
                    rim: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(config.color, "#ef4444");
        assert_eq!(config.rim, 2);

        state
            .update_car_config(
                "sedan",
                CarConfigPatch {
                    color: Some("#000000".into()),
                    spoiler: Some(200),
                    ..Default::default()
                },
            )
            .unwrap();
        let config = state.car_config("sedan").unwrap();
        assert_eq!(config.color, "#000000");
        assert_eq!(config.rim, 2);
        assert_eq!(config.spoiler, (SPOILER_TYPES.len() - 1) as u8);

        assert_eq!(
            state.update_car_config("tank", CarConfigPatch::default()),
            Err(ActionError::UnknownCar)
        );
    }

    #[test]
    fn test_off_palette_paint_rejected() {
        let mut state = GameState::default();
        let before = state.car_config("starter");
        let patch = CarConfigPatch {
            color: Some("#123456".into()),
            rim: Some(3),
            ..Default::default()
        };
        assert_eq!(
            state.update_car_config("starter", patch),
            Err(ActionError::UnknownPaint)
        );
        assert_eq!(state.car_config("starter"), before);
        assert!(state.take_save().is_none());
    }

    #[test]
    fn test_leaving_playing_clears_mission() {
        let mut state = GameState::default();
        state.begin_mission("m1", 45.0);
        assert_eq!(state.mode(), GameMode::Playing);
        assert_eq!(state.active_mission_id(), Some("m1"));

        state.set_game_mode(GameMode::Garage);
        assert!(state.active_mission_id().is_none());
        assert!(state.last_outcome().is_none());
    }

    #[test]
    fn test_passive_income_while_speeding() {
        let tuning = EconomyTuning::default();
        let mut state = playing();
        for _ in 0..10 {
            state.publish_speed(65.0, 0.25, &tuning);
        }
        assert!(state.is_speeding());
        assert_eq!(state.money(), 20);
    }

    #[test]
    fn test_huge_step_pays_once_and_returns() {
        let tuning = EconomyTuning::default();
        let mut state = playing();
        state.publish_speed(100.0, 1.0e8, &tuning);
        assert_eq!(state.money(), 1_000_000_000);
        let payouts = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PassiveIncome { .. }))
            .count();
        assert_eq!(payouts, 1);

        // Remainder is below one interval again
        state.publish_speed(100.0, 0.5, &tuning);
        assert_eq!(state.money(), 1_000_000_000);
    }

    #[test]
    fn test_passive_income_suppressed_by_mission_and_menu() {
        let tuning = EconomyTuning::default();
        let mut state = playing();
        state.begin_mission("m2", 60.0);
        state.publish_speed(100.0, 5.0, &tuning);
        assert_eq!(state.money(), 0);

        state.set_game_mode(GameMode::Menu);
        state.publish_speed(100.0, 5.0, &tuning);
        assert!(!state.is_speeding());
        assert_eq!(state.money(), 0);
    }

    #[test]
    fn test_passive_timer_resets_when_slowing() {
        let tuning = EconomyTuning::default();
        let mut state = playing();
        state.publish_speed(70.0, 0.9, &tuning);
        state.publish_speed(30.0, 0.1, &tuning);
        state.publish_speed(70.0, 0.9, &tuning);
        assert_eq!(state.money(), 0);
    }

    #[test]
    fn test_wanted_level_cools_down() {
        let tuning = EconomyTuning::default();
        let mut state = playing();
        state.publish_speed(90.0, 0.1, &tuning);
        assert!(state.police_pursuit());
        assert_eq!(state.wanted_level(), 1);

        state.publish_speed(40.0, 9.0, &tuning);
        assert_eq!(state.wanted_level(), 1);
        state.publish_speed(40.0, 1.5, &tuning);
        assert_eq!(state.wanted_level(), 0);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::WantedLevelChanged { level: 1 }));
        assert!(events.contains(&GameEvent::WantedLevelChanged { level: 0 }));
    }

    #[test]
    fn test_from_save_sanitizes() {
        let mut configs = BTreeMap::new();
        configs.insert(
            "sport".to_string(),
            CarConfig {
                color: "#ffffff".into(),
                rim: 9,
                spoiler: 1,
            },
        );
        configs.insert(
            "ghost".to_string(),
            CarConfig {
                color: "#ffffff".into(),
                rim: 0,
                spoiler: 0,
            },
        );
        let save = SaveData {
            money: 1234,
            owned_cars: vec!["sport".into(), "ghost".into(), "sport".into()],
            selected_car: "super".into(),
            car_configs: configs,
        };
        let state = GameState::from_save(Catalog::standard(), save);
        assert_eq!(state.money(), 1234);
        assert_eq!(state.owned_cars(), ["starter".to_string(), "sport".to_string()]);
        assert_eq!(state.selected_car(), "starter");
        assert_eq!(state.car_config("sport").unwrap().rim, 3);
        assert!(state.car_config("ghost").is_none());
    }
}
