//! Fixed timestep simulation tick
//!
//! [`Simulation`] owns every core subsystem and runs them in one fixed order:
//! weather, vehicle control, physics, speed publish, smoke, traffic, mission.
//! The mission check always sees this tick's post-physics position.

use super::mission;
use super::particles::{SmokeEmitter, SmokePool};
use super::physics::{BodyPose, PhysicsWorld};
use super::snapshot::{MissionHud, RenderSnapshot, SmokeSprite, TrafficSprite};
use super::state::{ActionError, GameEvent, GameMode, GameState, MissionOutcome};
use super::traffic;
use super::vehicle::{ControlAction, ControlIntent, DriveCommand, VehicleController};
use super::weather::{Atmosphere, WeatherCycle};
use super::world::{self, World, WorldParams};
use crate::persistence::SaveData;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// The whole deterministic core for one session
#[derive(Debug, Clone)]
pub struct Simulation {
    state: GameState,
    tuning: Tuning,
    world: World,
    weather: WeatherCycle,
    vehicle: VehicleController,
    smoke: SmokePool,
    sim_dt: f32,
    max_substeps: u32,
    accumulator: f32,
    /// Reset requested on a frame that ran no substep
    pending_reset: bool,
    tick: u64,
}

impl Simulation {
    pub fn new(settings: &Settings, tuning: Tuning, state: GameState) -> Self {
        let world = world::generate(WorldParams::from_settings(settings));
        let spawn = BodyPose::new(tuning.vehicle.spawn_position, tuning.vehicle.spawn_heading);
        Self {
            weather: WeatherCycle::new(settings.seed),
            smoke: SmokePool::new(settings.seed, &tuning.smoke),
            vehicle: VehicleController::new(spawn),
            sim_dt: settings.effective_sim_dt(),
            max_substeps: settings.max_substeps.max(1),
            accumulator: 0.0,
            pending_reset: false,
            tick: 0,
            state,
            tuning,
            world,
        }
    }

    /// Default content and balance, fresh profile
    pub fn with_seed(seed: u64) -> Self {
        let settings = Settings {
            seed,
            ..Settings::default()
        };
        Self::new(&settings, Tuning::default(), GameState::default())
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn vehicle(&self) -> &VehicleController {
        &self.vehicle
    }

    pub fn smoke(&self) -> &SmokePool {
        &self.smoke
    }

    pub fn weather_cycle(&self) -> &WeatherCycle {
        &self.weather
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn sim_dt(&self) -> f32 {
        self.sim_dt
    }

    /// Where the player body starts and where reset puts it
    pub fn spawn_pose(&self) -> BodyPose {
        BodyPose::new(
            self.tuning.vehicle.spawn_position,
            self.tuning.vehicle.spawn_heading,
        )
    }

    // === Boundary actions ===

    pub fn start_mission(&mut self, mission_id: &str) -> Result<(), ActionError> {
        mission::start(&mut self.state, mission_id)
    }

    pub fn start_mission_with_limit(
        &mut self,
        mission_id: &str,
        time_limit: f32,
    ) -> Result<(), ActionError> {
        mission::start_with_limit(&mut self.state, mission_id, time_limit)
    }

    pub fn set_game_mode(&mut self, mode: GameMode) {
        self.state.set_game_mode(mode);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn take_save(&mut self) -> Option<SaveData> {
        self.state.take_save()
    }

    // === Loop ===

    /// Advance the simulation by one fixed step.
    /// Returns the mission outcome if the active run ended this tick.
    pub fn tick(
        &mut self,
        intent: &ControlIntent,
        physics: &mut impl PhysicsWorld,
        dt: f32,
    ) -> Option<MissionOutcome> {
        let dt = crate::sanitize_dt(dt);

        // Weather
        self.weather.advance(&mut self.state, dt, &self.tuning.weather);

        // Vehicle controller
        let catalog = self.state.catalog();
        let spec = catalog
            .car(self.state.selected_car())
            .or_else(|| catalog.car(crate::consts::STARTER_CAR));
        let action = match spec {
            Some(spec) => self.vehicle.control(
                intent,
                spec,
                self.state.weather(),
                dt,
                &self.tuning.vehicle,
            ),
            None => ControlAction::Drive(DriveCommand::default()),
        };
        match action {
            ControlAction::Drive(command) => physics.drive(&command),
            ControlAction::Teleport(pose) => physics.teleport(pose),
        }

        // Physics
        physics.step(dt);
        let pose = physics.player_pose();
        let speed = self.vehicle.observe(pose, physics.player_velocity());
        self.state.publish_speed(speed, dt, &self.tuning.economy);

        // Smoke
        let emitter = SmokeEmitter {
            braking: self.vehicle.runtime().braking,
            speed_kmh: speed,
            wheels: physics.rear_wheels(),
        };
        self.smoke.update(&emitter, dt, &self.tuning.smoke);

        // Traffic
        let half_extent = self.world.half_extent();
        traffic::advance_all(&mut self.world.agents, dt, half_extent);
        for agent in &self.world.agents {
            physics.set_kinematic_pose(agent.id, agent.pose());
        }

        // Mission
        let outcome = mission::advance(&mut self.state, dt, pose.position, &self.tuning.mission);

        self.tick += 1;
        outcome
    }

    /// Feed one rendered frame's elapsed time; runs as many fixed steps as fit.
    /// The reset intent is one-shot: it applies to the first step only.
    /// Returns the number of steps run.
    pub fn advance_frame(
        &mut self,
        frame_dt: f32,
        intent: &ControlIntent,
        physics: &mut impl PhysicsWorld,
    ) -> u32 {
        self.accumulator += crate::clamp_frame_dt(frame_dt);
        self.pending_reset |= intent.reset;

        let mut intent = *intent;
        let mut substeps = 0;
        while self.accumulator >= self.sim_dt && substeps < self.max_substeps {
            intent.reset = std::mem::take(&mut self.pending_reset);
            self.tick(&intent, physics, self.sim_dt);
            self.accumulator -= self.sim_dt;
            substeps += 1;
        }
        substeps
    }

    /// Read-only view of this frame for the renderer and HUD
    pub fn snapshot(&self) -> RenderSnapshot {
        let state = &self.state;
        let runtime = *self.vehicle.runtime();

        let mission = state.mission_run().and_then(|run| {
            let def = state.catalog().mission(&run.mission_id)?;
            Some(MissionHud {
                mission_id: run.mission_id.clone(),
                title: def.title.clone(),
                checkpoint: *def.checkpoints.get(run.checkpoint_index)?,
                checkpoint_index: run.checkpoint_index,
                checkpoint_count: def.checkpoints.len(),
                time_remaining: run.time_remaining.max(0.0),
            })
        });

        RenderSnapshot {
            tick: self.tick,
            car_id: state.selected_car().to_string(),
            vehicle: runtime,
            smoke: self
                .smoke
                .alive()
                .map(|p| SmokeSprite {
                    position: p.position,
                    scale: p.visible_scale(),
                })
                .collect(),
            traffic: self
                .world
                .agents
                .iter()
                .map(|a| TrafficSprite {
                    id: a.id,
                    pose: a.pose(),
                })
                .collect(),
            weather: state.weather(),
            atmosphere: Atmosphere::for_weather(state.weather()),
            mission,
            last_outcome: state.last_outcome().cloned(),
            money: state.money(),
            speed_display: runtime.speed_kmh.abs().round() as u32,
            speeding: state.is_speeding(),
            police_pursuit: state.police_pursuit(),
            wanted_level: state.wanted_level(),
        }
    }
}
