//! Streetbound entry point
//!
//! Headless native driver: loads settings and the saved profile, then runs a
//! scripted drive through the simulation against the arcade reference body,
//! logging game events and saving progress as it changes.
//!
//! Usage: `streetbound [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    demo::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives `Simulation` directly
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::path::PathBuf;

    use streetbound::persistence::SaveStore;
    use streetbound::sim::{
        ArcadeBody, CarConfigPatch, Catalog, ControlIntent, GameEvent, GameMode, GameState,
        PhysicsWorld, Simulation, catalog::PAINT_COLORS,
    };
    use streetbound::{Settings, Tuning};

    /// Rendered frame length the demo pretends to run at
    const FRAME_DT: f32 = 1.0 / 60.0;

    pub fn run() -> anyhow::Result<()> {
        let settings_path = std::env::args()
            .nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("streetbound.json"));
        let settings = Settings::load_or_default(&settings_path)?;
        let tuning = match &settings.tuning_path {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };

        let store = SaveStore::new(&settings.save_path);
        let state = GameState::from_save(Catalog::standard(), store.load());
        log::info!(
            "Streetbound starting: seed {}, ${} in the bank, driving {}",
            settings.seed,
            state.money(),
            state.selected_car()
        );

        let mut sim = Simulation::new(&settings, tuning, state);
        let mut body = ArcadeBody::new(sim.spawn_pose());

        sim.set_game_mode(GameMode::Playing);
        if let Err(e) = sim.start_mission("m1") {
            log::warn!("Could not start mission: {e}");
        }

        let frames = (settings.demo_seconds.max(0.0) / FRAME_DT) as u32;
        for frame in 0..frames {
            sim.advance_frame(FRAME_DT, &scripted_intent(frame), &mut body);

            for event in sim.drain_events() {
                report(&event);
            }
            if let Some(save) = sim.take_save() {
                if let Err(e) = store.save(&save) {
                    log::warn!("Save failed: {e:#}");
                }
            }
        }

        // Garage visit: try an upgrade and repaint whatever is selected
        sim.set_game_mode(GameMode::Garage);
        match sim.state_mut().buy_car("sedan") {
            Ok(()) => log::info!("Bought the sedan"),
            Err(e) => log::info!("Sedan not bought: {e}"),
        }
        let selected = sim.state().selected_car().to_string();
        let patch = CarConfigPatch {
            color: Some(PAINT_COLORS[6].into()),
            ..Default::default()
        };
        if let Ok(config) = sim.state_mut().update_car_config(&selected, patch) {
            log::info!("{selected} repainted {}", config.color);
        }
        for event in sim.drain_events() {
            report(&event);
        }
        if let Some(save) = sim.take_save() {
            store.save(&save)?;
        }

        let snapshot = sim.snapshot();
        log::info!(
            "Demo done after {} ticks: ${}, weather {:?}, {} smoke puffs, player at {:?}",
            sim.tick_count(),
            snapshot.money,
            snapshot.weather,
            snapshot.smoke.len(),
            body.player_pose().position
        );
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        Ok(())
    }

    /// Laps of throttle with a handbrake slide and a reset every 40 seconds
    fn scripted_intent(frame: u32) -> ControlIntent {
        const LAP_FRAMES: u32 = 2400;
        let lap = (frame % LAP_FRAMES) as f32 * FRAME_DT;
        ControlIntent {
            accelerate: lap < 25.0,
            brake: (30.0..33.0).contains(&lap),
            steer_left: (10.0..12.0).contains(&lap),
            steer_right: (18.0..19.0).contains(&lap),
            handbrake: (22.0..23.0).contains(&lap),
            reset: frame > 0 && frame % LAP_FRAMES == 0,
        }
    }

    fn report(event: &GameEvent) {
        match event {
            GameEvent::PassiveIncome { .. } => log::debug!("{event:?}"),
            _ => log::info!("{event:?}"),
        }
    }
}
