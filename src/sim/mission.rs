//! Checkpoint mission engine
//!
//! INACTIVE -> ACTIVE -> {COMPLETED, FAILED} -> INACTIVE. The run itself lives
//! in [`GameState`]; this module is the only writer of it. Each tick the
//! timer is checked before the checkpoint, so expiring on the same tick the
//! last checkpoint is reached is a failure.

use glam::Vec3;

use super::state::{ActionError, GameEvent, GameState, MissionOutcome};
use crate::tuning::MissionTuning;

/// Start `mission_id` with its catalog time limit
pub fn start(state: &mut GameState, mission_id: &str) -> Result<(), ActionError> {
    let time_limit = state
        .catalog()
        .mission(mission_id)
        .map(|m| m.time_limit)
        .ok_or(ActionError::UnknownMission)?;
    start_with_limit(state, mission_id, time_limit)
}

/// Start `mission_id` with an explicit time limit (seconds, clamped to >= 0).
/// Replaces any run already in progress and forces the mode to `Playing`.
pub fn start_with_limit(
    state: &mut GameState,
    mission_id: &str,
    time_limit: f32,
) -> Result<(), ActionError> {
    let Some(mission) = state.catalog().mission(mission_id) else {
        log::warn!("Rejected start of unknown mission {mission_id:?}");
        return Err(ActionError::UnknownMission);
    };
    let title = mission.title.clone();
    let time_limit = if time_limit.is_finite() {
        time_limit.max(0.0)
    } else {
        0.0
    };

    state.begin_mission(mission_id, time_limit);
    log::info!("Mission {mission_id} ({title}) started, {time_limit:.0}s on the clock");
    Ok(())
}

/// Advance the active run by `dt` against the player's post-physics position.
/// Returns the outcome on the tick the run ends.
pub fn advance(
    state: &mut GameState,
    dt: f32,
    player_position: Vec3,
    tuning: &MissionTuning,
) -> Option<MissionOutcome> {
    let dt = crate::sanitize_dt(dt);
    let run = state.mission_run()?;
    let mission_id = run.mission_id.clone();
    let index = run.checkpoint_index;

    let Some(mission) = state.catalog().mission(&mission_id) else {
        // Catalog no longer knows this mission; drop the run without reward
        log::warn!("Active mission {mission_id} missing from catalog");
        return Some(fail(state, mission_id));
    };
    let reward = mission.reward;
    let last = mission.last_checkpoint();
    let target = mission.checkpoints.get(index).copied();

    // Time first
    let expired = {
        let run = state.mission_run_mut()?;
        run.spend(dt);
        run.expired()
    };
    if expired {
        return Some(fail(state, mission_id));
    }

    let target = target?;
    if player_position.distance(target) >= tuning.checkpoint_radius {
        return None;
    }

    if index >= last {
        if let Some(run) = state.mission_run_mut() {
            run.completed = true;
        }
        log::info!("Mission {mission_id} completed, reward {reward}");
        let outcome = MissionOutcome::Completed { mission_id, reward };
        state.end_mission(outcome.clone());
        Some(outcome)
    } else {
        if let Some(run) = state.mission_run_mut() {
            run.checkpoint_index = index + 1;
        }
        log::debug!("Mission {mission_id}: checkpoint {} of {}", index + 1, last + 1);
        state.push_event(GameEvent::CheckpointReached {
            mission_id,
            index: index + 1,
        });
        None
    }
}

fn fail(state: &mut GameState, mission_id: String) -> MissionOutcome {
    log::info!("Mission {mission_id} failed");
    let outcome = MissionOutcome::Failed { mission_id };
    state.end_mission(outcome.clone());
    outcome
}
