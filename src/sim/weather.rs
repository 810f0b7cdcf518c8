//! Weather cycle
//!
//! Every `interval` simulated seconds a new weather is drawn from fixed
//! weights and written over the current one. The draw ignores the current
//! weather entirely: it is a stateless resample, not a transition table, so
//! the same weather can be drawn several intervals in a row. A change event is
//! raised only when the drawn weather differs from the old one, but the
//! resample itself happens every interval regardless.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::state::{GameEvent, GameState, Weather};
use crate::tuning::WeatherTuning;

/// RNG stream for weather draws, kept apart from world generation and smoke
const WEATHER_STREAM: u64 = 0x57EA_7E12;

/// Most resamples a single advance will perform
const MAX_DRAWS_PER_ADVANCE: u32 = 16;

/// Timer-driven weather resampler
#[derive(Debug, Clone)]
pub struct WeatherCycle {
    timer: f32,
    rng: Pcg32,
}

impl WeatherCycle {
    pub fn new(seed: u64) -> Self {
        Self {
            timer: 0.0,
            rng: Pcg32::seed_from_u64(seed ^ WEATHER_STREAM),
        }
    }

    /// Seconds accumulated toward the next resample
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Advance the timer; resample once per elapsed interval.
    /// Returns the weather drawn last this call, if any draw happened.
    pub fn advance(
        &mut self,
        state: &mut GameState,
        dt: f32,
        tuning: &WeatherTuning,
    ) -> Option<Weather> {
        let interval = tuning.interval.max(f32::EPSILON);
        self.timer += crate::sanitize_dt(dt);
        if self.timer < interval {
            return None;
        }

        // Intervals skipped by one huge step collapse to a bounded number of draws
        let due = (self.timer / interval).floor() as u32;
        self.timer = self.timer.rem_euclid(interval);

        let mut drawn = None;
        for _ in 0..due.min(MAX_DRAWS_PER_ADVANCE) {
            let next = self.sample(&tuning.weights);
            let old = state.set_weather(next);
            if old != next {
                log::info!("Weather {old:?} -> {next:?}");
                state.push_event(GameEvent::WeatherChanged { old, new: next });
            }
            drawn = Some(next);
        }
        drawn
    }

    /// Weighted draw over sunny, rain, fog
    pub fn sample(&mut self, weights: &[f32; 3]) -> Weather {
        let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
        if total <= 0.0 {
            return Weather::Sunny;
        }
        let roll = self.rng.random::<f32>() * total;
        let mut acc = 0.0;
        for (weather, weight) in [Weather::Sunny, Weather::Rain, Weather::Fog]
            .into_iter()
            .zip(weights)
        {
            acc += weight.max(0.0);
            if roll < acc {
                return weather;
            }
        }
        Weather::Fog
    }
}

/// Renderer-facing lighting and fog for a weather
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Atmosphere {
    pub fog_color: &'static str,
    pub fog_near: f32,
    pub fog_far: f32,
    pub ambient_intensity: f32,
    pub sun_intensity: f32,
    /// Falling rain particles visible
    pub rain: bool,
}

impl Atmosphere {
    pub fn for_weather(weather: Weather) -> Self {
        match weather {
            Weather::Sunny => Self {
                fog_color: "#87CEEB",
                fog_near: 50.0,
                fog_far: 200.0,
                ambient_intensity: 0.6,
                sun_intensity: 1.0,
                rain: false,
            },
            Weather::Rain => Self {
                fog_color: "#334155",
                fog_near: 20.0,
                fog_far: 80.0,
                ambient_intensity: 0.3,
                sun_intensity: 0.4,
                rain: true,
            },
            Weather::Fog => Self {
                fog_color: "#a0a0a0",
                fog_near: 10.0,
                fog_far: 50.0,
                ambient_intensity: 0.3,
                sun_intensity: 0.4,
                rain: false,
            },
        }
    }
}

/// How tire smoke is tinted
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmokeStyle {
    pub color: &'static str,
    pub opacity: f32,
}

impl SmokeStyle {
    /// Light translucent steam in the rain, darker smoke otherwise
    pub fn for_weather(weather: Weather) -> Self {
        match weather {
            Weather::Rain => Self {
                color: "#d1d5db",
                opacity: 0.3,
            },
            Weather::Sunny | Weather::Fog => Self {
                color: "#6b7280",
                opacity: 0.5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_draw_before_interval() {
        let tuning = WeatherTuning::default();
        let mut state = GameState::default();
        let mut cycle = WeatherCycle::new(1);
        assert_eq!(cycle.advance(&mut state, 29.9, &tuning), None);
        assert!((cycle.timer() - 29.9).abs() < 1e-4);
    }

    #[test]
    fn test_draws_once_per_interval() {
        let tuning = WeatherTuning::default();
        let mut state = GameState::default();
        let mut cycle = WeatherCycle::new(2);
        let drawn = cycle.advance(&mut state, 30.0, &tuning);
        assert_eq!(drawn, Some(state.weather()));
        assert!(cycle.timer().abs() < 1e-4);
    }

    #[test]
    fn test_huge_step_returns() {
        let tuning = WeatherTuning::default();
        let mut state = GameState::default();
        let mut cycle = WeatherCycle::new(4);
        assert!(cycle.advance(&mut state, 1.0e9, &tuning).is_some());
        assert!(cycle.timer() >= 0.0 && cycle.timer() < tuning.interval);

        let changes = state.drain_events().len();
        assert!(changes <= MAX_DRAWS_PER_ADVANCE as usize);

        // Back to one draw per interval afterwards
        let timer = cycle.timer();
        assert_eq!(cycle.advance(&mut state, tuning.interval - timer - 0.5, &tuning), None);
    }

    #[test]
    fn test_distribution_matches_weights() {
        let tuning = WeatherTuning::default();
        let mut state = GameState::default();
        let mut cycle = WeatherCycle::new(42);
        let mut counts = [0u32; 3];
        let runs = 10_000;
        for _ in 0..runs {
            let w = cycle.advance(&mut state, tuning.interval, &tuning).unwrap();
            counts[w as usize] += 1;
        }
        for (count, expected) in counts.iter().zip(tuning.weights) {
            let freq = *count as f32 / runs as f32;
            // ~6 standard deviations at n = 10k
            assert!((freq - expected).abs() < 0.03, "freq {freq} vs {expected}");
        }
    }

    #[test]
    fn test_same_weather_can_repeat() {
        // A degenerate table always draws rain: the resample still happens,
        // only the first one is a change.
        let tuning = WeatherTuning {
            interval: 30.0,
            weights: [0.0, 1.0, 0.0],
        };
        let mut state = GameState::default();
        let mut cycle = WeatherCycle::new(3);
        for _ in 0..5 {
            assert_eq!(cycle.advance(&mut state, 30.0, &tuning), Some(Weather::Rain));
        }
        let changes = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::WeatherChanged { .. }))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_smoke_tint_follows_rain() {
        assert_eq!(SmokeStyle::for_weather(Weather::Rain).opacity, 0.3);
        assert_eq!(SmokeStyle::for_weather(Weather::Fog).color, "#6b7280");
        assert!(Atmosphere::for_weather(Weather::Rain).rain);
    }
}
