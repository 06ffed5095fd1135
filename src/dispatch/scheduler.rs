use std::sync::Arc;

use bon::Builder;
use chrono::{DateTime, Local};

use crate::{
    core::{
        control_mode::ControlMode,
        period::{PERIOD, period_start},
        risk_level::RiskLevel,
        schedule::Schedule,
    },
    forecast::ForecastSource,
    prelude::*,
    quantity::power::Watts,
};

/// Owns the current schedule and rebuilds it at the period boundaries.
///
/// A rebuild replaces the whole [`Arc`], so that the readers see either the old or the new schedule.
#[derive(Builder)]
pub struct Scheduler<S> {
    source: S,
    control_mode: ControlMode,

    #[builder(default)]
    risk_level: RiskLevel,

    max_charge_power_from_grid: Watts,

    #[builder(skip)]
    schedule: Option<Arc<Schedule>>,

    #[builder(skip)]
    next_rebuild_at: Option<DateTime<Local>>,
}

impl<S: ForecastSource> Scheduler<S> {
    /// Rebuild the schedule if it is due, and return the current one.
    pub fn tick(&mut self, now: DateTime<Local>) -> Option<Arc<Schedule>> {
        if self.is_rebuild_due(now) {
            self.rebuild(now);
        }
        self.schedule.clone()
    }

    #[must_use]
    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_deref()
    }

    fn is_rebuild_due(&self, now: DateTime<Local>) -> bool {
        match (&self.schedule, self.next_rebuild_at) {
            (Some(schedule), Some(next_rebuild_at)) => schedule.is_empty() || now >= next_rebuild_at,
            _ => true,
        }
    }

    #[instrument(skip_all, fields(now = %now))]
    fn rebuild(&mut self, now: DateTime<Local>) {
        match self.try_create() {
            Ok(Some(schedule)) => {
                info!(n_periods = schedule.periods().len(), "rebuilt");
                self.schedule = Some(Arc::new(schedule));
                self.next_rebuild_at = period_start(now)
                    .map(|start| start + PERIOD)
                    .inspect_err(|error| warn!("rebuilding on every tick: {error:#}"))
                    .ok();
            }
            Ok(None) => {}
            Err(error) => {
                warn!("keeping the previous schedule: {error:#}");
            }
        }
    }

    fn try_create(&self) -> Result<Option<Schedule>> {
        let battery_state = self.source.battery_state().context("failed to get the battery state")?;
        if !battery_state.is_initialized() {
            warn!("the battery power limits are not known yet");
            return Ok(None);
        }
        let forecast = self.source.forecast().context("failed to get the forecast")?;
        let schedule = Schedule::builder()
            .control_mode(self.control_mode)
            .risk_level(self.risk_level)
            .ess_usable_energy(battery_state.usable_energy())
            .ess_initial_energy(battery_state.available_energy())
            .ess_max_charge_power(battery_state.max_charge_power)
            .ess_max_discharge_power(battery_state.max_discharge_power)
            .max_charge_power_from_grid(self.max_charge_power_from_grid)
            .prices(&forecast.prices)
            .consumption(&forecast.consumption)
            .production(&forecast.production)
            .create();
        Ok(Some(schedule))
    }
}
