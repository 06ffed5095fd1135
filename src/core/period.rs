use chrono::{DateTime, DurationRound, Local, TimeDelta};

use crate::{
    core::{control_mode::ControlMode, state_machine::StateMachine},
    prelude::*,
    quantity::{energy::WattHours, power::Watts, rate::KilowattHourRate},
};

pub const PERIODS_PER_HOUR: i64 = 4;

pub const MINUTES_PER_PERIOD: i64 = 60 / PERIODS_PER_HOUR;

pub const PERIOD: TimeDelta = TimeDelta::minutes(MINUTES_PER_PERIOD);

/// Convert the power into the energy transferred within a single period.
#[must_use]
pub const fn to_energy(power: Watts) -> WattHours {
    WattHours(power.0 / PERIODS_PER_HOUR)
}

/// Convert the energy transferred within a single period into the power.
#[must_use]
pub const fn to_power(energy: WattHours) -> Watts {
    Watts(energy.0 * PERIODS_PER_HOUR)
}

/// Start of the period that contains the time.
pub fn period_start(time: DateTime<Local>) -> Result<DateTime<Local>> {
    time.duration_trunc(PERIOD).with_context(|| format!("failed to truncate `{time}`"))
}

/// Single fixed-length slot of a [`Schedule`][crate::core::schedule::Schedule].
#[derive(Copy, Clone, Debug)]
pub struct Period {
    /// Position in the schedule, the current period is `0`.
    pub index: usize,

    pub price: KilowattHourRate,
    pub production: WattHours,
    pub consumption: WattHours,

    /// Consumption minus production: negative means surplus.
    pub required_energy: WattHours,

    /// Battery energy at the period start.
    pub ess_initial_energy: WattHours,

    /// Negative is charging, positive is discharging.
    pub charge_discharge_energy: WattHours,

    pub max_discharge_energy_per_period: WattHours,
}

impl Period {
    pub fn new(
        index: usize,
        price: KilowattHourRate,
        production: WattHours,
        consumption: WattHours,
        max_discharge_energy_per_period: WattHours,
    ) -> Self {
        Self {
            index,
            price,
            production,
            consumption,
            required_energy: consumption - production,
            ess_initial_energy: WattHours::ZERO,
            charge_discharge_energy: WattHours::ZERO,
            max_discharge_energy_per_period,
        }
    }

    /// Positive is import from the grid, negative is export.
    #[must_use]
    pub fn grid_energy(&self) -> WattHours {
        self.required_energy - self.charge_discharge_energy
    }

    #[must_use]
    pub fn is_excess_pv_available(&self) -> bool {
        self.required_energy < WattHours::ZERO
    }

    /// The battery is charging while the household still imports from the grid.
    #[must_use]
    pub fn is_charge_from_grid_scheduled(&self) -> bool {
        self.charge_discharge_energy < WattHours::ZERO && self.grid_energy() > WattHours::ZERO
    }

    /// The discharge is deliberately held back below what the stored energy would allow.
    #[must_use]
    pub fn is_delay_discharge_scheduled(&self) -> bool {
        self.charge_discharge_energy < self.ess_initial_energy
            && self.grid_energy() > WattHours::ZERO
            && self.required_energy < self.ess_initial_energy
            && self.charge_discharge_energy != self.max_discharge_energy_per_period
    }

    /// Select the state of the period for the control mode.
    ///
    /// Surplus production and an empty battery always win: the free energy is prioritised.
    #[must_use]
    pub fn state_machine(&self, control_mode: ControlMode) -> StateMachine {
        if self.is_excess_pv_available() || self.ess_initial_energy == WattHours::ZERO {
            return StateMachine::ChargeFromPv;
        }
        match control_mode {
            ControlMode::ChargeFromGrid if self.is_charge_from_grid_scheduled() => {
                StateMachine::ChargeFromGrid
            }
            ControlMode::DelayDischarge if self.is_delay_discharge_scheduled() => {
                StateMachine::DelayDischarge
            }
            _ => StateMachine::AllowsDischarge,
        }
    }
}
