use std::iter::repeat;

use bon::Builder;
use itertools::{Itertools, izip};

use crate::{
    core::{
        control_mode::ControlMode,
        interpolate::interpolate,
        period::{Period, to_energy},
        risk_level::RiskLevel,
    },
    prelude::*,
    quantity::{energy::WattHours, power::Watts, rate::KilowattHourRate},
};

/// Battery parameters shared by every period of a schedule.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EssParameters {
    pub usable_energy: WattHours,

    /// Available energy at the moment the schedule was built.
    pub initial_energy: WattHours,

    /// Negative lower bound of the charge/discharge energy.
    pub max_charge_energy_per_period: WattHours,

    pub max_discharge_energy_per_period: WattHours,

    pub max_allowed_charge_energy_from_grid: WattHours,
}

/// Charge/discharge plan, one [`Period`] per forecast sample.
///
/// The schedule is only mutated while it is being created, afterwards it is published
/// as a whole and never changes.
#[derive(Clone, Debug)]
pub struct Schedule {
    periods: Vec<Period>,
    pub control_mode: ControlMode,
    pub risk_level: RiskLevel,
    pub ess: EssParameters,
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Pass {
    /// Pure balancing: decisions from previous passes do not exist yet.
    Initial,

    /// Strategy decisions from the previous pass are kept where they still apply.
    Subsequent,
}

/// Inputs of [`Schedule`] creation.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct ScheduleParams<'a> {
    control_mode: ControlMode,

    #[builder(default)]
    risk_level: RiskLevel,

    ess_usable_energy: WattHours,
    ess_initial_energy: WattHours,
    ess_max_discharge_power: Watts,

    /// Either sign is accepted, only the magnitude matters.
    ess_max_charge_power: Watts,

    max_charge_power_from_grid: Watts,

    /// Current period first, gaps are allowed.
    prices: &'a [Option<KilowattHourRate>],

    consumption: &'a [Option<WattHours>],
    production: &'a [Option<WattHours>],
}

impl<S: schedule_params_builder::IsComplete> ScheduleParamsBuilder<'_, S> {
    pub fn create(self) -> Schedule {
        self.build().create()
    }
}

impl ScheduleParams<'_> {
    #[instrument(
        skip_all,
        name = "creating the schedule…",
        fields(control_mode = ?self.control_mode, n_prices = self.prices.len()),
    )]
    fn create(self) -> Schedule {
        let mut schedule = self.balance();
        if schedule.periods.is_empty() {
            warn!("no prices available, the schedule is empty");
            return schedule;
        }
        schedule.optimize();
        schedule.settle();
        debug!(n_periods = schedule.periods.len(), "created");
        schedule
    }

    /// Build the periods and let the battery cover whatever it can, without any strategy.
    fn balance(self) -> Schedule {
        let ess = EssParameters {
            usable_energy: self.ess_usable_energy.positive(),
            initial_energy: self.ess_initial_energy.positive(),
            max_charge_energy_per_period: -to_energy(self.ess_max_charge_power.abs()),
            max_discharge_energy_per_period: to_energy(self.ess_max_discharge_power).positive(),
            max_allowed_charge_energy_from_grid: to_energy(self.max_charge_power_from_grid)
                .positive(),
        };
        let mut schedule = Schedule {
            periods: self.periods(ess.max_discharge_energy_per_period),
            control_mode: self.control_mode,
            risk_level: self.risk_level,
            ess,
        };
        schedule.simulate(Pass::Initial);
        schedule
    }

    fn periods(&self, max_discharge_energy_per_period: WattHours) -> Vec<Period> {
        let Some(prices) = interpolate(self.prices) else {
            return Vec::new();
        };
        let n_periods = prices.len();
        izip!(prices, Self::fit(self.consumption, n_periods), Self::fit(self.production, n_periods))
            .enumerate()
            .map(|(index, (price, consumption, production))| {
                Period::new(
                    index,
                    price,
                    self.risk_level.discount_production(production.positive()),
                    consumption.positive(),
                    max_discharge_energy_per_period,
                )
            })
            .collect()
    }

    /// Pad or truncate the forecast to the number of periods and fill in the gaps.
    ///
    /// A forecast without any known sample is assumed to be zero.
    fn fit(samples: &[Option<WattHours>], n_periods: usize) -> Vec<WattHours> {
        let samples =
            samples.iter().copied().chain(repeat(None)).take(n_periods).collect_vec();
        interpolate(&samples).unwrap_or_else(|| vec![WattHours::ZERO; n_periods])
    }
}

impl Schedule {
    pub fn builder<'a>() -> ScheduleParamsBuilder<'a> {
        ScheduleParams::builder()
    }

    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// The current period is always the first one.
    #[must_use]
    pub fn current_period(&self) -> Option<&Period> {
        self.periods.first()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Walk the periods and propagate the battery energy from one period to the next.
    fn simulate(&mut self, pass: Pass) {
        let ess = self.ess;
        let control_mode = self.control_mode;
        let mut ess_energy = ess.initial_energy;

        for period in &mut self.periods {
            period.ess_initial_energy = ess_energy.clamp(WattHours::ZERO, ess.usable_energy);
            period.charge_discharge_energy = ess.decide(period, control_mode, pass);
            ess_energy = (period.ess_initial_energy - period.charge_discharge_energy).positive();
        }
    }

    /// Cover the deficits, that the battery alone cannot cover, from cheaper earlier periods.
    fn optimize(&mut self) {
        for index in 0..self.periods.len() {
            let period = &self.periods[index];
            let required_energy_from_grid = period.required_energy - period.ess_initial_energy;
            if required_energy_from_grid > WattHours::ZERO {
                self.calculate_schedule(required_energy_from_grid, index);
            }

            // Shifting energy changes the headroom of every subsequent period:
            self.simulate(Pass::Subsequent);
        }
    }

    /// Repeat the simulation until the decisions stop changing.
    fn settle(&mut self) {
        for _ in 0..2 * self.periods.len() + 2 {
            let decisions = self.decisions();
            self.simulate(Pass::Subsequent);
            if self.decisions() == decisions {
                return;
            }
        }
        warn!("the schedule did not settle");
    }

    fn decisions(&self) -> Vec<(WattHours, WattHours)> {
        self.periods
            .iter()
            .map(|period| (period.ess_initial_energy, period.charge_discharge_energy))
            .collect()
    }

    /// Schedule the required energy in cheaper periods before the expensive one.
    fn calculate_schedule(&mut self, required_energy: WattHours, expensive_index: usize) {
        let expensive_price = self.periods[expensive_index].price;
        let mut remaining_energy = required_energy;
        let mut is_exhausted = vec![false; expensive_index];

        while remaining_energy > WattHours::ZERO {
            let Some(cheap_index) = self.cheapest_period_before(expensive_index, &is_exhausted)
            else {
                break;
            };
            let cheap_period = &self.periods[cheap_index];
            if cheap_period.price >= expensive_price {
                break;
            }
            let energy = remaining_energy.min(self.available_energy(cheap_period));
            trace!(cheap_index, expensive_index, %energy, "shifting");
            self.update_schedule(cheap_index, energy);
            remaining_energy -= energy;
            is_exhausted[cheap_index] = true;
        }
    }

    /// Find the cheapest period with available energy before the expensive one.
    ///
    /// Equally cheap periods resolve to the earliest one.
    fn cheapest_period_before(&self, expensive_index: usize, is_exhausted: &[bool]) -> Option<usize> {
        (0..expensive_index)
            .filter(|&index| !is_exhausted[index])
            .filter(|&index| self.available_energy(&self.periods[index]) > WattHours::ZERO)
            .filter(|&index| !self.gets_full_between(index, expensive_index))
            .min_by_key(|&index| self.periods[index].price)
    }

    /// Check whether the battery is full in any period strictly between the two.
    fn gets_full_between(&self, from: usize, to: usize) -> bool {
        self.periods[from + 1..to]
            .iter()
            .any(|period| period.ess_initial_energy == self.ess.usable_energy)
    }

    /// Charge energy for [`ControlMode::ChargeFromGrid`], discharge energy for
    /// [`ControlMode::DelayDischarge`] that the period may still take.
    fn available_energy(&self, period: &Period) -> WattHours {
        match self.control_mode {
            ControlMode::ChargeFromGrid => {
                let headroom = (self.ess.usable_energy - period.ess_initial_energy).positive();
                let limit = self.ess.max_charge_energy_per_period.max(
                    -(self.ess.max_allowed_charge_energy_from_grid - period.required_energy)
                        .positive(),
                );
                let available = if period.charge_discharge_energy < WattHours::ZERO {
                    (period.charge_discharge_energy - limit).positive()
                } else {
                    -limit
                };
                headroom.min(available)
            }
            ControlMode::DelayDischarge => {
                if period.ess_initial_energy == WattHours::ZERO
                    || period.charge_discharge_energy < WattHours::ZERO
                {
                    WattHours::ZERO
                } else {
                    self.ess.max_discharge_energy_per_period.min(period.charge_discharge_energy)
                }
            }
        }
    }

    fn update_schedule(&mut self, index: usize, energy: WattHours) {
        let period = &mut self.periods[index];
        period.charge_discharge_energy = match self.control_mode {
            ControlMode::ChargeFromGrid => {
                if period.charge_discharge_energy <= WattHours::ZERO {
                    period.charge_discharge_energy - energy
                } else {
                    -energy
                }
            }
            ControlMode::DelayDischarge => (period.charge_discharge_energy - energy).positive(),
        };
    }
}

impl EssParameters {
    /// Charge/discharge energy of the period given its initial energy.
    fn decide(&self, period: &Period, control_mode: ControlMode, pass: Pass) -> WattHours {
        // Do not charge above the usable energy, and do not discharge below zero:
        let max_charge_energy = self
            .max_charge_energy_per_period
            .max(period.ess_initial_energy - self.usable_energy);
        let max_discharge_energy =
            self.max_discharge_energy_per_period.min(period.ess_initial_energy);

        let balancing = if period.is_excess_pv_available() {
            max_charge_energy.max(period.required_energy)
        } else {
            max_discharge_energy.min(period.required_energy)
        };
        if pass == Pass::Initial {
            return balancing;
        }

        match control_mode {
            ControlMode::ChargeFromGrid if period.is_charge_from_grid_scheduled() => {
                max_charge_energy.max(period.charge_discharge_energy)
            }
            ControlMode::DelayDischarge if period.is_delay_discharge_scheduled() => {
                max_discharge_energy.min(period.charge_discharge_energy)
            }
            _ => balancing,
        }
    }
}
