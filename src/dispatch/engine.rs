use bon::Builder;
use chrono::TimeDelta;

use crate::{
    core::{
        control_mode::ControlMode,
        period::Period,
        schedule::Schedule,
        state_machine::StateMachine,
    },
    dispatch::{active_time::ActiveTime, readings::LiveReadings, set_point::PowerReadings},
    prelude::*,
    quantity::{percent::Percent, power::Watts},
};

/// Above this state of charge, the grid charging stops.
pub const DEFAULT_MAX_STATE_OF_CHARGE: Percent = Percent(90);

/// Outcome of a single control cycle.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct Dispatch {
    pub state: StateMachine,

    /// Active-power limit of the battery, `None` leaves the battery to the other controllers.
    pub set_point: Option<Watts>,

    /// The period the decision was based on.
    pub period: Option<Period>,
}

impl Dispatch {
    const fn delegate(period: Option<Period>) -> Self {
        Self { state: StateMachine::AllowsDischarge, set_point: None, period }
    }
}

#[derive(Builder)]
pub struct DispatchEngine {
    max_charge_power_from_grid: Watts,

    #[builder(default)]
    min_state_of_charge: Percent,

    #[builder(default = DEFAULT_MAX_STATE_OF_CHARGE)]
    max_state_of_charge: Percent,

    #[builder(default)]
    active_time: ActiveTime,
}

impl DispatchEngine {
    #[must_use]
    pub const fn active_time(&self) -> ActiveTime {
        self.active_time
    }

    /// Select the state of the current period, derive its set-point, and account the elapsed time.
    #[instrument(skip_all)]
    pub fn run_cycle(
        &mut self,
        schedule: Option<&Schedule>,
        readings: &impl LiveReadings,
        elapsed: TimeDelta,
    ) -> Dispatch {
        let dispatch = self.dispatch(schedule, readings);
        self.active_time.add(dispatch.state, elapsed);
        info!(state = %dispatch.state, set_point = ?dispatch.set_point, "dispatched");
        dispatch
    }

    fn dispatch(&self, schedule: Option<&Schedule>, readings: &impl LiveReadings) -> Dispatch {
        let Some((schedule, period)) =
            schedule.and_then(|schedule| Some((schedule, schedule.current_period()?)))
        else {
            debug!("no plan available");
            return Dispatch::delegate(None);
        };
        let power = match Self::read_power(readings) {
            Ok(power) => power,
            Err(error) => {
                warn!("delegating: {error:#}");
                return Dispatch::delegate(Some(*period));
            }
        };
        let state_of_charge = readings
            .state_of_charge()
            .inspect_err(|error| warn!("ignoring the state of charge: {error:#}"))
            .ok();
        let (state, set_point) =
            self.postprocess(schedule.control_mode, period, power, state_of_charge);
        Dispatch { state, set_point, period: Some(*period) }
    }

    fn read_power(readings: &impl LiveReadings) -> Result<PowerReadings> {
        Ok(PowerReadings {
            grid: readings.grid_active_power()?,
            ess: readings.ess_active_power()?,
            dc_discharge: readings.dc_discharge_power()?,
        })
    }

    /// Downgrade the planned state when the live readings make it pointless.
    fn postprocess(
        &self,
        control_mode: ControlMode,
        period: &Period,
        power: PowerReadings,
        state_of_charge: Option<Percent>,
    ) -> (StateMachine, Option<Watts>) {
        let mut state = period.state_machine(control_mode);

        if state == StateMachine::ChargeFromGrid {
            let set_point = power
                .charge_from_grid(period.charge_discharge_energy, self.max_charge_power_from_grid);
            if state_of_charge.is_some_and(|soc| soc > self.max_state_of_charge) {
                debug!(?state_of_charge, "the battery is almost full");
                state = downgrade(control_mode, StateMachine::DelayDischarge);
            } else if set_point >= power.delay_discharge() {
                debug!(%set_point, "charging would not change anything");
                state = downgrade(control_mode, StateMachine::DelayDischarge);
            } else {
                return (state, Some(set_point));
            }
        }

        if state == StateMachine::DelayDischarge {
            let set_point = power.delay_discharge();
            if state_of_charge.is_some_and(|soc| soc <= self.min_state_of_charge) {
                debug!(?state_of_charge, "the battery is at its reserve");
                state = downgrade(control_mode, StateMachine::AllowsDischarge);
            } else if set_point >= power.balancing() {
                debug!(%set_point, "delaying would not change anything");
                state = downgrade(control_mode, StateMachine::AllowsDischarge);
            } else {
                return (state, Some(set_point));
            }
        }

        (state, None)
    }
}

fn downgrade(control_mode: ControlMode, state: StateMachine) -> StateMachine {
    if control_mode.allows(state) { state } else { StateMachine::AllowsDischarge }
}
