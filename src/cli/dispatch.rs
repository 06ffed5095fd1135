use std::path::PathBuf;

use chrono::{Local, TimeDelta};
use clap::Parser;
use serde::Serialize;

use crate::{
    cli::SchedulerArgs,
    core::state_machine::StateMachine,
    dispatch::{
        active_time::ActiveTime,
        engine::{Dispatch, DispatchEngine},
        readings::Snapshot,
    },
    prelude::*,
    quantity::{percent::Percent, power::Watts},
};

#[derive(Parser)]
pub struct DispatchArgs {
    #[clap(flatten)]
    pub scheduler: SchedulerArgs,

    /// Grid active power in watts, positive is import.
    #[clap(long = "grid-power-watts", env = "GRID_POWER_WATTS", allow_negative_numbers = true)]
    pub grid_power: Option<Watts>,

    /// Battery active power in watts, positive is discharge.
    #[clap(long = "ess-power-watts", env = "ESS_POWER_WATTS", allow_negative_numbers = true)]
    pub ess_power: Option<Watts>,

    /// DC discharge power of a hybrid inverter in watts, omit for an AC-coupled battery.
    #[clap(long = "dc-discharge-power-watts", env = "DC_DISCHARGE_POWER_WATTS")]
    pub dc_discharge_power: Option<Watts>,

    /// State-of-charge percent above which the grid charging stops.
    #[clap(long = "max-soc-percent", default_value = "90", env = "MAX_SOC_PERCENT")]
    pub max_state_of_charge: Percent,

    /// TOML file with the active time counters.
    #[clap(long = "active-time-path", default_value = "active-time.toml", env = "ACTIVE_TIME_PATH")]
    pub active_time_path: PathBuf,

    /// Control cycle duration, accounted to the active time.
    #[clap(long = "cycle-seconds", default_value = "1", env = "CYCLE_SECONDS")]
    pub cycle_seconds: i64,
}

#[derive(Serialize)]
struct Output {
    state: StateMachine,
    set_point: Option<Watts>,

    #[serde(flatten)]
    active_time: ActiveTime,
}

#[instrument(skip_all)]
pub fn dispatch(args: &DispatchArgs) -> Result {
    let elapsed =
        TimeDelta::try_seconds(args.cycle_seconds).context("the cycle duration is out of range")?;
    let battery = args.scheduler.battery;
    let schedule = args.scheduler.scheduler().tick(Local::now());

    let mut engine = DispatchEngine::builder()
        .max_charge_power_from_grid(args.scheduler.strategy.max_charge_power_from_grid)
        .min_state_of_charge(battery.min_state_of_charge)
        .max_state_of_charge(args.max_state_of_charge)
        .active_time(ActiveTime::read_from(&args.active_time_path)?)
        .build();
    let readings = Snapshot::builder()
        .maybe_grid_active_power(args.grid_power)
        .maybe_ess_active_power(args.ess_power)
        .maybe_dc_discharge_power(args.dc_discharge_power)
        .state_of_charge(battery.state_of_charge)
        .build();
    let dispatch = engine.run_cycle(schedule.as_deref(), &readings, elapsed);
    trace_period(&dispatch);
    engine.active_time().write_to(&args.active_time_path)?;

    let output = Output {
        state: dispatch.state,
        set_point: dispatch.set_point,
        active_time: engine.active_time(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn trace_period(dispatch: &Dispatch) {
    if let Some(period) = dispatch.period {
        info!(
            price = %period.price,
            production = %period.production,
            consumption = %period.consumption,
            battery = %period.charge_discharge_energy,
            grid = %period.grid_energy(),
            "current period",
        );
    }
}
