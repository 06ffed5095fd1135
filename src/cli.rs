mod dispatch;
mod plan;
mod query;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use self::{
    dispatch::{DispatchArgs, dispatch},
    plan::{PlanArgs, plan},
    query::{QueryArgs, query},
};
use crate::{
    core::{control_mode::ControlMode, risk_level::RiskLevel},
    dispatch::scheduler::Scheduler,
    forecast::{BatteryState, ForecastFile},
    quantity::{energy::WattHours, percent::Percent, power::Watts},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the schedule from the forecast and print it.
    #[clap(name = "plan")]
    Plan(Box<PlanArgs>),

    /// Run a single control cycle against the live readings, and update the active time.
    #[clap(name = "dispatch")]
    Dispatch(Box<DispatchArgs>),

    /// Answer a JSON-RPC schedule request with the history and the planned periods.
    #[clap(name = "schedule")]
    Schedule(Box<QueryArgs>),
}

#[must_use]
#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Total battery capacity in watt-hours.
    #[clap(long = "capacity-watt-hours", env = "CAPACITY_WATT_HOURS")]
    pub capacity: WattHours,

    /// Current state-of-charge percent.
    #[clap(long = "soc-percent", env = "SOC_PERCENT")]
    pub state_of_charge: Percent,

    /// Reserve state-of-charge percent, the battery never discharges below it.
    #[clap(long = "min-soc-percent", default_value = "10", env = "MIN_SOC_PERCENT")]
    pub min_state_of_charge: Percent,

    /// Maximum charging power in watts.
    #[clap(long = "max-charge-power-watts", default_value = "5000", env = "MAX_CHARGE_POWER_WATTS")]
    pub max_charge_power: Watts,

    /// Maximum discharging power in watts.
    #[clap(
        long = "max-discharge-power-watts",
        default_value = "5000",
        env = "MAX_DISCHARGE_POWER_WATTS"
    )]
    pub max_discharge_power: Watts,
}

impl BatteryArgs {
    pub const fn battery_state(self) -> BatteryState {
        BatteryState {
            capacity: self.capacity,
            state_of_charge: self.state_of_charge,
            min_state_of_charge: self.min_state_of_charge,
            max_charge_power: self.max_charge_power,
            max_discharge_power: self.max_discharge_power,
        }
    }
}

#[must_use]
#[derive(Copy, Clone, Parser)]
pub struct StrategyArgs {
    #[clap(
        long = "control-mode",
        value_enum,
        default_value = "delay-discharge",
        env = "CONTROL_MODE"
    )]
    pub control_mode: ControlMode,

    /// How much to trust the production forecast.
    #[clap(long = "risk-level", value_enum, default_value = "high", env = "RISK_LEVEL")]
    pub risk_level: RiskLevel,

    /// Maximum grid import while charging from the grid, in watts.
    #[clap(
        long = "max-charge-power-from-grid-watts",
        default_value = "5000",
        env = "MAX_CHARGE_POWER_FROM_GRID_WATTS"
    )]
    pub max_charge_power_from_grid: Watts,
}

#[derive(Parser)]
pub struct SchedulerArgs {
    /// JSON file with the quarter-hourly prices, consumption and production.
    #[clap(long = "forecast", env = "FORECAST_PATH")]
    pub forecast: PathBuf,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub strategy: StrategyArgs,
}

impl SchedulerArgs {
    pub fn scheduler(&self) -> Scheduler<ForecastFile> {
        Scheduler::builder()
            .source(ForecastFile {
                path: self.forecast.clone(),
                battery_state: self.battery.battery_state(),
            })
            .control_mode(self.strategy.control_mode)
            .risk_level(self.strategy.risk_level)
            .max_charge_power_from_grid(self.strategy.max_charge_power_from_grid)
            .build()
    }
}
