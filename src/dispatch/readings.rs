use bon::Builder;

use crate::{
    prelude::*,
    quantity::{percent::Percent, power::Watts},
};

/// Live measurements of the site, each of them may be unavailable.
///
/// Positive power is import from the grid or discharge of the battery.
pub trait LiveReadings {
    fn grid_active_power(&self) -> Result<Watts>;

    fn ess_active_power(&self) -> Result<Watts>;

    /// DC-side discharge power of a hybrid inverter, `None` for an AC-coupled battery.
    fn dc_discharge_power(&self) -> Result<Option<Watts>>;

    fn state_of_charge(&self) -> Result<Percent>;
}

/// Readings taken once and then replayed.
#[derive(Copy, Clone, Debug, Default, Builder)]
pub struct Snapshot {
    grid_active_power: Option<Watts>,
    ess_active_power: Option<Watts>,
    dc_discharge_power: Option<Watts>,
    state_of_charge: Option<Percent>,
}

impl LiveReadings for Snapshot {
    fn grid_active_power(&self) -> Result<Watts> {
        self.grid_active_power.context("grid active power is not available")
    }

    fn ess_active_power(&self) -> Result<Watts> {
        self.ess_active_power.context("battery active power is not available")
    }

    fn dc_discharge_power(&self) -> Result<Option<Watts>> {
        Ok(self.dc_discharge_power)
    }

    fn state_of_charge(&self) -> Result<Percent> {
        self.state_of_charge.context("state of charge is not available")
    }
}
