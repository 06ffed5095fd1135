//! Schedule inputs: the quarter-hourly forecasts and the battery state.

use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    prelude::*,
    quantity::{energy::WattHours, percent::Percent, power::Watts, rate::KilowattHourRate},
};

/// Quarter-hourly forecasts starting with the current period.
///
/// Gaps are allowed anywhere, they get interpolated when the schedule is built.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub prices: Vec<Option<KilowattHourRate>>,

    #[serde(default)]
    pub consumption: Vec<Option<WattHours>>,

    #[serde(default)]
    pub production: Vec<Option<WattHours>>,
}

impl Forecast {
    #[instrument(name = "reading the forecast…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let forecast: Self = serde_json::from_slice(&fs::read(path)?)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;
        debug!(
            n_prices = forecast.prices.len(),
            n_consumption = forecast.consumption.len(),
            n_production = forecast.production.len(),
            "read",
        );
        Ok(forecast)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct BatteryState {
    pub capacity: WattHours,
    pub state_of_charge: Percent,

    /// Reserve that is never discharged.
    pub min_state_of_charge: Percent,

    pub max_charge_power: Watts,
    pub max_discharge_power: Watts,
}

impl BatteryState {
    #[must_use]
    pub fn reserve_energy(&self) -> WattHours {
        self.capacity.share(self.min_state_of_charge)
    }

    /// Capacity above the reserve.
    #[must_use]
    pub fn usable_energy(&self) -> WattHours {
        self.capacity - self.reserve_energy()
    }

    /// Stored energy above the reserve.
    #[must_use]
    pub fn available_energy(&self) -> WattHours {
        (self.capacity.share(self.state_of_charge) - self.reserve_energy()).positive()
    }

    /// The power limits stay zero until the battery has reported them.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.max_charge_power != Watts::ZERO || self.max_discharge_power != Watts::ZERO
    }
}

pub trait ForecastSource {
    fn forecast(&self) -> Result<Forecast>;

    fn battery_state(&self) -> Result<BatteryState>;
}

/// Forecast from a JSON file and a battery state known up front.
pub struct ForecastFile {
    pub path: PathBuf,
    pub battery_state: BatteryState,
}

impl ForecastSource for ForecastFile {
    fn forecast(&self) -> Result<Forecast> {
        Forecast::read_from(&self.path)
    }

    fn battery_state(&self) -> Result<BatteryState> {
        Ok(self.battery_state)
    }
}
