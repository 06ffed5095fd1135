use std::{fmt::Debug, fs, path::Path};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

use crate::{core::state_machine::StateMachine, prelude::*};

/// Cumulative time spent in the states that deviate from the plain balancing.
///
/// The counters only ever grow, and survive restarts in a TOML file.
#[serde_as]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveTime {
    /// Time spent charging from the grid.
    #[serde_as(as = "DurationSeconds<i64>")]
    #[serde(rename = "charged_seconds")]
    pub charged: TimeDelta,

    /// Time spent with the discharge delayed.
    #[serde_as(as = "DurationSeconds<i64>")]
    #[serde(rename = "delayed_seconds")]
    pub delayed: TimeDelta,
}

impl Default for ActiveTime {
    fn default() -> Self {
        Self { charged: TimeDelta::zero(), delayed: TimeDelta::zero() }
    }
}

impl ActiveTime {
    /// Account the elapsed cycle time to the state that was active during the cycle.
    pub fn add(&mut self, state: StateMachine, elapsed: TimeDelta) {
        let elapsed = elapsed.max(TimeDelta::zero());
        match state {
            StateMachine::ChargeFromGrid => self.charged += elapsed,
            StateMachine::DelayDischarge => self.delayed += elapsed,
            StateMachine::AllowsDischarge | StateMachine::ChargeFromPv => {}
        }
    }

    #[instrument(name = "reading the active time…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() { Ok(toml::from_slice(&fs::read(path)?)?) } else { Ok(Self::default()) }
    }

    #[instrument(skip(self), name = "writing the active time…")]
    pub fn write_to<P: AsRef<Path> + Debug>(&self, path: P) -> Result {
        fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }
}
