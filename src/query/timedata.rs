use std::{fs, path::PathBuf};

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::{
    core::{interval::Interval, state_machine::StateMachine},
    prelude::*,
    quantity::rate::KilowattHourRate,
};

/// Historical quarter-hourly sample of the published values.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct HistoricalSample {
    pub timestamp: DateTime<Local>,

    #[serde(default)]
    pub price: Option<KilowattHourRate>,

    /// State code averaged over the sample.
    #[serde(default)]
    pub state: Option<f64>,
}

impl HistoricalSample {
    /// The averaged state truncated to the state code.
    #[must_use]
    pub fn state_machine(&self) -> Option<StateMachine> {
        let state = self.state.filter(|state| (0.0..256.0).contains(state))?;
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let code = state as u8;
        StateMachine::from_code(code)
    }
}

pub trait Timedata {
    /// Samples within the interval, in any order.
    fn query_history(&self, interval: Interval) -> Result<Vec<HistoricalSample>>;
}

/// No history at all.
impl<T: Timedata> Timedata for Option<T> {
    fn query_history(&self, interval: Interval) -> Result<Vec<HistoricalSample>> {
        self.as_ref().map_or_else(|| Ok(Vec::new()), |timedata| timedata.query_history(interval))
    }
}

/// History in a JSON array of samples.
pub struct HistoryFile {
    pub path: PathBuf,
}

impl Timedata for HistoryFile {
    #[instrument(skip_all, fields(path = ?self.path, interval = ?interval))]
    fn query_history(&self, interval: Interval) -> Result<Vec<HistoricalSample>> {
        let samples: Vec<HistoricalSample> = serde_json::from_slice(&fs::read(&self.path)?)
            .with_context(|| format!("failed to parse `{}`", self.path.display()))?;
        Ok(samples.into_iter().filter(|sample| interval.contains(sample.timestamp)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(state: Option<f64>) -> HistoricalSample {
        HistoricalSample { timestamp: Local::now(), price: None, state }
    }

    #[test]
    fn test_averaged_state_is_truncated() {
        assert_eq!(sample(Some(1.0)).state_machine(), Some(StateMachine::AllowsDischarge));
        assert_eq!(sample(Some(2.75)).state_machine(), Some(StateMachine::ChargeFromPv));
        assert_eq!(sample(Some(0.5)).state_machine(), Some(StateMachine::DelayDischarge));
    }

    #[test]
    fn test_invalid_state() {
        assert_eq!(sample(None).state_machine(), None);
        assert_eq!(sample(Some(-1.0)).state_machine(), None);
        assert_eq!(sample(Some(7.0)).state_machine(), None);
        assert_eq!(sample(Some(f64::NAN)).state_machine(), None);
    }

    #[test]
    fn test_deserialize() {
        let sample: HistoricalSample =
            serde_json::from_str(r#"{"timestamp": "2025-03-01T09:00:00Z", "price": 0.25}"#)
                .unwrap();
        assert_eq!(sample.price, Some(KilowattHourRate(0.25)));
        assert_eq!(sample.state, None);
    }
}
