use std::iter::successors;

use chrono::{DateTime, Local, TimeDelta, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    core::{
        interval::Interval,
        period::{PERIOD, period_start},
        schedule::Schedule,
        state_machine::StateMachine,
    },
    prelude::*,
    query::timedata::{HistoricalSample, Timedata},
    quantity::rate::KilowattHourRate,
};

pub const HISTORY_DURATION: TimeDelta = TimeDelta::hours(3);

/// Three hours of quarter-hourly samples.
const MAX_PAST_ENTRIES: usize = 12;

/// One day of quarter-hourly entries.
pub const MAX_ENTRIES: usize = 96;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub timestamp: DateTime<Utc>,
    pub price: KilowattHourRate,
    pub state: StateMachine,
}

impl ScheduleEntry {
    fn from_sample(sample: &HistoricalSample) -> Option<Self> {
        Some(Self {
            timestamp: sample.timestamp.to_utc(),
            price: sample.price?,
            state: sample.state_machine()?,
        })
    }
}

pub struct ScheduleQueryService<T> {
    timedata: T,
}

impl<T: Timedata> ScheduleQueryService<T> {
    pub const fn new(timedata: T) -> Self {
        Self { timedata }
    }

    /// Merge the recent history with the planned periods.
    ///
    /// Entries without a price or a state are skipped.
    #[instrument(skip_all, fields(now = %now))]
    pub fn get_schedule(
        &self,
        schedule: Option<&Schedule>,
        now: DateTime<Local>,
    ) -> Vec<ScheduleEntry> {
        let now = period_start(now).inspect_err(|error| warn!("{error:#}")).unwrap_or(now);
        let future = schedule.into_iter().flat_map(|schedule| {
            successors(Some(now), |timestamp| Some(*timestamp + PERIOD))
                .zip(schedule.periods())
                .map(move |(timestamp, period)| {
                    Some(ScheduleEntry {
                        timestamp: timestamp.to_utc(),
                        price: period.price,
                        state: period.state_machine(schedule.control_mode),
                    })
                })
        });
        let entries = self
            .query_past(now)
            .into_iter()
            .chain(future)
            .take(MAX_ENTRIES)
            .flatten()
            .collect_vec();
        debug!(n_entries = entries.len(), "merged");
        entries
    }

    /// The latest historical entries before the current period.
    ///
    /// History errors are not fatal: the schedule is returned without the history.
    fn query_past(&self, now: DateTime<Local>) -> Vec<Option<ScheduleEntry>> {
        let interval = Interval::until(now, HISTORY_DURATION);
        let samples = match self.timedata.query_history(interval) {
            Ok(samples) => samples,
            Err(error) => {
                warn!("ignoring the history: {error:#}");
                return Vec::new();
            }
        };
        let samples = samples
            .into_iter()
            .filter(|sample| interval.contains(sample.timestamp))
            .sorted_by_key(|sample| sample.timestamp)
            .collect_vec();
        let n_skipped = samples.len().saturating_sub(MAX_PAST_ENTRIES);
        samples.iter().skip(n_skipped).map(ScheduleEntry::from_sample).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        core::control_mode::ControlMode,
        quantity::{energy::WattHours, power::Watts},
    };

    struct FakeTimedata(Option<Vec<HistoricalSample>>);

    impl Timedata for FakeTimedata {
        fn query_history(&self, _interval: Interval) -> Result<Vec<HistoricalSample>> {
            self.0.clone().context("the database is down")
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 1, 12, 7, 30).unwrap()
    }

    fn period_at(n_periods: i32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() + PERIOD * n_periods
    }

    fn schedule(n_periods: usize) -> Schedule {
        Schedule::builder()
            .control_mode(ControlMode::DelayDischarge)
            .ess_usable_energy(WattHours(10_000))
            .ess_initial_energy(WattHours(5_000))
            .ess_max_discharge_power(Watts(4_000))
            .ess_max_charge_power(Watts(4_000))
            .max_charge_power_from_grid(Watts(4_000))
            .prices(&vec![Some(KilowattHourRate(0.3)); n_periods])
            .consumption(&[Some(WattHours(100))])
            .production(&[])
            .create()
    }

    fn history(n_periods: i32) -> Vec<HistoricalSample> {
        (1..=n_periods)
            .map(|n_periods_ago| HistoricalSample {
                timestamp: period_at(-n_periods_ago),
                price: Some(KilowattHourRate(0.2)),
                state: Some(1.0),
            })
            .collect()
    }

    #[test]
    fn test_future_only() {
        let service = ScheduleQueryService::new(FakeTimedata(Some(Vec::new())));
        let entries = service.get_schedule(Some(&schedule(4)), now());
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].timestamp, period_at(0).to_utc());
        assert_eq!(entries[3].timestamp, period_at(3).to_utc());
        assert_eq!(entries[0].state, StateMachine::AllowsDischarge);
    }

    #[test]
    fn test_history_goes_first() {
        let service = ScheduleQueryService::new(FakeTimedata(Some(history(2))));
        let entries = service.get_schedule(Some(&schedule(2)), now());
        let timestamps = entries.iter().map(|entry| entry.timestamp).collect_vec();
        assert_eq!(
            timestamps,
            [period_at(-2), period_at(-1), period_at(0), period_at(1)].map(|time| time.to_utc()),
        );
        assert_eq!(entries[0].price, KilowattHourRate(0.2));
        assert_eq!(entries[2].price, KilowattHourRate(0.3));
    }

    #[test]
    fn test_trimmed_to_one_day() {
        let service = ScheduleQueryService::new(FakeTimedata(Some(history(20))));
        let entries = service.get_schedule(Some(&schedule(192)), now());
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries[0].timestamp, period_at(-12).to_utc());
        assert_eq!(entries[MAX_ENTRIES - 1].timestamp, period_at(83).to_utc());
    }

    #[test]
    fn test_incomplete_samples_are_skipped() {
        let mut history = history(3);
        history[0].price = None;
        history[1].state = None;
        let service = ScheduleQueryService::new(FakeTimedata(Some(history)));
        let entries = service.get_schedule(None, now());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].timestamp, period_at(-3).to_utc());
    }

    #[test]
    fn test_samples_outside_interval_are_ignored() {
        let mut history = history(1);
        let sample = history[0];
        history.push(HistoricalSample { timestamp: period_at(0), ..sample });
        history.push(HistoricalSample { timestamp: period_at(-13), ..sample });
        let service = ScheduleQueryService::new(FakeTimedata(Some(history)));
        let entries = service.get_schedule(None, now());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].timestamp, period_at(-1).to_utc());
    }

    #[test]
    fn test_history_failure_is_not_fatal() {
        let service = ScheduleQueryService::new(FakeTimedata(None));
        assert_eq!(service.get_schedule(Some(&schedule(3)), now()).len(), 3);
    }

    #[test]
    fn test_no_schedule_no_history() {
        let service = ScheduleQueryService::new(None::<FakeTimedata>);
        assert!(service.get_schedule(None, now()).is_empty());
    }
}
