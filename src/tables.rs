use std::iter::successors;

use chrono::{DateTime, Local};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{period::PERIOD, schedule::Schedule},
    quantity::{energy::WattHours, rate::KilowattHourRate},
};

/// Render the schedule, the first row starts at `start`.
pub fn build_schedule_table(schedule: &Schedule, start: DateTime<Local>) -> Table {
    let mean_price = mean_price(schedule);

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec![
        "Start",
        "Price",
        "Production",
        "Consumption",
        "Before",
        "Battery",
        "Grid",
        "State",
    ]);
    let starts = successors(Some(start), |start| Some(*start + PERIOD));
    for (start, period) in starts.zip(schedule.periods()) {
        let state = period.state_machine(schedule.control_mode);
        table.add_row(vec![
            Cell::new(start.format("%H:%M")),
            Cell::new(period.price).fg(if period.price >= mean_price {
                Color::Red
            } else {
                Color::Green
            }),
            Cell::new(period.production).set_alignment(CellAlignment::Right),
            Cell::new(period.consumption).set_alignment(CellAlignment::Right),
            Cell::new(period.ess_initial_energy)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim)
                .fg(if period.ess_initial_energy == schedule.ess.usable_energy {
                    Color::Green
                } else if period.ess_initial_energy == WattHours::ZERO {
                    Color::Red
                } else {
                    Color::Reset
                }),
            Cell::new(period.charge_discharge_energy).set_alignment(CellAlignment::Right),
            Cell::new(period.grid_energy()).set_alignment(CellAlignment::Right).fg(
                if period.grid_energy() > WattHours::ZERO { Color::Red } else { Color::Green },
            ),
            Cell::new(state).fg(state.color()),
        ]);
    }
    table
}

fn mean_price(schedule: &Schedule) -> KilowattHourRate {
    let periods = schedule.periods();
    if periods.is_empty() {
        return KilowattHourRate::ZERO;
    }
    let total: KilowattHourRate = periods.iter().map(|period| period.price).sum();
    #[expect(clippy::cast_precision_loss)]
    let n_periods = periods.len() as f64;
    KilowattHourRate(total.0 / n_periods)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;
    use crate::{
        core::control_mode::ControlMode,
        quantity::power::Watts,
    };

    fn schedule(prices: &[Option<KilowattHourRate>]) -> Schedule {
        Schedule::builder()
            .control_mode(ControlMode::ChargeFromGrid)
            .ess_usable_energy(WattHours(10_000))
            .ess_initial_energy(WattHours(1_000))
            .ess_max_discharge_power(Watts(4_000))
            .ess_max_charge_power(Watts(4_000))
            .max_charge_power_from_grid(Watts(4_000))
            .prices(prices)
            .consumption(&[Some(WattHours(300))])
            .production(&[])
            .create()
    }

    #[test]
    fn test_mean_price() {
        let schedule = schedule(&[Some(KilowattHourRate(0.2)), Some(KilowattHourRate(0.4))]);
        assert_abs_diff_eq!(mean_price(&schedule).0, 0.3);
        assert_eq!(mean_price(&self::schedule(&[])), KilowattHourRate::ZERO);
    }

    #[test]
    fn test_one_row_per_period() {
        let schedule = schedule(&[Some(KilowattHourRate(0.2)), Some(KilowattHourRate(0.4))]);
        let start = Local.with_ymd_and_hms(2025, 3, 1, 23, 45, 0).unwrap();
        let table = build_schedule_table(&schedule, start);
        assert_eq!(table.row_count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("23:45"));
        assert!(rendered.contains("00:00"));
    }
}
