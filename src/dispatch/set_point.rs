use crate::{
    core::period::to_power,
    quantity::{energy::WattHours, power::Watts},
};

/// Power readings that the set-points are corrected with.
#[derive(Copy, Clone, Debug)]
pub struct PowerReadings {
    pub grid: Watts,
    pub ess: Watts,
    pub dc_discharge: Option<Watts>,
}

impl PowerReadings {
    /// Battery power that would bring the grid power to zero.
    #[must_use]
    pub fn balancing(self) -> Watts {
        self.grid + self.ess
    }

    /// AC-side output of a hybrid inverter that comes from its DC-coupled PV.
    fn pv_feed_through(self) -> Option<Watts> {
        self.dc_discharge.map(|dc_discharge| (self.ess - dc_discharge).positive())
    }

    /// Active-power limit while charging from the grid, never positive.
    ///
    /// The planned energy is corrected by the live grid power,
    /// so that the import never exceeds the allowed grid charge power.
    #[must_use]
    pub fn charge_from_grid(
        self,
        charge_discharge_energy: WattHours,
        max_charge_power_from_grid: Watts,
    ) -> Watts {
        let mut charge_power = -to_power(charge_discharge_energy);
        if let Some(pv_feed_through) = self.pv_feed_through() {
            charge_power -= pv_feed_through;
        }
        (-charge_power).max(self.balancing() - max_charge_power_from_grid).min(Watts::ZERO)
    }

    /// Active-power limit while the discharge is delayed: only the DC-coupled PV may pass.
    #[must_use]
    pub fn delay_discharge(self) -> Watts {
        self.pv_feed_through().unwrap_or(Watts::ZERO)
    }
}
