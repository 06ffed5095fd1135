use crate::quantity::{energy::WattHours, percent::Percent};

/// How much the user trusts the production forecast.
///
/// The default takes the forecast as is.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, clap::ValueEnum)]
pub enum RiskLevel {
    Low,
    Medium,

    #[default]
    High,
}

impl RiskLevel {
    /// Share of the predicted production that is not relied upon.
    #[must_use]
    pub const fn production_discount(self) -> Percent {
        match self {
            Self::Low => Percent(20),
            Self::Medium => Percent(10),
            Self::High => Percent(0),
        }
    }

    #[must_use]
    pub fn discount_production(self, production: WattHours) -> WattHours {
        let retained = 100 - i64::from(self.production_discount().0);
        WattHours(production.0 * retained / 100)
    }
}
