use crate::quantity::percent::Percent;

quantity!(WattHours, i64, "Wh");

impl WattHours {
    /// Positive part of the energy, negative values become zero.
    #[must_use]
    pub fn positive(self) -> Self {
        self.max(Self::ZERO)
    }

    /// Share of the energy, truncated to whole watt-hours.
    ///
    /// The division goes first, so that the result matches the integer arithmetic of the inverter.
    #[must_use]
    pub fn share(self, percent: Percent) -> Self {
        Self(self.0 / 100 * i64::from(percent.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive() {
        assert_eq!(WattHours(-5).positive(), WattHours::ZERO);
        assert_eq!(WattHours(5).positive(), WattHours(5));
    }

    #[test]
    fn test_share() {
        assert_eq!(WattHours(10_000).share(Percent(40)), WattHours(4_000));
        assert_eq!(WattHours(10_050).share(Percent(10)), WattHours(1_000));
    }

    #[test]
    fn test_display() {
        assert_eq!(WattHours(-250).to_string(), "-250 Wh");
        assert_eq!(format!("{:?}", WattHours(250)), "250Wh");
    }
}
