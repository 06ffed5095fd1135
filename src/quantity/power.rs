quantity!(Watts, i64, "W");

impl Watts {
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Positive part of the power, negative values become zero.
    #[must_use]
    pub fn positive(self) -> Self {
        self.max(Self::ZERO)
    }
}
