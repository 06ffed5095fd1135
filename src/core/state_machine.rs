use std::fmt::{Display, Formatter};

use comfy_table::Color;
use serde::{Serialize, Serializer};

/// Battery state for a single period.
///
/// The state is derived from a [`Period`][crate::core::period::Period] and the active
/// [`ControlMode`][crate::core::control_mode::ControlMode], it has no lifecycle of its own.
#[derive(Debug, enumset::EnumSetType)]
pub enum StateMachine {
    /// Discharge is withheld to keep the energy for a more expensive period.
    DelayDischarge,

    /// No constraint: the battery balances the household.
    AllowsDischarge,

    /// Surplus production is available, or the battery is empty.
    ChargeFromPv,

    /// Active import from the grid is scheduled to pre-charge the battery.
    ChargeFromGrid,
}

impl StateMachine {
    /// Integer code used in the telemetry and the schedule query responses.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::DelayDischarge => 0,
            Self::AllowsDischarge => 1,
            Self::ChargeFromPv => 2,
            Self::ChargeFromGrid => 3,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::DelayDischarge),
            1 => Some(Self::AllowsDischarge),
            2 => Some(Self::ChargeFromPv),
            3 => Some(Self::ChargeFromGrid),
            _ => None,
        }
    }

    pub const fn color(self) -> Color {
        match self {
            Self::DelayDischarge => Color::DarkYellow,
            Self::AllowsDischarge => Color::Reset,
            Self::ChargeFromPv => Color::Cyan,
            Self::ChargeFromGrid => Color::Green,
        }
    }
}

/// Serialized as the integer code.
impl Serialize for StateMachine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl Display for StateMachine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DelayDischarge => write!(f, "Delay discharge"),
            Self::AllowsDischarge => write!(f, "Allows discharge"),
            Self::ChargeFromPv => write!(f, "Charge from PV"),
            Self::ChargeFromGrid => write!(f, "Charge from grid"),
        }
    }
}
