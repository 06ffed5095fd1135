use enumset::EnumSet;

use crate::core::state_machine::StateMachine;

/// Strategy selected by the user.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, clap::ValueEnum)]
pub enum ControlMode {
    /// Never import from the grid to charge, only withhold the discharge during cheap periods.
    DelayDischarge,

    /// Additionally, pre-charge the battery from the grid before an expensive period.
    ChargeFromGrid,
}

impl ControlMode {
    /// States that the mode may put the battery into.
    #[must_use]
    pub fn states(self) -> EnumSet<StateMachine> {
        match self {
            Self::DelayDischarge => {
                StateMachine::AllowsDischarge
                    | StateMachine::ChargeFromPv
                    | StateMachine::DelayDischarge
            }
            Self::ChargeFromGrid => EnumSet::all(),
        }
    }

    #[must_use]
    pub fn allows(self, state: StateMachine) -> bool {
        self.states().contains(state)
    }
}
