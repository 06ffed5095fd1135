pub mod control_mode;
pub mod interpolate;
pub mod interval;
pub mod period;
pub mod risk_level;
pub mod schedule;
pub mod state_machine;
