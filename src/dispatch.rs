//! Runtime side: turns the head of the current schedule into a set-point every control cycle.

pub mod active_time;
pub mod engine;
pub mod readings;
pub mod scheduler;
pub mod set_point;
