//! Read view of the schedule: recent history merged with the planned periods.

pub mod jsonrpc;
pub mod service;
pub mod timedata;
