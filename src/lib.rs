//! Cost-optimal ON/OFF scheduling of a single pump feeding a storage tank
//! under a time-of-day energy tariff.

pub mod cli;
pub mod config;
pub mod devices;
pub mod driver;
pub mod error;
pub mod io;
/// Scalar objective over schedule coordinates.
pub mod objective;
pub mod optimizer;
pub mod reporting;
/// Tank simulation engine, schedules, penalties, and KPIs.
pub mod sim;
pub mod tariff;
