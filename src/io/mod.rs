/// Telemetry export.
pub mod export;
