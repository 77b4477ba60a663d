#[allow(clippy::module_inception)]
mod telemetry;

pub use telemetry::*;
