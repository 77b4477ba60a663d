pub mod configuration;
pub mod dispatcher;
pub mod intake;
pub mod telemetry;
pub mod template;
pub mod traits;
pub mod webhook;
