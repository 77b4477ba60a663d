#[allow(clippy::module_inception)]
mod configuration;

pub use configuration::*;
