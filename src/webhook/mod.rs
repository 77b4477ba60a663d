#[allow(clippy::module_inception)]
mod webhook;

pub use webhook::*;
