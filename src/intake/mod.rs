#[allow(clippy::module_inception)]
mod intake;

pub use intake::*;
