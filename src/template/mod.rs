#[allow(clippy::module_inception)]
mod template;

pub use template::*;
