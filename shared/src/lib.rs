mod handles;
mod stats;

#[cfg(feature = "client")]
pub mod providers;

pub use handles::*;
pub use stats::*;
