pub mod telemetry;
pub mod topology;

pub use telemetry::*;
pub use topology::*;
