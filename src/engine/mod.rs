// Fetch engine — pipeline, congestion control, telemetry, orchestration.

pub mod cubic;
pub mod fetch;
pub mod pipeline;
pub mod stats;
pub mod telemetry;
