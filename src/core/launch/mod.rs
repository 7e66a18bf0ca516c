pub mod gate;
pub mod task;

pub use gate::{LaunchGate, LaunchOutcome};
pub use task::launch_artifact;
