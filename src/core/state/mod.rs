pub mod app_state;
pub mod paths;
pub mod settings;
pub mod status;

pub use app_state::{AppState, FlowGuard};
pub use paths::LauncherPaths;
pub use settings::LauncherSettings;
pub use status::{LauncherStatus, LauncherView, StatusController};
