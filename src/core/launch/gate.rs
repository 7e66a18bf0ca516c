use std::sync::Arc;

use tracing::{debug, info, warn};

use super::task::launch_artifact;
use crate::core::state::{AppState, LauncherStatus};
use crate::core::update::{CheckOutcome, UpdateChecker};

/// Result of pressing the launch/retry button.
#[derive(Debug)]
pub enum LaunchOutcome {
    /// The build is running; the launcher should exit.
    Started { pid: u32 },
    /// The previous attempt had failed and the check ran again.
    Retrying(CheckOutcome),
    /// Nothing to do in the current state.
    Ignored,
    /// The build could not be started; status is now `Failed`.
    LaunchFailed,
}

/// Decides what the single launcher button does.
pub struct LaunchGate {
    state: Arc<AppState>,
    checker: UpdateChecker,
}

impl LaunchGate {
    pub fn new(state: Arc<AppState>, checker: UpdateChecker) -> Self {
        Self { state, checker }
    }

    /// Launch when `Ready`, retry when `Failed`, otherwise do nothing.
    ///
    /// The press is also ignored while a check or install holds the flow, so
    /// a build that is still being written can never be started.
    pub async fn on_launch_requested(&self) -> LaunchOutcome {
        let Some(flow) = self.state.try_begin_flow() else {
            debug!("Launch ignored: check or install in progress");
            return LaunchOutcome::Ignored;
        };

        match self.state.status().await {
            Some(LauncherStatus::Ready) => {
                let paths = self.state.paths();
                let executable = paths.executable();
                if !executable.is_file() {
                    warn!("Status is Ready but {:?} is missing", executable);
                    return LaunchOutcome::Ignored;
                }

                match launch_artifact(&executable, &paths.build_dir()) {
                    Ok(child) => {
                        info!("Build started (pid {})", child.id());
                        LaunchOutcome::Started { pid: child.id() }
                    }
                    Err(err) => {
                        self.state.fail_flow(flow, &err).await;
                        LaunchOutcome::LaunchFailed
                    }
                }
            }
            Some(LauncherStatus::Failed) => {
                drop(flow);
                info!("Retrying update check");
                LaunchOutcome::Retrying(self.checker.check_for_updates().await)
            }
            other => {
                debug!("Launch ignored while {:?}", other);
                LaunchOutcome::Ignored
            }
        }
    }
}
