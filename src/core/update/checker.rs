// ─── Update Checker ───
// Decides between fresh install, update and ready on every activation.

use std::sync::Arc;

use tracing::info;

use crate::core::error::LauncherResult;
use crate::core::install::{InstallHandle, InstallKind, Installer};
use crate::core::state::{AppState, LauncherStatus};
use crate::core::version::{read_local_version, Version};

/// What a check decided.
#[derive(Debug)]
pub enum CheckOutcome {
    /// Installed build matches the authority.
    UpToDate,
    /// A download is running in the background.
    Installing(InstallHandle),
    /// The check or the start of the install failed; status is `Failed`.
    Failed,
}

impl CheckOutcome {
    /// Wait for a background install, if one was started.
    pub async fn wait(self) {
        if let CheckOutcome::Installing(handle) = self {
            handle.wait().await;
        }
    }
}

impl From<Option<InstallHandle>> for CheckOutcome {
    fn from(handle: Option<InstallHandle>) -> Self {
        match handle {
            Some(handle) => CheckOutcome::Installing(handle),
            None => CheckOutcome::Failed,
        }
    }
}

#[derive(Clone)]
pub struct UpdateChecker {
    state: Arc<AppState>,
    installer: Installer,
}

impl UpdateChecker {
    pub fn new(state: Arc<AppState>) -> Self {
        let installer = Installer::new(state.clone());
        Self { state, installer }
    }

    /// Compare the installed build against the authority and act on it.
    ///
    /// Only equality matters: any difference, including an installed build
    /// that is numerically newer, triggers an update.
    pub async fn check_for_updates(&self) -> CheckOutcome {
        let flow = self.state.begin_flow().await;
        match self.pending_install().await {
            Ok(Some(kind)) => self.installer.install(flow, kind).await.into(),
            Ok(None) => {
                self.state.finish_flow(flow, LauncherStatus::Ready).await;
                CheckOutcome::UpToDate
            }
            Err(err) => {
                self.state.fail_flow(flow, &err).await;
                CheckOutcome::Failed
            }
        }
    }

    /// The install this activation needs, `None` when the build is current.
    async fn pending_install(&self) -> LauncherResult<Option<InstallKind>> {
        let marker = self.state.paths().version_file();
        let Some(local) = read_local_version(&marker).await? else {
            info!("No installed build found, starting fresh install");
            return Ok(Some(InstallKind::Fresh));
        };
        self.state.set_version(&local).await;

        let remote_text = self.state.source().fetch_version().await?;
        let remote = Version::parse(&remote_text)?;

        if local == remote {
            info!("Installed build {} is current", local);
            return Ok(None);
        }

        info!("Installed build {} differs from published {}", local, remote);
        Ok(Some(InstallKind::Update(remote)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{observed_state, test_state, zip_bytes, FakeSource, ScratchDir};

    #[tokio::test]
    async fn equal_versions_mark_ready_without_installing() {
        let scratch = ScratchDir::new("check-equal");
        let (state, _view, source) = test_state(&scratch, FakeSource::new().with_version("1.2.3"));
        std::fs::write(state.paths().version_file(), "1.2.3").unwrap();

        let outcome = UpdateChecker::new(state.clone()).check_for_updates().await;

        assert!(matches!(outcome, CheckOutcome::UpToDate));
        assert_eq!(state.status().await, Some(LauncherStatus::Ready));
        assert_eq!(state.version_text().await, "v1.2.3");
        assert_eq!(source.archive_fetches(), 0);
    }

    #[tokio::test]
    async fn newer_local_build_still_triggers_an_update() {
        let scratch = ScratchDir::new("check-newer-local");
        let source = FakeSource::new()
            .with_version("1.0.0")
            .with_archive(zip_bytes(&[("Game", b"1.0.0")]));
        let (state, view, _source) = test_state(&scratch, source);
        std::fs::write(state.paths().version_file(), "2.0.0").unwrap();

        let outcome = UpdateChecker::new(state.clone()).check_for_updates().await;

        let handle = match outcome {
            CheckOutcome::Installing(handle) => handle,
            other => panic!("expected an update install, got {:?}", other),
        };
        assert_eq!(handle.version(), Version::new(1, 0, 0));
        handle.wait().await;

        assert_eq!(view.labels()[0], "Downloading Update...");
        assert_eq!(
            std::fs::read_to_string(state.paths().version_file()).unwrap(),
            "1.0.0"
        );
        assert_eq!(state.status().await, Some(LauncherStatus::Ready));
    }

    #[tokio::test]
    async fn missing_marker_runs_a_fresh_install_stamped_with_the_remote_version() {
        let scratch = ScratchDir::new("check-fresh");
        let source = FakeSource::new()
            .with_version("3.1.4")
            .with_archive(zip_bytes(&[("a.txt", b"x")]));
        let (state, view, source) = test_state(&scratch, source);

        let outcome = UpdateChecker::new(state.clone()).check_for_updates().await;
        assert!(matches!(outcome, CheckOutcome::Installing(_)));
        outcome.wait().await;

        assert_eq!(view.labels()[0], "Downloading Game...");
        assert_eq!(source.version_fetches(), 1);
        assert_eq!(
            std::fs::read_to_string(state.paths().version_file()).unwrap(),
            "3.1.4"
        );
        assert_eq!(state.version_text().await, "v3.1.4");
        assert_eq!(state.status().await, Some(LauncherStatus::Ready));
    }

    #[tokio::test]
    async fn unreachable_authority_fails_but_keeps_the_local_version_visible() {
        let scratch = ScratchDir::new("check-offline");
        let (state, view, _source) = test_state(&scratch, FakeSource::new());
        std::fs::write(state.paths().version_file(), "1.0.0").unwrap();

        let outcome = UpdateChecker::new(state.clone()).check_for_updates().await;

        assert!(matches!(outcome, CheckOutcome::Failed));
        assert_eq!(state.status().await, Some(LauncherStatus::Failed));
        assert_eq!(state.version_text().await, "v1.0.0");
        assert_eq!(view.errors().len(), 1);
    }

    #[tokio::test]
    async fn malformed_remote_version_is_a_failure() {
        let scratch = ScratchDir::new("check-bad-remote");
        let (state, _view, source) = test_state(&scratch, FakeSource::new().with_version("1.x.3"));
        std::fs::write(state.paths().version_file(), "1.0.0").unwrap();

        let outcome = UpdateChecker::new(state.clone()).check_for_updates().await;

        assert!(matches!(outcome, CheckOutcome::Failed));
        assert_eq!(source.archive_fetches(), 0);
    }

    #[tokio::test]
    async fn malformed_marker_fails_before_touching_the_network() {
        let scratch = ScratchDir::new("check-bad-marker");
        let (state, _view, source) = test_state(&scratch, FakeSource::new().with_version("1.0.0"));
        std::fs::write(state.paths().version_file(), "one.two.three").unwrap();

        let outcome = UpdateChecker::new(state.clone()).check_for_updates().await;

        assert!(matches!(outcome, CheckOutcome::Failed));
        assert_eq!(source.version_fetches(), 0);
        assert_eq!(state.label().await, "Update Failed - Retry");
    }

    #[tokio::test]
    async fn wrong_arity_marker_compares_as_zero() {
        let scratch = ScratchDir::new("check-zero");
        let (state, _view, _source) = test_state(&scratch, FakeSource::new().with_version("0.0.0"));
        std::fs::write(state.paths().version_file(), "1.2").unwrap();

        let outcome = UpdateChecker::new(state.clone()).check_for_updates().await;

        assert!(matches!(outcome, CheckOutcome::UpToDate));
        assert_eq!(state.version_text().await, "v0.0.0");
    }

    #[tokio::test]
    async fn a_second_check_waits_for_the_pending_install() {
        let scratch = ScratchDir::new("check-serialized");
        let source = FakeSource::new()
            .with_version("2.0.0")
            .with_archive(zip_bytes(&[("Game", b"2")]))
            .holding_downloads();
        let (state, _view, source) = test_state(&scratch, source);
        std::fs::write(state.paths().version_file(), "1.0.0").unwrap();
        let checker = UpdateChecker::new(state.clone());

        let first = checker.check_for_updates().await;
        let second = tokio::spawn({
            let checker = checker.clone();
            async move { checker.check_for_updates().await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(!second.is_finished());
        assert_eq!(state.status().await, Some(LauncherStatus::DownloadingUpdate));

        source.release_download();
        first.wait().await;
        let second = second.await.unwrap();

        assert!(matches!(second, CheckOutcome::UpToDate));
        assert_eq!(source.archive_fetches(), 1);
        assert_eq!(state.status().await, Some(LauncherStatus::Ready));
    }

    #[tokio::test]
    async fn flow_is_free_by_the_time_up_to_date_is_shown() {
        let scratch = ScratchDir::new("check-ready-flow");
        let (state, view, _source) =
            observed_state(&scratch, FakeSource::new().with_version("1.2.3"));
        std::fs::write(state.paths().version_file(), "1.2.3").unwrap();

        let outcome = UpdateChecker::new(state.clone()).check_for_updates().await;

        assert!(matches!(outcome, CheckOutcome::UpToDate));
        assert_eq!(view.seen(), vec![(LauncherStatus::Ready, true)]);
    }

    #[tokio::test]
    async fn flow_is_free_by_the_time_a_failed_check_is_shown() {
        let scratch = ScratchDir::new("check-failed-flow");
        let (state, view, _source) = observed_state(&scratch, FakeSource::new());
        std::fs::write(state.paths().version_file(), "1.0.0").unwrap();

        let outcome = UpdateChecker::new(state.clone()).check_for_updates().await;

        assert!(matches!(outcome, CheckOutcome::Failed));
        assert_eq!(view.seen(), vec![(LauncherStatus::Failed, true)]);
    }
}
