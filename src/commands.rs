use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::core::downloader::{Downloader, HttpUpdateSource};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::launch::{LaunchGate, LaunchOutcome};
use crate::core::state::paths::default_root_dir;
use crate::core::state::{AppState, LauncherPaths, LauncherSettings, LauncherStatus, LauncherView};
use crate::core::update::UpdateChecker;
use crate::core::version::read_local_version;

#[derive(Debug, Parser)]
#[command(name = "patchlauncher", version, about = "Self-updating game launcher")]
pub struct Cli {
    /// Directory holding Version.txt, Build/ and launcher_settings.json.
    #[arg(long, env = "PATCHLAUNCHER_ROOT", global = true)]
    root: Option<PathBuf>,

    /// Endpoint returning the published version as plain text.
    #[arg(long, env = "PATCHLAUNCHER_VERSION_URL", global = true)]
    version_url: Option<String>,

    /// Endpoint serving the zipped build.
    #[arg(long, env = "PATCHLAUNCHER_ARCHIVE_URL", global = true)]
    archive_url: Option<String>,

    /// Executable name inside Build/.
    #[arg(long, env = "PATCHLAUNCHER_ARTIFACT", global = true)]
    artifact: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Check for updates, then wait for the user to press play (default).
    Play,
    /// Check for updates and install them, then exit.
    Check,
    /// Show the installed version without contacting the server.
    Status,
    /// Persist the given flags to launcher_settings.json.
    Configure,
}

impl Cli {
    fn overrides(&self) -> LauncherSettings {
        LauncherSettings {
            version_url: self.version_url.clone(),
            archive_url: self.archive_url.clone(),
            artifact_name: self.artifact.clone(),
        }
    }
}

/// Terminal stand-in for the launcher window.
struct ConsoleView;

impl LauncherView for ConsoleView {
    fn status_changed(&self, _status: LauncherStatus, label: &str) {
        println!("» {label}");
    }

    fn version_changed(&self, text: &str) {
        println!("Installed version: {text}");
    }

    fn show_error(&self, message: &str) {
        eprintln!("Error: {message}");
    }
}

struct Launcher {
    state: Arc<AppState>,
    checker: UpdateChecker,
    gate: LaunchGate,
}

impl Launcher {
    fn build(root: &Path, settings: &LauncherSettings) -> LauncherResult<Self> {
        let endpoints = settings.endpoints()?;
        std::fs::create_dir_all(root).map_err(|source| LauncherError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let source = HttpUpdateSource::new(Downloader::new()?, endpoints);
        let paths = LauncherPaths::new(root, settings.artifact_name());
        let state = AppState::new(paths, Arc::new(source), Arc::new(ConsoleView));
        let checker = UpdateChecker::new(state.clone());
        let gate = LaunchGate::new(state.clone(), checker.clone());

        Ok(Self {
            state,
            checker,
            gate,
        })
    }
}

pub async fn execute(cli: Cli) -> LauncherResult<ExitCode> {
    let root = cli.root.clone().unwrap_or_else(default_root_dir);
    let settings = LauncherSettings::load(&root).merged_with(cli.overrides());
    info!("Launcher root: {:?}", root);

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => play(Launcher::build(&root, &settings)?).await,
        Command::Check => check(Launcher::build(&root, &settings)?).await,
        Command::Status => status(&root, &settings).await,
        Command::Configure => {
            settings.save(&root)?;
            println!(
                "Saved settings to {}",
                LauncherSettings::settings_path(&root).display()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn play(launcher: Launcher) -> LauncherResult<ExitCode> {
    let mut status_rx = launcher.state.subscribe().await;
    // An install started here keeps running in the background.
    let _ = launcher.checker.check_for_updates().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        wait_for_terminal(&mut status_rx).await?;
        println!("[Enter] {}   [q] Quit", launcher.state.label().await);

        if read_answer(&mut lines).await? == PromptAnswer::Quit {
            return Ok(ExitCode::SUCCESS);
        }

        match launcher.gate.on_launch_requested().await {
            LaunchOutcome::Started { pid } => {
                println!("Game started (pid {pid})");
                return Ok(ExitCode::SUCCESS);
            }
            LaunchOutcome::Ignored => {
                warn!("Nothing to launch yet");
            }
            LaunchOutcome::Retrying(_) | LaunchOutcome::LaunchFailed => {}
        }
    }
}

/// What the player typed at the play prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptAnswer {
    Press,
    Quit,
}

/// `q` or end of input quits, any other line presses the button.
async fn read_answer<R>(lines: &mut Lines<R>) -> LauncherResult<PromptAnswer>
where
    R: AsyncBufRead + Unpin,
{
    let line = lines
        .next_line()
        .await
        .map_err(|e| LauncherError::Other(format!("stdin closed: {e}")))?;
    match line {
        Some(line) if !line.trim().eq_ignore_ascii_case("q") => Ok(PromptAnswer::Press),
        _ => Ok(PromptAnswer::Quit),
    }
}

async fn check(launcher: Launcher) -> LauncherResult<ExitCode> {
    launcher.checker.check_for_updates().await.wait().await;

    match launcher.state.status().await {
        Some(LauncherStatus::Ready) => Ok(ExitCode::SUCCESS),
        _ => Ok(ExitCode::from(1)),
    }
}

async fn status(root: &Path, settings: &LauncherSettings) -> LauncherResult<ExitCode> {
    let paths = LauncherPaths::new(root, settings.artifact_name());
    match read_local_version(&paths.version_file()).await? {
        Some(version) => println!("Installed version: {}", version.display_text()),
        None => println!("Not installed"),
    }
    if !paths.executable().is_file() {
        println!("Executable missing: {}", paths.executable().display());
    }
    Ok(ExitCode::SUCCESS)
}

async fn wait_for_terminal(
    status_rx: &mut watch::Receiver<Option<LauncherStatus>>,
) -> LauncherResult<()> {
    status_rx
        .wait_for(|status| matches!(status, Some(status) if status.is_terminal()))
        .await
        .map_err(|_| LauncherError::Other("Status channel closed".into()))?;
    Ok(())
}
