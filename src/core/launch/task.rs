// ─── Launch Task ───
// Spawns the installed build as a detached child process.

use std::path::Path;
use std::process::{Child, Command, Stdio};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};

/// Start `executable` with `working_dir` as its current directory.
///
/// Returns right after spawning; the child outlives the launcher.
pub fn launch_artifact(executable: &Path, working_dir: &Path) -> LauncherResult<Child> {
    let mut cmd = Command::new(executable);
    cmd.current_dir(working_dir);
    cmd.stdin(Stdio::null());
    configure_platform_spawn(&mut cmd);

    info!("Launching {:?}", executable);
    debug!("Command: {:?} (cwd {:?})", cmd, working_dir);

    cmd.spawn().map_err(|source| LauncherError::Launch {
        path: executable.to_path_buf(),
        source,
    })
}

fn configure_platform_spawn(cmd: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        const CREATE_NEW_CONSOLE: u32 = 0x00000010;
        cmd.creation_flags(CREATE_NEW_CONSOLE);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}
