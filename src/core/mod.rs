// ─── PatchLauncher Core ───
// Update-check / fetch / install state machine of a self-updating launcher.
//
// Architecture:
//   core/
//     version/    — Version value type + Version.txt marker
//     state/      — Shared state, status/labels, paths, settings
//     downloader/ — HTTP client + update source seam
//     install/    — Background download, archive extraction, stamping
//     update/     — Local vs. remote comparison
//     launch/     — Launch/retry gate + process spawner

pub mod downloader;
pub mod error;
pub mod install;
pub mod launch;
pub mod state;
pub mod update;
pub mod version;

#[cfg(test)]
pub(crate) mod test_support;
