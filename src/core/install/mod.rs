pub mod extract;
pub mod installer;

pub use installer::{InstallHandle, InstallKind, Installer};
