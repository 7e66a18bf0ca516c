pub mod marker;
pub mod number;

pub use marker::{read_local_version, write_local_version};
pub use number::{Version, VersionParseError};
