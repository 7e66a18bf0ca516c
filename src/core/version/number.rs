// ─── Version Number ───
// Three-component version published by the version authority and stored in
// the local marker file.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// A `major.minor.sub_minor` version, each component fitting in 16 bits.
///
/// Only equality is defined. The launcher reinstalls whenever the local and
/// remote versions differ, so there is deliberately no ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub sub_minor: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("segment {segment:?} of {text:?} is not a number in 0..=65535: {source}")]
    Format {
        text: String,
        segment: String,
        source: ParseIntError,
    },
}

impl Version {
    /// Placeholder `0.0.0`, also the result of parsing text with the wrong
    /// number of segments.
    pub const ZERO: Version = Version::new(0, 0, 0);

    pub const fn new(major: u16, minor: u16, sub_minor: u16) -> Self {
        Self {
            major,
            minor,
            sub_minor,
        }
    }

    /// Parse `"{major}.{minor}.{sub_minor}"`.
    ///
    /// - Text that does not split into exactly three segments yields [`Version::ZERO`].
    /// - Three segments where one is not an unsigned 16-bit integer is an error.
    /// - Whitespace around the text and around each segment is ignored.
    pub fn parse(text: &str) -> Result<Self, VersionParseError> {
        let trimmed = text.trim();
        let segments: Vec<&str> = trimmed.split('.').collect();
        let [major, minor, sub_minor] = segments.as_slice() else {
            return Ok(Self::ZERO);
        };

        Ok(Self {
            major: parse_segment(trimmed, major)?,
            minor: parse_segment(trimmed, minor)?,
            sub_minor: parse_segment(trimmed, sub_minor)?,
        })
    }

    /// Text shown next to the play button, e.g. `v1.4.2`.
    pub fn display_text(&self) -> String {
        format!("v{}", self)
    }
}

fn parse_segment(text: &str, segment: &str) -> Result<u16, VersionParseError> {
    segment
        .trim()
        .parse::<u16>()
        .map_err(|source| VersionParseError::Format {
            text: text.to_string(),
            segment: segment.to_string(),
            source,
        })
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.sub_minor)
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
