pub mod client;
pub mod source;

pub use client::Downloader;
pub use source::{HttpUpdateSource, UpdateSource};
