//! mz-cli: command-line front end for mz-core
//!
//! Holds the text renderer used by the `mazegen` binary.

pub mod render;

pub use render::{render_ascii, summary};
