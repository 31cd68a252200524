//! Shady - build-time shader preprocessor
//!
//! The engine lives in `shady-core`; this crate wires it to a project
//! directory:
//! - `project` - shader discovery and the `_bak`/`_mod` sibling files
//! - `archive` - rotating copies of backups
//! - `pipeline` - the `pre`, `post` and `clean` build steps

pub mod archive;
pub mod pipeline;
pub mod project;

pub use archive::Archive;
pub use pipeline::{BuildOptions, PreReport, clean, post, pre};
pub use project::Project;
