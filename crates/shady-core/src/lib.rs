//! Shady Core - GLSL shader preprocessing engine
//!
//! This crate provides:
//! - `#pragma shady:` directive tokenizing (token matcher + transition table)
//! - Line classification into exportable regions
//! - Region resolution, macro inlining and shader variants
//! - Cache stamps for incremental rebuilds
//!
//! Work is split in two phases. [`classify_all`] classifies every shader on a
//! small worker pool; once all workers have joined, the resulting
//! [`ShaderIndex`] is read-only and [`ShaderIndex::expand`] resolves each
//! shader against it. Nothing here touches the filesystem.

pub mod cache;
pub mod classifier;
pub mod directive;
pub mod error;
pub mod index;
pub mod resolver;
pub mod shader;
pub mod token;
pub mod tokenizer;

pub use cache::CacheStamp;
pub use directive::{Directive, DirectiveError};
pub use error::{CoreError, Diagnostic};
pub use index::{DEFAULT_WORKERS, ShaderIndex, classify_all};
pub use resolver::{ExpandOptions, Expansion};
pub use shader::{ImportBinding, Region, Shader, ShaderLine, ShaderSource, VariantSpec};
pub use token::{Token, TokenKind};
pub use tokenizer::{SyntaxError, tokenize_directive};
