//! Engine errors
//!
//! [`Diagnostic`]s are recoverable: they are logged, the offending directive
//! or splice is skipped, and processing carries on. [`CoreError`]s abort the
//! whole run.

use thiserror::Error;

use crate::shader::Region;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("Syntax Error in {shader}, line {line}: {message}")]
    Syntax {
        shader: String,
        line: usize,
        message: String,
    },

    #[error("Import Error in {shader}, line {line}: Cannot import '{target}', shader doesn't exist or has no exported identifiers!")]
    MissingShader {
        shader: String,
        line: usize,
        target: String,
    },

    #[error("Import Error in {shader}, line {line}: Cannot import '{region}' from '{target}', identifier doesn't exist!")]
    MissingRegion {
        shader: String,
        line: usize,
        target: String,
        region: Region,
    },

    #[error("Variant Error in {shader}: Cannot create a variant of '{base}', shader doesn't exist!")]
    MissingVariantBase { shader: String, base: String },

    #[error("Macro Error in {shader}, line {line}: macro_end without a matching macro_begin")]
    UnbalancedMacro { shader: String, line: usize },

    #[error("Macro Error in {shader}: macro '{name}' is never closed")]
    UnclosedMacro { shader: String, name: String },

    #[error("Import Error in {shader}, line {line}: '{region}' from '{target}' inlines itself")]
    RecursiveInline {
        shader: String,
        line: usize,
        target: String,
        region: Region,
    },
}

impl Diagnostic {
    /// Log through the `log` facade and hand the diagnostic back
    pub(crate) fn report(self) -> Self {
        log::warn!("{}", self);
        self
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Duplicate shader name: {0}")]
    DuplicateShader(String),

    #[error("A classification worker panicked")]
    WorkerPanicked,

    #[error("Failed to spawn classification worker: {0}")]
    Spawn(#[from] std::io::Error),
}
