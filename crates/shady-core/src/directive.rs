//! Directive semantics
//!
//! Turns a tokenized `#pragma shady:` line into a typed [`Directive`].

use thiserror::Error;

use crate::shader::{ImportBinding, Region, VariantSpec};
use crate::token::{Token, TokenKind};

/// A directive that tokenized but cannot be interpreted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("empty directive")]
    Empty,

    #[error("missing shader name")]
    MissingShader,

    #[error("too many qualifiers in '{0}'")]
    TooManyQualifiers(String),

    #[error("{0} needs a name")]
    MissingName(&'static str),

    #[error("{0} is not a directive")]
    NotADirective(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `import(Name[.Region])` or `import(Name.Ext.Region)`
    Import(ImportBinding),
    /// `inline(Name[.Macro])`
    Inline(ImportBinding),
    /// `variant(Base, DEFINE...)`
    Variant(VariantSpec),
    MacroBegin(String),
    MacroEnd,
    SkipCompilation,
    PrintPath,
}

impl Directive {
    /// Interpret the tokens of one directive line.
    ///
    /// `extension` is the importing shader's own extension (with the dot); it
    /// is appended to referenced shader names unless overridden. `tokens` must
    /// come from [`crate::tokenizer::tokenize_directive`].
    pub fn from_tokens(tokens: &[Token<'_>], extension: &str) -> Result<Directive, DirectiveError> {
        let Some(first) = tokens.first() else {
            return Err(DirectiveError::Empty);
        };

        let words: Vec<&str> = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::Argument | TokenKind::Name))
            .map(|t| t.value)
            .collect();

        match first.kind {
            TokenKind::Import => {
                let (shader, region) = target(&words, extension)?;
                let region = region.map_or(Region::Export, |name| Region::Symbol(name.to_string()));
                Ok(Directive::Import(ImportBinding::new(shader, region)))
            }
            TokenKind::Inline => {
                let (shader, region) = target(&words, extension)?;
                let region = region.map_or(Region::Export, |name| Region::Macro(name.to_string()));
                Ok(Directive::Inline(ImportBinding::new(shader, region)))
            }
            TokenKind::Variant => {
                let (base, defines) = words
                    .split_first()
                    .ok_or(DirectiveError::MissingName("variant"))?;
                Ok(Directive::Variant(VariantSpec {
                    base: format!("{base}{extension}"),
                    defines: defines.iter().map(|d| d.to_string()).collect(),
                }))
            }
            TokenKind::MacroBegin => words
                .first()
                .map(|name| Directive::MacroBegin(name.to_string()))
                .ok_or(DirectiveError::MissingName("macro_begin")),
            TokenKind::MacroEnd => Ok(Directive::MacroEnd),
            TokenKind::SkipCompilation => Ok(Directive::SkipCompilation),
            TokenKind::PrintPath => Ok(Directive::PrintPath),
            other => Err(DirectiveError::NotADirective(other.description())),
        }
    }
}

/// Resolve `Name`, `Name.Region` or `Name.Ext.Region` into a shader file
/// name and an optional region name.
fn target<'a>(
    words: &[&'a str],
    extension: &str,
) -> Result<(String, Option<&'a str>), DirectiveError> {
    match words {
        [name] => Ok((format!("{name}{extension}"), None)),
        [name, region] => Ok((format!("{name}{extension}"), Some(*region))),
        [name, ext, region] => Ok((format!("{name}.{ext}"), Some(*region))),
        [] => Err(DirectiveError::MissingShader),
        _ => Err(DirectiveError::TooManyQualifiers(words.join("."))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_directive;

    fn parse(line: &str) -> Result<Directive, DirectiveError> {
        let tokens = tokenize_directive(line).unwrap().unwrap();
        Directive::from_tokens(&tokens, ".fsh")
    }

    #[test]
    fn test_import_whole_shader() {
        assert_eq!(
            parse("#pragma shady: import(common)").unwrap(),
            Directive::Import(ImportBinding::new("common.fsh", Region::Export))
        );
    }

    #[test]
    fn test_import_symbol() {
        assert_eq!(
            parse("#pragma shady: import(b.c)").unwrap(),
            Directive::Import(ImportBinding::new("b.fsh", Region::Symbol("c".into())))
        );
    }

    #[test]
    fn test_import_foreign_extension() {
        assert_eq!(
            parse("#pragma shady: import(shared.vsh.transform)").unwrap(),
            Directive::Import(ImportBinding::new("shared.vsh", Region::Symbol("transform".into())))
        );
    }

    #[test]
    fn test_import_too_deep() {
        assert_eq!(
            parse("#pragma shady: import(a.b.c.d)"),
            Err(DirectiveError::TooManyQualifiers("a.b.c.d".into()))
        );
    }

    #[test]
    fn test_inline_macro() {
        assert_eq!(
            parse("#pragma shady: inline(blur.KERNEL)").unwrap(),
            Directive::Inline(ImportBinding::new("blur.fsh", Region::Macro("KERNEL".into())))
        );
        assert_eq!(
            parse("#pragma shady: inline(blur)").unwrap(),
            Directive::Inline(ImportBinding::new("blur.fsh", Region::Export))
        );
    }

    #[test]
    fn test_variant() {
        assert_eq!(
            parse("#pragma shady: variant(base, FEATURE_X, FEATURE_Y)").unwrap(),
            Directive::Variant(VariantSpec {
                base: "base.fsh".into(),
                defines: vec!["FEATURE_X".into(), "FEATURE_Y".into()],
            })
        );
    }

    #[test]
    fn test_macro_and_flags() {
        assert_eq!(
            parse("#pragma shady: macro_begin KERNEL").unwrap(),
            Directive::MacroBegin("KERNEL".into())
        );
        assert_eq!(parse("#pragma shady: macro_end").unwrap(), Directive::MacroEnd);
        assert_eq!(
            parse("#pragma shady: skip_compilation").unwrap(),
            Directive::SkipCompilation
        );
    }
}
