//! Line classifier
//!
//! One pass over a shader's lines: directives are tokenized and applied,
//! every other line is assigned to the regions it belongs to. All state for
//! the pass lives in [`ParseState`], so shaders can be classified in parallel.

use crate::directive::Directive;
use crate::error::Diagnostic;
use crate::shader::{Region, Shader};
use crate::token::TokenKind;
use crate::tokenizer::tokenize_directive;

/// Per-shader parse state, threaded through every line
#[derive(Debug, Default)]
struct ParseState {
    /// Brace nesting depth
    level: usize,
    in_block_comment: bool,
    in_entry_point: bool,
    current_function: Option<String>,
    /// Innermost last
    open_macros: Vec<String>,
}

/// What a non-directive line contributes
#[derive(Debug, PartialEq, Eq)]
enum LineClass {
    /// Blank or comment: no regions, no brace bookkeeping
    Ignored,
    /// Top-level `varying`/`uniform`/`precision`: output only, never captured
    Declaration,
    /// Regular code, optionally defining a symbol of its own
    Code { symbol: Option<String> },
}

impl ParseState {
    fn classify(&mut self, text: &str) -> LineClass {
        let line = text.trim_start();

        if self.in_block_comment {
            if TokenKind::CloseComment.matches(line).is_some() {
                self.in_block_comment = false;
            }
            return LineClass::Ignored;
        }

        if line.is_empty() || TokenKind::LineComment.matches(line).is_some() {
            return LineClass::Ignored;
        }

        if TokenKind::OpenComment.matches(line).is_some() {
            if TokenKind::CloseComment.matches(line).is_none() {
                self.in_block_comment = true;
            }
            return LineClass::Ignored;
        }

        if self.level != 0 {
            return LineClass::Code { symbol: None };
        }

        let is_declaration = [TokenKind::Varying, TokenKind::Uniform, TokenKind::Precision]
            .iter()
            .any(|kind| kind.matches(line).is_some());
        if is_declaration {
            return LineClass::Declaration;
        }

        if TokenKind::EntryPoint.matches(line).is_some() {
            self.in_entry_point = true;
            return LineClass::Code { symbol: None };
        }

        if let Some(define) = TokenKind::Define.matches(line) {
            let symbol = TokenKind::Identifier
                .matches(define.rest.trim_start())
                .map(|name| name.value.to_string());
            return LineClass::Code { symbol };
        }

        if let Some(assignment) = TokenKind::Assignment.matches(line) {
            let symbol = TokenKind::Identifier
                .matches(assignment.value)
                .map(|name| name.value.to_string());
            return LineClass::Code { symbol };
        }

        if let Some(function) = TokenKind::Function.matches(line) {
            if let Some(name) = TokenKind::Identifier.matches(function.value) {
                self.current_function = Some(name.value.to_string());
            }
        }

        LineClass::Code { symbol: None }
    }

    /// Regions a captured line joins, besides its own symbol
    fn regions(&self) -> Vec<Region> {
        let mut regions = Vec::with_capacity(2 + self.open_macros.len());
        if !self.in_entry_point {
            regions.push(Region::Export);
            if let Some(function) = &self.current_function {
                regions.push(Region::Symbol(function.clone()));
            }
        }
        regions.extend(self.open_macros.iter().cloned().map(Region::Macro));
        regions
    }

    /// Track braces in code, ignoring anything after a `//`
    fn track_braces(&mut self, text: &str) {
        let code = text.find("//").map_or(text, |comment| &text[..comment]);
        for c in code.chars() {
            match c {
                '{' => self.level += 1,
                '}' => {
                    self.level = self.level.saturating_sub(1);
                    if self.level == 0 {
                        self.in_entry_point = false;
                        self.current_function = None;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Classify every line of `shader`, filling its regions, import bindings and
/// flags. Returns the recoverable problems found, already logged.
pub fn classify(shader: &mut Shader) -> Vec<Diagnostic> {
    let mut state = ParseState::default();
    let mut diagnostics = Vec::new();

    for i in 0..shader.lines().len() {
        let text = shader.lines()[i].text.clone();

        let tokens = match tokenize_directive(&text) {
            Ok(None) => {
                let class = state.classify(&text);
                log::trace!("{}:{} {:?} level {}", shader.name(), i + 1, class, state.level);

                let symbol = match class {
                    LineClass::Ignored => continue,
                    LineClass::Declaration => None,
                    LineClass::Code { symbol } => {
                        for region in state.regions() {
                            shader.add_to_region(region, i);
                        }
                        symbol
                    }
                };
                if let Some(symbol) = symbol {
                    if !state.in_entry_point {
                        shader.add_to_region(Region::Symbol(symbol), i);
                    }
                }
                state.track_braces(&text);
                continue;
            }
            Ok(Some(tokens)) => tokens,
            Err(err) => {
                shader.will_modify = true;
                shader.lines_mut()[i].dropped = true;
                diagnostics.push(syntax(shader, i, err.to_string()));
                continue;
            }
        };

        shader.will_modify = true;
        let directive = match Directive::from_tokens(&tokens, shader.extension()) {
            Ok(directive) => directive,
            Err(err) => {
                shader.lines_mut()[i].dropped = true;
                diagnostics.push(syntax(shader, i, err.to_string()));
                continue;
            }
        };
        log::debug!("{}:{} {:?}", shader.name(), i + 1, directive);

        match directive {
            Directive::Import(binding) | Directive::Inline(binding) => {
                shader.lines_mut()[i].binding = Some(binding);
                if !state.in_block_comment {
                    for region in state.regions() {
                        shader.add_to_region(region, i);
                    }
                }
                continue;
            }
            Directive::Variant(spec) => shader.variant = Some(spec),
            Directive::MacroBegin(name) => state.open_macros.push(name),
            Directive::MacroEnd => {
                if state.open_macros.pop().is_none() {
                    diagnostics.push(
                        Diagnostic::UnbalancedMacro {
                            shader: shader.name().to_string(),
                            line: i + 1,
                        }
                        .report(),
                    );
                }
            }
            Directive::SkipCompilation => shader.is_skipped = true,
            Directive::PrintPath => match shader.origin() {
                Some(path) => log::info!("{}: {}", shader.name(), path.display()),
                None => log::info!("{}: <no path>", shader.name()),
            },
        }
        shader.lines_mut()[i].dropped = true;
    }

    for name in state.open_macros {
        diagnostics.push(
            Diagnostic::UnclosedMacro {
                shader: shader.name().to_string(),
                name,
            }
            .report(),
        );
    }

    diagnostics
}

fn syntax(shader: &Shader, index: usize, message: String) -> Diagnostic {
    Diagnostic::Syntax {
        shader: shader.name().to_string(),
        line: index + 1,
        message,
    }
    .report()
}
