//! Region resolver
//!
//! Expands a shader's lines into final text, splicing referenced regions
//! depth-first. Runs only over a finished [`ShaderIndex`], so every
//! cross-shader lookup is read-only.

use std::collections::HashSet;

use crate::error::Diagnostic;
use crate::index::ShaderIndex;
use crate::shader::{ImportBinding, Region, Shader, ShaderLine};

/// Options for the serial expansion phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Number written in the `#line` directive for source line index 0
    pub line_offset: usize,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self { line_offset: 1 }
    }
}

/// Result of expanding one shader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub name: String,
    /// Cache metadata line followed by the expanded source. For shaders
    /// without directives only the metadata line.
    pub text: String,
    /// True when the shader had directives and must be replaced by `text`
    pub modified: bool,
    /// True when the shader or anything it pulls in changed since the last run
    pub dirty: bool,
    pub diagnostics: Vec<Diagnostic>,
}

struct Resolver<'a> {
    index: &'a ShaderIndex,
    out: String,
    /// Non-macro regions already spliced into this output
    imported: HashSet<ImportBinding>,
    /// Macro regions currently being expanded
    inlining: Vec<ImportBinding>,
    dirty: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Resolver<'a> {
    fn new(index: &'a ShaderIndex, dirty: bool) -> Self {
        Self {
            index,
            out: String::new(),
            imported: HashSet::new(),
            inlining: Vec::new(),
            dirty,
            diagnostics: Vec::new(),
        }
    }

    fn line(&mut self, text: impl std::fmt::Display) {
        self.out.push_str(&text.to_string());
        self.out.push('\n');
    }

    /// Expand `lines` in order.
    ///
    /// `counter` is the source line number of the first line. Only the
    /// outermost call for a physical shader advances it (`owns_counter`);
    /// spliced code reuses the number of the line that imported it.
    fn expand<'l>(
        &mut self,
        lines: impl IntoIterator<Item = &'l ShaderLine>,
        mut counter: usize,
        owns_counter: bool,
    ) {
        let mut mark = true;

        for line in lines {
            if line.dropped {
                if owns_counter {
                    counter += 1;
                }
                mark = true;
                continue;
            }

            match &line.binding {
                None => {
                    if mark {
                        self.line(format_args!("#line {counter}"));
                        mark = false;
                    }
                    self.line(&line.text);
                }
                Some(binding) => {
                    self.splice(line, binding, counter);
                    mark = true;
                }
            }

            if owns_counter {
                counter += 1;
            }
        }
    }

    fn splice(&mut self, line: &ShaderLine, binding: &ImportBinding, counter: usize) {
        let is_macro = binding.region.is_macro();

        if !is_macro
            && (self.imported.contains(binding) || self.imported.contains(&binding.whole_shader()))
        {
            log::trace!("{}:{} already imported {}", line.shader, line.number(), binding);
            return;
        }

        let index = self.index;
        // Failed splices invalidate the cached expansion
        let Some(target) = index.get(&binding.shader) else {
            self.dirty = true;
            self.diagnostics.push(
                Diagnostic::MissingShader {
                    shader: line.shader.to_string(),
                    line: line.number(),
                    target: binding.shader.clone(),
                }
                .report(),
            );
            return;
        };
        let Some(region) = target.region(&binding.region) else {
            self.dirty = true;
            self.diagnostics.push(
                Diagnostic::MissingRegion {
                    shader: line.shader.to_string(),
                    line: line.number(),
                    target: binding.shader.clone(),
                    region: binding.region.clone(),
                }
                .report(),
            );
            return;
        };

        if is_macro {
            if self.inlining.contains(binding) {
                self.diagnostics.push(
                    Diagnostic::RecursiveInline {
                        shader: line.shader.to_string(),
                        line: line.number(),
                        target: binding.shader.clone(),
                        region: binding.region.clone(),
                    }
                    .report(),
                );
                return;
            }
            self.inlining.push(binding.clone());
        } else {
            self.imported.insert(binding.clone());
        }

        self.dirty |= !target.is_cached();

        self.line(format_args!("// begin import {binding}"));
        self.expand(region, counter, false);
        self.line(format_args!("// end import {binding}"));

        if is_macro {
            self.inlining.pop();
        }
    }

    fn finish(self, shader: &Shader) -> Expansion {
        Expansion {
            name: shader.name().to_string(),
            text: self.out,
            modified: shader.will_modify(),
            dirty: self.dirty,
            diagnostics: self.diagnostics,
        }
    }
}

/// Expand one shader of a finished index
pub(crate) fn expand_shader(index: &ShaderIndex, shader: &Shader, options: &ExpandOptions) -> Expansion {
    let mut resolver = Resolver::new(index, !shader.is_cached());
    resolver.line(shader.stamp().header());

    if !shader.will_modify() {
        return resolver.finish(shader);
    }

    resolver
        .imported
        .insert(ImportBinding::new(shader.name(), Region::Export));

    if shader.is_skipped() {
        resolver.line("// shader skipped by skip_compilation");
        resolver.line("void main() {}");
    } else if let Some(variant) = shader.variant() {
        resolver.line(format_args!("// variant of {}", variant.base));
        for define in &variant.defines {
            resolver.line(format_args!("#define {define}"));
        }
        resolver.line("");

        match index.get(&variant.base) {
            Some(base) => {
                resolver.dirty |= !base.is_cached();
                resolver
                    .imported
                    .insert(ImportBinding::new(base.name(), Region::Export));
                resolver.expand(base.lines(), options.line_offset, true);
            }
            None => {
                resolver.dirty = true;
                resolver.diagnostics.push(
                    Diagnostic::MissingVariantBase {
                        shader: shader.name().to_string(),
                        base: variant.base.clone(),
                    }
                    .report(),
                );
            }
        }
    } else {
        resolver.expand(shader.lines(), options.line_offset, true);
    }

    resolver.finish(shader)
}
