//! Shader model
//!
//! A shader owns its lines once; regions are ordered lists of indices into
//! that arena, so one line can belong to any number of regions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cache::CacheStamp;

const EXPORT_REGION: &str = "__shady_export";
const MACRO_REGION_PREFIX: &str = "__shady_macro_";

/// Name of a region inside a shader
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    /// Every top-level line outside the entry point
    Export,
    /// A `#define`, assignment target or function
    Symbol(String),
    /// A `macro_begin`/`macro_end` block
    Macro(String),
}

impl Region {
    pub fn is_macro(&self) -> bool {
        matches!(self, Region::Macro(_))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Export => f.write_str(EXPORT_REGION),
            Region::Symbol(name) => f.write_str(name),
            Region::Macro(name) => write!(f, "{MACRO_REGION_PREFIX}{name}"),
        }
    }
}

/// "Splice region `region` of `shader` here"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportBinding {
    pub shader: String,
    pub region: Region,
}

impl ImportBinding {
    pub fn new(shader: impl Into<String>, region: Region) -> Self {
        Self { shader: shader.into(), region }
    }

    /// The binding that pulls in the whole of the same shader
    pub fn whole_shader(&self) -> ImportBinding {
        ImportBinding::new(self.shader.clone(), Region::Export)
    }
}

impl fmt::Display for ImportBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.shader, self.region)
    }
}

/// One physical source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderLine {
    /// Owning shader's file name
    pub shader: Arc<str>,
    /// Zero-based line index in the source file
    pub index: usize,
    pub text: String,
    /// Set when this line is an import/inline directive
    pub binding: Option<ImportBinding>,
    /// Directive lines that contribute nothing to output
    pub dropped: bool,
}

impl ShaderLine {
    /// 1-based line number, as reported in diagnostics
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Variant declaration: the base shader plus the defines to prepend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    pub base: String,
    pub defines: Vec<String>,
}

/// Collaborator-facing input for one shader file
#[derive(Debug, Clone)]
pub struct ShaderSource {
    /// File name with extension, the shader's identity
    pub name: String,
    pub text: String,
    /// Last-modified time of the source file
    pub modified: DateTime<Utc>,
    /// First line of the previous expansion, if there is one
    pub cached_header: Option<String>,
    /// Where the source came from, for `print_path`
    pub origin: Option<PathBuf>,
}

impl ShaderSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>, modified: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            modified,
            cached_header: None,
            origin: None,
        }
    }

    pub fn with_cached_header(mut self, header: impl Into<String>) -> Self {
        self.cached_header = Some(header.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// A shader file split into lines and regions
#[derive(Debug, Clone)]
pub struct Shader {
    name: Arc<str>,
    extension: String,
    origin: Option<PathBuf>,
    stamp: CacheStamp,
    lines: Vec<ShaderLine>,
    regions: HashMap<Region, Vec<usize>>,
    pub(crate) variant: Option<VariantSpec>,
    pub(crate) will_modify: bool,
    pub(crate) is_cached: bool,
    pub(crate) is_skipped: bool,
}

impl Shader {
    pub fn from_source(source: &ShaderSource) -> Self {
        let name: Arc<str> = Arc::from(source.name.as_str());
        let extension = source
            .name
            .rfind('.')
            .map(|dot| source.name[dot..].to_string())
            .unwrap_or_default();

        let lines = source
            .text
            .lines()
            .enumerate()
            .map(|(index, text)| ShaderLine {
                shader: Arc::clone(&name),
                index,
                text: text.to_string(),
                binding: None,
                dropped: false,
            })
            .collect();

        let stamp = CacheStamp::new(source.modified);
        let is_cached = source
            .cached_header
            .as_deref()
            .and_then(CacheStamp::parse_header)
            .is_some_and(|previous| previous == stamp);

        Self {
            name,
            extension,
            origin: source.origin.clone(),
            stamp,
            lines,
            regions: HashMap::new(),
            variant: None,
            will_modify: false,
            is_cached,
            is_skipped: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension including the dot (`.fsh`), empty if the name has none
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn origin(&self) -> Option<&PathBuf> {
        self.origin.as_ref()
    }

    pub fn stamp(&self) -> CacheStamp {
        self.stamp
    }

    pub fn lines(&self) -> &[ShaderLine] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [ShaderLine] {
        &mut self.lines
    }

    pub fn variant(&self) -> Option<&VariantSpec> {
        self.variant.as_ref()
    }

    /// True once any directive was found
    pub fn will_modify(&self) -> bool {
        self.will_modify
    }

    /// True when the previous expansion was made from this exact source
    pub fn is_cached(&self) -> bool {
        self.is_cached
    }

    pub fn is_skipped(&self) -> bool {
        self.is_skipped
    }

    pub(crate) fn add_to_region(&mut self, region: Region, line: usize) {
        self.regions.entry(region).or_default().push(line);
    }

    pub fn has_region(&self, region: &Region) -> bool {
        self.regions.contains_key(region)
    }

    /// Lines of a region in source order
    pub fn region<'s>(
        &'s self,
        region: &Region,
    ) -> Option<impl Iterator<Item = &'s ShaderLine> + use<'s>> {
        self.regions
            .get(region)
            .map(|indices| indices.iter().map(|&i| &self.lines[i]))
    }

    pub fn region_names(&self) -> impl Iterator<Item = &Region> {
        self.regions.keys()
    }
}
