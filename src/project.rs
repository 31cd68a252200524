//! Project layout on disk
//!
//! Shader discovery, the `_bak`/`_mod` sibling files and the moves between
//! them. Backups are made and restored by renaming, so a shader's
//! modification time survives a full pre/post cycle.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use shady_config::BuildConfig;
use shady_core::ShaderSource;

use crate::archive::Archive;

/// Suffix of the untouched original while a build is running
pub const BACKUP_SUFFIX: &str = "_bak";
/// Suffix of the expanded copy, kept between builds as a cache
pub const CACHE_SUFFIX: &str = "_mod";

/// A project directory and its shader folder
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    build: BuildConfig,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, build: BuildConfig) -> Self {
        Self {
            root: root.into(),
            build,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build(&self) -> &BuildConfig {
        &self.build
    }

    pub fn shaders_dir(&self) -> PathBuf {
        self.root.join(&self.build.shaders_dir)
    }

    /// Every shader file under the shader folder, sorted by path
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut shaders = Vec::new();
        visit_files(&self.shaders_dir(), &mut |path| {
            if self.build.is_shader(path) {
                shaders.push(path.to_path_buf());
            }
        })?;
        shaders.sort();
        Ok(shaders)
    }

    /// Every `_mod` cache file under the shader folder
    pub fn cache_files(&self) -> Result<Vec<PathBuf>> {
        self.siblings(CACHE_SUFFIX)
    }

    /// Every `_bak` backup under the shader folder, whether or not the
    /// shader it was moved from still exists
    pub fn backup_files(&self) -> Result<Vec<PathBuf>> {
        self.siblings(BACKUP_SUFFIX)
    }

    fn siblings(&self, suffix: &str) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        visit_files(&self.shaders_dir(), &mut |path| {
            if strip_suffix(path, suffix).is_some_and(|original| self.build.is_shader(&original)) {
                found.push(path.to_path_buf());
            }
        })?;
        found.sort();
        Ok(found)
    }
}

fn visit_files<F>(dir: &Path, visitor: &mut F) -> Result<()>
where
    F: FnMut(&Path),
{
    if !dir.is_dir() {
        return Ok(());
    }

    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))?;
    for entry in entries {
        let path = entry.with_context(|| format!("Failed to read {:?}", dir))?.path();
        if path.is_dir() {
            visit_files(&path, visitor)?;
        } else {
            visitor(&path);
        }
    }
    Ok(())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn strip_suffix(path: &Path, suffix: &str) -> Option<PathBuf> {
    path.to_str()
        .and_then(|p| p.strip_suffix(suffix))
        .map(PathBuf::from)
}

pub fn backup_path(shader: &Path) -> PathBuf {
    with_suffix(shader, BACKUP_SUFFIX)
}

pub fn cache_path(shader: &Path) -> PathBuf {
    with_suffix(shader, CACHE_SUFFIX)
}

/// File name used as the shader's identity
pub fn shader_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read a shader plus the header of its previous expansion
pub fn read_source(path: &Path) -> Result<ShaderSource> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let modified: DateTime<Utc> = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("Failed to read modification time of {:?}", path))?
        .into();

    let mut source = ShaderSource::new(shader_name(path), text, modified).with_origin(path);
    if let Some(header) = read_first_line(&cache_path(path))? {
        source = source.with_cached_header(header);
    }
    Ok(source)
}

fn read_first_line(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }

    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    BufReader::new(file)
        .lines()
        .next()
        .transpose()
        .with_context(|| format!("Failed to read {:?}", path))
}

/// True when the shader on disk already is its own expansion, i.e. a
/// previous build never restored it.
pub fn is_left_over_expansion(shader: &Path, text: &str) -> Result<bool> {
    let cache = cache_path(shader);
    if !cache.is_file() {
        return Ok(false);
    }

    let expanded = fs::read_to_string(&cache).with_context(|| format!("Failed to read {:?}", cache))?;
    Ok(text.lines().eq(expanded.lines()))
}

/// Move the shader aside to `<file>_bak`
pub fn backup(shader: &Path) -> Result<()> {
    let backup = backup_path(shader);
    fs::rename(shader, &backup)
        .with_context(|| format!("Failed to back up {:?} to {:?}", shader, backup))
}

/// Move every `<file>_bak` in the project back to `<file>`, archiving it
/// first if an archive is given. Returns the number of shaders restored.
pub fn restore(project: &Project, archive: Option<&Archive>) -> Result<usize> {
    let mut restored = 0;

    for backup in project.backup_files()? {
        let Some(shader) = strip_suffix(&backup, BACKUP_SUFFIX) else {
            continue;
        };

        if let Some(archive) = archive {
            match archive.store(&backup, &shader_name(&shader)) {
                Ok(Some(path)) => log::debug!("Archived {:?} as {:?}", shader, path),
                Ok(None) => {}
                Err(e) => log::warn!("Failed to archive {:?}: {:#}", shader, e),
            }
        }

        fs::rename(&backup, &shader)
            .with_context(|| format!("Failed to restore {:?} from {:?}", shader, backup))?;
        restored += 1;
    }

    Ok(restored)
}
