//! Build steps
//!
//! `pre` runs before the shader compiler and swaps every shader that uses
//! directives for its expansion. `post` puts the originals back. `clean`
//! additionally drops the expansion cache.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use shady_core::{Diagnostic, ExpandOptions, Shader, classify_all};

use crate::archive::Archive;
use crate::project::{self, Project};

/// Settings for a `pre` run
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub workers: usize,
    pub expand: ExpandOptions,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            workers: shady_core::DEFAULT_WORKERS,
            expand: ExpandOptions::default(),
        }
    }
}

/// What a `pre` run did
#[derive(Debug, Default)]
pub struct PreReport {
    /// Shaders found under the shader folder
    pub shaders: usize,
    /// Shaders moved aside to `_bak`
    pub backed_up: usize,
    /// `_mod` files (re)written
    pub cached: usize,
    /// Shaders replaced by their expansion
    pub replaced: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Expand every shader in place, keeping the originals as `_bak`.
///
/// On a fatal error every shader backed up so far is restored before the
/// error is returned.
pub fn pre(project: &Project, options: &BuildOptions, archive: Option<&Archive>) -> Result<PreReport> {
    match run_pre(project, options, archive) {
        Ok(report) => {
            log::info!("Pre-Build Complete!");
            Ok(report)
        }
        Err(e) => {
            log::error!("Fatal Error. Trying to restore backed-up shaders");
            let restored = project::restore(project, None)?;
            log::info!("Restored {} shaders", restored);
            Err(e)
        }
    }
}

fn run_pre(project: &Project, options: &BuildOptions, archive: Option<&Archive>) -> Result<PreReport> {
    let left_over = project::restore(project, None)?;
    if left_over > 0 {
        log::warn!("Restored {} shaders left over from an unfinished build", left_over);
    }
    let shaders = project.discover()?;

    log::info!("Parse shaders");
    let started = Instant::now();

    let sources = shaders
        .iter()
        .map(|path| project::read_source(path))
        .collect::<Result<Vec<_>>>()?;
    let paths: HashMap<&str, &Path> = sources
        .iter()
        .zip(&shaders)
        .map(|(source, path)| (source.name.as_str(), path.as_path()))
        .collect();
    let texts: HashMap<&str, &str> = sources
        .iter()
        .map(|source| (source.name.as_str(), source.text.as_str()))
        .collect();

    let (index, mut diagnostics) =
        classify_all(sources.iter().map(Shader::from_source).collect(), options.workers)?;
    log::info!("Parsing took {} ms", started.elapsed().as_millis());

    let mut report = PreReport {
        shaders: index.len(),
        ..PreReport::default()
    };

    log::info!("Backup original shaders");
    for shader in index.iter().filter(|shader| shader.will_modify()) {
        let path = paths[shader.name()];
        if project::is_left_over_expansion(path, texts[shader.name()])? {
            log::error!("Integrity check for {} failed, it seems to be corrupted!", shader.name());
            log::error!("Try to find backup files in {:?}", project::backup_path(path));
            if let Some(archive) = archive {
                log::error!("Or in {:?}", archive.dir());
            }
            continue;
        }
        project::backup(path)?;
        report.backed_up += 1;
    }

    log::info!("Write modified shaders");
    for expansion in index.expand_all(&options.expand) {
        let path = paths[expansion.name.as_str()];
        let cache = project::cache_path(path);

        if expansion.dirty {
            fs::write(&cache, &expansion.text).with_context(|| format!("Failed to write {:?}", cache))?;
            report.cached += 1;
        }

        if expansion.modified {
            fs::copy(&cache, path).with_context(|| format!("Failed to replace {:?}", path))?;
            report.replaced += 1;
        }

        diagnostics.extend(expansion.diagnostics);
    }

    report.diagnostics = diagnostics;
    Ok(report)
}

/// Archive and restore every backed-up shader
pub fn post(project: &Project, archive: Option<&Archive>) -> Result<usize> {
    log::info!("Bring back original shaders");
    let restored = project::restore(project, archive)?;

    log::info!("Post-Build Complete!");
    log::info!(
        "Expanded shader sources stay next to their originals in {:?} with the '{}' suffix",
        project.shaders_dir(),
        project::CACHE_SUFFIX
    );
    Ok(restored)
}

/// Restore every backed-up shader and delete the expansion cache.
/// Returns the number of cache files removed.
pub fn clean(project: &Project) -> Result<usize> {
    log::info!("Bring back original shaders");
    project::restore(project, None)?;

    log::info!("Clean shader cache");
    let caches = project.cache_files()?;
    for cache in &caches {
        fs::remove_file(cache).with_context(|| format!("Failed to remove {:?}", cache))?;
    }

    log::info!("Clean Complete!");
    Ok(caches.len())
}
