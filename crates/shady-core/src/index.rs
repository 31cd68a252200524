//! Shader index and the two build phases
//!
//! [`classify_all`] is the parallel phase: a fixed pool of workers pulls
//! shaders off a shared queue and classifies each one in isolation. Joining
//! the workers is the barrier; only then does a [`ShaderIndex`] exist, and it
//! hands out nothing but shared references for the serial expansion phase.

use std::collections::{BTreeMap, HashSet};
use std::thread;

use crossbeam_queue::SegQueue;

use crate::classifier::classify;
use crate::error::{CoreError, Diagnostic};
use crate::resolver::{ExpandOptions, Expansion, expand_shader};
use crate::shader::Shader;

/// Default size of the classification pool
pub const DEFAULT_WORKERS: usize = 4;

/// Every classified shader, by file name
#[derive(Debug, Default)]
pub struct ShaderIndex {
    shaders: BTreeMap<String, Shader>,
}

impl ShaderIndex {
    pub fn get(&self, name: &str) -> Option<&Shader> {
        self.shaders.get(name)
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Shaders in name order
    pub fn iter(&self) -> impl Iterator<Item = &Shader> {
        self.shaders.values()
    }

    /// Expand a single shader, `None` if it is not in the index
    pub fn expand(&self, name: &str, options: &ExpandOptions) -> Option<Expansion> {
        self.get(name).map(|shader| expand_shader(self, shader, options))
    }

    /// Expand every shader, in name order
    pub fn expand_all(&self, options: &ExpandOptions) -> Vec<Expansion> {
        self.iter()
            .map(|shader| expand_shader(self, shader, options))
            .collect()
    }
}

/// Classify every shader on a pool of `workers` threads.
///
/// Diagnostics are grouped by shader name, in line order within a shader.
pub fn classify_all(
    shaders: Vec<Shader>,
    workers: usize,
) -> Result<(ShaderIndex, Vec<Diagnostic>), CoreError> {
    let mut names = HashSet::with_capacity(shaders.len());
    for shader in &shaders {
        if !names.insert(shader.name().to_string()) {
            return Err(CoreError::DuplicateShader(shader.name().to_string()));
        }
    }

    let workers = workers.clamp(1, shaders.len().max(1));
    let pending = SegQueue::new();
    for shader in shaders {
        pending.push(shader);
    }
    let finished = SegQueue::new();

    thread::scope(|scope| -> Result<(), CoreError> {
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let handle = thread::Builder::new()
                .name(format!("shady-classify-{id}"))
                .spawn_scoped(scope, || {
                    while let Some(mut shader) = pending.pop() {
                        let diagnostics = classify(&mut shader);
                        finished.push((shader, diagnostics));
                    }
                })?;
            handles.push(handle);
        }

        let results: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
        if results.iter().any(Result::is_err) {
            return Err(CoreError::WorkerPanicked);
        }
        Ok(())
    })?;

    let mut index = ShaderIndex::default();
    let mut diagnostics = BTreeMap::new();
    while let Some((shader, found)) = finished.pop() {
        diagnostics.insert(shader.name().to_string(), found);
        index.shaders.insert(shader.name().to_string(), shader);
    }

    log::debug!("Classified {} shaders on {} workers", index.len(), workers);
    Ok((index, diagnostics.into_values().flatten().collect()))
}
