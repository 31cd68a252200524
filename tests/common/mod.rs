//! Common test utilities and harness
//!
//! Provides an isolated project directory with helpers to write shaders,
//! read them back and run the build steps against it.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use shady::{BuildOptions, PreReport, Project};
use shady_config::BuildConfig;
use tempfile::TempDir;

/// Test environment with an isolated project directory
pub struct TestEnvironment {
    /// Temporary project directory
    pub temp_dir: TempDir,
    /// Path to the shader folder inside it
    pub shaders_dir: PathBuf,
}

impl TestEnvironment {
    /// Create a new isolated project with an empty shader folder
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let shaders_dir = temp_dir.path().join("shaders");
        fs::create_dir_all(&shaders_dir).expect("Failed to create shaders directory");

        Self {
            temp_dir,
            shaders_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn project(&self) -> Project {
        Project::new(self.root(), BuildConfig::default())
    }

    /// Write `shaders/<name>/<name>.<ext>` the way IDE projects lay shaders out
    pub fn write_shader(&self, file_name: &str, content: &str) -> PathBuf {
        let stem = file_name.split('.').next().unwrap_or(file_name);
        let dir = self.shaders_dir.join(stem);
        fs::create_dir_all(&dir).expect("Failed to create shader directory");

        let path = dir.join(file_name);
        fs::write(&path, content).expect("Failed to write test shader");
        path
    }

    /// Rewrite a shader and move its modification time forward so the
    /// change is visible to the cache regardless of timestamp resolution
    pub fn edit_shader(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.write_shader(file_name, content);
        let later = SystemTime::now() + Duration::from_secs(60);
        fs::File::options()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_modified(later))
            .expect("Failed to touch test shader");
        path
    }

    pub fn shader_path(&self, file_name: &str) -> PathBuf {
        let stem = file_name.split('.').next().unwrap_or(file_name);
        self.shaders_dir.join(stem).join(file_name)
    }

    pub fn read_shader(&self, file_name: &str) -> String {
        fs::read_to_string(self.shader_path(file_name)).expect("Failed to read test shader")
    }

    /// Contents of the `_mod` cache next to a shader
    pub fn read_cache(&self, file_name: &str) -> String {
        fs::read_to_string(shady::project::cache_path(&self.shader_path(file_name)))
            .expect("Failed to read shader cache")
    }

    pub fn has_cache(&self, file_name: &str) -> bool {
        shady::project::cache_path(&self.shader_path(file_name)).exists()
    }

    pub fn has_backup(&self, file_name: &str) -> bool {
        shady::project::backup_path(&self.shader_path(file_name)).exists()
    }

    pub fn pre(&self) -> PreReport {
        shady::pre(&self.project(), &BuildOptions::default(), None).expect("pre-build failed")
    }

    pub fn post(&self) -> usize {
        shady::post(&self.project(), None).expect("post-build failed")
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Expanded body without the cache metadata line
pub fn body(text: &str) -> Vec<&str> {
    text.lines().skip(1).collect()
}
