//! Backup archive
//!
//! Before `--post` restores a shader, its backup is copied into the archive
//! directory as `<file>_<yyyyMMdd_HHmmss>`. Only the newest copies are kept.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use shady_config::ArchiveConfig;

/// IDE cache directory exported to build scripts
pub const IDE_CACHE_ENV: &str = "YYMACROS_ide_cache_directory";
/// Per-project folder name inside the IDE cache directory
pub const PROJECT_CACHE_ENV: &str = "YYMACROS_project_cache_directory_name";

const ARCHIVE_DIR_NAME: &str = "Shady";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const STAMP_LEN: usize = 15;

#[derive(Debug, Clone)]
pub struct Archive {
    dir: PathBuf,
    keep: usize,
}

impl Archive {
    pub fn new(dir: impl Into<PathBuf>, keep: usize) -> Self {
        Self {
            dir: dir.into(),
            keep,
        }
    }

    /// Archive for the configured directory, or the IDE cache directory when
    /// none is configured. `None` if archiving is off or no location is known.
    pub fn from_config(config: &ArchiveConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let dir = config.directory.clone().or_else(ide_cache_dir)?;
        Some(Self::new(dir, config.keep))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `backup` into the archive under `file_name`.
    ///
    /// Returns the new archive path, or `None` when the newest archive of that
    /// file already has identical contents.
    pub fn store(&self, backup: &Path, file_name: &str) -> Result<Option<PathBuf>> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create archive directory {:?}", self.dir))?;

        let contents =
            fs::read(backup).with_context(|| format!("Failed to read backup {:?}", backup))?;

        if let Some(latest) = self.archives(file_name)?.first() {
            if fs::read(latest).is_ok_and(|previous| previous == contents) {
                log::debug!("{} unchanged since {:?}, not archived", file_name, latest);
                return Ok(None);
            }
        }

        let target = self
            .dir
            .join(format!("{}_{}", file_name, Local::now().format(STAMP_FORMAT)));
        fs::write(&target, &contents)
            .with_context(|| format!("Failed to write archive {:?}", target))?;

        self.prune(file_name)?;
        Ok(Some(target))
    }

    /// Archived copies of `file_name`, newest first
    pub fn archives(&self, file_name: &str) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let prefix = format!("{file_name}_");
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read archive directory {:?}", self.dir))?;

        let mut archives: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.strip_prefix(&prefix))
                    .is_some_and(is_stamp)
            })
            .collect();

        // Stamps sort lexically in time order
        archives.sort_unstable_by(|a, b| b.cmp(a));
        Ok(archives)
    }

    fn prune(&self, file_name: &str) -> Result<()> {
        for old in self.archives(file_name)?.into_iter().skip(self.keep) {
            fs::remove_file(&old).with_context(|| format!("Failed to remove {:?}", old))?;
            log::debug!("Pruned archive {:?}", old);
        }
        Ok(())
    }
}

fn ide_cache_dir() -> Option<PathBuf> {
    let base = std::env::var_os(IDE_CACHE_ENV)?;
    let project = std::env::var_os(PROJECT_CACHE_ENV)?;
    Some(PathBuf::from(base).join(project).join(ARCHIVE_DIR_NAME))
}

fn is_stamp(s: &str) -> bool {
    s.len() == STAMP_LEN
        && s.char_indices()
            .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stamp_shape() {
        assert!(is_stamp("20240131_235959"));
        assert!(!is_stamp("20240131-235959"));
        assert!(!is_stamp("bak"));
    }

    #[test]
    fn test_identical_backup_is_not_archived_twice() {
        let temp = TempDir::new().unwrap();
        let backup = temp.path().join("a.fsh_bak");
        fs::write(&backup, "void main() {}\n").unwrap();

        let archive = Archive::new(temp.path().join("archive"), 5);
        assert!(archive.store(&backup, "a.fsh").unwrap().is_some());
        assert!(archive.store(&backup, "a.fsh").unwrap().is_none());
        assert_eq!(archive.archives("a.fsh").unwrap().len(), 1);
    }

    #[test]
    fn test_old_archives_are_pruned() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("archive");
        fs::create_dir_all(&dir).unwrap();
        for day in 1..=4 {
            fs::write(dir.join(format!("a.fsh_2020010{day}_120000")), format!("old {day}")).unwrap();
        }
        fs::write(dir.join("b.fsh_20200101_120000"), "other shader").unwrap();

        let backup = temp.path().join("a.fsh_bak");
        fs::write(&backup, "new").unwrap();

        let archive = Archive::new(&dir, 3);
        let stored = archive.store(&backup, "a.fsh").unwrap().unwrap();

        let kept = archive.archives("a.fsh").unwrap();
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0], stored);
        assert!(kept[2].ends_with("a.fsh_20200103_120000"));
        assert_eq!(archive.archives("b.fsh").unwrap().len(), 1);
    }

    #[test]
    fn test_disabled_archive() {
        let config = ArchiveConfig {
            enabled: false,
            directory: Some(PathBuf::from("/tmp/archive")),
            keep: 5,
        };
        assert!(Archive::from_config(&config).is_none());

        let config = ArchiveConfig {
            enabled: true,
            ..config
        };
        let archive = Archive::from_config(&config).unwrap();
        assert_eq!(archive.dir(), Path::new("/tmp/archive"));
    }
}
