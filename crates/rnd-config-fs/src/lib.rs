// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem [`ConfigStore`] for the rendering proxy.
//!
//! One JSON file per key under the platform config directory. Writes go to a
//! temporary file in the same directory and are renamed into place, so a
//! reader never sees a half-written settings file.
#![forbid(unsafe_code)]

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rnd_config::{ConfigError, ConfigStore};
use tempfile::NamedTempFile;

/// JSON files under a base directory, one per key.
pub struct FsConfigStore {
    root: PathBuf,
}

impl FsConfigStore {
    /// Store under the user config directory (e.g. `~/.config/rnd-proxy`).
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("org", "openmicroscopy", "rnd-proxy")
            .ok_or_else(|| ConfigError::Other("no home directory to hold the config".into()))?;
        Self::with_base(dirs.config_dir())
    }

    /// Store under `root`, created if missing.
    pub fn with_base(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the files.
    pub fn base(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, key: &str) -> Result<PathBuf, ConfigError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if valid {
            Ok(self.root.join(format!("{key}.json")))
        } else {
            Err(ConfigError::Other(format!("invalid config key {key:?}")))
        }
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        fs::read(self.file_for(key)?).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::Io(err),
        })
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let target = self.file_for(key)?;
        let mut staged = NamedTempFile::new_in(&self.root)?;
        staged.write_all(data)?;
        staged.as_file().sync_all()?;
        staged.persist(&target).map_err(|e| ConfigError::Io(e.error))?;
        Ok(())
    }
}
