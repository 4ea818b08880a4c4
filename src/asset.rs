use std::{fs, path::{Path, PathBuf}};

use crate::config::ProvisionConfig;

/// The weight file and its config, valid only together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPair {
    pub model_path: PathBuf,
    pub config_path: PathBuf,
}

impl AssetPair {
    pub fn new(model_path: PathBuf, config_path: PathBuf) -> Self {
        Self { model_path, config_path }
    }

    pub fn in_dir(dir: &Path, cfg: &ProvisionConfig) -> Self {
        Self::new(dir.join(&cfg.model_file), dir.join(&cfg.config_file))
    }

    /// Both files exist, the config parses as JSON and the weights are non-empty.
    ///
    /// Never errors: anything that goes wrong while checking counts as invalid.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    fn check(&self) -> anyhow::Result<()> {
        if !self.model_path.is_file() {
            anyhow::bail!("missing {}", self.model_path.display());
        }
        if !self.config_path.is_file() {
            anyhow::bail!("missing {}", self.config_path.display());
        }
        let data = fs::read(&self.config_path)?;
        serde_json::from_slice::<serde_json::Value>(&data)?;
        if fs::metadata(&self.model_path)?.len() == 0 {
            anyhow::bail!("empty {}", self.model_path.display());
        }
        Ok(())
    }
}
