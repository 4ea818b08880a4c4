use std::{io, path::Path};

use tracing::{error, info, warn};

use crate::{
    asset::AssetPair,
    config::ProvisionConfig,
    error::ProvisionError,
    fetch::AssetSource,
    fsperm,
};

/// Directory set-up step run before the pre-check.
pub type PrepareDir = fn(&Path, u32) -> io::Result<()>;

/// Makes sure a directory holds a valid asset pair, fetching it on a miss.
pub struct Provisioner<S> {
    cfg: ProvisionConfig,
    source: S,
    prepare_dir: PrepareDir,
}

impl<S: AssetSource> Provisioner<S> {
    pub fn new(cfg: ProvisionConfig, source: S) -> Self {
        Self { cfg, source, prepare_dir: fsperm::prepare_dir }
    }

    /// Replace the directory set-up step (defaults to [`fsperm::prepare_dir`]).
    pub fn with_prepare_dir(mut self, prepare_dir: PrepareDir) -> Self {
        self.prepare_dir = prepare_dir;
        self
    }

    /// Idempotent: a directory that already holds a valid pair is left alone
    /// and no fetch is made.
    pub async fn ensure(&self, dir: &Path) -> Result<AssetPair, ProvisionError> {
        // Files already in place stay usable when permissions can't be changed.
        match (self.prepare_dir)(dir, self.cfg.dir_mode) {
            Ok(()) => info!(
                path = %dir.display(),
                mode = %format!("{:o}", self.cfg.dir_mode),
                "Permissions set"
            ),
            Err(e) => warn!(path = %dir.display(), error = %e, "Could not set permissions"),
        }

        match self.verify_or_fetch(dir).await {
            Ok(pair) => Ok(pair),
            Err(e) => {
                error!(path = %dir.display(), error = %e, "Failed to download model");
                Err(e)
            }
        }
    }

    async fn verify_or_fetch(&self, dir: &Path) -> Result<AssetPair, ProvisionError> {
        std::fs::create_dir_all(dir).map_err(|e| ProvisionError::io("creating", dir, e))?;

        let pair = AssetPair::in_dir(dir, &self.cfg);
        if pair.is_valid() {
            info!(path = %dir.display(), "Model files already exist and are valid");
            return Ok(pair);
        }

        info!("Downloading Kokoro v1.0 model files");
        self.fetch_pair(&pair).await?;

        if !pair.is_valid() {
            return Err(ProvisionError::Verification { dir: dir.to_path_buf() });
        }
        info!(path = %dir.display(), "Model files prepared");
        Ok(pair)
    }

    /// Weights first, then config. Stops at the first failure.
    async fn fetch_pair(&self, pair: &AssetPair) -> Result<(), ProvisionError> {
        let targets = [
            (&self.cfg.model_file, &pair.model_path),
            (&self.cfg.config_file, &pair.config_path),
        ];
        for (name, dest) in targets {
            info!(file = %name, "Downloading");
            let bytes = self.source.fetch(name, dest).await?;
            fsperm::set_mode(dest, self.cfg.file_mode)
                .map_err(|e| ProvisionError::io("setting permissions on", dest.as_path(), e))?;
            info!(file = %name, bytes, "Downloaded");
        }
        Ok(())
    }
}
