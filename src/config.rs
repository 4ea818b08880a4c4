use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Release the asset pair is pinned to.
pub const DEFAULT_BASE_URL: &str = "https://github.com/remsky/Kokoro-FastAPI/releases/download/v0.1.4";
pub const DEFAULT_MODEL_FILE: &str = "kokoro-v1_0.pth";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "KOKORO_PROVISION_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProvisionConfig {
    pub base_url: String,
    pub model_file: String,
    pub config_file: String,
    pub dir_mode: u32,
    pub file_mode: u32,
    pub show_progress: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            dir_mode: 0o755,
            file_mode: 0o644,
            show_progress: true,
        }
    }
}

impl ProvisionConfig {
    /// Load from `path`, or from the file named by `KOKORO_PROVISION_CONFIG`.
    /// Falls back to the pinned defaults when neither is set.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        };
        let Some(path) = path else { return Ok(Self::default()) };
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(data: &str) -> anyhow::Result<Self> {
        let cfg: ProvisionConfig = toml::from_str(data)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url cannot be empty");
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!("base_url must be http(s): {}", self.base_url);
        }
        for name in [&self.model_file, &self.config_file] {
            if name.is_empty() {
                anyhow::bail!("asset file name cannot be empty");
            }
            if name.contains('/') || name.contains('\\') {
                anyhow::bail!("asset file name '{}' cannot contain path separators", name);
            }
        }
        if self.model_file == self.config_file {
            anyhow::bail!("model_file and config_file must differ (both '{}')", self.model_file);
        }
        Ok(())
    }

    /// URL of a single asset under the release.
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_pinned_release() {
        let cfg = ProvisionConfig::default();
        assert_eq!(
            cfg.url_for(&cfg.model_file),
            "https://github.com/remsky/Kokoro-FastAPI/releases/download/v0.1.4/kokoro-v1_0.pth"
        );
        assert_eq!(cfg.dir_mode, 0o755);
        assert_eq!(cfg.file_mode, 0o644);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = ProvisionConfig::from_toml("base_url = \"http://mirror.local/v0.1.4/\"\nshow_progress = false\n").unwrap();
        assert_eq!(cfg.url_for("config.json"), "http://mirror.local/v0.1.4/config.json");
        assert_eq!(cfg.model_file, DEFAULT_MODEL_FILE);
        assert!(!cfg.show_progress);
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = ProvisionConfig::default();
        cfg.base_url = "ftp://example.com".into();
        assert!(cfg.validate().is_err());

        let mut cfg = ProvisionConfig::default();
        cfg.model_file = "../escape.pth".into();
        assert!(cfg.validate().is_err());

        let mut cfg = ProvisionConfig::default();
        cfg.config_file = cfg.model_file.clone();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provision.toml");
        std::fs::write(&path, "model_file = \"weights.pth\"\n").unwrap();
        let cfg = ProvisionConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.model_file, "weights.pth");
        assert_eq!(cfg.config_file, DEFAULT_CONFIG_FILE);
    }

    #[test]
    fn load_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ProvisionConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
