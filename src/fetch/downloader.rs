use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::{ffi::OsString, fs::{self, File}, io::Write, path::{Path, PathBuf}};
use tracing::debug;

use super::AssetSource;
use crate::{config::ProvisionConfig, error::ProvisionError};

const PROGRESS_TEMPLATE: &str =
    "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Downloads assets from `<base_url>/<file name>`.
///
/// Bodies are streamed into `<dest>.part` and renamed over `dest` once complete,
/// so a failed transfer never leaves a truncated file under the final name.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    cfg: ProvisionConfig,
}

impl HttpSource {
    pub fn new(cfg: &ProvisionConfig) -> Result<Self, ProvisionError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ProvisionError::Request { url: cfg.base_url.clone(), source })?;
        Ok(Self::with_client(cfg, client))
    }

    pub fn with_client(cfg: &ProvisionConfig, client: reqwest::Client) -> Self {
        Self { client, cfg: cfg.clone() }
    }

    async fn download(&self, url: &str, file_name: &str, part: &Path) -> Result<u64, ProvisionError> {
        let request_err = |source: reqwest::Error| ProvisionError::Request { url: url.to_string(), source };

        let mut resp = self.client.get(url).send().await.map_err(request_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProvisionError::Status { url: url.to_string(), status });
        }

        let pb = self.progress_bar(resp.content_length(), file_name);
        let mut file = File::create(part).map_err(|e| ProvisionError::io("creating", part, e))?;
        let mut written = 0u64;
        while let Some(chunk) = resp.chunk().await.map_err(request_err)? {
            file.write_all(&chunk).map_err(|e| ProvisionError::io("writing", part, e))?;
            written += chunk.len() as u64;
            pb.inc(chunk.len() as u64);
        }
        file.sync_all().map_err(|e| ProvisionError::io("syncing", part, e))?;
        pb.finish_and_clear();
        Ok(written)
    }

    fn progress_bar(&self, len: Option<u64>, file_name: &str) -> ProgressBar {
        if !self.cfg.show_progress {
            return ProgressBar::hidden();
        }
        let pb = match len {
            Some(n) => {
                let pb = ProgressBar::new(n);
                let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> ");
                pb.set_style(style);
                pb
            }
            None => ProgressBar::new_spinner(),
        };
        pb.set_message(file_name.to_string());
        pb
    }
}

#[async_trait]
impl AssetSource for HttpSource {
    async fn fetch(&self, file_name: &str, dest: &Path) -> Result<u64, ProvisionError> {
        let url = self.cfg.url_for(file_name);
        let part = part_path(dest);
        debug!(url = %url, dest = %dest.display(), "GET");

        match self.download(&url, file_name, &part).await {
            Ok(bytes) => {
                commit(&part, dest)?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = fs::remove_file(&part);
                Err(e)
            }
        }
    }
}

/// Move a finished download into place. The staged file is removed if the
/// move fails.
fn commit(part: &Path, dest: &Path) -> Result<(), ProvisionError> {
    fs::rename(part, dest).map_err(|e| {
        let _ = fs::remove_file(part);
        ProvisionError::io("renaming", dest, e)
    })
}

/// Sibling path a download is staged in before it is moved into place.
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
