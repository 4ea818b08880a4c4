use std::path::Path;

use async_trait::async_trait;

use crate::error::ProvisionError;

pub mod downloader;

/// Something that can place a named asset at a destination path.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, file_name: &str, dest: &Path) -> Result<u64, ProvisionError>;
}

#[async_trait]
impl<S: AssetSource + ?Sized> AssetSource for &S {
    async fn fetch(&self, file_name: &str, dest: &Path) -> Result<u64, ProvisionError> {
        (**self).fetch(file_name, dest).await
    }
}
