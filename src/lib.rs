pub mod asset;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fsperm;
pub mod provision;

pub use asset::AssetPair;
pub use config::ProvisionConfig;
pub use error::ProvisionError;
pub use fetch::{AssetSource, downloader::HttpSource};
pub use provision::Provisioner;

pub type Result<T> = anyhow::Result<T>;
