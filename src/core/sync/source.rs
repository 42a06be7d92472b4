use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::intent::AssetFolder;
use super::listing::parse_listing;
use crate::core::downloader::Downloader;
use crate::core::error::UpdaterResult;
use crate::core::state::SessionContext;

/// Remote side of a reconciliation pass.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Decoded file names the server declares for `folder`.
    async fn list_files(&self, folder: AssetFolder) -> UpdaterResult<Vec<String>>;

    /// Byte length the server reports for one file.
    async fn remote_length(&self, folder: AssetFolder, name: &str) -> UpdaterResult<u64>;

    /// Fetch one file into `dest`. Must leave `dest` absent or complete.
    async fn download(&self, folder: AssetFolder, name: &str, dest: &Path) -> UpdaterResult<()>;
}

/// [`AssetSource`] backed by the server's download tree for one
/// profile and version path.
pub struct HttpAssetSource<'a> {
    downloader: &'a Downloader,
    session: &'a SessionContext,
    version_path: String,
}

impl<'a> HttpAssetSource<'a> {
    pub fn new(downloader: &'a Downloader, session: &'a SessionContext, version_path: String) -> Self {
        Self {
            downloader,
            session,
            version_path,
        }
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource<'_> {
    async fn list_files(&self, folder: AssetFolder) -> UpdaterResult<Vec<String>> {
        let url = self
            .session
            .downloads_url(&self.version_path, &[folder.dir_name()])?;
        let html = self.downloader.fetch_text(&url).await?;
        let names = parse_listing(&html);
        debug!("{} lists {} entries", url, names.len());
        Ok(names)
    }

    async fn remote_length(&self, folder: AssetFolder, name: &str) -> UpdaterResult<u64> {
        let url = self
            .session
            .downloads_url(&self.version_path, &[folder.dir_name(), name])?;
        self.downloader.content_length(&url).await
    }

    async fn download(&self, folder: AssetFolder, name: &str, dest: &Path) -> UpdaterResult<()> {
        let url = self
            .session
            .downloads_url(&self.version_path, &[folder.dir_name(), name])?;
        // Folder passes are never cancelled midway.
        self.downloader.download_file(&url, dest, None).await
    }
}
