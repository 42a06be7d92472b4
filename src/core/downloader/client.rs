use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Url};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::error::{UpdaterError, UpdaterResult};

/// Sequential HTTP downloader with atomic-or-absent file writes.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    // ── Single file download ────────────────────────────

    /// Download `url` to `dest`, replacing any existing file.
    ///
    /// The body is streamed into `<dest>.part` and renamed into place only
    /// once fully written, so `dest` is either the complete file or left as
    /// it was. The partial file is removed on failure or cancellation.
    pub async fn download_file(
        &self,
        url: &Url,
        dest: &Path,
        cancel: Option<&CancellationToken>,
    ) -> UpdaterResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| UpdaterError::io(parent, e))?;
        }

        let part = part_path(dest);
        let result = self.stream_to(url, &part, cancel).await;
        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&part, dest).await {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(UpdaterError::io(dest, e));
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }

    async fn stream_to(
        &self,
        url: &Url,
        part: &Path,
        cancel: Option<&CancellationToken>,
    ) -> UpdaterResult<()> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Write inside a block so the handle is closed before the rename.
        {
            let mut file = tokio::fs::File::create(part)
                .await
                .map_err(|e| UpdaterError::io(part, e))?;

            let mut body = response.bytes_stream();
            loop {
                let chunk = match cancel {
                    Some(token) => tokio::select! {
                        _ = token.cancelled() => return Err(UpdaterError::Cancelled),
                        chunk = body.next() => chunk,
                    },
                    None => body.next().await,
                };
                let Some(chunk) = chunk else { break };
                file.write_all(&chunk?)
                    .await
                    .map_err(|e| UpdaterError::io(part, e))?;
            }

            file.flush().await.map_err(|e| UpdaterError::io(part, e))?;
        }

        Ok(())
    }

    // ── Metadata ────────────────────────────────────────

    /// Byte length the server reports for `url`, from a `HEAD` request.
    pub async fn content_length(&self, url: &Url) -> UpdaterResult<u64> {
        let response = self.client.head(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| UpdaterError::ContentLength {
                url: url.to_string(),
            })
    }

    /// GET `url` and return the body as text.
    pub async fn fetch_text(&self, url: &Url) -> UpdaterResult<String> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
