use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::version::VersionTable;

/// Everything resolved once at startup and shared read-only by the rest of
/// the run. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct SessionContext {
    server: Url,
    profile: String,
    versions: VersionTable,
    motd: Vec<String>,
    game_path: PathBuf,
}

impl SessionContext {
    pub fn new(
        server: Url,
        profile: String,
        versions: VersionTable,
        motd: Vec<String>,
        game_path: PathBuf,
    ) -> Self {
        Self {
            server,
            profile,
            versions,
            motd,
            game_path,
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn versions(&self) -> &VersionTable {
        &self.versions
    }

    pub fn motd(&self) -> &[String] {
        &self.motd
    }

    /// Game directory used when a profile does not set its own.
    pub fn game_path(&self) -> &Path {
        &self.game_path
    }

    /// `{server}/minecraft/downloads/{profile}/{versionPath}` plus `segments`.
    pub fn downloads_url(&self, version_path: &str, segments: &[&str]) -> UpdaterResult<Url> {
        let mut all = vec!["minecraft", "downloads", self.profile.as_str(), version_path];
        all.extend_from_slice(segments);
        join_segments(&self.server, &all)
    }
}

/// `{server}/minecraft/profiles/{profile}/{file}`.
pub fn profile_url(server: &Url, profile: &str, file: &str) -> UpdaterResult<Url> {
    join_segments(server, &["minecraft", "profiles", profile, file])
}

/// Parse the configured server address as a base URL.
pub fn parse_server_url(server: &str) -> UpdaterResult<Url> {
    let url = Url::parse(server).map_err(|e| UpdaterError::InvalidUrl {
        url: server.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(UpdaterError::InvalidUrl {
            url: server.to_string(),
            reason: "not a base URL".into(),
        });
    }
    Ok(url)
}

/// Append path segments to `base`, percent-encoding each one.
pub fn join_segments(base: &Url, segments: &[&str]) -> UpdaterResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| UpdaterError::InvalidUrl {
            url: base.to_string(),
            reason: "not a base URL".into(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(server: &str) -> SessionContext {
        SessionContext::new(
            parse_server_url(server).unwrap(),
            "Alpaka".into(),
            VersionTable::default(),
            Vec::new(),
            PathBuf::from("/games/.minecraft"),
        )
    }

    #[test]
    fn downloads_url_with_and_without_trailing_slash() {
        for server in ["https://mc.example.com/", "https://mc.example.com"] {
            let url = session(server)
                .downloads_url("1.20.1-forge-47.2.0", &["mods", "jei.jar"])
                .unwrap();
            assert_eq!(
                url.as_str(),
                "https://mc.example.com/minecraft/downloads/Alpaka/1.20.1-forge-47.2.0/mods/jei.jar"
            );
        }
    }

    #[test]
    fn segments_are_encoded() {
        let url = session("https://mc.example.com/files/")
            .downloads_url("v", &["resourcepacks", "My Pack #2.zip"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://mc.example.com/files/minecraft/downloads/Alpaka/v/resourcepacks/My%20Pack%20%232.zip"
        );
    }

    #[test]
    fn profile_url_shape() {
        let url = profile_url(
            &parse_server_url("https://mc.example.com/").unwrap(),
            "Alpaka",
            "versions.json",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://mc.example.com/minecraft/profiles/Alpaka/versions.json"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(parse_server_url("mailto:someone@example.com").is_err());
        assert!(parse_server_url("not a url").is_err());
    }
}
