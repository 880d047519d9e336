use crate::{BrowserVersion, Error, PlatformKey, Result};
use serde::Deserialize;

/// One downloadable chromedriver build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverArtifact {
    pub version: BrowserVersion,
    pub platform: PlatformKey,
    pub download_url: String,
}

/// Chrome-for-Testing `known-good-versions-with-downloads.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub versions: Vec<ManifestVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestVersion {
    pub version: String,
    #[serde(default)]
    pub downloads: ManifestDownloads,
}

/// Builds older than the Chrome-for-Testing era carry no chromedriver list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestDownloads {
    #[serde(default)]
    pub chromedriver: Vec<ManifestAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestAsset {
    pub platform: String,
    pub url: String,
}

impl Manifest {
    /// Pick the newest build sharing `major` and return its download for `platform`.
    ///
    /// The newest build decides: if it has no download for `platform`, older
    /// builds of the same major are not considered.
    pub fn select(&self, major: &str, platform: PlatformKey) -> Result<DriverArtifact> {
        let newest = self
            .versions
            .iter()
            .filter_map(|entry| BrowserVersion::parse(&entry.version).map(|v| (v, entry)))
            .filter(|(version, _)| version.major() == major)
            .max_by(|(a, _), (b, _)| a.cmp(b));

        let (version, entry) = newest.ok_or_else(|| Error::NoMatchingVersion {
            major: major.to_string(),
        })?;

        let asset = entry
            .downloads
            .chromedriver
            .iter()
            .find(|asset| asset.platform == platform.manifest_tag())
            .ok_or_else(|| Error::NoMatchingPlatform {
                version: version.to_string(),
                platform: platform.to_string(),
            })?;

        Ok(DriverArtifact {
            version,
            platform,
            download_url: asset.url.clone(),
        })
    }
}

/// Remote catalogue of chromedriver builds.
pub struct DriverRegistry {
    client: reqwest::Client,
    manifest_url: String,
}

impl DriverRegistry {
    pub fn new(client: reqwest::Client, manifest_url: impl Into<String>) -> Self {
        Self {
            client,
            manifest_url: manifest_url.into(),
        }
    }

    /// Fetch the manifest and select the driver for `major` on `platform`.
    pub async fn find_driver(&self, major: &str, platform: PlatformKey) -> Result<DriverArtifact> {
        let manifest = self.fetch_manifest().await?;
        let artifact = manifest.select(major, platform)?;

        tracing::info!(
            "Selected chromedriver {} for Chrome {} on {}",
            artifact.version,
            major,
            platform
        );

        Ok(artifact)
    }

    pub async fn fetch_manifest(&self) -> Result<Manifest> {
        tracing::debug!("Fetching driver manifest from {}", self.manifest_url);

        let response = self
            .client
            .get(&self.manifest_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Registry(format!("manifest request failed: {}", e)))?;

        let manifest: Manifest = response
            .json()
            .await
            .map_err(|e| Error::Registry(format!("manifest parse failed: {}", e)))?;

        tracing::debug!("Manifest lists {} versions", manifest.versions.len());
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::manifest_json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manifest(versions: &[(&str, &[&str])]) -> Manifest {
        serde_json::from_str(&manifest_json("https://dl.test", versions)).unwrap()
    }

    #[test]
    fn test_selects_numerically_greatest_same_major() {
        let m = manifest(&[
            ("120.0.1", &["linux64"]),
            ("120.0.9", &["linux64"]),
            ("119.9.9", &["linux64"]),
        ]);

        let artifact = m.select("120", PlatformKey::LinuxX64).unwrap();
        assert_eq!(artifact.version.as_str(), "120.0.9");
        assert_eq!(
            artifact.download_url,
            "https://dl.test/120.0.9/linux64/chromedriver-linux64.zip"
        );
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let m = manifest(&[
            ("120.0.6099.9", &["linux64"]),
            ("120.0.6099.109", &["linux64"]),
            ("120.0.6099.71", &["linux64"]),
        ]);

        let artifact = m.select("120", PlatformKey::LinuxX64).unwrap();
        assert_eq!(artifact.version.as_str(), "120.0.6099.109");
    }

    #[test]
    fn test_major_is_exact_segment_match() {
        let m = manifest(&[("12.0.1", &["linux64"]), ("120.0.1", &["linux64"])]);

        let artifact = m.select("12", PlatformKey::LinuxX64).unwrap();
        assert_eq!(artifact.version.as_str(), "12.0.1");
    }

    #[test]
    fn test_distinguishes_mac_architectures() {
        let m = manifest(&[("120.0.1", &["mac-x64", "mac-arm64"])]);

        let arm = m.select("120", PlatformKey::MacArm64).unwrap();
        assert!(arm.download_url.ends_with("chromedriver-mac-arm64.zip"));

        let intel = m.select("120", PlatformKey::MacX64).unwrap();
        assert!(intel.download_url.ends_with("chromedriver-mac-x64.zip"));
    }

    #[test]
    fn test_no_matching_version() {
        let m = manifest(&[("119.0.1", &["linux64"])]);

        match m.select("120", PlatformKey::LinuxX64) {
            Err(Error::NoMatchingVersion { major }) => assert_eq!(major, "120"),
            other => panic!("expected NoMatchingVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_no_matching_platform() {
        let m = manifest(&[("120.0.1", &["linux64"]), ("120.0.2", &["win64"])]);

        match m.select("120", PlatformKey::LinuxX64) {
            Err(Error::NoMatchingPlatform { version, platform }) => {
                assert_eq!(version, "120.0.2");
                assert_eq!(platform, "linux64");
            }
            other => panic!("expected NoMatchingPlatform, got {:?}", other),
        }
    }

    #[test]
    fn test_newest_without_chromedriver_does_not_fall_back() {
        let json = r#"{
            "versions": [
                {"version": "120.0.5", "downloads": {"chrome": []}},
                {"version": "120.0.9", "downloads": {}},
                {"version": "120.0.1", "downloads": {"chromedriver": [
                    {"platform": "linux64", "url": "https://dl.test/a.zip"}
                ]}}
            ]
        }"#;
        let m: Manifest = serde_json::from_str(json).unwrap();

        match m.select("120", PlatformKey::LinuxX64) {
            Err(Error::NoMatchingPlatform { version, .. }) => assert_eq!(version, "120.0.9"),
            other => panic!("expected NoMatchingPlatform, got {:?}", other),
        }
    }

    #[test]
    fn test_entries_without_downloads_still_parse() {
        let json = r#"{"versions": [{"version": "114.0.5735.90"}]}"#;
        let m: Manifest = serde_json::from_str(json).unwrap();

        assert!(matches!(
            m.select("114", PlatformKey::LinuxX64),
            Err(Error::NoMatchingPlatform { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_driver_fetches_manifest() {
        let server = MockServer::start().await;
        let body = manifest_json(&server.uri(), &[("120.0.9", &["linux64"])]);

        Mock::given(method("GET"))
            .and(path("/manifest.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let registry = DriverRegistry::new(
            reqwest::Client::new(),
            format!("{}/manifest.json", server.uri()),
        );
        let artifact = registry.find_driver("120", PlatformKey::LinuxX64).await.unwrap();

        assert_eq!(artifact.version.as_str(), "120.0.9");
        assert_eq!(artifact.platform, PlatformKey::LinuxX64);
    }

    #[tokio::test]
    async fn test_find_driver_reports_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let registry = DriverRegistry::new(
            reqwest::Client::new(),
            format!("{}/manifest.json", server.uri()),
        );
        let result = registry.find_driver("120", PlatformKey::LinuxX64).await;

        assert!(matches!(result, Err(Error::Registry(_))));
    }
}
