use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

/// Environment variable overriding the cache root
pub const CACHE_ENV: &str = "LEXICLASS_CACHE";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Bundle not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Bundle verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_name}")]
    HashMismatch {
        file_name: String,
        expected: String,
        actual: String,
    },
    #[error("Invalid bundle source: {0}")]
    InvalidSource(#[from] serde_json::Error),
    #[error("Unsafe name {0:?}: must be a single plain path component")]
    UnsafeName(String),
}

/// Accepts `name` only if it names one entry directly inside a directory:
/// no separators, no `..`, no root or drive prefix.
fn checked_component(name: &str) -> Result<&str, StoreError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(name),
        _ => Err(StoreError::UnsafeName(name.to_string())),
    }
}

/// One remote artifact of a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub file_name: String,
    pub url: String,
    pub sha256: String,
}

/// Where a bundle's files come from and what they must hash to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSource {
    pub name: String,
    pub files: Vec<ArtifactFile>,
}

impl BundleSource {
    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let bytes = fs::read(path)?;
        let source: Self = serde_json::from_slice(&bytes)?;
        source.validate()?;
        Ok(source)
    }

    /// Checks that the bundle name and every file name stay inside the bundle directory.
    pub fn validate(&self) -> Result<(), StoreError> {
        checked_component(&self.name)?;
        for file in &self.files {
            checked_component(&file.file_name)?;
        }
        Ok(())
    }
}

/// Caches model bundles on disk, downloading and verifying them on demand.
#[derive(Clone)]
pub struct BundleStore {
    bundles_dir: PathBuf,
    client: reqwest::Client,
    download_lock: Arc<Mutex<()>>,
}

/// Cache root resolution: an explicit override wins, then the platform cache
/// directory, then `~/.cache`, then the system temp directory.
fn bundles_dir_from(cache_override: Option<String>) -> PathBuf {
    if let Some(path) = cache_override.filter(|p| !p.is_empty()) {
        return PathBuf::from(path).join("bundles");
    }

    if let Some(cache_dir) = dirs::cache_dir() {
        return cache_dir.join("lexiclass").join("bundles");
    }

    if let Some(home_dir) = dirs::home_dir() {
        return home_dir.join(".cache").join("lexiclass").join("bundles");
    }

    env::temp_dir().join("lexiclass").join("bundles")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

impl BundleStore {
    /// Creates a new BundleStore with the default bundles directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::default_bundles_dir())
    }

    /// Returns the default bundles directory path, honoring `LEXICLASS_CACHE`
    pub fn default_bundles_dir() -> PathBuf {
        bundles_dir_from(env::var(CACHE_ENV).ok())
    }

    pub fn new<P: AsRef<Path>>(bundles_dir: P) -> io::Result<Self> {
        let bundles_dir = bundles_dir.as_ref().to_path_buf();
        fs::create_dir_all(&bundles_dir)?;
        Ok(Self {
            bundles_dir,
            client: reqwest::Client::new(),
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Replaces the HTTP client used for downloads (timeouts, proxies, TLS roots).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Directory of bundle `name`.
    ///
    /// # Errors
    /// - `UnsafeName` if `name` is not a single plain path component
    pub fn bundle_dir(&self, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.bundles_dir.join(checked_component(name)?))
    }

    /// Path of one bundle file; both names must be single plain path components.
    pub fn file_path(&self, name: &str, file_name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.bundle_dir(name)?.join(checked_component(file_name)?))
    }

    pub fn is_bundle_downloaded(&self, source: &BundleSource) -> Result<bool, StoreError> {
        let mut missing = Vec::new();
        for file in &source.files {
            if !self.file_path(&source.name, &file.file_name)?.exists() {
                missing.push(file.file_name.as_str());
            }
        }
        log::info!("Checking if bundle '{}' is downloaded (missing: {:?})", source.name, missing);
        Ok(missing.is_empty())
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, StoreError> {
        let bytes = fs::read(path)?;
        let hash = sha256_hex(&bytes);
        log::debug!("Verifying {:?}: {} bytes, hash {}, expected {}", path, bytes.len(), hash, expected_hash);
        Ok(hash == expected_hash)
    }

    /// Checks every file of the bundle against its expected SHA-256.
    /// Returns `Ok(false)` when a file is missing or corrupt.
    pub fn verify_bundle(&self, source: &BundleSource) -> Result<bool, StoreError> {
        for file in &source.files {
            let path = self.file_path(&source.name, &file.file_name)?;
            if !path.exists() {
                log::info!("Bundle file {:?} does not exist", path);
                return Ok(false);
            }
            if !self.verify_file(&path, &file.sha256)? {
                log::warn!("Bundle file {:?} failed verification", path);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Downloads every missing or corrupt file of the bundle.
    /// On failure, all of the bundle's files are removed.
    pub async fn download_bundle(&self, source: &BundleSource) -> Result<(), StoreError> {
        source.validate()?;
        let _lock = self.download_lock.lock().await;

        let bundle_dir = self.bundle_dir(&source.name)?;
        log::info!("Creating bundle directory at {:?}", bundle_dir);
        fs::create_dir_all(&bundle_dir)?;

        for file in &source.files {
            let path = self.file_path(&source.name, &file.file_name)?;
            if path.exists() && self.verify_file(&path, &file.sha256)? {
                log::info!("Existing file {:?} verified successfully", path);
                continue;
            }
            if let Err(e) = self.download_and_verify_file(file, &path).await {
                log::error!("Failed to set up {}: {}", file.file_name, e);
                let _ = self.remove_download(source);
                return Err(e);
            }
        }

        log::info!("Bundle '{}' ready to use", source.name);
        Ok(())
    }

    async fn download_and_verify_file(&self, file: &ArtifactFile, path: &Path) -> Result<(), StoreError> {
        log::info!("Downloading {} from {} to {:?}", file.file_name, file.url, path);
        let response = self.client.get(&file.url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        let hash = sha256_hex(&bytes);
        if hash != file.sha256 {
            log::error!("{} hash mismatch: expected {}, got {}", file.file_name, file.sha256, hash);
            return Err(StoreError::HashMismatch {
                file_name: file.file_name.clone(),
                expected: file.sha256.clone(),
                actual: hash,
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;

        if !self.verify_file(path, &file.sha256)? {
            return Err(StoreError::VerificationFailed);
        }
        Ok(())
    }

    /// Deletes the bundle's files. Names are checked before anything is removed.
    pub fn remove_download(&self, source: &BundleSource) -> Result<(), StoreError> {
        source.validate()?;
        for file in &source.files {
            let path = self.file_path(&source.name, &file.file_name)?;
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Ensures that a bundle is downloaded and verified, returning its directory.
    /// If the bundle doesn't exist, it will be downloaded.
    /// If verification fails, it will be re-downloaded.
    pub async fn ensure_bundle_downloaded(&self, source: &BundleSource) -> Result<PathBuf, StoreError> {
        if !self.is_bundle_downloaded(source)? {
            log::info!("Bundle not found, downloading...");
            self.download_bundle(source).await?;
        } else if !self.verify_bundle(source)? {
            log::info!("Bundle verification failed, re-downloading...");
            self.remove_download(source)?;
            self.download_bundle(source).await?;
        } else {
            log::info!("Bundle verification successful");
        }
        self.bundle_dir(&source.name)
    }

    /// Returns the bundle directory if the bundle is present and intact.
    pub fn require_bundle(&self, source: &BundleSource) -> Result<PathBuf, StoreError> {
        if !self.verify_bundle(source)? {
            return Err(StoreError::NotDownloaded(source.name.clone()));
        }
        self.bundle_dir(&source.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_override() {
        let path = bundles_dir_from(Some("/tmp/test-lexiclass-cache".to_string()));
        assert_eq!(path, PathBuf::from("/tmp/test-lexiclass-cache/bundles"));
    }

    #[test]
    fn test_platform_cache_without_override() {
        for cache_override in [None, Some(String::new())] {
            let path = bundles_dir_from(cache_override);
            assert!(path.ends_with("lexiclass/bundles"));
        }
    }

    #[test]
    fn test_checked_component() {
        assert!(checked_component("spam").is_ok());
        assert!(checked_component("model.v2.json").is_ok());
        for name in ["", ".", "..", "../x", "a/b", "/etc", "a/.", "./a"] {
            assert!(
                matches!(checked_component(name), Err(StoreError::UnsafeName(_))),
                "{:?} accepted", name
            );
        }
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
