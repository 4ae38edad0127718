use std::path::PathBuf;
use std::time::Duration;

use crate::config::InstallConfig;
use crate::error::{FetchError, InstallError, Result};
use crate::host::Arch;

/// Local file header of a zip archive.
pub const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";
/// End-of-central-directory record, what an empty zip starts with.
pub const ZIP_EMPTY_MAGIC: &[u8; 4] = b"PK\x05\x06";

/// Retrieves a URL into memory.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("botstrap/{}", crate::VERSION.unwrap_or("0.0.0")))
            .timeout(None::<Duration>)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        log::debug!("GET {}", url);
        let resp = self.client.get(url).send()?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        let bytes = resp.bytes()?;
        if bytes.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(bytes.to_vec())
    }
}

/// Sniffs the first bytes rather than trusting the URL or Content-Type.
pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(ZIP_EMPTY_MAGIC)
}

/// Downloads the bot build for `arch` into the install root and marks it
/// executable. Any failure is fatal.
pub fn install_binary(fetcher: &impl Fetcher, config: &InstallConfig, arch: Arch) -> Result<PathBuf> {
    let url = config.binary_url(arch);
    log::info!("Downloading {} for {} from {}", config.binary_name, arch, url);

    let bytes = fetcher
        .fetch(&url)
        .map_err(|source| InstallError::Download { url: url.clone(), source })?;

    let dest = config.binary_path();
    crate::write_file(&dest, &bytes, 0o755)?;
    log::info!("Installed {} ({} bytes)", dest.display(), bytes.len());
    Ok(dest)
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned bodies; unknown URLs answer 404.
    #[derive(Default)]
    pub struct MockFetcher {
        bodies: HashMap<String, Vec<u8>>,
        requested: RefCell<Vec<String>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn serve(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.bodies.insert(url.to_string(), body.into());
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.borrow().clone()
        }
    }

    impl Fetcher for MockFetcher {
        fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            self.bodies.get(url).cloned().ok_or(FetchError::Status(404))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockFetcher;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn sniffs_zip_magic() {
        assert!(is_zip(b"PK\x03\x04rest-of-archive"));
        assert!(is_zip(b"PK\x05\x06\0\0\0\0"));
        assert!(!is_zip(b"<!DOCTYPE html><title>404</title>"));
        assert!(!is_zip(b"\x1f\x8b\x08\0"));
        assert!(!is_zip(b"PK"));
    }

    #[test]
    fn binary_is_fetched_for_detected_arch_and_made_executable() {
        let root = TempDir::new().unwrap();
        let config = InstallConfig::rooted_at(root.path());
        let url = config.binary_url(Arch::Arm64);
        let fetcher = MockFetcher::new().serve(&url, b"\x7fELF...".to_vec());

        let dest = install_binary(&fetcher, &config, Arch::Arm64).unwrap();

        assert_eq!(fetcher.requested(), vec![url]);
        assert_eq!(fs::read(&dest).unwrap(), b"\x7fELF...");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dest).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o755);
        }
    }

    #[test]
    fn failed_binary_download_is_fatal() {
        let root = TempDir::new().unwrap();
        let config = InstallConfig::rooted_at(root.path());

        match install_binary(&MockFetcher::new(), &config, Arch::X86_64) {
            Err(InstallError::Download { url, source: FetchError::Status(404) }) => {
                assert!(url.ends_with("bot-linux-x86_64"));
            }
            other => panic!("expected download error, got {other:?}"),
        }
        assert!(!config.binary_path().exists());
    }
}
