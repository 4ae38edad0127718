use thiserror::Error;

use crate::config::VersionFloor;

/// Fatal installer errors. Anything that reaches `main` exits with status 1.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("this installer must be run as root (try: sudo botstrap)")]
    NotRoot,

    #[error("unsupported CPU architecture: {0}")]
    UnsupportedArch(String),

    #[error("could not provide Python {floor} or newer, every install strategy failed")]
    RuntimeUnavailable { floor: VersionFloor },

    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("server returned an empty body")]
    Empty,
}

pub type Result<T> = std::result::Result<T, InstallError>;
