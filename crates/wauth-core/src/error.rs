//! Error types for wauth

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by a directory client, kept as the client produced it
pub type DirectorySource = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    // Construction Errors
    #[error("windows authentication strategy requires a verify function")]
    MissingVerify,

    #[error("Invalid strategy options: {0}")]
    InvalidOptions(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Directory Errors
    #[error("Directory error: {0}")]
    Directory(#[source] DirectorySource),

    // Verification Errors
    #[error(transparent)]
    Verify(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap any error raised while talking to the directory service.
    pub fn directory<E>(err: E) -> Self
    where
        E: Into<DirectorySource>,
    {
        Error::Directory(err.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingVerify => "MissingVerify",
            Error::InvalidOptions(_) => "InvalidOptions",
            Error::Config(_) => "ConfigError",
            Error::Directory(_) => "DirectoryError",
            Error::Verify(_) => "VerifyError",
            Error::Io(_) => "InternalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_directory_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::directory(io);

        assert_eq!(err.code(), "DirectoryError");
        assert_eq!(err.to_string(), "Directory error: refused");

        let source = err.source().expect("source");
        let io = source
            .downcast_ref::<std::io::Error>()
            .expect("io error kept unmodified");
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn test_verify_error_from_anyhow() {
        let err: Error = anyhow::anyhow!("account locked").into();
        assert_eq!(err.code(), "VerifyError");
        assert_eq!(err.to_string(), "account locked");
    }
}
