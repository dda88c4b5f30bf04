//! Error handling and custom error types
//!
//! Provides unified error handling across the pipeline using thiserror, plus
//! the coarse [`ErrorKind`] taxonomy that decides what the user is shown.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

/// Failure classes a caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Generation,
    Render,
    Export,
    Unclassified,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse(_) => ErrorKind::Parse,
            // reqwest is only used to talk to the text-generation provider
            Error::Generation(_) | Error::Http(_) => ErrorKind::Generation,
            Error::Render(_) => ErrorKind::Render,
            Error::Export(_) => ErrorKind::Export,
            _ => ErrorKind::Unclassified,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Generation => "generation",
            ErrorKind::Render => "render",
            ErrorKind::Export => "export",
            ErrorKind::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
