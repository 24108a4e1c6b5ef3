use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::data_uri::DataUriError;

/// Asset whose byte payload is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Buffer(usize),
    Image(usize),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Buffer(index) => write!(f, "buffer {index}"),
            Resource::Image(index) => write!(f, "image {index}"),
        }
    }
}

/// Errors produced while decoding a glTF document or container.
#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("unable to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// Token stream does not describe a well-formed tree. `position` is the
    /// index of the offending token.
    #[error("malformed JSON at token {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("data URI decode failed")]
    DecodeFailure(#[from] DataUriError),

    #[error("{resource}: {message}")]
    InvalidReference { resource: Resource, message: String },

    #[error("failed to resolve {resource}")]
    Payload {
        resource: Resource,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn payload(resource: Resource, source: Error) -> Self {
        Error::Payload {
            resource,
            source: Box::new(source),
        }
    }

    /// Returns the innermost error, looking through payload wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Payload { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
