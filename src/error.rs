use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("collection {id} has no images")]
    InvalidCollection { id: u32 },

    #[error("collection id {id} appears more than once")]
    DuplicateCollection { id: u32 },

    #[error("image index {index} is out of range for a collection of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to access config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, GalleryError>;
