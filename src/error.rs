use std::{io, path::PathBuf};

use thiserror::Error;

/// Everything that can abort a generation call.
///
/// Words the packer could not place are not errors; see
/// [`PackOutcome::dropped`](crate::layout::PackOutcome::dropped).
#[derive(Debug, Error)]
pub enum Error {
    #[error("input: unable to read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("analysis: no words left to lay out")]
    EmptyInput,

    #[error("config: {0}")]
    InvalidConfig(String),

    #[error("config: malformed overrides: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("render: {0}")]
    Font(String),

    #[error("encode: {0}")]
    EncodingFailure(#[from] image::ImageError),

    #[error("save: unable to write {}: {source}", path.display())]
    SaveFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
