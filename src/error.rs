//! Error type shared by the counting core and its integrations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while setting up or feeding a counting run.
///
/// Only the setup variants (`MissingSource`, `SourceOpen`, line errors) stop a
/// run. The rest are logged by the pipeline and the run continues.
#[derive(Debug, Error)]
pub enum Error {
    /// Both line endpoints are equal, or not finite.
    #[error("counting line is degenerate: endpoints must be distinct finite points")]
    DegenerateLine,

    /// Line text could not be parsed as `x1,y1,x2,y2`.
    #[error("--line must be 'x1,y1,x2,y2', got {0:?}")]
    InvalidLine(String),

    /// No input reference was given.
    #[error("missing --source/--input")]
    MissingSource,

    /// The input stream could not be opened.
    #[error("could not open {}", path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// One line of replay input is not a valid frame record.
    #[error("malformed frame on line {line}: {source}")]
    MalformedFrame {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
