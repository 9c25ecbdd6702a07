use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::parsers::ClassParseError;

/// Failure conditions raised while inventorying a run.
///
/// Only `OutputWrite` escapes `Analyzer::run`; the other variants are logged
/// where they occur and the run moves on to the next entry or input.
#[derive(Debug, Error)]
pub enum ClassmapError {
    #[error("input '{path}' does not exist or is empty")]
    InputMissingOrEmpty { path: PathBuf },

    #[error("failed to read entry '{entry}' of {container}: {source}")]
    EntryRead {
        container: String,
        entry: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to open {container}: {source}")]
    ContainerOpen {
        container: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("malformed compiled type '{entry}': {source}")]
    MalformedType {
        entry: String,
        #[source]
        source: ClassParseError,
    },

    #[error("failed to write '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ClassmapError>;
