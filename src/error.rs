//! Error types.
//!
//! `Error` covers everything that ends a run with exit status 2. Per-path
//! problems (`AccessError`, `WalkError`) are reported and the run carries on.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The role a pattern plays, used to name it in compile errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternRole {
    Search,
    Filename,
    SkipDirs,
    SkipFiles,
}

impl fmt::Display for PatternRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternRole::Search => "search-pattern",
            PatternRole::Filename => "filename-pattern",
            PatternRole::SkipDirs => "skip-dirs-pattern",
            PatternRole::SkipFiles => "skip-files-pattern",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error: no pattern given. At least search-pattern and/or filename-pattern needed.")]
    NoPattern,

    #[error("Exception compiling {role} regex: '{pattern}'")]
    Pattern {
        role: PatternRole,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The consumer of the primary output went away.
    #[error("broken pipe")]
    BrokenPipe,

    #[error("Interrupted")]
    Interrupted,

    #[error("error writing output: {0}")]
    Output(#[source] io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::BrokenPipe {
            Error::BrokenPipe
        } else {
            Error::Output(err)
        }
    }
}

/// A path that cannot be searched or descended into.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("File does not exist: {}", .0.display())]
    Missing(PathBuf),
    #[error("Broken symlink: {}", .0.display())]
    BrokenSymlink(PathBuf),
    #[error("Directory is not readable: {}", .0.display())]
    UnreadableDirectory(PathBuf),
    #[error("File is not readable: {}", .0.display())]
    UnreadableFile(PathBuf),
}

/// A directory the walker could not process. Only the subtree is lost.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("Error listing: {}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
