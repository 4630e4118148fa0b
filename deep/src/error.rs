use std::io;

use thiserror::Error;

use crate::value::Type;

/// Errors reported by comparison and printing.
#[derive(Debug, Error)]
pub enum Error {
    /// The values contain something that can't be compared structurally.
    #[error("unsupported comparison of {ty}: {reason}")]
    Unsupported {
        /// Type of the offending value.
        ty: Type,
        /// What is unsupported about it.
        reason: &'static str,
    },
    /// Writing the rendering of an argument failed.
    #[error("printing argument {arg} failed")]
    Print {
        /// Position of the argument.
        arg: usize,
        /// The underlying write failure.
        #[source]
        source: io::Error,
    },
    /// Writing to the output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn unsupported(ty: Type, reason: &'static str) -> Self {
        Error::Unsupported { ty, reason }
    }
}
