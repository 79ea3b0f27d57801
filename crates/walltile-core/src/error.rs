use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed configuration ({entry}): `{attribute}` {reason}")]
    MalformedSpec {
        entry: String,
        attribute: String,
        reason: String,
    },

    #[error("Couldn't find an entry for this process in the configuration ({key})")]
    UnresolvedIdentity { key: String },

    #[error("RANK must be an integer, got `{value}`")]
    InvalidRank { value: String },

    #[error("Geometry for {entry} does not fit in 32-bit pixel coordinates")]
    GeometryOverflow { entry: String },

    #[error(transparent)]
    Xml(#[from] roxmltree::Error),

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn malformed(
        entry: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedSpec {
            entry: entry.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means no entry in the document describes the current process.
    pub fn is_unresolved_identity(&self) -> bool {
        matches!(self, Self::UnresolvedIdentity { .. })
    }
}
