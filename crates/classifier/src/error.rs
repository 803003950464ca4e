use std::path::PathBuf;

/// Raised while loading the trained vectorizer or classifier. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {artifact} artifact: {source}")]
    Parse {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {artifact} artifact: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },
}

impl ArtifactError {
    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            artifact,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArtifactError>;
