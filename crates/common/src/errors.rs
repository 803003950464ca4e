pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("model artifact error: {0}")]
    Artifact(#[source] anyhow::Error),
    #[error("scoring policy error: {0}")]
    Policy(#[source] anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn artifact(err: impl Into<anyhow::Error>) -> Self {
        Self::Artifact(err.into())
    }

    pub fn policy(err: impl Into<anyhow::Error>) -> Self {
        Self::Policy(err.into())
    }
}
