use keyscroll_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid generator settings: {0}")]
    Config(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse note records: {0}")]
    Parse(String),
}

impl BuildError {
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config(message.into())
    }
}
