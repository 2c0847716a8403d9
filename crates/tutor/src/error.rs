use thiserror::Error;

#[derive(Debug, Error)]
pub enum TutorError {
    #[error("invalid tutor configuration: {0}")]
    Config(String),
}

impl TutorError {
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config(message.into())
    }
}
