use thiserror::Error;

/// All errors the elevator itself can observe.
///
/// Playback failures are deliberately absent: the host owns those and they
/// never reach this crate.
#[derive(Debug, Error)]
pub enum ElevatorError {
    /// Options could not be parsed.
    #[error("invalid options: {0}")]
    Options(String),
    /// An audio resource could not be constructed from its path.
    #[error("cannot load audio '{path}': {reason}")]
    AudioLoad { path: String, reason: String },
    /// A host call threw.
    #[error("host error: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, ElevatorError>;

impl From<serde_json::Error> for ElevatorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Options(e.to_string())
    }
}

/// Shorthand constructors.
impl ElevatorError {
    pub fn audio_load(path: &str, reason: impl Into<String>) -> Self {
        Self::AudioLoad {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }
}
