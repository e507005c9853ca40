use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),
}

impl CoreError {
    /// Returns `true` when the command was refused and nothing changed.
    pub fn is_rejection(&self) -> bool {
        match self {
            CoreError::InvalidInput(_) => true,
            CoreError::Playback(err) => err.is_rejection(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
