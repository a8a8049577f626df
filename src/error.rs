#[derive(Debug, thiserror::Error)]
pub enum StationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error encoding readings: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid reading payload: {0}")]
    Validation(String),
    #[error("Config parsing error: {0}")]
    Config(#[from] dotenvy::Error),
    #[error("Invalid config value: {0}")]
    InvalidConfig(String),
}
