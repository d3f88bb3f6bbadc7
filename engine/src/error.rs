use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to load catalogue: {0}")]
    Load(String),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid catalogue: {0}")]
    InvalidCatalogue(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Engine not initialized. Call init_engine(catalogue_json, config_json) first.")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, EngineError>;
