use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The notification body could not be serialized.
    #[error("failed to serialize notification payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A construction property had a value of the wrong shape.
    #[error("invalid notification properties: {0}")]
    InvalidProperties(#[source] serde_json::Error),

    #[error("failed to read config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse notification defaults: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
