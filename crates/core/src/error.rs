use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no element with id `{0}`")]
    MissingElement(String),

    #[error("dom: {0}")]
    Dom(String),

    #[error("transport: {0}")]
    Transport(String),

    #[error("socket: {0}")]
    Socket(String),

    #[error("config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("unknown log level `{0}`")]
    InvalidLogLevel(String),
}
