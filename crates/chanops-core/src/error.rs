use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChanopsError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("unrecognized channel status: {0}")]
    UnrecognizedStatus(String),

    #[error("unreadable update stamp {path}: {value:?}")]
    BadStamp { path: String, value: String },

    #[error("updates limited to one per {cooldown_minutes} minutes; retry in {retry_secs}s")]
    RateLimited {
        cooldown_minutes: i64,
        retry_secs: i64,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ChanopsError>;
