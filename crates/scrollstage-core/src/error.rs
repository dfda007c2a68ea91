use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stage count: {0} (a sequence needs at least one stage)")]
    InvalidStageCount(usize),

    #[error("Invalid threshold {value}: {reason}")]
    InvalidThreshold { value: f64, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
