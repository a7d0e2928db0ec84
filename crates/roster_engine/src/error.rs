use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("worker pool could not be started: {0}")]
    WorkerPool(#[from] io::Error),
    #[error("invalid pool settings: {0}")]
    InvalidSettings(String),
}
