use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Failed to start dispatch loop: {0}")]
    Startup(#[from] std::io::Error),

    #[error("Dispatch loop is not running")]
    DispatchClosed,
}

pub type Result<T> = std::result::Result<T, SimError>;
