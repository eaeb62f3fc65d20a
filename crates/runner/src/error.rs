use kiwi_gateway::ConfigError;
use kiwi_sim::SimError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulator error: {0}")]
    Simulator(#[from] SimError),

    #[error("Invalid arguments: {0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
