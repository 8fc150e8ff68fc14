use thiserror::Error;

pub type Result<T> = std::result::Result<T, FleetError>;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("lane error: {0}")]
    Lane(#[from] LaneError),
    #[error("network error: {0}")]
    Net(#[from] RpcError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    MissingConfig(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown chain key `{0}`")]
    UnknownChain(String),
}

#[derive(Debug, Error)]
pub enum LaneError {
    #[error("lane `{key}` attempt still in flight after {waited_ms}ms; caller detached")]
    Timeout { key: String, waited_ms: u64 },
    #[error("lane `{key}` worker dropped before settling")]
    WorkerLost { key: String },
}

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("gas price read timed out after {waited_ms}ms on {chain}")]
    GasReadTimeout { chain: String, waited_ms: u64 },
}
