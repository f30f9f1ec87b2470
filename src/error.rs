use crate::domain::machine::{Operation, StateKind};
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by a single machine operation.
///
/// Every variant is returned before any field is written, so a failed call
/// leaves the machine exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MachineError {
    #[error("bad state: cannot {operation} in state {state}")]
    BadState {
        operation: Operation,
        state: StateKind,
    },
    #[error("invalid product: {0:?}")]
    InvalidProduct(String),
    #[error("out of stock: product {0:?}")]
    OutOfStock(String),
    #[error(
        "insufficient funds: product {product:?}, price: {price}, inserted amount: {inserted}"
    )]
    InsufficientFunds {
        product: String,
        price: u32,
        inserted: i64,
    },
    #[error("missing input: {0}")]
    MissingInput(&'static str),
    /// A core invariant was broken somewhere else. Not a user error.
    #[error("internal fault: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum VendingError {
    #[error(transparent)]
    Machine(#[from] MachineError),
    #[error("machine not found: {0:?}")]
    MachineNotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode config: {0}")]
    ConfigDecode(#[from] toml::de::Error),
    #[error("invalid value {value:?} for environment variable {key}")]
    ConfigEnv { key: &'static str, value: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = VendingError> = std::result::Result<T, E>;
