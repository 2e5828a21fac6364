// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A null or zero key was handed to a repository operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("storage: {0}")]
    Storage(String),
    #[error("serialization: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
