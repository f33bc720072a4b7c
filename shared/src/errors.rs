//! Shared error types for the emulator test harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid endpoint URL: {url} ({message})")]
    InvalidEndpoint { url: String, message: String },

    #[error("Invalid identifier: {input}")]
    InvalidId { input: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
