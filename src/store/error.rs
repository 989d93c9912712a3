use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreError {
    /// No stock is stored under the symbol
    StockNotFound(String),

    /// A rename targets a symbol that is already taken
    DuplicateSymbol(String),

    /// Command name not recognised by the interpreter
    UnknownCommand(String),

    /// Command line has fewer tokens than the command needs
    MissingArguments {
        command: String,
        expected: usize,
        found: usize,
    },

    /// A numeric field failed to parse
    InvalidNumber { field: String, value: String },

    /// Line with no tokens
    EmptyCommand,

    /// Reading or writing failed
    Io(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::StockNotFound(symbol) => write!(f, "Stock not found: {}", symbol),
            StoreError::DuplicateSymbol(symbol) => write!(f, "Symbol already exists: {}", symbol),
            StoreError::UnknownCommand(command) => write!(f, "Unknown command: {}", command),
            StoreError::MissingArguments {
                command,
                expected,
                found,
            } => write!(
                f,
                "{} expects {} arguments, found {}",
                command, expected, found
            ),
            StoreError::InvalidNumber { field, value } => {
                write!(f, "Invalid {}: {}", field, value)
            }
            StoreError::EmptyCommand => write!(f, "Empty command"),
            StoreError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
