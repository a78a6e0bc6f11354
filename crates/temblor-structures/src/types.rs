// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Core error handling for source model structures.
*/

use thiserror::Error;

/// Result type for source model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for source model reading and construction
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid source model XML: {0}")]
    Xml(String),

    #[error("invalid source '{id}': {reason}")]
    InvalidSource { id: String, reason: String },

    #[error("source model defines no sources")]
    EmptyModel,
}

// Convert from std::io::Error
impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err.to_string())
    }
}

// Convert from roxmltree::Error
impl From<roxmltree::Error> for ModelError {
    fn from(err: roxmltree::Error) -> Self {
        ModelError::Xml(err.to_string())
    }
}
