// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Error handling for logic tree loading, parsing and validation.

Two user-facing failure classes exist, matching the two ways an input can
be bad:

- [`LogicTreeError::Parsing`] - the file is unreadable, is not well-formed
  XML, violates the document structure, or references a file that cannot
  be read or parsed. `filename` always names the offending file, even when
  the failure originates in a nested referenced document.
- [`LogicTreeError::Validation`] - the document is well-formed but breaks
  a logic tree semantic rule. Carries the line of the offending element.

Either way construction of the tree fails outright; a partially built tree
is never observable. Inconsistencies between the validator and the
uncertainty applicator are programmer errors and panic instead.
*/

use std::path::PathBuf;

use thiserror::Error;

/// Result type for logic tree operations
pub type LtResult<T> = Result<T, LogicTreeError>;

/// Error types for logic tree parsing and validation
#[derive(Error, Debug)]
pub enum LogicTreeError {
    #[error("file '{filename}': {message}")]
    Parsing {
        /// Name of the offending file, relative to `basepath`.
        filename: String,
        basepath: PathBuf,
        message: String,
    },

    #[error("file '{filename}' line {lineno}: {message}")]
    Validation {
        filename: String,
        basepath: PathBuf,
        /// Line of the XML element that triggered the rule.
        lineno: u32,
        message: String,
    },
}

impl LogicTreeError {
    /// Absolute path to the affected file.
    pub fn filepath(&self) -> PathBuf {
        match self {
            LogicTreeError::Parsing {
                filename, basepath, ..
            }
            | LogicTreeError::Validation {
                filename, basepath, ..
            } => basepath.join(filename),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LogicTreeError::Parsing { message, .. }
            | LogicTreeError::Validation { message, .. } => message,
        }
    }

    /// Line number for validation errors, `None` for parsing errors.
    pub fn lineno(&self) -> Option<u32> {
        match self {
            LogicTreeError::Parsing { .. } => None,
            LogicTreeError::Validation { lineno, .. } => Some(*lineno),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filepath_joins_basepath() {
        let err = LogicTreeError::Parsing {
            filename: "smlt.xml".to_string(),
            basepath: PathBuf::from("/base"),
            message: "broken".to_string(),
        };
        assert_eq!(err.filepath(), PathBuf::from("/base/smlt.xml"));
        assert_eq!(err.message(), "broken");
        assert_eq!(err.lineno(), None);
    }

    #[test]
    fn test_display_includes_lineno() {
        let err = LogicTreeError::Validation {
            filename: "smlt.xml".to_string(),
            basepath: PathBuf::from("/base"),
            lineno: 7,
            message: "branchID 'b1' is not unique".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "file 'smlt.xml' line 7: branchID 'b1' is not unique"
        );
        assert_eq!(err.lineno(), Some(7));
    }
}
