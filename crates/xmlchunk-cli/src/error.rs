// Dweve xmlchunk - Bounded-memory XML Element Extraction
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structured error types for the xmlchunk CLI.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use xmlchunk::ChunkerError;

/// Errors reported by CLI commands.
///
/// # Examples
///
/// ```rust,no_run
/// use xmlchunk_cli::error::CliError;
///
/// let result = std::fs::create_dir_all("out")
///     .map_err(|e| CliError::io_error("out", e));
/// ```
#[derive(Error, Debug)]
pub enum CliError {
    /// Writing output failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The path being written
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// Extraction failed.
    #[error("{0}")]
    Chunker(#[from] ChunkerError),

    /// Invalid input provided by the user.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Create an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = CliError::io_error(
            "out/box_000001.xml",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("out/box_000001.xml"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_invalid_input_display() {
        let err = CliError::invalid_input("entity must be NAME=VALUE");
        assert_eq!(err.to_string(), "Invalid input: entity must be NAME=VALUE");
    }

    #[test]
    fn test_chunker_error_passes_through() {
        let err: CliError = ChunkerError::config("chunk size must be positive").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: chunk size must be positive"
        );
    }
}
