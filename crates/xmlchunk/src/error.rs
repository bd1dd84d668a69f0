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

//! Error types for the chunker.
//!
//! Every fatal condition aborts the whole parse and surfaces as one
//! [`ChunkerError`]. Fragments dispatched before the failure are not rolled
//! back.
//!
//! # Error Categories
//!
//! - **I/O Errors**: Reading the byte source failed
//! - **Configuration Errors**: Bad chunk size, invalid tag or entity name,
//!   unreadable source, misuse of the incremental parser
//! - **DTD Errors**: Entities were registered but the DOCTYPE cannot be patched
//! - **Syntax Errors**: The document is not well-formed XML
//! - **Structure Errors**: Fundamental elements nest, or close without opening
//!
//! # Example
//!
//! ```rust
//! use xmlchunk::{ChunkerError, XmlChunker};
//! use std::io::Cursor;
//!
//! let xml = "<truck><box><box></box></box></truck>";
//! let chunker = XmlChunker::new(Cursor::new(xml), "box").unwrap();
//!
//! match chunker.for_each_fragment(|_| {}) {
//!     Err(ChunkerError::NestedFundamental { tag, line }) => {
//!         assert_eq!(tag, "box");
//!         assert_eq!(line, 1);
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Syntax error codes reported by the event parser.
///
/// The numeric values follow the classic expat numbering so that codes in
/// log output line up with what other XML tooling reports for the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlErrorCode {
    /// Generic syntax error.
    Syntax = 2,
    /// No root element, or elements still open at end of input.
    NoElements = 3,
    /// Malformed token or content where none is allowed.
    InvalidToken = 4,
    /// Markup still open at end of input.
    UnclosedToken = 5,
    /// Input ends inside a multi-byte character.
    PartialChar = 6,
    /// End tag does not match the open element.
    TagMismatch = 7,
    /// Attribute appears twice on one element.
    DuplicateAttribute = 8,
    /// Content after the root element closed.
    JunkAfterDocElement = 9,
    /// Reference to an entity that was never declared.
    UndefinedEntity = 11,
    /// Character reference to an invalid code point.
    BadCharRef = 14,
    /// XML declaration anywhere but the document start.
    MisplacedXmlPi = 17,
    /// CDATA section still open at end of input.
    UnclosedCdataSection = 20,
}

impl XmlErrorCode {
    /// Numeric error code.
    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Short human-readable description of the code.
    pub fn description(self) -> &'static str {
        match self {
            Self::Syntax => "syntax error",
            Self::NoElements => "no element found",
            Self::InvalidToken => "not well-formed (invalid token)",
            Self::UnclosedToken => "unclosed token",
            Self::PartialChar => "partial character",
            Self::TagMismatch => "mismatched tag",
            Self::DuplicateAttribute => "duplicate attribute",
            Self::JunkAfterDocElement => "junk after document element",
            Self::UndefinedEntity => "undefined entity",
            Self::BadCharRef => "reference to invalid character number",
            Self::MisplacedXmlPi => "XML or text declaration not at start of entity",
            Self::UnclosedCdataSection => "unclosed CDATA section",
        }
    }
}

impl fmt::Display for XmlErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.description())
    }
}

/// Errors that abort a chunked parse.
///
/// # Examples
///
/// ```rust
/// use xmlchunk::{ChunkerError, XmlErrorCode};
///
/// let err = ChunkerError::syntax(XmlErrorCode::TagMismatch, 12, "expected </b>, found </c>");
/// assert_eq!(err.line(), Some(12));
/// assert!(err.to_string().contains("mismatched tag"));
/// assert!(err.to_string().contains("line 12"));
/// ```
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Reading the byte source failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or API misuse.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The DOCTYPE could not be rewritten to carry registered entities.
    #[error("Unsupported DTD: {0}")]
    UnsupportedDtd(String),

    /// The document is not well-formed.
    #[error("XML syntax error {code} at line {line}: {message}")]
    XmlSyntax {
        code: XmlErrorCode,
        line: usize,
        message: String,
    },

    /// A fundamental element was opened inside another one.
    #[error("Nested fundamental element <{tag}> at line {line}")]
    NestedFundamental { tag: String, line: usize },

    /// A fundamental closing tag appeared with no fundamental element open.
    #[error("Closing tag </{tag}> at line {line} has no open fundamental element")]
    UnmatchedClose { tag: String, line: usize },
}

impl ChunkerError {
    /// Create a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an unsupported-DTD error.
    #[inline]
    pub fn unsupported_dtd(message: impl Into<String>) -> Self {
        Self::UnsupportedDtd(message.into())
    }

    /// Create a syntax error.
    #[inline]
    pub fn syntax(code: XmlErrorCode, line: usize, message: impl Into<String>) -> Self {
        Self::XmlSyntax {
            code,
            line,
            message: message.into(),
        }
    }

    /// Get the line number if available.
    #[inline]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::XmlSyntax { line, .. }
            | Self::NestedFundamental { line, .. }
            | Self::UnmatchedClose { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Get the syntax error code if this is a syntax error.
    #[inline]
    pub fn xml_code(&self) -> Option<XmlErrorCode> {
        match self {
            Self::XmlSyntax { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for chunker operations.
pub type ChunkerResult<T> = Result<T, ChunkerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    // ==================== XmlErrorCode tests ====================

    #[test]
    fn test_codes_follow_expat_numbering() {
        assert_eq!(XmlErrorCode::NoElements.code(), 3);
        assert_eq!(XmlErrorCode::TagMismatch.code(), 7);
        assert_eq!(XmlErrorCode::JunkAfterDocElement.code(), 9);
        assert_eq!(XmlErrorCode::UnclosedCdataSection.code(), 20);
    }

    #[test]
    fn test_code_display() {
        let display = XmlErrorCode::UnclosedToken.to_string();
        assert_eq!(display, "5 - unclosed token");
    }

    // ==================== ChunkerError variant tests ====================

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ChunkerError::from(io_err);
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_configuration_error() {
        let err = ChunkerError::config("chunk size must be positive");
        assert_eq!(
            err.to_string(),
            "Configuration error: chunk size must be positive"
        );
        assert_eq!(err.line(), None);
        assert_eq!(err.xml_code(), None);
    }

    #[test]
    fn test_unsupported_dtd_error() {
        let err = ChunkerError::unsupported_dtd("internal subset present");
        assert!(err.to_string().starts_with("Unsupported DTD"));
    }

    #[test]
    fn test_syntax_error() {
        let err = ChunkerError::syntax(XmlErrorCode::NoElements, 7, "unexpected end of input");
        let display = err.to_string();
        assert!(display.contains("3 - no element found"));
        assert!(display.contains("line 7"));
        assert!(display.contains("unexpected end of input"));
        assert_eq!(err.line(), Some(7));
        assert_eq!(err.xml_code(), Some(XmlErrorCode::NoElements));
    }

    #[test]
    fn test_structure_errors_carry_lines() {
        let nested = ChunkerError::NestedFundamental {
            tag: "box".to_string(),
            line: 4,
        };
        assert_eq!(nested.line(), Some(4));
        assert!(nested.to_string().contains("<box>"));

        let unmatched = ChunkerError::UnmatchedClose {
            tag: "box".to_string(),
            line: 9,
        };
        assert_eq!(unmatched.line(), Some(9));
        assert!(unmatched.to_string().contains("</box>"));
    }
}
