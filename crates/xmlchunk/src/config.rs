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

//! Chunker configuration.
//!
//! [`ChunkerConfig`] holds everything a parse needs besides the byte source:
//! the fundamental tag name, the chunk size and the table of entities to
//! inject into the DOCTYPE.
//!
//! # Examples
//!
//! ```rust
//! use xmlchunk::{ChunkerConfig, DEFAULT_CHUNK_SIZE};
//!
//! let config = ChunkerConfig::new("box")
//!     .unwrap()
//!     .with_chunk_size(64 * 1024)
//!     .unwrap()
//!     .with_entity("nbsp", "\u{a0}")
//!     .unwrap();
//!
//! assert_eq!(config.fundamental_tag(), "box");
//! assert_eq!(config.chunk_size(), 64 * 1024);
//! assert_eq!(config.entities().get("nbsp"), Some("\u{a0}"));
//! assert_ne!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
//! ```

use crate::error::{ChunkerError, ChunkerResult};

/// Default number of bytes read from the source at once (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Insertion-ordered table of entity names and their replacement text.
///
/// Names are unique. Registering a name twice replaces the earlier value but
/// keeps its original position, so the injected DOCTYPE lists declarations in
/// first-registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTable {
    entries: Vec<(String, String)>,
}

impl EntityTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with replacement text `value`.
    ///
    /// Fails with a configuration error if `name` is not a valid XML name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> ChunkerResult<()> {
        let name = name.into();
        if !is_valid_ncname(&name) {
            return Err(ChunkerError::config(format!(
                "invalid entity name: {:?}",
                name
            )));
        }
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        Ok(())
    }

    /// Look up the replacement text for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over `(name, value)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Configuration for one chunked parse.
///
/// Owned by the chunker and immutable once parsing starts.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    fundamental_tag: String,
    chunk_size: usize,
    entities: EntityTable,
}

impl ChunkerConfig {
    /// Create a configuration for the given fundamental tag name.
    ///
    /// The name must be a valid XML element name without a namespace prefix.
    pub fn new(fundamental_tag: impl Into<String>) -> ChunkerResult<Self> {
        let fundamental_tag = fundamental_tag.into();
        if !is_valid_ncname(&fundamental_tag) {
            return Err(ChunkerError::config(format!(
                "invalid fundamental tag name: {:?}",
                fundamental_tag
            )));
        }
        Ok(Self {
            fundamental_tag,
            chunk_size: DEFAULT_CHUNK_SIZE,
            entities: EntityTable::new(),
        })
    }

    /// Builder-style variant of [`set_chunk_size`](Self::set_chunk_size).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> ChunkerResult<Self> {
        self.set_chunk_size(chunk_size)?;
        Ok(self)
    }

    /// Builder-style variant of [`add_entity`](Self::add_entity).
    pub fn with_entity(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> ChunkerResult<Self> {
        self.add_entity(name, value)?;
        Ok(self)
    }

    /// Set the number of bytes read per chunk. Must be positive.
    pub fn set_chunk_size(&mut self, chunk_size: usize) -> ChunkerResult<()> {
        validate_chunk_size(chunk_size)?;
        self.chunk_size = chunk_size;
        Ok(())
    }

    /// Register an entity to inject into the DOCTYPE.
    pub fn add_entity(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> ChunkerResult<()> {
        self.entities.insert(name, value)
    }

    #[inline]
    pub fn fundamental_tag(&self) -> &str {
        &self.fundamental_tag
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[inline]
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }
}

pub(crate) fn validate_chunk_size(chunk_size: usize) -> ChunkerResult<()> {
    if chunk_size == 0 {
        return Err(ChunkerError::config(
            "chunk size must be a positive number of bytes",
        ));
    }
    Ok(())
}

/// Check `name` against the XML `Name` production, excluding colons.
pub fn is_valid_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Check `name` as a possibly prefixed element or attribute name (`p:local`).
pub(crate) fn is_valid_qname(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_valid_ncname(prefix) && is_valid_ncname(local),
        None => is_valid_ncname(name),
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}
