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

//! Chunked parse entry point.
//!
//! [`XmlChunker`] owns the byte source and the configuration and drives the
//! whole pipeline in [`parse_file`](XmlChunker::parse_file):
//!
//! ```text
//! ChunkSource -> inject_entities (first chunk only) -> EventParser
//!             -> ElementReconstructor -> Dispatcher -> handler
//! ```
//!
//! Parsing consumes the chunker. The source is dropped when the call returns,
//! whether it succeeded or not.
//!
//! # Examples
//!
//! ```rust
//! use xmlchunk::XmlChunker;
//! use std::io::Cursor;
//!
//! let xml = "<truck><box><pear/></box><trash>x</trash><box><air/></box></truck>";
//! let mut chunker = XmlChunker::new(Cursor::new(xml), "box").unwrap();
//! chunker.set_chunk_size(8).unwrap();
//!
//! let mut fragments = Vec::new();
//! let summary = chunker
//!     .for_each_fragment(|fragment| fragments.push(fragment.to_string()))
//!     .unwrap();
//!
//! assert_eq!(summary.fragments, 2);
//! assert_eq!(
//!     fragments,
//!     vec!["<box><pear></pear></box>", "<box><air></air></box>"]
//! );
//! ```
//!
//! Trailing arguments are passed to the handler after each fragment:
//!
//! ```rust
//! use xmlchunk::XmlChunker;
//! use std::io::Cursor;
//!
//! let xml = "<list><item>a</item><item>b</item></list>";
//! let chunker = XmlChunker::new(Cursor::new(xml), "item").unwrap();
//!
//! let mut out = Vec::new();
//! chunker
//!     .parse_file(
//!         |fragment, args| out.push(format!("{}{}", args[0], fragment)),
//!         vec!["> ".to_string()],
//!     )
//!     .unwrap();
//!
//! assert_eq!(out, vec!["> <item>a</item>", "> <item>b</item>"]);
//! ```

use crate::config::{ChunkerConfig, EntityTable};
use crate::dispatch::Dispatcher;
use crate::error::{ChunkerError, ChunkerResult};
use crate::event::{EventSink, XmlEvent};
use crate::parser::EventParser;
use crate::patch::inject_entities;
use crate::reconstruct::ElementReconstructor;
use crate::source::ChunkSource;
use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Counters reported by a successful parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Number of fragments handed to the handler.
    pub fragments: usize,
    /// Number of chunks read from the source.
    pub chunks: usize,
    /// Total bytes read from the source.
    pub bytes_read: u64,
}

/// Bounded-memory extractor of fundamental elements.
#[derive(Debug)]
pub struct XmlChunker<R: Read> {
    reader: R,
    config: ChunkerConfig,
}

impl XmlChunker<File> {
    /// Open the file at `path` as the byte source.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::Configuration`] if the tag name is invalid or the file
    /// cannot be opened.
    pub fn open(path: impl AsRef<Path>, fundamental_tag: &str) -> ChunkerResult<Self> {
        let config = ChunkerConfig::new(fundamental_tag)?;
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ChunkerError::config(format!("cannot open {}: {}", path.display(), e))
        })?;
        Ok(Self::with_config(file, config))
    }
}

impl<R: Read> XmlChunker<R> {
    /// Create a chunker over any reader with default settings.
    pub fn new(reader: R, fundamental_tag: &str) -> ChunkerResult<Self> {
        Ok(Self::with_config(reader, ChunkerConfig::new(fundamental_tag)?))
    }

    pub fn with_config(reader: R, config: ChunkerConfig) -> Self {
        Self { reader, config }
    }

    /// Set the number of bytes read per chunk. Zero is rejected.
    pub fn set_chunk_size(&mut self, chunk_size: usize) -> ChunkerResult<()> {
        self.config.set_chunk_size(chunk_size)
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size()
    }

    #[inline]
    pub fn fundamental_tag(&self) -> &str {
        self.config.fundamental_tag()
    }

    /// Register an entity to declare in the document's DOCTYPE before parsing.
    ///
    /// Once any entity is registered, the first chunk must contain a complete
    /// DOCTYPE without an internal subset.
    pub fn add_entity(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> ChunkerResult<()> {
        self.config.add_entity(name, value)
    }

    #[inline]
    pub fn entities(&self) -> &EntityTable {
        self.config.entities()
    }

    #[inline]
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Parse the whole source, calling `handler(fragment, &extra_args)` once
    /// per fundamental element in document order.
    ///
    /// # Errors
    ///
    /// Any [`ChunkerError`]. The parse stops at the first error; fragments
    /// already handed to `handler` stay delivered.
    pub fn parse_file<H, A>(self, handler: H, extra_args: Vec<A>) -> ChunkerResult<ParseSummary>
    where
        H: FnMut(&str, &[A]),
    {
        let Self { reader, config } = self;
        let entities = config.entities();

        info!(
            tag = config.fundamental_tag(),
            chunk_size = config.chunk_size(),
            entities = entities.len(),
            "starting chunked parse"
        );

        let mut source = ChunkSource::with_chunk_size(reader, config.chunk_size())?;
        let mut parser = EventParser::new();
        let mut pipeline = Pipeline {
            reconstructor: ElementReconstructor::new(config.fundamental_tag(), entities),
            dispatcher: Dispatcher::new(handler, extra_args),
        };

        while let Some(chunk) = source.next_chunk()? {
            let bytes = if source.chunks_read() == 1 && !entities.is_empty() {
                Cow::Owned(inject_entities(&chunk.bytes, entities)?)
            } else {
                Cow::Borrowed(chunk.bytes.as_slice())
            };
            parser.feed(&bytes, chunk.is_last, &mut pipeline)?;
        }

        let summary = ParseSummary {
            fragments: pipeline.dispatcher.dispatched(),
            chunks: source.chunks_read(),
            bytes_read: source.bytes_read(),
        };
        info!(
            fragments = summary.fragments,
            chunks = summary.chunks,
            bytes_read = summary.bytes_read,
            "chunked parse complete"
        );
        Ok(summary)
    }

    /// [`parse_file`](Self::parse_file) for handlers that take only the
    /// fragment.
    pub fn for_each_fragment<F>(self, mut handler: F) -> ChunkerResult<ParseSummary>
    where
        F: FnMut(&str),
    {
        self.parse_file(move |fragment: &str, _: &[()]| handler(fragment), Vec::new())
    }
}

/// Parser sink feeding the reconstructor, which feeds the dispatcher.
struct Pipeline<'c, H, A> {
    reconstructor: ElementReconstructor<'c>,
    dispatcher: Dispatcher<H, A>,
}

impl<H, A> EventSink for Pipeline<'_, H, A>
where
    H: FnMut(&str, &[A]),
{
    fn handle_event(&mut self, event: XmlEvent, line: usize) -> ChunkerResult<()> {
        self.reconstructor.handle(event, line, &mut self.dispatcher)
    }

    fn wants_text(&self) -> bool {
        self.reconstructor.is_in_fundamental()
    }
}
