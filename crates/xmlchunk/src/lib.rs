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

//! Bounded-memory XML Element Extraction
//!
//! This crate pulls repeated "fundamental" elements out of XML documents too
//! large to load at once. The document is read in fixed-size chunks, parsed
//! incrementally, and each fundamental element is rebuilt as text and handed
//! to a caller-supplied handler as soon as it closes.
//!
//! # Features
//!
//! - **Bounded Memory**: Roughly one chunk plus the largest fundamental element
//! - **Chunk-size Independent**: The same fragments for any chunk size
//! - **Entity Injection**: Declare entities an external DTD would define
//! - **Strict**: Malformed XML and nested fundamental elements abort the parse
//!
//! # Quick Start
//!
//! ```rust
//! use xmlchunk::XmlChunker;
//! use std::io::Cursor;
//!
//! let xml = r#"<truck>
//!   <box><pear/><apple/></box>
//!   <trash>ignored</trash>
//!   <box><note><color>white</color><contents>paper</contents></note></box>
//!   <box><air/></box>
//! </truck>"#;
//!
//! let chunker = XmlChunker::new(Cursor::new(xml), "box").unwrap();
//! let mut fragments = Vec::new();
//! chunker
//!     .for_each_fragment(|fragment| fragments.push(fragment.to_string()))
//!     .unwrap();
//!
//! assert_eq!(
//!     fragments,
//!     vec![
//!         "<box><pear></pear><apple></apple></box>",
//!         "<box><note><color>white</color><contents>paper</contents></note></box>",
//!         "<box><air></air></box>",
//!     ]
//! );
//! ```
//!
//! # Files
//!
//! ```rust,no_run
//! use xmlchunk::XmlChunker;
//!
//! let mut chunker = XmlChunker::open("catalog.xml", "product").unwrap();
//! chunker.set_chunk_size(64 * 1024).unwrap();
//! chunker.add_entity("copy", "(c)").unwrap();
//!
//! let summary = chunker
//!     .parse_file(
//!         |fragment, args| println!("[{}] {}", args[0], fragment),
//!         vec!["catalog".to_string()],
//!     )
//!     .unwrap();
//! eprintln!("{} products", summary.fragments);
//! ```
//!
//! # Pipeline
//!
//! The pieces of the pipeline are public for callers that need to drive them
//! separately:
//!
//! - [`ChunkSource`] reads fixed-size [`Chunk`]s
//! - [`inject_entities`] rewrites the DOCTYPE of the first chunk
//! - [`EventParser`] turns chunks into [`XmlEvent`]s
//! - [`ElementReconstructor`] rebuilds fundamental elements from events
//! - [`Dispatcher`] calls the handler for each fragment

mod chunker;
mod config;
mod dispatch;
mod error;
mod event;
mod parser;
mod patch;
mod reconstruct;
mod source;

pub use chunker::{ParseSummary, XmlChunker};
pub use config::{is_valid_ncname, ChunkerConfig, EntityTable, DEFAULT_CHUNK_SIZE};
pub use dispatch::{Dispatcher, FragmentSink};
pub use error::{ChunkerError, ChunkerResult, XmlErrorCode};
pub use event::{EventSink, XmlEvent};
pub use parser::EventParser;
pub use patch::inject_entities;
pub use reconstruct::ElementReconstructor;
pub use source::{Chunk, ChunkSource};
