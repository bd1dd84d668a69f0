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

//! DOCTYPE rewriting for registered entities.
//!
//! Documents that reference entities the external DTD would define (and that
//! the chunker cannot fetch) get those entities declared inline: the first
//! chunk's DOCTYPE receives an internal subset listing every registered
//! entity. Only DOCTYPEs without an internal subset are supported, and the
//! whole declaration must fit in the first chunk.
//!
//! # Example
//!
//! ```rust
//! use xmlchunk::{inject_entities, EntityTable};
//!
//! let mut entities = EntityTable::new();
//! entities.insert("foo", "bar").unwrap();
//!
//! let chunk = br#"<?xml version="1.0"?><!DOCTYPE root SYSTEM "x.dtd"><root/>"#;
//! let patched = inject_entities(chunk, &entities).unwrap();
//! assert_eq!(
//!     patched,
//!     br#"<?xml version="1.0"?><!DOCTYPE root SYSTEM "x.dtd" [<!ENTITY foo "bar">]><root/>"#.to_vec()
//! );
//! ```

use crate::config::EntityTable;
use crate::error::{ChunkerError, ChunkerResult};
use memchr::{memchr, memmem};

const DOCTYPE_OPEN: &[u8] = b"<!DOCTYPE";

/// Splice an internal subset declaring `entities` into the DOCTYPE of `chunk`.
///
/// Bytes outside the DOCTYPE are left untouched.
///
/// # Errors
///
/// - [`ChunkerError::UnsupportedDtd`] if the chunk has no complete DOCTYPE
/// - [`ChunkerError::UnsupportedDtd`] if the DOCTYPE already has an internal
///   subset
pub fn inject_entities(chunk: &[u8], entities: &EntityTable) -> ChunkerResult<Vec<u8>> {
    let doctype_start = memmem::find(chunk, DOCTYPE_OPEN).ok_or_else(|| {
        ChunkerError::unsupported_dtd(
            "could not find a DOCTYPE in the first chunk; \
             it must fit within the first chunk to inject entities",
        )
    })?;

    let doctype_end = memchr(b'>', &chunk[doctype_start..])
        .map(|offset| doctype_start + offset)
        .ok_or_else(|| {
            ChunkerError::unsupported_dtd("DOCTYPE declaration is not closed within the first chunk")
        })?;

    if memchr(b'[', &chunk[doctype_start..doctype_end]).is_some() {
        return Err(ChunkerError::unsupported_dtd(
            "DOCTYPE already has an internal subset; only external DTDs can receive entities",
        ));
    }

    let subset = render_subset(entities);
    let mut patched = Vec::with_capacity(chunk.len() + subset.len() + 1);
    patched.extend_from_slice(&chunk[..doctype_end]);
    if !chunk[..doctype_end].ends_with(b" ") {
        patched.push(b' ');
    }
    patched.extend_from_slice(subset.as_bytes());
    patched.extend_from_slice(&chunk[doctype_end..]);
    Ok(patched)
}

fn render_subset(entities: &EntityTable) -> String {
    let mut subset = String::from("[");
    for (name, value) in entities.iter() {
        subset.push_str("<!ENTITY ");
        subset.push_str(name);
        subset.push_str(" \"");
        push_entity_literal(&mut subset, value);
        subset.push_str("\">");
    }
    subset.push(']');
    subset
}

/// Characters that would end or reinterpret an entity literal are written as
/// character references.
fn push_entity_literal(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("&#34;"),
            '&' => out.push_str("&#38;"),
            '%' => out.push_str("&#37;"),
            _ => out.push(c),
        }
    }
}
