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

//! Fundamental element reconstruction.
//!
//! [`ElementReconstructor`] is a two-state machine (`Idle`, `InFundamental`)
//! driven by parser events. While inside a fundamental element it re-serializes
//! every event into a buffer; when the fundamental element closes, the buffer
//! is handed to a [`FragmentSink`] and cleared.
//!
//! Serialization rules:
//!
//! - Tags are written as `<name attr="value">` and `</name>`; empty elements
//!   therefore come out as `<name></name>`.
//! - Attribute values are written as decoded, without re-escaping.
//! - Text is dropped when it is whitespace only, otherwise written with
//!   `& < > "` escaped and its surrounding whitespace intact.
//! - `&name;` references to registered entities are replaced by the
//!   registered value; any other markup is logged and skipped.
//!
//! # Example
//!
//! ```rust
//! use xmlchunk::{ElementReconstructor, EntityTable, XmlEvent};
//!
//! let entities = EntityTable::new();
//! let mut reconstructor = ElementReconstructor::new("box", &entities);
//! let mut fragments: Vec<String> = Vec::new();
//!
//! let events = vec![
//!     XmlEvent::StartElement { name: "box".into(), attributes: vec![] },
//!     XmlEvent::CharacterData("a < b".into()),
//!     XmlEvent::EndElement { name: "box".into() },
//! ];
//! for event in events {
//!     reconstructor.handle(event, 1, &mut fragments).unwrap();
//! }
//!
//! assert_eq!(fragments, vec!["<box>a &lt; b</box>"]);
//! ```

use crate::config::EntityTable;
use crate::dispatch::FragmentSink;
use crate::error::{ChunkerError, ChunkerResult};
use crate::event::XmlEvent;
use quick_xml::escape::partial_escape;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InFundamental,
}

/// Rebuilds the serialized text of each fundamental element.
#[derive(Debug)]
pub struct ElementReconstructor<'c> {
    fundamental_tag: &'c str,
    entities: &'c EntityTable,
    state: State,
    buffer: String,
}

impl<'c> ElementReconstructor<'c> {
    pub fn new(fundamental_tag: &'c str, entities: &'c EntityTable) -> Self {
        Self {
            fundamental_tag,
            entities,
            state: State::Idle,
            buffer: String::new(),
        }
    }

    /// Whether a fundamental element is currently open.
    #[inline]
    pub fn is_in_fundamental(&self) -> bool {
        self.state == State::InFundamental
    }

    /// Text accumulated for the open fundamental element. Always empty when
    /// idle.
    #[inline]
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Apply one parser event, dispatching a fragment if it completes one.
    ///
    /// # Errors
    ///
    /// - [`ChunkerError::NestedFundamental`] if a fundamental element opens
    ///   inside another
    /// - [`ChunkerError::UnmatchedClose`] if a fundamental element closes while
    ///   none is open
    pub fn handle<S: FragmentSink + ?Sized>(
        &mut self,
        event: XmlEvent,
        line: usize,
        sink: &mut S,
    ) -> ChunkerResult<()> {
        match (self.state, event) {
            (State::Idle, XmlEvent::StartElement { name, attributes }) => {
                if name == self.fundamental_tag {
                    self.state = State::InFundamental;
                    self.buffer.clear();
                    self.push_start_tag(&name, &attributes);
                }
            }
            (State::InFundamental, XmlEvent::StartElement { name, attributes }) => {
                if name == self.fundamental_tag {
                    return Err(ChunkerError::NestedFundamental { tag: name, line });
                }
                self.push_start_tag(&name, &attributes);
            }
            (State::InFundamental, XmlEvent::EndElement { name }) => {
                self.buffer.push_str("</");
                self.buffer.push_str(&name);
                self.buffer.push('>');
                if name == self.fundamental_tag {
                    self.state = State::Idle;
                    debug!(line, len = self.buffer.len(), "fragment complete");
                    sink.dispatch(&self.buffer);
                    self.buffer.clear();
                }
            }
            (State::Idle, XmlEvent::EndElement { name }) => {
                if name == self.fundamental_tag {
                    return Err(ChunkerError::UnmatchedClose { tag: name, line });
                }
            }
            (State::InFundamental, XmlEvent::CharacterData(text)) => {
                if !trim_blank(&text).is_empty() {
                    push_escaped(&mut self.buffer, &text);
                }
            }
            (State::InFundamental, XmlEvent::UnresolvedMarkup(raw)) => {
                match entity_name(&raw).and_then(|name| self.entities.get(name)) {
                    Some(value) => self.buffer.push_str(value),
                    None => warn!(line, markup = %raw, "possible invalid XML inside fundamental element"),
                }
            }
            (State::Idle, XmlEvent::CharacterData(_) | XmlEvent::UnresolvedMarkup(_)) => {}
        }
        Ok(())
    }

    fn push_start_tag(&mut self, name: &str, attributes: &[(String, String)]) {
        self.buffer.push('<');
        self.buffer.push_str(name);
        for (key, value) in attributes {
            // Values go in as decoded; they are not re-escaped.
            self.buffer.push(' ');
            self.buffer.push_str(key);
            self.buffer.push_str("=\"");
            self.buffer.push_str(value);
            self.buffer.push('"');
        }
        self.buffer.push('>');
    }
}

/// Name between the first `&` and the last following `;`.
fn entity_name(raw: &str) -> Option<&str> {
    let start = raw.find('&')? + 1;
    let end = raw[start..].rfind(';')? + start;
    Some(&raw[start..end])
}

/// Escape `& < > "` in text. Apostrophes are left alone.
fn push_escaped(out: &mut String, text: &str) {
    let escaped = partial_escape(text);
    let mut rest: &str = &escaped;
    while let Some(quote) = rest.find('"') {
        out.push_str(&rest[..quote]);
        out.push_str("&quot;");
        rest = &rest[quote + 1..];
    }
    out.push_str(rest);
}

/// Strip the blank characters that make a text node insignificant.
fn trim_blank(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
}
