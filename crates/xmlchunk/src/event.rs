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

//! Events emitted by the incremental parser.
//!
//! For `<a x="1">hi &foo;</a>` the parser emits, in order:
//!
//! ```text
//! StartElement { name: "a", attributes: [("x", "1")] }
//! CharacterData("hi ")
//! UnresolvedMarkup("&foo;")
//! EndElement { name: "a" }
//! ```

use crate::error::ChunkerResult;

/// A structural occurrence in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// An element opened. Attributes keep document order; values have
    /// character and declared entity references resolved.
    StartElement {
        name: String,
        attributes: Vec<(String, String)>,
    },

    /// An element closed. Empty elements produce a start and an end event.
    EndElement { name: String },

    /// Decoded text content.
    CharacterData(String),

    /// Markup that is neither element nor plain text, passed through raw:
    /// undeclared entity references, comments, processing instructions and
    /// the DOCTYPE.
    UnresolvedMarkup(String),
}

/// Receiver of parser events.
///
/// `line` is the line on which the event's token starts. Returning an error
/// stops the parser immediately and propagates the error out of
/// [`EventParser::feed`](crate::EventParser::feed).
pub trait EventSink {
    fn handle_event(&mut self, event: XmlEvent, line: usize) -> ChunkerResult<()>;

    /// Whether character data arriving now would be used.
    ///
    /// When this returns `false` the parser checks an unfinished text run
    /// and drops it as it streams in, instead of holding it until the next
    /// tag. The answer may only change on element events.
    fn wants_text(&self) -> bool {
        true
    }
}

impl EventSink for Vec<XmlEvent> {
    fn handle_event(&mut self, event: XmlEvent, _line: usize) -> ChunkerResult<()> {
        self.push(event);
        Ok(())
    }
}
