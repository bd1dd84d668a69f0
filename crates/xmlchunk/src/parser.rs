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

//! Incremental push parser.
//!
//! [`EventParser`] is fed the document one chunk at a time and emits
//! [`XmlEvent`]s to an [`EventSink`] before each [`feed`](EventParser::feed)
//! call returns. State survives between calls, so chunk boundaries may fall
//! anywhere: inside a tag, a comment, a multi-byte character or an entity
//! reference.
//!
//! # Design
//!
//! - **Framing**: The parser cuts its buffer into complete tokens (tags, text
//!   runs, comments, CDATA sections, processing instructions, the DOCTYPE)
//!   with `memchr`. An incomplete trailing token stays buffered until the
//!   next chunk, and the scan resumes where the previous one stopped. Text is
//!   only emitted once the next `<` has been seen, so the event stream does not
//!   depend on where chunks end.
//! - **Ignored text**: Text outside the root element, or text the sink does
//!   not want (see [`EventSink::wants_text`]), is checked as it arrives and
//!   dropped instead of being held. Only a trailing partial reference or
//!   partial UTF-8 sequence is kept back.
//! - **Decoding**: Each complete tag or DOCTYPE is handed to `quick-xml`,
//!   which splits out names and attributes and expands `<a/>` into a start and
//!   an end event. References are resolved with `quick_xml::escape`.
//! - **Well-formedness**: The parser keeps its own stack of open elements and
//!   checks nesting, the single-root rule and content outside the root.
//!
//! # Example
//!
//! ```rust
//! use xmlchunk::{EventParser, XmlEvent};
//!
//! let mut parser = EventParser::new();
//! let mut events: Vec<XmlEvent> = Vec::new();
//!
//! parser.feed(b"<root><it", false, &mut events).unwrap();
//! parser.feed(b"em n=\"1\"/></root>", true, &mut events).unwrap();
//!
//! assert_eq!(
//!     events,
//!     vec![
//!         XmlEvent::StartElement { name: "root".into(), attributes: vec![] },
//!         XmlEvent::StartElement {
//!             name: "item".into(),
//!             attributes: vec![("n".into(), "1".into())],
//!         },
//!         XmlEvent::EndElement { name: "item".into() },
//!         XmlEvent::EndElement { name: "root".into() },
//!     ]
//! );
//! ```

use crate::config::{is_valid_ncname, is_valid_qname};
use crate::error::{ChunkerError, ChunkerResult, XmlErrorCode};
use crate::event::{EventSink, XmlEvent};
use memchr::{memchr, memchr3, memchr_iter, memmem, memrchr};
use quick_xml::escape::{unescape, unescape_with, EscapeError};
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::HashMap;
use std::mem;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Text,
    Tag,
    Comment,
    CData,
    ProcessingInstruction,
    Declaration,
}

/// Resumable XML tokenizer.
///
/// Feed chunks in document order, exactly once each, with `is_last` set on
/// the final one. After the final chunk, or after any error, the parser is
/// finished and rejects further input.
#[derive(Debug)]
pub struct EventParser {
    buffer: Vec<u8>,
    /// Leading bytes of `buffer` already searched for the end of its token.
    scanned: usize,
    /// Line on which a partly dropped text run started.
    run_line: Option<usize>,
    line: usize,
    consumed: u64,
    bom_checked: bool,
    finished: bool,
    document: DocumentState,
}

/// Well-formedness state of the document seen so far.
#[derive(Debug, Default)]
struct DocumentState {
    open: Vec<String>,
    root_seen: bool,
    root_closed: bool,
    doctype_seen: bool,
    /// The DOCTYPE names an external subset (SYSTEM or PUBLIC id).
    external_subset: bool,
    /// The XML declaration says `standalone="yes"`.
    standalone: bool,
    declared: HashMap<String, String>,
}

impl EventParser {
    /// Create a parser positioned at the start of a document.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            run_line: None,
            line: 1,
            consumed: 0,
            bom_checked: false,
            finished: false,
            document: DocumentState::default(),
        }
    }

    /// Current line number (1-based) of the first unconsumed byte.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Number of currently open elements.
    #[inline]
    pub fn depth(&self) -> usize {
        self.document.open.len()
    }

    /// Bytes held back waiting for the rest of their token.
    #[inline]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the parser has seen its final chunk or failed.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Entities declared in the DOCTYPE internal subset.
    pub fn declared_entity(&self, name: &str) -> Option<&str> {
        self.document.declared.get(name).map(String::as_str)
    }

    /// Parse one chunk, emitting every event it completes.
    ///
    /// When `is_last` is true the document must be complete: all markup
    /// closed and exactly one root element.
    ///
    /// # Errors
    ///
    /// - [`ChunkerError::XmlSyntax`] if the document is malformed
    /// - [`ChunkerError::Configuration`] if called after the parser finished
    /// - any error returned by `sink`
    pub fn feed<S: EventSink + ?Sized>(
        &mut self,
        chunk: &[u8],
        is_last: bool,
        sink: &mut S,
    ) -> ChunkerResult<()> {
        if self.finished {
            return Err(ChunkerError::config(
                "parser already received its final chunk or failed",
            ));
        }

        let result = self.process(chunk, is_last, sink);
        if result.is_err() || is_last {
            self.finished = true;
            self.buffer = Vec::new();
        }
        result
    }

    fn process<S: EventSink + ?Sized>(
        &mut self,
        chunk: &[u8],
        is_last: bool,
        sink: &mut S,
    ) -> ChunkerResult<()> {
        self.buffer.extend_from_slice(chunk);

        if !self.bom_checked {
            if !is_last && self.buffer.len() < UTF8_BOM.len() && UTF8_BOM.starts_with(&self.buffer) {
                return Ok(());
            }
            if self.buffer.starts_with(UTF8_BOM) {
                self.buffer.drain(..UTF8_BOM.len());
            }
            self.bom_checked = true;
        }

        let buffer = mem::take(&mut self.buffer);
        let mut scanned = mem::take(&mut self.scanned);
        let mut pos = 0;

        while pos < buffer.len() {
            let rest = &buffer[pos..];
            let Some((kind, len)) = frame_token(rest, is_last, scanned) else {
                if is_last {
                    return Err(unclosed_token_error(rest, self.line));
                }
                scanned = rest.len();
                if rest[0] != b'<' && (self.document.open.is_empty() || !sink.wants_text()) {
                    let dropped = self.drop_text(rest)?;
                    pos += dropped;
                    scanned -= dropped;
                }
                break;
            };
            scanned = 0;

            let raw = &rest[..len];
            let run_line = self.run_line.take();
            let line = match kind {
                TokenKind::Text => run_line.unwrap_or(self.line),
                _ => self.line,
            };
            let at_document_start = self.consumed == 0;
            let at_input_end = is_last && len == rest.len();
            self.document
                .handle_token(kind, raw, line, at_input_end, at_document_start, sink)?;

            self.line += memchr_iter(b'\n', raw).count();
            self.consumed += len as u64;
            pos += len;
        }

        if is_last {
            return self.document.finish(self.line);
        }

        let mut buffer = buffer;
        buffer.drain(..pos);
        self.buffer = buffer;
        self.scanned = scanned;
        Ok(())
    }

    /// Check and consume the settled prefix of an unfinished text run that
    /// nobody will read. Returns the number of bytes consumed.
    fn drop_text(&mut self, run: &[u8]) -> ChunkerResult<usize> {
        let settled = settled_text_len(run);
        if settled == 0 {
            return Ok(0);
        }
        let line = *self.run_line.get_or_insert(self.line);
        self.document.check_text(&run[..settled], line)?;

        self.line += memchr_iter(b'\n', &run[..settled]).count();
        self.consumed += settled as u64;
        Ok(settled)
    }
}

impl Default for EventParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentState {
    fn handle_token<S: EventSink + ?Sized>(
        &mut self,
        kind: TokenKind,
        raw: &[u8],
        line: usize,
        at_input_end: bool,
        at_document_start: bool,
        sink: &mut S,
    ) -> ChunkerResult<()> {
        match kind {
            TokenKind::Text => self.handle_text(raw, line, at_input_end, sink),
            TokenKind::Tag => self.handle_tag(raw, line, sink),
            TokenKind::Comment => {
                let text = decode_utf8(raw, line, false)?;
                sink.handle_event(XmlEvent::UnresolvedMarkup(text.to_string()), line)
            }
            TokenKind::CData => {
                if self.open.is_empty() {
                    return Err(ChunkerError::syntax(
                        XmlErrorCode::InvalidToken,
                        line,
                        "CDATA section outside the root element",
                    ));
                }
                let text = decode_utf8(&raw[9..raw.len() - 3], line, false)?;
                if text.is_empty() {
                    return Ok(());
                }
                let text = normalize_newlines(text).into_owned();
                sink.handle_event(XmlEvent::CharacterData(text), line)
            }
            TokenKind::ProcessingInstruction => {
                let text = decode_utf8(raw, line, false)?;
                if is_xml_declaration(text) {
                    if !at_document_start {
                        return Err(ChunkerError::syntax(
                            XmlErrorCode::MisplacedXmlPi,
                            line,
                            "XML declaration must be at the start of the document",
                        ));
                    }
                    self.standalone = declares_standalone(raw);
                    return Ok(());
                }
                sink.handle_event(XmlEvent::UnresolvedMarkup(text.to_string()), line)
            }
            TokenKind::Declaration => self.handle_doctype(raw, line, sink),
        }
    }

    fn handle_text<S: EventSink + ?Sized>(
        &mut self,
        raw: &[u8],
        line: usize,
        at_input_end: bool,
        sink: &mut S,
    ) -> ChunkerResult<()> {
        let text = decode_utf8(raw, line, at_input_end)?;
        if self.open.is_empty() {
            return self.check_outside_root(text, line);
        }

        let text = normalize_newlines(text);
        let mut pending = String::new();
        for piece in Pieces::new(&text) {
            match piece.map_err(|_| unterminated_reference(line))? {
                Piece::Text(t) => pending.push_str(t),
                Piece::Reference(name) => match decode_reference(name, line)? {
                    Some(value) => pending.push_str(&value),
                    None => {
                        if !pending.is_empty() {
                            sink.handle_event(XmlEvent::CharacterData(mem::take(&mut pending)), line)?;
                        }
                        sink.handle_event(
                            XmlEvent::UnresolvedMarkup(format!("&{};", name)),
                            line,
                        )?;
                    }
                },
            }
        }
        if !pending.is_empty() {
            sink.handle_event(XmlEvent::CharacterData(pending), line)?;
        }
        Ok(())
    }

    /// The checks of [`handle_text`](Self::handle_text) without emitting
    /// anything.
    fn check_text(&self, raw: &[u8], line: usize) -> ChunkerResult<()> {
        let text = decode_utf8(raw, line, false)?;
        if self.open.is_empty() {
            return self.check_outside_root(text, line);
        }
        for piece in Pieces::new(text) {
            if let Piece::Reference(name) = piece.map_err(|_| unterminated_reference(line))? {
                decode_reference(name, line)?;
            }
        }
        Ok(())
    }

    fn check_outside_root(&self, text: &str, line: usize) -> ChunkerResult<()> {
        if text.chars().all(is_xml_whitespace) {
            return Ok(());
        }
        let (code, message) = if self.root_closed {
            (XmlErrorCode::JunkAfterDocElement, "text after the root element")
        } else {
            (XmlErrorCode::InvalidToken, "text before the root element")
        };
        Err(ChunkerError::syntax(code, line, message))
    }

    fn handle_tag<S: EventSink + ?Sized>(
        &mut self,
        raw: &[u8],
        line: usize,
        sink: &mut S,
    ) -> ChunkerResult<()> {
        let mut reader = Reader::from_reader(raw);
        reader
            .expand_empty_elements(true)
            .check_end_names(false)
            .trim_text(false);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => self.open_element(&e, line, sink)?,
                Ok(Event::End(e)) => {
                    let name = decode_utf8(e.name().as_ref(), line, false)?.to_string();
                    self.close_element(name, line, sink)?;
                }
                Ok(Event::Eof) => return Ok(()),
                Ok(_) => {
                    return Err(ChunkerError::syntax(
                        XmlErrorCode::InvalidToken,
                        line,
                        "unexpected content in tag",
                    ))
                }
                Err(e) => {
                    return Err(ChunkerError::syntax(
                        XmlErrorCode::InvalidToken,
                        line,
                        e.to_string(),
                    ))
                }
            }
        }
    }

    fn open_element<S: EventSink + ?Sized>(
        &mut self,
        start: &BytesStart<'_>,
        line: usize,
        sink: &mut S,
    ) -> ChunkerResult<()> {
        let name = decode_utf8(start.name().as_ref(), line, false)?.to_string();
        if !is_valid_qname(&name) {
            return Err(ChunkerError::syntax(
                XmlErrorCode::InvalidToken,
                line,
                format!("invalid element name {:?}", name),
            ));
        }
        if self.root_closed {
            return Err(ChunkerError::syntax(
                XmlErrorCode::JunkAfterDocElement,
                line,
                format!("element <{}> after the root element", name),
            ));
        }

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| match e {
                AttrError::Duplicated(..) => ChunkerError::syntax(
                    XmlErrorCode::DuplicateAttribute,
                    line,
                    format!("duplicate attribute on <{}>", name),
                ),
                other => ChunkerError::syntax(XmlErrorCode::InvalidToken, line, other.to_string()),
            })?;
            let key = decode_utf8(attr.key.as_ref(), line, false)?.to_string();
            if !is_valid_qname(&key) {
                return Err(ChunkerError::syntax(
                    XmlErrorCode::InvalidToken,
                    line,
                    format!("invalid attribute name {:?}", key),
                ));
            }
            let raw_value = decode_utf8(&attr.value, line, false)?;
            let value = self.decode_attribute_value(raw_value, line)?;
            attributes.push((key, value));
        }

        self.root_seen = true;
        self.open.push(name.clone());
        sink.handle_event(XmlEvent::StartElement { name, attributes }, line)
    }

    fn close_element<S: EventSink + ?Sized>(
        &mut self,
        name: String,
        line: usize,
        sink: &mut S,
    ) -> ChunkerResult<()> {
        match self.open.pop() {
            Some(open) if open == name => {}
            Some(open) => {
                return Err(ChunkerError::syntax(
                    XmlErrorCode::TagMismatch,
                    line,
                    format!("expected </{}>, found </{}>", open, name),
                ))
            }
            None => {
                return Err(ChunkerError::syntax(
                    XmlErrorCode::TagMismatch,
                    line,
                    format!("closing tag </{}> with no open element", name),
                ))
            }
        }
        if self.open.is_empty() {
            self.root_closed = true;
        }
        sink.handle_event(XmlEvent::EndElement { name }, line)
    }

    /// Normalize whitespace and resolve references in an attribute value.
    ///
    /// With an external subset that may declare more entities, and no
    /// `standalone="yes"`, references to undeclared entities are dropped
    /// instead of rejected.
    fn decode_attribute_value(&self, raw: &str, line: usize) -> ChunkerResult<String> {
        if memchr(b'<', raw.as_bytes()).is_some() {
            return Err(ChunkerError::syntax(
                XmlErrorCode::InvalidToken,
                line,
                "'<' in attribute value",
            ));
        }

        let normalized: String = normalize_newlines(raw)
            .chars()
            .map(|c| if matches!(c, '\t' | '\n') { ' ' } else { c })
            .collect();
        let lenient = self.external_subset && !self.standalone;
        let mut skipped = Vec::new();

        let value = unescape_with(&normalized, |name| match self.declared.get(name) {
            Some(value) => Some(value.as_str()),
            None if lenient && is_valid_ncname(name) => {
                skipped.push(name.to_string());
                Some("")
            }
            None => None,
        })
        .map_err(|e| reference_error(e, line, " in attribute value"))?;

        for name in skipped {
            debug!(line, entity = %name, "skipped entity declared outside the document");
        }
        Ok(value.into_owned())
    }

    fn handle_doctype<S: EventSink + ?Sized>(
        &mut self,
        raw: &[u8],
        line: usize,
        sink: &mut S,
    ) -> ChunkerResult<()> {
        if !raw.starts_with(b"<!DOCTYPE") {
            return Err(ChunkerError::syntax(
                XmlErrorCode::InvalidToken,
                line,
                "unknown markup declaration",
            ));
        }
        if self.root_seen || self.doctype_seen {
            return Err(ChunkerError::syntax(
                XmlErrorCode::InvalidToken,
                line,
                "DOCTYPE must appear once, before the root element",
            ));
        }
        self.doctype_seen = true;

        let mut reader = Reader::from_reader(raw);
        match reader.read_event() {
            Ok(Event::DocType(_)) => {}
            Ok(_) => {
                return Err(ChunkerError::syntax(
                    XmlErrorCode::InvalidToken,
                    line,
                    "malformed DOCTYPE",
                ))
            }
            Err(e) => {
                return Err(ChunkerError::syntax(
                    XmlErrorCode::InvalidToken,
                    line,
                    e.to_string(),
                ))
            }
        }

        let text = decode_utf8(raw, line, false)?;
        let subset_start = text.find('[');
        let head = &text["<!DOCTYPE".len()..subset_start.unwrap_or(text.len())];
        self.external_subset = matches!(
            head.split(is_xml_whitespace).filter(|s| !s.is_empty()).nth(1),
            Some("SYSTEM" | "PUBLIC")
        );

        if let (Some(open), Some(close)) = (subset_start, text.rfind(']')) {
            if open < close {
                for (name, value) in parse_entity_declarations(&text[open + 1..close]) {
                    let expanded = expand_literal(&value, &self.declared);
                    self.declared.entry(name).or_insert(expanded);
                }
            }
        }

        sink.handle_event(XmlEvent::UnresolvedMarkup(text.to_string()), line)
    }

    fn finish(&self, line: usize) -> ChunkerResult<()> {
        if let Some(open) = self.open.last() {
            return Err(ChunkerError::syntax(
                XmlErrorCode::NoElements,
                line,
                format!("end of input inside element <{}>", open),
            ));
        }
        if !self.root_seen {
            return Err(ChunkerError::syntax(
                XmlErrorCode::NoElements,
                line,
                "document has no root element",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Framing
// ============================================================================

/// Find the kind and length of the complete token at the start of `input`,
/// or `None` if more bytes are needed.
///
/// The first `scanned` bytes were searched by an earlier call that ran out of
/// input, so the search for the token's end resumes there.
fn frame_token(input: &[u8], is_last: bool, scanned: usize) -> Option<(TokenKind, usize)> {
    if input[0] != b'<' {
        let from = scanned.min(input.len());
        return match memchr(b'<', &input[from..]) {
            Some(end) => Some((TokenKind::Text, from + end)),
            None if is_last => Some((TokenKind::Text, input.len())),
            None => None,
        };
    }

    if input.starts_with(b"<!--") {
        return find_end(input, b"-->", 4, scanned).map(|len| (TokenKind::Comment, len));
    }
    if input.starts_with(b"<![CDATA[") {
        return find_end(input, b"]]>", 9, scanned).map(|len| (TokenKind::CData, len));
    }
    if input.starts_with(b"<?") {
        return find_end(input, b"?>", 2, scanned).map(|len| (TokenKind::ProcessingInstruction, len));
    }
    if input.starts_with(b"<!") {
        if b"<!--".starts_with(input) || b"<![CDATA[".starts_with(input) {
            return None;
        }
        return scan_declaration(input).map(|len| (TokenKind::Declaration, len));
    }
    scan_tag(input).map(|len| (TokenKind::Tag, len))
}

/// Length up to and including the first `terminator` at or after `start`.
fn find_end(input: &[u8], terminator: &[u8], start: usize, scanned: usize) -> Option<usize> {
    let from = start.max(scanned.saturating_sub(terminator.len() - 1));
    memmem::find(input.get(from..)?, terminator).map(|offset| from + offset + terminator.len())
}

fn scan_tag(input: &[u8]) -> Option<usize> {
    let mut pos = 1;
    loop {
        let rest = input.get(pos..)?;
        let hit = memchr3(b'>', b'"', b'\'', rest);
        // A stray '<' ends the token early so the decoder reports it.
        if let Some(stray) = memchr(b'<', &rest[..hit.unwrap_or(rest.len())]) {
            return Some(pos + stray);
        }
        let at = pos + hit?;
        match input[at] {
            b'>' => return Some(at + 1),
            quote => pos = at + 1 + memchr(quote, &input[at + 1..])? + 1,
        }
    }
}

fn scan_declaration(input: &[u8]) -> Option<usize> {
    let mut quote = None;
    let mut depth = 0usize;
    for (i, &b) in input.iter().enumerate().skip(2) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'[') => depth += 1,
            (None, b']') => depth = depth.saturating_sub(1),
            (None, b'>') if depth == 0 => return Some(i + 1),
            (None, _) => {}
        }
    }
    None
}

/// Length of the prefix of an unfinished text run that later bytes cannot
/// change: everything before a trailing unterminated reference or a trailing
/// partial UTF-8 sequence.
fn settled_text_len(run: &[u8]) -> usize {
    let mut len = run.len();
    if let Some(amp) = memrchr(b'&', run) {
        if memchr(b';', &run[amp..]).is_none() {
            len = amp;
        }
    }
    match std::str::from_utf8(&run[..len]) {
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        _ => len,
    }
}

fn unclosed_token_error(rest: &[u8], line: usize) -> ChunkerError {
    if rest.starts_with(b"<![CDATA[") {
        ChunkerError::syntax(
            XmlErrorCode::UnclosedCdataSection,
            line,
            "end of input inside CDATA section",
        )
    } else {
        ChunkerError::syntax(XmlErrorCode::UnclosedToken, line, "end of input inside markup")
    }
}

// ============================================================================
// Text and references
// ============================================================================

enum Piece<'a> {
    Text(&'a str),
    /// Reference name between `&` and `;`.
    Reference(&'a str),
}

/// Splits text into literal runs and `&name;` references.
/// Yields `Err(())` for an `&` with no terminating `;`.
struct Pieces<'a> {
    rest: &'a str,
}

impl<'a> Pieces<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = Result<Piece<'a>, ()>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let bytes = self.rest.as_bytes();
        match memchr(b'&', bytes) {
            Some(0) => match memchr(b';', bytes) {
                Some(end) => {
                    let name = &self.rest[1..end];
                    self.rest = &self.rest[end + 1..];
                    Some(Ok(Piece::Reference(name)))
                }
                None => {
                    self.rest = "";
                    Some(Err(()))
                }
            },
            Some(start) => {
                let (text, rest) = self.rest.split_at(start);
                self.rest = rest;
                Some(Ok(Piece::Text(text)))
            }
            None => Some(Ok(Piece::Text(mem::take(&mut self.rest)))),
        }
    }
}

/// Decode a character reference or predefined entity.
///
/// Returns `Ok(None)` for a well-formed general entity name that needs a
/// declaration to resolve.
fn decode_reference(name: &str, line: usize) -> ChunkerResult<Option<String>> {
    let reference = format!("&{};", name);
    match unescape(&reference) {
        Ok(decoded) => Ok(Some(decoded.into_owned())),
        Err(EscapeError::UnrecognizedSymbol(..)) if is_valid_ncname(name) => Ok(None),
        Err(e) => Err(reference_error(e, line, "")),
    }
}

fn reference_error(error: EscapeError, line: usize, context: &str) -> ChunkerError {
    match error {
        EscapeError::UnrecognizedSymbol(_, name) if is_valid_ncname(&name) => ChunkerError::syntax(
            XmlErrorCode::UndefinedEntity,
            line,
            format!("undefined entity &{};{}", name, context),
        ),
        EscapeError::UnrecognizedSymbol(_, name) => ChunkerError::syntax(
            XmlErrorCode::InvalidToken,
            line,
            format!("malformed entity reference &{};{}", name, context),
        ),
        EscapeError::UnterminatedEntity(_) => unterminated_reference(line),
        other => ChunkerError::syntax(
            XmlErrorCode::BadCharRef,
            line,
            format!("invalid character reference{}: {}", context, other),
        ),
    }
}

fn unterminated_reference(line: usize) -> ChunkerError {
    ChunkerError::syntax(
        XmlErrorCode::InvalidToken,
        line,
        "'&' not followed by a terminated reference",
    )
}

/// Translate `\r\n` and lone `\r` to `\n`.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if memchr(b'\r', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

fn decode_utf8(bytes: &[u8], line: usize, is_last: bool) -> ChunkerResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        let code = if is_last && e.error_len().is_none() {
            XmlErrorCode::PartialChar
        } else {
            XmlErrorCode::InvalidToken
        };
        ChunkerError::syntax(code, line, e.to_string())
    })
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_xml_declaration(pi: &str) -> bool {
    let Some(body) = pi.strip_prefix("<?xml") else {
        return false;
    };
    body.starts_with(is_xml_whitespace) || body.starts_with("?>")
}

fn declares_standalone(raw: &[u8]) -> bool {
    let mut reader = Reader::from_reader(raw);
    match reader.read_event() {
        Ok(Event::Decl(decl)) => {
            matches!(decl.standalone(), Some(Ok(value)) if value.as_ref() == b"yes")
        }
        _ => false,
    }
}

// ============================================================================
// DOCTYPE internal subset
// ============================================================================

/// Collect internal general entity declarations (`<!ENTITY name "value">`).
/// Parameter and external entities are skipped.
fn parse_entity_declarations(subset: &str) -> Vec<(String, String)> {
    let mut declarations = Vec::new();
    let mut rest = subset;

    while let Some(start) = memmem::find(rest.as_bytes(), b"<!ENTITY") {
        rest = rest[start + "<!ENTITY".len()..].trim_start_matches(is_xml_whitespace);
        if rest.starts_with('%') {
            continue;
        }
        let name_end = rest
            .find(|c: char| is_xml_whitespace(c) || c == '"' || c == '\'')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start_matches(is_xml_whitespace);

        let Some(quote) = rest.bytes().next().filter(|&c| c == b'"' || c == b'\'') else {
            continue;
        };
        let Some(end) = memchr(quote, &rest.as_bytes()[1..]) else {
            break;
        };
        if is_valid_ncname(name) {
            declarations.push((name.to_string(), rest[1..=end].to_string()));
        }
        rest = &rest[end + 2..];
    }

    declarations
}

/// Expand character references, predefined entities and earlier
/// declarations inside an entity literal. A literal that refers to anything
/// else is kept verbatim.
fn expand_literal(literal: &str, declared: &HashMap<String, String>) -> String {
    match unescape_with(literal, |name| declared.get(name).map(String::as_str)) {
        Ok(value) => value.into_owned(),
        Err(_) => literal.to_string(),
    }
}
