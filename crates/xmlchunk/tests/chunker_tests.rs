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

//! Integration tests for xmlchunk

use std::fs;
use std::io::Cursor;
use xmlchunk::{ChunkerConfig, ChunkerError, XmlChunker, XmlErrorCode};

const TRUCK: &str = "<truck><box><pear/><apple/></box><trash>ignored</trash>\
<box><note><color>white</color><contents>paper</contents></note></box>\
<box><air/></box></truck>";

fn fragments(xml: &str, tag: &str, chunk_size: usize) -> Result<Vec<String>, ChunkerError> {
    let mut chunker = XmlChunker::new(Cursor::new(xml.to_string()), tag)?;
    chunker.set_chunk_size(chunk_size)?;
    let mut out = Vec::new();
    chunker.for_each_fragment(|f| out.push(f.to_string()))?;
    Ok(out)
}

// ==================== Canonical Example ====================

#[test]
fn test_truck_example() {
    let out = fragments(TRUCK, "box", 1024).unwrap();
    assert_eq!(
        out,
        vec![
            "<box><pear></pear><apple></apple></box>",
            "<box><note><color>white</color><contents>paper</contents></note></box>",
            "<box><air></air></box>",
        ]
    );
    assert!(out.iter().all(|f| !f.contains("trash")));
}

#[test]
fn test_truck_example_tiny_chunks() {
    let expected = fragments(TRUCK, "box", 1024).unwrap();
    for size in 1..=20 {
        assert_eq!(fragments(TRUCK, "box", size).unwrap(), expected, "chunk size {}", size);
    }
}

#[test]
fn test_pretty_printed_document() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- inventory -->
<truck>
    <box id="1">
        <pear ripe="yes"/>
    </box>
    <box id="2">
        <note>fragile &amp; heavy</note>
    </box>
</truck>
"#;
    let out = fragments(xml, "box", 7).unwrap();
    assert_eq!(
        out,
        vec![
            r#"<box id="1"><pear ripe="yes"></pear></box>"#,
            r#"<box id="2"><note>fragile &amp; heavy</note></box>"#,
        ]
    );
}

#[test]
fn test_fragments_at_different_depths() {
    let xml = "<a><box>1</box><b><c><box>2</box></c></b><box>3</box></a>";
    assert_eq!(
        fragments(xml, "box", 4).unwrap(),
        vec!["<box>1</box>", "<box>2</box>", "<box>3</box>"]
    );
}

// ==================== Content Handling ====================

#[test]
fn test_cdata_is_escaped_text() {
    let xml = "<r><box><![CDATA[a < b]]></box></r>";
    assert_eq!(fragments(xml, "box", 3).unwrap(), vec!["<box>a &lt; b</box>"]);
}

#[test]
fn test_character_references_decoded_then_escaped() {
    let xml = "<r><box>&#65;&#x42;&lt;</box></r>";
    assert_eq!(fragments(xml, "box", 2).unwrap(), vec!["<box>AB&lt;</box>"]);
}

#[test]
fn test_comments_and_pis_dropped_inside_fragment() {
    let xml = "<r><box><!-- c --><?pi x?><a/></box></r>";
    assert_eq!(fragments(xml, "box", 5).unwrap(), vec!["<box><a></a></box>"]);
}

#[test]
fn test_attribute_values_not_reescaped() {
    let xml = r#"<r><box title="a &amp; b &lt; c"/></r>"#;
    assert_eq!(
        fragments(xml, "box", 6).unwrap(),
        vec![r#"<box title="a & b < c"></box>"#]
    );
}

#[test]
fn test_multibyte_text_across_chunks() {
    let xml = "<r><box>größe 日本</box></r>";
    for size in 1..=8 {
        assert_eq!(
            fragments(xml, "box", size).unwrap(),
            vec!["<box>größe 日本</box>"],
            "chunk size {}",
            size
        );
    }
}

#[test]
fn test_crlf_line_endings() {
    let xml = "<truck>\r\n  <box>\r\n    <note>two\r\nlines</note>\r\n  </box>\r\n</truck>\r\n";
    for size in [1, 3, 8, 1024] {
        assert_eq!(
            fragments(xml, "box", size).unwrap(),
            vec!["<box><note>two\nlines</note></box>"],
            "chunk size {}",
            size
        );
    }
}

#[test]
fn test_apostrophes_kept_in_text() {
    let xml = r#"<r><box>it's "here"</box></r>"#;
    assert_eq!(
        fragments(xml, "box", 4).unwrap(),
        vec!["<box>it's &quot;here&quot;</box>"]
    );
}

#[test]
fn test_large_ignored_text_between_fragments() {
    let filler = "lorem ipsum &amp; dolor\n".repeat(4000);
    let xml = format!(
        "<r><box>1</box><trash>{}</trash>{}<box>2</box></r>",
        filler, filler
    );
    for size in [7, 64, 4096] {
        assert_eq!(
            fragments(&xml, "box", size).unwrap(),
            vec!["<box>1</box>", "<box>2</box>"],
            "chunk size {}",
            size
        );
    }
}

#[test]
fn test_bom_skipped() {
    let xml = "\u{feff}<r><box/></r>";
    assert_eq!(fragments(xml, "box", 1).unwrap(), vec!["<box></box>"]);
}

// ==================== Entities ====================

#[test]
fn test_registered_entity_injected_and_substituted() {
    let xml = "<?xml version=\"1.0\"?>\n<!DOCTYPE truck SYSTEM \"truck.dtd\">\n\
               <truck><box>&foo;</box><box>x &foo; y</box></truck>";
    let mut chunker = XmlChunker::new(Cursor::new(xml), "box").unwrap();
    chunker.add_entity("foo", "bar").unwrap();

    let mut out = Vec::new();
    chunker
        .for_each_fragment(|f| out.push(f.to_string()))
        .unwrap();
    assert_eq!(out, vec!["<box>bar</box>", "<box>x bar y</box>"]);
}

#[test]
fn test_registered_entity_in_attribute() {
    let xml = "<!DOCTYPE r SYSTEM \"r.dtd\"><r><box label=\"&co;\"/></r>";
    let config = ChunkerConfig::new("box")
        .unwrap()
        .with_entity("co", "Acme")
        .unwrap();
    let chunker = XmlChunker::with_config(Cursor::new(xml), config);

    let mut out = Vec::new();
    chunker
        .for_each_fragment(|f| out.push(f.to_string()))
        .unwrap();
    assert_eq!(out, vec![r#"<box label="Acme"></box>"#]);
}

#[test]
fn test_unregistered_entity_skipped_with_warning() {
    let xml = "<r><box>a&unknown;b</box></r>";
    assert_eq!(fragments(xml, "box", 3).unwrap(), vec!["<box>ab</box>"]);
}

#[test]
fn test_external_dtd_entity_in_attribute_skipped() {
    let xml = r#"<!DOCTYPE r SYSTEM "r.dtd"><r><box a="&ext;">x</box></r>"#;
    assert_eq!(fragments(xml, "box", 5).unwrap(), vec![r#"<box a="">x</box>"#]);
}

#[test]
fn test_undeclared_entity_in_attribute_is_error() {
    let err = fragments(r#"<r><box a="&nope;"/></r>"#, "box", 64).unwrap_err();
    assert_eq!(err.xml_code(), Some(XmlErrorCode::UndefinedEntity));
}

#[test]
fn test_entities_with_internal_subset_rejected() {
    let xml = "<!DOCTYPE r [<!ENTITY a \"b\">]><r/>";
    let mut chunker = XmlChunker::new(Cursor::new(xml), "box").unwrap();
    chunker.add_entity("foo", "bar").unwrap();
    assert!(matches!(
        chunker.for_each_fragment(|_| {}),
        Err(ChunkerError::UnsupportedDtd(_))
    ));
}

#[test]
fn test_doctype_must_fit_first_chunk() {
    let xml = "<!DOCTYPE truck SYSTEM \"truck.dtd\"><truck/>";
    let mut chunker = XmlChunker::new(Cursor::new(xml), "box").unwrap();
    chunker.set_chunk_size(10).unwrap();
    chunker.add_entity("foo", "bar").unwrap();
    assert!(matches!(
        chunker.for_each_fragment(|_| {}),
        Err(ChunkerError::UnsupportedDtd(_))
    ));
}

// ==================== Trailing Arguments ====================

#[test]
fn test_extra_args_follow_fragment() {
    let chunker = XmlChunker::new(Cursor::new(TRUCK), "box").unwrap();
    let mut calls = Vec::new();
    let summary = chunker
        .parse_file(
            |fragment, args| calls.push((fragment.len(), args.to_vec())),
            vec![10_u32, 20],
        )
        .unwrap();

    assert_eq!(summary.fragments, 3);
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|(_, args)| args == &[10, 20]));
}

// ==================== Errors ====================

#[test]
fn test_nested_fundamental_aborts() {
    let xml = "<truck>\n<box><air/></box>\n<box>\n<box/></box>\n<box/></truck>";
    let chunker = XmlChunker::new(Cursor::new(xml), "box").unwrap();
    let mut seen = Vec::new();
    let err = chunker
        .for_each_fragment(|f| seen.push(f.to_string()))
        .unwrap_err();

    assert_eq!(seen, vec!["<box><air></air></box>"]);
    match err {
        ChunkerError::NestedFundamental { tag, line } => {
            assert_eq!(tag, "box");
            assert_eq!(line, 4);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_malformed_xml_aborts_with_line() {
    let xml = "<r>\n<box>ok</box>\n<box><a></b></box>\n</r>";
    let mut seen = 0;
    let chunker = XmlChunker::new(Cursor::new(xml), "box").unwrap();
    let err = chunker.for_each_fragment(|_| seen += 1).unwrap_err();

    assert_eq!(seen, 1);
    assert_eq!(err.xml_code(), Some(XmlErrorCode::TagMismatch));
    assert_eq!(err.line(), Some(3));
}

#[test]
fn test_truncated_document() {
    let err = fragments("<r><box>", "box", 3).unwrap_err();
    assert_eq!(err.xml_code(), Some(XmlErrorCode::NoElements));
}

#[test]
fn test_empty_document() {
    let err = fragments("", "box", 3).unwrap_err();
    assert_eq!(err.xml_code(), Some(XmlErrorCode::NoElements));
}

#[test]
fn test_junk_after_root() {
    let err = fragments("<r><box/></r><r/>", "box", 3).unwrap_err();
    assert_eq!(err.xml_code(), Some(XmlErrorCode::JunkAfterDocElement));
}

// ==================== Files ====================

#[test]
fn test_open_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truck.xml");
    fs::write(&path, TRUCK).unwrap();

    let mut chunker = XmlChunker::open(&path, "box").unwrap();
    chunker.set_chunk_size(13).unwrap();
    let mut count = 0;
    let summary = chunker.for_each_fragment(|_| count += 1).unwrap();

    assert_eq!(count, 3);
    assert_eq!(summary.bytes_read, TRUCK.len() as u64);
}

#[test]
fn test_open_missing_file_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = XmlChunker::open(dir.path().join("missing.xml"), "box").unwrap_err();
    assert!(matches!(err, ChunkerError::Configuration(_)));
}
