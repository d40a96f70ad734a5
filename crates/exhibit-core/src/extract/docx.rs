//! Word-processing document extraction.
//!
//! Walks `word/document.xml` with a small depth-tracking state machine.
//! Only paragraphs that are direct children of the body count toward the
//! word total; text nested in tables or other containers is excluded.
//! Run text is concatenated without separators, so a word split across
//! runs stays one word.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::extract::{opc, truncate_to_hour, FileFacts};
use crate::record::{Metadata, WordMetadata};

/// Main document part of a word-processing container.
const DOCUMENT_PART: &str = "word/document.xml";

/// Extract word-document metadata from the container at `path`.
pub fn extract(path: &Path, facts: FileFacts) -> Result<Metadata> {
    let mut archive = opc::open_container(path)?;

    let props = match opc::read_optional_part(&mut archive, opc::CORE_PROPERTIES_PART)? {
        Some(xml) => opc::parse_core_properties(&xml)?,
        None => Default::default(),
    };

    let body_xml = opc::read_part(&mut archive, DOCUMENT_PART)?;
    let counts = scan_document_body(&body_xml)?;

    Ok(Metadata::Word(WordMetadata {
        size_bytes: facts.size_bytes,
        last_access: facts.last_access,
        author: props.creator,
        title: props.title,
        created: truncate_to_hour(&props.created),
        modified: truncate_to_hour(&props.modified),
        word_count: counts.words,
        num_images: counts.inline_images,
    }))
}

#[derive(Debug, Default)]
struct BodyCounts {
    words: u64,
    inline_images: u64,
}

/// Count words in body-level paragraphs and inline graphics anywhere.
///
/// Within an open paragraph, `w:t` text accumulates verbatim, `w:tab`
/// contributes a tab and `w:br`/`w:cr` a newline, but only when they sit
/// inside a run. Tab stop definitions under `w:pPr` share the `tab` local
/// name and must not count. The finished paragraph is then split on
/// whitespace.
fn scan_document_body(xml: &str) -> Result<BodyCounts> {
    let mut reader = Reader::from_str(xml);
    let mut counts = BodyCounts::default();

    let mut depth: usize = 0;
    let mut body_depth: Option<usize> = None;
    let mut paragraph_depth: Option<usize> = None;
    let mut in_run = false;
    let mut in_text = false;
    let mut paragraph = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"body" if body_depth.is_none() => body_depth = Some(depth),
                    b"p" if paragraph_depth.is_none()
                        && body_depth.map(|d| d + 1) == Some(depth) =>
                    {
                        paragraph_depth = Some(depth);
                        paragraph.clear();
                    }
                    b"r" if paragraph_depth.is_some() => in_run = true,
                    b"t" if in_run => in_text = true,
                    b"tab" if in_run => paragraph.push('\t'),
                    b"br" | b"cr" if in_run => paragraph.push('\n'),
                    b"inline" => counts.inline_images += 1,
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" if in_run => paragraph.push('\t'),
                b"br" | b"cr" if in_run => paragraph.push('\n'),
                b"inline" => counts.inline_images += 1,
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                if in_text {
                    let text = t.unescape().map_err(|e| opc::malformed(DOCUMENT_PART, e))?;
                    paragraph.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                match e.local_name().as_ref() {
                    b"p" if paragraph_depth == Some(depth) => {
                        counts.words += paragraph.split_whitespace().count() as u64;
                        paragraph_depth = None;
                    }
                    b"r" => in_run = false,
                    b"t" => in_text = false,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(opc::malformed(DOCUMENT_PART, e)),
        }
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
                        xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">
                <w:body>{body}</w:body>
            </w:document>"#
        )
    }

    #[test]
    fn test_counts_words_across_paragraphs() {
        let xml = document(
            "<w:p><w:r><w:t>The quick brown fox</w:t></w:r></w:p>\
             <w:p><w:r><w:t>jumps over</w:t></w:r></w:p>",
        );
        let counts = scan_document_body(&xml).unwrap();
        assert_eq!(counts.words, 6);
        assert_eq!(counts.inline_images, 0);
    }

    #[test]
    fn test_runs_concatenate_without_separator() {
        // "Hel" + "lo" is one word, not two
        let xml = document(
            "<w:p><w:r><w:t>Hel</w:t></w:r><w:r><w:t>lo</w:t></w:r>\
             <w:r><w:t> world</w:t></w:r></w:p>",
        );
        let counts = scan_document_body(&xml).unwrap();
        assert_eq!(counts.words, 2);
    }

    #[test]
    fn test_tabs_and_breaks_separate_words() {
        let xml = document(
            "<w:p><w:r><w:t>alpha</w:t><w:tab/><w:t>beta</w:t><w:br/>\
             <w:t>gamma</w:t></w:r></w:p>",
        );
        let counts = scan_document_body(&xml).unwrap();
        assert_eq!(counts.words, 3);
    }

    #[test]
    fn test_tab_stop_definitions_do_not_count() {
        // w:tabs/w:tab under paragraph properties shares the local name
        // with the run-level tab character
        let xml = document(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>solo</w:t></w:r></w:p>",
        );
        let counts = scan_document_body(&xml).unwrap();
        assert_eq!(counts.words, 1);
    }

    #[test]
    fn test_table_text_is_excluded() {
        let xml = document(
            "<w:p><w:r><w:t>outside</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc>\
             <w:p><w:r><w:t>inside the table</w:t></w:r></w:p>\
             </w:tc></w:tr></w:tbl>",
        );
        let counts = scan_document_body(&xml).unwrap();
        assert_eq!(counts.words, 1);
    }

    #[test]
    fn test_inline_images_counted_in_both_forms() {
        let xml = document(
            "<w:p><w:r><w:drawing><wp:inline><wp:extent cx=\"1\" cy=\"1\"/></wp:inline>\
             </w:drawing></w:r></w:p>\
             <w:p><w:r><w:drawing><wp:inline/></w:drawing></w:r></w:p>",
        );
        let counts = scan_document_body(&xml).unwrap();
        assert_eq!(counts.inline_images, 2);
    }

    #[test]
    fn test_entities_unescape_inside_text() {
        let xml = document("<w:p><w:r><w:t>salt &amp; pepper</w:t></w:r></w:p>");
        let counts = scan_document_body(&xml).unwrap();
        // "salt", "&", "pepper"
        assert_eq!(counts.words, 3);
    }

    #[test]
    fn test_empty_body() {
        let xml = document("");
        let counts = scan_document_body(&xml).unwrap();
        assert_eq!(counts.words, 0);
        assert_eq!(counts.inline_images, 0);
    }

    #[test]
    fn test_whitespace_only_paragraph_counts_zero() {
        let xml = document("<w:p><w:r><w:t>   </w:t></w:r></w:p>");
        let counts = scan_document_body(&xml).unwrap();
        assert_eq!(counts.words, 0);
    }
}
