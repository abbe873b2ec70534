//! Text extraction shared by the Office Open XML loaders.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;

use super::super::LoadCause;

pub(super) type Archive = zip::ZipArchive<Cursor<Vec<u8>>>;

pub(super) fn open(bytes: Vec<u8>) -> Result<Archive, LoadCause> {
    Ok(zip::ZipArchive::new(Cursor::new(bytes))?)
}

pub(super) fn read_entry(archive: &mut Archive, name: &str) -> Result<String, LoadCause> {
    let mut entry = archive.by_name(name)?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Element names that carry text and delimit paragraphs in one XML dialect.
pub(super) struct Dialect {
    pub text: &'static [u8],
    pub paragraph: &'static [u8],
    pub tab: &'static [u8],
    pub line_break: &'static [u8],
}

pub(super) const WORDPROCESSING: Dialect = Dialect {
    text: b"w:t",
    paragraph: b"w:p",
    tab: b"w:tab",
    line_break: b"w:br",
};

pub(super) const DRAWING: Dialect = Dialect {
    text: b"a:t",
    paragraph: b"a:p",
    tab: b"a:tab",
    line_break: b"a:br",
};

/// Concatenate the text runs of `xml`, one line per paragraph. Empty paragraphs
/// are dropped.
pub(super) fn extract_text(xml: &str, dialect: &Dialect) -> Result<String, LoadCause> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == dialect.text => in_text = true,
            Ok(Event::End(e)) => {
                let name = e.name();
                if name.as_ref() == dialect.text {
                    in_text = false;
                } else if name.as_ref() == dialect.paragraph {
                    let line = std::mem::take(&mut current);
                    if !line.trim().is_empty() {
                        paragraphs.push(line);
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                if name.as_ref() == dialect.tab {
                    current.push('\t');
                } else if name.as_ref() == dialect.line_break {
                    current.push('\n');
                }
            }
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| LoadCause::Xml(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(LoadCause::Xml(format!(
                    "at position {}: {e}",
                    reader.error_position()
                )));
            }
        }
    }
    if !current.trim().is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    /// Zip the given `(name, contents)` entries into an in-memory archive.
    pub fn zip_entries(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub fn docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        zip_entries(&[("word/document.xml", &xml)])
    }

    pub fn slide_xml(text: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_lines() {
        let xml = r#"<w:body><w:p><w:r><w:t>First</w:t></w:r><w:r><w:t xml:space="preserve"> part</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>Second</w:t></w:r></w:p></w:body>"#;
        assert_eq!(extract_text(xml, &WORDPROCESSING).unwrap(), "First part\nSecond");
    }

    #[test]
    fn entities_are_unescaped() {
        let xml = "<a:p><a:r><a:t>R&amp;D &lt;2&gt;</a:t></a:r></a:p>";
        assert_eq!(extract_text(xml, &DRAWING).unwrap(), "R&D <2>");
    }

    #[test]
    fn tabs_and_breaks() {
        let xml = "<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>";
        assert_eq!(extract_text(xml, &WORDPROCESSING).unwrap(), "a\tb\nc");
    }

    #[test]
    fn text_outside_runs_is_ignored() {
        let xml = "<w:p><w:instrText>PAGE</w:instrText><w:r><w:t>body</w:t></w:r></w:p>";
        assert_eq!(extract_text(xml, &WORDPROCESSING).unwrap(), "body");
    }

    #[test]
    fn missing_entry_is_archive_error() {
        let mut archive = open(fixtures::zip_entries(&[("other.xml", "<x/>")])).unwrap();
        let err = read_entry(&mut archive, "word/document.xml").unwrap_err();
        assert!(matches!(err, LoadCause::Archive(_)));
    }
}
