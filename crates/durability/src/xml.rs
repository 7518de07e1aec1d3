//! XML codec for stack documents
//!
//! Reads and writes the `<stack_history>` format with `quick-xml`:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <stack_history path="/d/bak/f/f_swinstall_stack" schema="2">
//!    <elt action="install" version="1" datetime="20181110-104603" hash="..."/>
//! </stack_history>
//! ```
//!
//! Children of entry elements, comments and text are ignored on read.

use crate::document::{
    Element, StackDocument, ENTRY_ELEMENT, PATH_ATTRIBUTE, ROOT_ELEMENT, SCHEMA_ATTRIBUTE,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use swstack_core::{Result, StackError};

fn xml_err<E: std::fmt::Display>(e: E) -> StackError {
    StackError::Xml(e.to_string())
}

fn read_attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    start
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(xml_err)?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(xml_err)?
                .to_string();
            let value = attr.unescape_value().map_err(xml_err)?.into_owned();
            Ok((key, value))
        })
        .collect()
}

fn read_root(start: &BytesStart<'_>, document: &mut StackDocument) -> Result<()> {
    if start.name().as_ref() != ROOT_ELEMENT.as_bytes() {
        return Err(StackError::Xml(format!(
            "unexpected root element <{}>, expected <{}>",
            String::from_utf8_lossy(start.name().as_ref()),
            ROOT_ELEMENT
        )));
    }
    for (key, value) in read_attributes(start)? {
        match key.as_str() {
            PATH_ATTRIBUTE => document.path = Some(value),
            SCHEMA_ATTRIBUTE => document.schema = Some(value),
            _ => document.attributes.push((key, value)),
        }
    }
    Ok(())
}

fn read_entry(start: &BytesStart<'_>, document: &mut StackDocument) -> Result<()> {
    if start.name().as_ref() != ENTRY_ELEMENT.as_bytes() {
        return Err(StackError::Xml(format!(
            "unexpected element <{}> under <{}>",
            String::from_utf8_lossy(start.name().as_ref()),
            ROOT_ELEMENT
        )));
    }
    let mut element = Element::new();
    for (key, value) in read_attributes(start)? {
        element.set(key, value);
    }
    document.elements.push(element);
    Ok(())
}

/// Parse a stack document from text
pub fn parse_document(text: &str) -> Result<StackDocument> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut document = StackDocument::default();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(start) => {
                match depth {
                    0 if seen_root => return Err(StackError::Xml("multiple root elements".into())),
                    0 => {
                        read_root(&start, &mut document)?;
                        seen_root = true;
                    }
                    1 => read_entry(&start, &mut document)?,
                    _ => {}
                }
                depth += 1;
            }
            Event::Empty(start) => match depth {
                0 if seen_root => return Err(StackError::Xml("multiple root elements".into())),
                0 => {
                    read_root(&start, &mut document)?;
                    seen_root = true;
                }
                1 => read_entry(&start, &mut document)?,
                _ => {}
            },
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(StackError::Xml("document has no root element".into()));
    }
    if depth != 0 {
        return Err(StackError::Xml("unexpected end of document".into()));
    }
    Ok(document)
}

/// Render a stack document as indented UTF-8 XML
pub fn render_document(document: &StackDocument, indent: usize) -> Result<Vec<u8>> {
    let mut writer = if indent > 0 {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    } else {
        Writer::new(Vec::new())
    };

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    let mut root = BytesStart::new(ROOT_ELEMENT);
    if let Some(path) = &document.path {
        root.push_attribute((PATH_ATTRIBUTE, path.as_str()));
    }
    if let Some(schema) = &document.schema {
        root.push_attribute((SCHEMA_ATTRIBUTE, schema.as_str()));
    }
    for (key, value) in &document.attributes {
        root.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(root)).map_err(xml_err)?;

    for element in &document.elements {
        let mut entry = BytesStart::new(ENTRY_ELEMENT);
        for (key, value) in element.attributes() {
            entry.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Empty(entry)).map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
        .map_err(xml_err)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}
