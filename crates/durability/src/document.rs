//! In-memory stack document
//!
//! A [`StackDocument`] mirrors the XML file one-to-one: the root's `path`
//! and `schema` attributes, any other root attributes, and an ordered list
//! of entry elements. Entry attributes are kept as raw strings in document
//! order; decoding them is the job of the schema engine that owns the
//! document. Attributes nobody decodes are written back unchanged.

use crate::xml;
use std::path::Path;
use swstack_core::Result;
use tracing::debug;

/// Root element name
pub const ROOT_ELEMENT: &str = "stack_history";
/// Entry element name
pub const ENTRY_ELEMENT: &str = "elt";
/// Root attribute holding the document's own path
pub const PATH_ATTRIBUTE: &str = "path";
/// Root attribute holding the schema identifier
pub const SCHEMA_ATTRIBUTE: &str = "schema";

/// One entry element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    attributes: Vec<(String, String)>,
}

impl Element {
    /// Element without attributes
    pub fn new() -> Self {
        Element::default()
    }

    /// Builder-style attribute setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Value of an attribute
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// All attributes in document order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }
}

/// Parsed stack document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackDocument {
    /// `path` attribute of the root
    pub path: Option<String>,
    /// `schema` attribute of the root
    pub schema: Option<String>,
    /// Remaining root attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Entry elements in document order
    pub elements: Vec<Element>,
}

impl StackDocument {
    /// Empty document
    pub fn new(path: impl Into<String>, schema: Option<String>) -> Self {
        StackDocument {
            path: Some(path.into()),
            schema,
            attributes: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Same root with a different entry list
    pub fn with_elements(&self, elements: Vec<Element>) -> Self {
        StackDocument {
            path: self.path.clone(),
            schema: self.schema.clone(),
            attributes: self.attributes.clone(),
            elements,
        }
    }

    /// Read and parse a document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let document = xml::parse_document(&text)?;
        debug!(
            path = %path.display(),
            schema = ?document.schema,
            entries = document.elements.len(),
            "Loaded stack document"
        );
        Ok(document)
    }

    /// Parse a document from text
    pub fn parse(text: &str) -> Result<Self> {
        xml::parse_document(text)
    }

    /// Serialize as UTF-8 XML indented by `indent` spaces
    pub fn to_xml(&self, indent: usize) -> Result<Vec<u8>> {
        xml::render_document(self, indent)
    }
}
