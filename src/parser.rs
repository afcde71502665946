//! Pull-parser boundary.
//!
//! The extractor consumes XML as a forward-only sequence of owned [`Node`]s
//! obtained from a [`PullParser`]. [`XmlPullParser`] is the `quick-xml`
//! implementation; [`XmlSource`] opens one from a file or from an in-memory
//! document, as often as a pass needs to be restarted.

use crate::error::Result;
use quick_xml::events::BytesStart;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::str;

/// The kind of a parsed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An opening tag, or a self-closing one
    ElementStart,
    /// A closing tag
    ElementEnd,
    /// Character data
    Text,
    /// A CDATA section
    CData,
    /// Declarations, comments, processing instructions, doctypes and
    /// whitespace-only text
    Other,
}

/// One node event read from the document.
///
/// Nodes are owned so that the extractor can hand a start node down to a
/// recursive call without holding a borrow on the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// The node kind
    pub kind: NodeKind,
    /// Qualified tag name for element nodes, empty otherwise
    pub name: String,
    /// Text content for text and CDATA nodes
    pub value: Option<String>,
    /// True for a self-closing element (`<tag/>`)
    pub is_empty_element: bool,
    /// Attribute name/value pairs of a start element, in document order
    pub attributes: Vec<(String, String)>,
}

impl Node {
    /// Creates an element start node.
    pub fn start(name: impl Into<String>, attributes: Vec<(String, String)>, is_empty: bool) -> Self {
        Self {
            kind: NodeKind::ElementStart,
            name: name.into(),
            value: None,
            is_empty_element: is_empty,
            attributes,
        }
    }

    /// Creates an element end node.
    pub fn end(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::ElementEnd,
            name: name.into(),
            value: None,
            is_empty_element: false,
            attributes: Vec::new(),
        }
    }

    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::character_data(NodeKind::Text, value.into())
    }

    /// Creates a CDATA node.
    pub fn cdata(value: impl Into<String>) -> Self {
        Self::character_data(NodeKind::CData, value.into())
    }

    /// Creates a node the extractor ignores.
    pub fn other() -> Self {
        Self {
            kind: NodeKind::Other,
            name: String::new(),
            value: None,
            is_empty_element: false,
            attributes: Vec::new(),
        }
    }

    fn character_data(kind: NodeKind, value: String) -> Self {
        Self {
            kind,
            name: String::new(),
            value: Some(value),
            is_empty_element: false,
            attributes: Vec::new(),
        }
    }

    /// Returns true if the node carries a text value.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Returns true if the node carries attributes.
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }
}

/// A forward-only source of [`Node`]s.
pub trait PullParser {
    /// Reads the next node, `None` at the end of the document.
    fn read_node(&mut self) -> Result<Option<Node>>;
}

impl<P: PullParser + ?Sized> PullParser for Box<P> {
    fn read_node(&mut self) -> Result<Option<Node>> {
        (**self).read_node()
    }
}

/// A [`PullParser`] backed by `quick-xml`.
///
/// Text is kept as written, surrounding spaces included; whitespace-only text
/// between elements is reported as [`NodeKind::Other`]. Entity references in
/// text and attribute values are unescaped; CDATA is passed through verbatim.
pub struct XmlPullParser<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> XmlPullParser<R> {
    /// Creates a parser reading from a buffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: Reader::from_reader(reader),
            buf: Vec::with_capacity(4096),
        }
    }

    /// Extracts attributes from a BytesStart element as owned data.
    fn extract_attrs(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            attrs.push((key, value));
        }
        Ok(attrs)
    }
}

impl<R: BufRead> PullParser for XmlPullParser<R> {
    fn read_node(&mut self) -> Result<Option<Node>> {
        self.buf.clear();

        let node = match self.reader.read_event_into(&mut self.buf)? {
            XmlEvent::Start(ref e) => {
                let name = str::from_utf8(e.name().as_ref())?.to_string();
                Node::start(name, Self::extract_attrs(e)?, false)
            }
            XmlEvent::Empty(ref e) => {
                let name = str::from_utf8(e.name().as_ref())?.to_string();
                Node::start(name, Self::extract_attrs(e)?, true)
            }
            XmlEvent::End(ref e) => Node::end(str::from_utf8(e.name().as_ref())?),
            XmlEvent::Text(ref e) => {
                let text = e.unescape()?;
                if is_xml_whitespace(&text) {
                    Node::other()
                } else {
                    Node::text(text.into_owned())
                }
            }
            XmlEvent::CData(ref e) => Node::cdata(str::from_utf8(e.as_ref())?),
            XmlEvent::Eof => return Ok(None),
            _ => Node::other(),
        };

        Ok(Some(node))
    }
}

/// Returns true if `text` holds only XML whitespace (space, tab, CR, LF).
fn is_xml_whitespace(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// Where a document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlSource {
    /// A file on disk
    File(PathBuf),
    /// An in-memory document
    Text(String),
}

impl XmlSource {
    /// Creates a file source.
    pub fn file(path: impl AsRef<Path>) -> Self {
        XmlSource::File(path.as_ref().to_path_buf())
    }

    /// Creates an in-memory source.
    pub fn text(xml: impl Into<String>) -> Self {
        XmlSource::Text(xml.into())
    }

    /// Opens a fresh parser positioned at the start of the document.
    pub fn open(&self) -> Result<Box<dyn PullParser>> {
        match self {
            XmlSource::File(path) => {
                let file = File::open(path)?;
                Ok(Box::new(XmlPullParser::from_reader(BufReader::new(file))))
            }
            XmlSource::Text(xml) => Ok(Box::new(XmlPullParser::from_reader(Cursor::new(
                xml.clone().into_bytes(),
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(xml: &str) -> Vec<Node> {
        let mut parser = XmlPullParser::from_reader(xml.as_bytes());
        let mut nodes = Vec::new();
        while let Some(node) = parser.read_node().unwrap() {
            nodes.push(node);
        }
        nodes
    }

    #[test]
    fn test_element_nodes() {
        let nodes = read_all(r#"<root a="1"><tag/></root>"#);
        assert_eq!(
            nodes,
            vec![
                Node::start("root", vec![("a".to_string(), "1".to_string())], false),
                Node::start("tag", Vec::new(), true),
                Node::end("root"),
            ]
        );
        assert!(nodes[0].has_attributes());
        assert!(!nodes[1].has_attributes());
    }

    #[test]
    fn test_text_keeps_surrounding_spaces() {
        let nodes = read_all("<a>\n   x &amp; y  \n</a>");
        assert_eq!(nodes[1], Node::text("\n   x & y  \n"));
        assert!(nodes[1].has_value());

        let nodes = read_all("<tag>  padded value  </tag>");
        assert_eq!(nodes[1], Node::text("  padded value  "));
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let nodes = read_all("<a>\n  <b>1</b>\n</a>");
        let kinds: Vec<_> = nodes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::ElementStart,
                NodeKind::Other,
                NodeKind::ElementStart,
                NodeKind::Text,
                NodeKind::ElementEnd,
                NodeKind::Other,
                NodeKind::ElementEnd,
            ]
        );
        assert_eq!(nodes[3], Node::text("1"));
    }

    #[test]
    fn test_cdata_and_other_nodes() {
        let nodes = read_all("<?xml version=\"1.0\"?><a><!-- note --><![CDATA[<raw>]]></a>");
        assert_eq!(nodes[0].kind, NodeKind::Other);
        assert_eq!(nodes[2].kind, NodeKind::Other);
        assert_eq!(nodes[3], Node::cdata("<raw>"));
    }

    #[test]
    fn test_attribute_values_are_unescaped() {
        let nodes = read_all(r#"<a title="x &lt; y"/>"#);
        assert_eq!(nodes[0].attributes, vec![("title".to_string(), "x < y".to_string())]);
    }

    #[test]
    fn test_mismatched_end_tag_is_an_error() {
        let mut parser = XmlPullParser::from_reader("<a></b>".as_bytes());
        assert!(parser.read_node().is_ok());
        assert!(parser.read_node().is_err());
    }

    #[test]
    fn test_source_reopens_from_start() {
        let source = XmlSource::text("<root/>");
        for _ in 0..2 {
            let mut parser = source.open().unwrap();
            let node = parser.read_node().unwrap().unwrap();
            assert_eq!(node.name, "root");
            assert!(parser.read_node().unwrap().is_none());
        }
    }

    #[test]
    fn test_missing_file_source_fails_to_open() {
        let source = XmlSource::file("/nonexistent/path/to/file.xml");
        assert!(source.open().is_err());
    }
}
