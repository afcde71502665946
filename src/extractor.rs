//! Streaming record extractor.
//!
//! [`RecordExtractor`] pulls nodes from a [`PullParser`] and assembles one
//! record per element matching the configured [`TagPath`], keeping only the
//! record being built in memory.
//!
//! # Example
//!
//! ```rust
//! use xml_extractor::extractor::{ExtractorConfig, RecordExtractor};
//!
//! let xml = r#"<catalog version="2">
//!     <item><name>First</name></item>
//!     <item><name>Second</name><tag>a</tag><tag>b</tag></item>
//! </catalog>"#;
//!
//! let config = ExtractorConfig::new().with_plain_map(true);
//! let mut extractor = RecordExtractor::from_xml(xml, "catalog/item", config).unwrap();
//!
//! for record in extractor.records() {
//!     let record = record.unwrap();
//!     println!("{}", record.as_value().unwrap());
//! }
//! assert_eq!(extractor.count(), 2);
//!
//! let catalog = extractor.root_tag("catalog").unwrap();
//! assert_eq!(catalog.attribute("version"), Some("2"));
//! ```

use crate::error::{Error, Result};
use crate::parser::{Node, NodeKind, PullParser, XmlSource};
use crate::path::TagPath;
use crate::record::{ChildSlot, RecordNode, Value};
use std::path::Path;

/// Default limit on element nesting inside one record.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Configuration options for the extractor.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Return records as plain [`Value`]s instead of [`RecordNode`]s
    pub return_plain_map: bool,
    /// Fold attributes into the record data (existing children win)
    pub merge_attributes: bool,
    /// Deepest element nesting allowed inside a record, the record itself
    /// counting as depth 1
    pub max_depth: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            return_plain_map: false,
            merge_attributes: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ExtractorConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether records are exported as plain values.
    pub fn with_plain_map(mut self, plain: bool) -> Self {
        self.return_plain_map = plain;
        self
    }

    /// Sets whether attributes are merged into the record data.
    pub fn with_merge_attributes(mut self, merge: bool) -> Self {
        self.merge_attributes = merge;
        self
    }

    /// Sets the nesting limit inside a record.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A record produced by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Structured form (the default)
    Node(RecordNode),
    /// Plain form, when [`ExtractorConfig::return_plain_map`] is set
    Plain(Value),
}

impl Record {
    /// Returns the structured record, if this is one.
    pub fn as_node(&self) -> Option<&RecordNode> {
        match self {
            Record::Node(node) => Some(node),
            Record::Plain(_) => None,
        }
    }

    /// Returns the plain record, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Record::Plain(value) => Some(value),
            Record::Node(_) => None,
        }
    }

    /// Converts into the structured record, if this is one.
    pub fn into_node(self) -> Option<RecordNode> {
        match self {
            Record::Node(node) => Some(node),
            Record::Plain(_) => None,
        }
    }

    /// Converts into the plain record, if this is one.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Record::Plain(value) => Some(value),
            Record::Node(_) => None,
        }
    }
}

/// A container element named by the tag path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootTag {
    name: String,
    node: Option<RecordNode>,
}

impl RootTag {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            node: None,
        }
    }

    /// The segment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The captured element (name and attributes only), once encountered.
    pub fn node(&self) -> Option<&RecordNode> {
        self.node.as_ref()
    }

    /// Returns true once the element has been encountered in this pass.
    pub fn is_resolved(&self) -> bool {
        self.node.is_some()
    }
}

/// How a start element relates to the tag path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagRole {
    /// The pending root segment at this index
    Root(usize),
    /// The start of a record, or of a descendant inside one
    Record,
}

/// A streaming record extractor.
///
/// The extractor is a restartable cursor: [`restart`](Self::restart) opens a
/// new pass and reads the first record, [`advance`](Self::advance) reads the
/// next one, and [`current`](Self::current), [`position`](Self::position) and
/// [`count`](Self::count) expose the cursor state. [`records`](Self::records)
/// wraps the same protocol in an iterator.
///
/// The parser, and with it any open file, is released when the extractor is
/// dropped, closed, restarted or hits an error.
pub struct RecordExtractor {
    path: TagPath,
    config: ExtractorConfig,
    source: Option<XmlSource>,
    parser: Option<Box<dyn PullParser>>,
    opened: bool,
    roots: Vec<RootTag>,
    depth: usize,
    position: i64,
    count: usize,
    current: Option<Record>,
}

impl RecordExtractor {
    /// Creates an extractor over a source.
    ///
    /// Fails with [`Error::Configuration`] if the tag path is malformed or a
    /// file source does not exist. Nothing is read until the first pass.
    pub fn new(source: XmlSource, tag_path: &str, config: ExtractorConfig) -> Result<Self> {
        if let XmlSource::File(path) = &source {
            if !path.exists() {
                return Err(Error::Configuration(format!(
                    "File doesn't exist: {}",
                    path.display()
                )));
            }
        }
        let mut extractor = Self::unopened(tag_path, config)?;
        extractor.source = Some(source);
        Ok(extractor)
    }

    /// Creates an extractor reading a file.
    pub fn from_file(path: impl AsRef<Path>, tag_path: &str, config: ExtractorConfig) -> Result<Self> {
        Self::new(XmlSource::file(path), tag_path, config)
    }

    /// Creates an extractor reading an in-memory document.
    pub fn from_xml(xml: impl Into<String>, tag_path: &str, config: ExtractorConfig) -> Result<Self> {
        Self::new(XmlSource::text(xml), tag_path, config)
    }

    /// Creates an extractor driving an existing parser.
    ///
    /// Such an extractor supports a single pass: the parser cannot be
    /// rewound, so a second [`restart`](Self::restart) fails.
    pub fn with_parser(
        parser: impl PullParser + 'static,
        tag_path: &str,
        config: ExtractorConfig,
    ) -> Result<Self> {
        let mut extractor = Self::unopened(tag_path, config)?;
        extractor.parser = Some(Box::new(parser));
        Ok(extractor)
    }

    fn unopened(tag_path: &str, config: ExtractorConfig) -> Result<Self> {
        let path = TagPath::parse(tag_path)?;
        let roots = path.roots().iter().map(|name| RootTag::new(name)).collect();
        Ok(Self {
            path,
            config,
            source: None,
            parser: None,
            opened: false,
            roots,
            depth: 0,
            position: -1,
            count: 0,
            current: None,
        })
    }

    /// The tag path records are extracted from.
    pub fn tag_path(&self) -> &TagPath {
        &self.path
    }

    /// The extractor configuration.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Starts a new pass from the beginning of the document and reads the
    /// first record.
    ///
    /// Resets the count, the position and the captured root tags.
    pub fn restart(&mut self) -> Result<Option<&Record>> {
        let parser = match &self.source {
            Some(source) => {
                self.parser = None;
                tracing::debug!(path = %self.path, "Opening XML source");
                source.open()?
            }
            None => match self.parser.take() {
                Some(parser) if !self.opened => parser,
                _ => {
                    return Err(Error::Configuration(
                        "the parser cannot be rewound for another pass".to_string(),
                    ))
                }
            },
        };
        self.parser = Some(parser);
        self.opened = true;

        for root in &mut self.roots {
            root.node = None;
        }
        self.count = 0;
        self.position = -1;
        self.current = None;
        self.advance()
    }

    /// Reads the next record and makes it current.
    ///
    /// Returns `None` once the records are exhausted, or when no pass is
    /// open. An error ends the pass and releases the parser.
    pub fn advance(&mut self) -> Result<Option<&Record>> {
        self.position += 1;
        self.depth = 0;

        match self.next_record() {
            Ok(record) => {
                if record.is_some() {
                    self.count += 1;
                } else {
                    tracing::debug!(count = self.count, "No more records");
                }
                self.current = record;
                Ok(self.current.as_ref())
            }
            Err(e) => {
                tracing::debug!(error = %e, position = self.position, "Extraction aborted");
                self.current = None;
                self.parser = None;
                Err(e)
            }
        }
    }

    /// The current record.
    pub fn current(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    /// Zero-based index of the current record, -1 before a pass starts.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Returns true while there is a current record.
    pub fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    /// Number of records produced so far in this pass.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Container tags of the path, in path order.
    pub fn root_tags(&self) -> &[RootTag] {
        &self.roots
    }

    /// The captured container element named `name`.
    pub fn root_tag(&self, name: &str) -> Option<&RecordNode> {
        self.roots
            .iter()
            .find(|root| root.name == name)
            .and_then(RootTag::node)
    }

    /// Releases the parser. The current pass ends.
    pub fn close(&mut self) {
        self.parser = None;
    }

    /// Iterates over the records of a new pass.
    ///
    /// The first call to `next` restarts the extractor. Records are moved out
    /// to the caller, so [`current`](Self::current) stays empty while
    /// iterating. An error is yielded once and ends the iteration.
    pub fn records(&mut self) -> Records<'_> {
        Records {
            extractor: self,
            started: false,
            done: false,
        }
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        let Some(mut node) = self.assemble(None)? else {
            return Ok(None);
        };
        tracing::trace!(tag = node.name(), position = self.position, "Assembled record");

        let record = if self.config.return_plain_map {
            Record::Plain(node.export_tree(self.config.merge_attributes))
        } else {
            if self.config.merge_attributes {
                node.merge_attributes();
            }
            Record::Node(node)
        };
        Ok(Some(record))
    }

    fn read_node(&mut self) -> Result<Option<Node>> {
        match self.parser.as_mut() {
            Some(parser) => parser.read_node(),
            None => Ok(None),
        }
    }

    /// Assembles one element.
    ///
    /// `pending` is a start node the caller already consumed; it is used
    /// instead of reading. A close tag with nothing assembled is the end of
    /// a container and ends the pass.
    fn assemble(&mut self, mut pending: Option<Node>) -> Result<Option<RecordNode>> {
        let mut record: Option<RecordNode> = None;

        loop {
            let node = match pending.take() {
                Some(node) => node,
                None => match self.read_node()? {
                    Some(node) => node,
                    None => break,
                },
            };

            match node.kind {
                NodeKind::Other => continue,
                NodeKind::ElementEnd => break,
                NodeKind::Text | NodeKind::CData => {
                    if let (Some(record), Some(text)) = (record.as_mut(), node.value.as_deref()) {
                        record.push_text(text);
                    }
                    continue;
                }
                NodeKind::ElementStart => {}
            }

            if let TagRole::Root(index) = self.classify(&node.name)? {
                tracing::debug!(tag = %node.name, attributes = node.attributes.len(), "Entered root tag");
                self.roots[index].node = Some(element_node(node));
                continue;
            }

            match record {
                None => {
                    if self.depth >= self.config.max_depth {
                        return Err(Error::DepthLimitExceeded {
                            tag: node.name,
                            limit: self.config.max_depth,
                        });
                    }
                    let self_closing = node.is_empty_element;
                    record = Some(element_node(node));
                    self.depth += 1;
                    if self_closing {
                        break;
                    }
                }
                Some(ref mut current) => {
                    if let Some(child) = self.assemble(Some(node))? {
                        let name = child.name().to_string();
                        if child.is_empty() {
                            // Simple content, no value is always an empty string
                            let value = child.value().unwrap_or_default().to_string();
                            current.set_child(name, ChildSlot::Text(value));
                        } else {
                            current.set_child(name, child);
                        }
                    }
                }
            }
        }

        if record.is_some() {
            self.depth = self.depth.saturating_sub(1);
        }
        Ok(record)
    }

    fn classify(&self, name: &str) -> Result<TagRole> {
        if self.depth > 0 || self.roots.is_empty() {
            return Ok(TagRole::Record);
        }

        if let Some(index) = self.roots.iter().position(|root| !root.is_resolved()) {
            return if self.roots[index].name == name {
                Ok(TagRole::Root(index))
            } else {
                Err(Error::UnexpectedRootTag(name.to_string()))
            };
        }

        let target = self.path.target();
        if target.matches(name) {
            Ok(TagRole::Record)
        } else {
            Err(Error::TagMismatch {
                found: name.to_string(),
                expected: target.to_string(),
            })
        }
    }
}

/// Builds a node from a start element's name and attributes.
fn element_node(node: Node) -> RecordNode {
    let mut element = RecordNode::new(node.name);
    for (name, value) in node.attributes {
        element.set_attribute(name, value);
    }
    element
}

/// Iterator over the records of one pass, see [`RecordExtractor::records`].
pub struct Records<'a> {
    extractor: &'a mut RecordExtractor,
    started: bool,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let step = if self.started {
            self.extractor.advance().map(|_| ())
        } else {
            self.started = true;
            self.extractor.restart().map(|_| ())
        };

        match step {
            Ok(()) => match self.extractor.current.take() {
                Some(record) => Some(Ok(record)),
                None => {
                    self.done = true;
                    None
                }
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<'a> IntoIterator for &'a mut RecordExtractor {
    type Item = Result<Record>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.records()
    }
}
