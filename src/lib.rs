//! Streaming XML record extraction for Rust.
//!
//! This crate turns a large or deeply nested XML document into a sequence of
//! records, one per element matching a tag path, without loading the whole
//! document into memory.
//!
//! # Features
//!
//! - **Tag paths**: `root/container/item` walks the containers and yields
//!   every `item`; `root/*` yields every element inside `root`.
//! - **Structured records**: [`RecordNode`] keeps the tag name, text value,
//!   attributes and children; repeated siblings become ordered collections.
//! - **Plain export**: [`Value`] is a nested text / list / map form, with
//!   attributes optionally folded into the data.
//! - **Container attributes**: attributes of the path's container elements
//!   are captured and available while iterating.
//! - **Serde Support**: [`Value`] serializes to and from JSON-shaped data
//!   with `serde`; its `Display` output is compact JSON.
//!
//! # Quick Start
//!
//! ```rust
//! use xml_extractor::{ExtractorConfig, RecordExtractor};
//!
//! let xml = r#"<root source="file">
//!     <tag size="large"><field name="inside">Field value</field></tag>
//! </root>"#;
//!
//! let mut extractor =
//!     RecordExtractor::from_xml(xml, "root/tag", ExtractorConfig::new()).unwrap();
//!
//! for record in extractor.records() {
//!     let node = record.unwrap().into_node().unwrap();
//!     assert_eq!(node.attribute("size"), Some("large"));
//!     println!("{}", node.export_tree(false)); // {"field":"Field value"}
//!     println!("{}", node.export_tree(true)); // {"size":"large","field":{"name":"inside","field":"Field value"}}
//! }
//! ```
//!
//! # Streaming from a file
//!
//! ```rust,no_run
//! use xml_extractor::{ExtractorConfig, RecordExtractor};
//!
//! let config = ExtractorConfig::new()
//!     .with_plain_map(true)
//!     .with_merge_attributes(true);
//! let mut extractor = RecordExtractor::from_file("catalog.xml", "catalog/item", config).unwrap();
//!
//! for record in &mut extractor {
//!     match record {
//!         Ok(record) => println!("{}", record.as_value().unwrap()),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! println!("{} records", extractor.count());
//! ```
//!
//! # Module Structure
//!
//! - [`record`] - Record tree and plain export types
//! - [`extractor`] - The streaming record extractor
//! - [`parser`] - Pull-parser boundary and the `quick-xml` implementation
//! - [`path`] - Tag path parsing
//! - [`error`] - Error types

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod extractor;
pub mod parser;
pub mod path;
pub mod record;

// Re-export commonly used types at the crate root
pub use error::{Error, Result};
pub use extractor::{ExtractorConfig, Record, RecordExtractor, Records, RootTag, DEFAULT_MAX_DEPTH};
pub use parser::{Node, NodeKind, PullParser, XmlPullParser, XmlSource};
pub use path::{TagPath, TargetTag};
pub use record::{ChildSlot, RecordNode, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
