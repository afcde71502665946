//! demo_records - Print the records found under a tag path.
//!
//! Reads an XML file, extracts every element matching the tag path and
//! prints one compact JSON line per record, followed by the attributes of
//! the container elements and the record count.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example demo_records <filename.xml> <tag/path> [--merge]
//! ```
//!
//! `--merge` folds attributes into the record data.

use std::env;
use std::process;

use xml_extractor::{ExtractorConfig, RecordExtractor};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <filename.xml> <tag/path> [--merge]", args[0]);
        process::exit(1);
    }
    let merge = args.iter().skip(3).any(|a| a == "--merge");

    let config = ExtractorConfig::new()
        .with_plain_map(true)
        .with_merge_attributes(merge);

    let mut extractor = match RecordExtractor::from_file(&args[1], &args[2], config) {
        Ok(extractor) => extractor,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    for record in &mut extractor {
        match record {
            Ok(record) => {
                if let Some(value) = record.as_value() {
                    println!("{}", value);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }

    for root in extractor.root_tags() {
        if let Some(node) = root.node() {
            eprintln!("<{}> {}", root.name(), node.export_tree(true));
        }
    }
    eprintln!("{} records", extractor.count());
}
