//! Record types.
//!
//! - [`RecordNode`] - One extracted element: name, text value, attributes
//!   and children
//! - [`ChildSlot`] - A child entry: text, nested node or collection of
//!   same-named siblings
//! - [`Value`] - The plain nested form a record exports to

mod node;
mod value;

pub use node::{ChildSlot, RecordNode};
pub use value::Value;
