//! The record tree.

use super::Value;
use indexmap::map::Entry;
use indexmap::IndexMap;

/// One child entry of a [`RecordNode`].
///
/// A slot starts as text or a nested node and turns into a
/// [`ChildSlot::Collection`] as soon as a second child with the same name
/// is inserted. Collections only ever hold `Text` and `Node` items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildSlot {
    /// Simple text content (an element without children or attributes)
    Text(String),
    /// A nested element with children and/or attributes
    Node(RecordNode),
    /// Repeated same-named siblings, in document order
    Collection(Vec<ChildSlot>),
}

impl ChildSlot {
    /// Returns the text if this is a [`ChildSlot::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ChildSlot::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the node if this is a [`ChildSlot::Node`].
    pub fn as_node(&self) -> Option<&RecordNode> {
        match self {
            ChildSlot::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the items if this is a [`ChildSlot::Collection`].
    pub fn as_collection(&self) -> Option<&[ChildSlot]> {
        match self {
            ChildSlot::Collection(items) => Some(items),
            _ => None,
        }
    }

    /// Exports this slot as a plain value.
    pub fn export(&self, merge_attributes: bool) -> Value {
        match self {
            ChildSlot::Text(s) => Value::Text(s.clone()),
            ChildSlot::Node(node) => node.export_tree(merge_attributes),
            ChildSlot::Collection(items) => Value::List(
                items
                    .iter()
                    .map(|item| item.export(merge_attributes))
                    .collect(),
            ),
        }
    }

    fn merge_attributes(&mut self, unset_attributes: bool) {
        match self {
            ChildSlot::Text(_) => {}
            ChildSlot::Node(node) => node.merge_attributes_into_self(unset_attributes),
            ChildSlot::Collection(items) => {
                for item in items {
                    item.merge_attributes(unset_attributes);
                }
            }
        }
    }
}

impl From<RecordNode> for ChildSlot {
    fn from(node: RecordNode) -> Self {
        ChildSlot::Node(node)
    }
}

impl From<&str> for ChildSlot {
    fn from(s: &str) -> Self {
        ChildSlot::Text(s.to_string())
    }
}

impl From<String> for ChildSlot {
    fn from(s: String) -> Self {
        ChildSlot::Text(s)
    }
}

/// An XML element extracted from the document.
///
/// Holds the tag name, an optional text value, an optional set of attributes
/// and the element's children keyed by tag name.
///
/// ```
/// use xml_extractor::record::{ChildSlot, RecordNode};
///
/// let mut outside = RecordNode::new("Outside");
/// outside.set_child("Inside", "Value 1");
/// assert_eq!(outside.get("Inside").and_then(ChildSlot::as_text), Some("Value 1"));
///
/// // A second child with the same name turns the slot into a collection
/// outside.set_child("Inside", "Value 2");
/// let items = outside.get("Inside").and_then(ChildSlot::as_collection).unwrap();
/// assert_eq!(items[1].as_text(), Some("Value 2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordNode {
    name: String,
    value: Option<String>,
    attributes: Option<Box<RecordNode>>,
    children: IndexMap<String, ChildSlot>,
}

impl RecordNode {
    /// Creates a new node with no value, attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the tag name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the text value, `None` if no text was ever assigned.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Sets or clears the text value.
    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Appends text to the value, setting it if it was unset.
    ///
    /// Consecutive text and CDATA chunks of one element accumulate, so
    /// `a<![CDATA[b]]>c` reads as `abc` instead of keeping only the last chunk,
    /// and the text on both sides of a child element is joined.
    pub fn push_text(&mut self, text: &str) {
        self.value.get_or_insert_with(String::new).push_str(text);
    }

    /// Inserts a child, resolving name collisions.
    ///
    /// A new name is inserted as is. A name that already holds a collection
    /// gets the new slot appended. Any other existing entry is replaced by a
    /// collection of the previous entry followed by the new one.
    pub fn set_child(&mut self, name: impl Into<String>, slot: impl Into<ChildSlot>) {
        let slot = slot.into();
        match self.children.entry(name.into()) {
            Entry::Vacant(entry) => {
                entry.insert(slot);
            }
            Entry::Occupied(mut entry) => match entry.get_mut() {
                ChildSlot::Collection(items) => items.push(slot),
                existing => {
                    let previous = std::mem::replace(existing, ChildSlot::Text(String::new()));
                    *existing = ChildSlot::Collection(vec![previous, slot]);
                }
            },
        }
    }

    /// Returns the child stored under `name`.
    pub fn get(&self, name: &str) -> Option<&ChildSlot> {
        self.children.get(name)
    }

    /// Returns true if a child is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Iterates over the children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &ChildSlot)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of child slots.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true iff the node has neither attributes nor children.
    ///
    /// The text value does not count: an element holding only text is empty.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_none() && self.children.is_empty()
    }

    /// Records an attribute on this node.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .get_or_insert_with(|| Box::new(RecordNode::default()))
            .set_child(name, ChildSlot::Text(value.into()));
    }

    /// Returns true if the element carried attributes.
    pub fn has_attributes(&self) -> bool {
        self.attributes.is_some()
    }

    /// Returns an attribute value, `None` if absent or if there are no
    /// attributes at all.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(name))
            .and_then(ChildSlot::as_text)
    }

    /// Returns all attributes as name/value pairs (empty when there are none).
    pub fn attributes(&self) -> IndexMap<String, String> {
        self.attributes
            .iter()
            .flat_map(|attrs| attrs.children())
            .filter_map(|(name, slot)| slot.as_text().map(|v| (name.to_string(), v.to_string())))
            .collect()
    }

    /// Returns the node holding the attributes.
    pub fn attribute_node(&self) -> Option<&RecordNode> {
        self.attributes.as_deref()
    }

    /// Exports the node as a plain value without modifying it.
    ///
    /// With `merge_attributes`, attributes are folded into the resulting map
    /// and a text value is stored under the node's own name. Without it, a
    /// text value replaces the whole result and attributes are dropped.
    /// A node with no value and nothing else to export becomes an empty string.
    pub fn export_tree(&self, merge_attributes: bool) -> Value {
        let mut map = IndexMap::new();
        if merge_attributes {
            if let Some(Value::Map(attrs)) = self.attributes.as_ref().map(|a| a.export_tree(false))
            {
                map.extend(attrs);
            }
        }

        for (key, slot) in &self.children {
            match slot {
                ChildSlot::Node(node) => {
                    map.insert(node.name.clone(), node.export_tree(merge_attributes));
                }
                other => {
                    map.insert(key.clone(), other.export(merge_attributes));
                }
            }
        }

        match &self.value {
            Some(value) if merge_attributes => {
                map.insert(self.name.clone(), Value::Text(value.clone()));
                Value::Map(map)
            }
            Some(value) => Value::Text(value.clone()),
            None if map.is_empty() => Value::Text(String::new()),
            None => Value::Map(map),
        }
    }

    /// Folds attributes into the children, in place and recursively.
    ///
    /// A text value is first moved into a child named after this node,
    /// replacing any child of that name just as [`export_tree(true)`]
    /// overwrites it. An attribute only becomes a child when no child of that
    /// name exists. With `unset_attributes` the attribute set is dropped
    /// afterwards.
    ///
    /// [`export_tree(true)`]: Self::export_tree
    pub fn merge_attributes_into_self(&mut self, unset_attributes: bool) {
        if let Some(value) = self.value.take() {
            self.children.insert(self.name.clone(), ChildSlot::Text(value));
        }

        let attributes = if unset_attributes {
            self.attributes.take().map(|attrs| *attrs)
        } else {
            self.attributes.as_deref().cloned()
        };
        if let Some(attrs) = attributes {
            for (name, slot) in attrs.children {
                if !self.contains(&name) {
                    self.set_child(name, slot);
                }
            }
        }

        for slot in self.children.values_mut() {
            slot.merge_attributes(unset_attributes);
        }
    }

    /// Shorthand for [`merge_attributes_into_self(true)`](Self::merge_attributes_into_self).
    pub fn merge_attributes(&mut self) {
        self.merge_attributes_into_self(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn map(entries: &[(&str, Value)]) -> Value {
        Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_new_node_is_empty() {
        let node = RecordNode::new("root");
        assert!(node.is_empty());
        assert_eq!(node.name(), "root");
        assert!(node.value().is_none());
        assert_eq!(node.export_tree(false), text(""));
        assert_eq!(node.export_tree(true), text(""));
    }

    #[test]
    fn test_value_does_not_affect_emptiness() {
        let mut node = RecordNode::new("tag");
        node.set_value(Some("hello".to_string()));
        assert!(node.is_empty());
        assert_eq!(node.export_tree(false), text("hello"));
    }

    #[test]
    fn test_empty_value_is_distinct_from_unset() {
        let mut node = RecordNode::new("tag");
        node.set_value(Some(String::new()));
        assert_eq!(node.value(), Some(""));
        node.set_value(None);
        assert_eq!(node.value(), None);
    }

    #[test]
    fn test_push_text_appends() {
        let mut node = RecordNode::new("tag");
        node.push_text("foo");
        node.push_text("bar");
        assert_eq!(node.value(), Some("foobar"));
    }

    #[test]
    fn test_set_name() {
        let mut node = RecordNode::new("a");
        node.set_name("b");
        assert_eq!(node.name(), "b");
    }

    #[test]
    fn test_collision_builds_ordered_collection() {
        let mut node = RecordNode::new("root");
        node.set_child("multi", "1");
        node.set_child("multi", "2");
        node.set_child("multi", "3");

        assert_eq!(node.len(), 1);
        let items = node.get("multi").and_then(ChildSlot::as_collection).unwrap();
        let values: Vec<_> = items.iter().filter_map(ChildSlot::as_text).collect();
        assert_eq!(values, vec!["1", "2", "3"]);

        assert_eq!(
            node.export_tree(false),
            map(&[("multi", Value::List(vec![text("1"), text("2"), text("3")]))])
        );
    }

    #[test]
    fn test_collision_promotes_complex_node_to_collection() {
        let mut first = RecordNode::new("item");
        first.set_child("field", "a");
        let mut second = RecordNode::new("item");
        second.set_child("field", "b");

        let mut node = RecordNode::new("root");
        node.set_child("item", first.clone());
        node.set_child("item", second.clone());

        let items = node.get("item").and_then(ChildSlot::as_collection).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_node(), Some(&first));
        assert_eq!(items[1].as_node(), Some(&second));
        // The first occurrence keeps only its own named children
        assert_eq!(first.len(), 1);

        assert_eq!(
            node.export_tree(false),
            map(&[(
                "item",
                Value::List(vec![map(&[("field", text("a"))]), map(&[("field", text("b"))])])
            )])
        );
    }

    #[test]
    fn test_collection_mixes_text_and_nodes() {
        let mut with_attr = RecordNode::new("entry");
        with_attr.set_attribute("id", "2");
        with_attr.set_value(Some("second".to_string()));

        let mut node = RecordNode::new("root");
        node.set_child("entry", "first");
        node.set_child("entry", with_attr);

        assert_eq!(
            node.export_tree(false),
            map(&[("entry", Value::List(vec![text("first"), text("second")]))])
        );
        assert_eq!(
            node.export_tree(true),
            map(&[(
                "entry",
                Value::List(vec![
                    text("first"),
                    map(&[("id", text("2")), ("entry", text("second"))])
                ])
            )])
        );
    }

    #[test]
    fn test_attribute_access() {
        let mut node = RecordNode::new("tag");
        assert!(node.attributes().is_empty());
        assert_eq!(node.attribute("size"), None);
        assert!(!node.has_attributes());

        node.set_attribute("size", "large");
        node.set_attribute("color", "red");
        assert!(node.has_attributes());
        assert!(!node.is_empty());
        assert_eq!(node.attribute("size"), Some("large"));
        assert_eq!(node.attribute("missing"), None);

        let attrs = node.attributes();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("color").map(String::as_str), Some("red"));
        assert_eq!(node.attribute_node().map(RecordNode::len), Some(2));
    }

    #[test]
    fn test_export_without_merge_drops_attributes() {
        let mut field = RecordNode::new("field");
        field.set_attribute("name", "inside");
        field.set_value(Some("Field value".to_string()));

        let mut tag = RecordNode::new("tag");
        tag.set_attribute("size", "large");
        tag.set_child("field", field);

        assert_eq!(tag.export_tree(false), map(&[("field", text("Field value"))]));
    }

    #[test]
    fn test_export_with_merge() {
        let mut field = RecordNode::new("field");
        field.set_attribute("name", "inside");
        field.set_value(Some("Field value".to_string()));

        let mut tag = RecordNode::new("tag");
        tag.set_attribute("size", "large");
        tag.set_child("field", field);

        assert_eq!(
            tag.export_tree(true),
            map(&[
                ("size", text("large")),
                (
                    "field",
                    map(&[("field", text("Field value")), ("name", text("inside"))])
                ),
            ])
        );
    }

    #[test]
    fn test_export_with_merge_data_wins() {
        let mut tag = RecordNode::new("tag");
        tag.set_attribute("field", "X");
        tag.set_child("field", "data");

        assert_eq!(tag.export_tree(true), map(&[("field", text("data"))]));
    }

    #[test]
    fn test_export_is_repeatable() {
        let mut tag = RecordNode::new("tag");
        tag.set_attribute("a", "1");
        tag.set_child("b", "2");
        tag.set_child("b", "3");
        assert_eq!(tag.export_tree(false), tag.export_tree(false));
        assert_eq!(tag.export_tree(true), tag.export_tree(true));
    }

    #[test]
    fn test_merge_into_self_matches_merged_export() {
        let mut inner = RecordNode::new("field");
        inner.set_attribute("name", "inside");
        inner.set_value(Some("Field value".to_string()));

        let mut repeated = RecordNode::new("entry");
        repeated.set_attribute("id", "7");
        repeated.set_child("label", "x");

        let mut tag = RecordNode::new("tag");
        tag.set_attribute("size", "large");
        tag.set_attribute("field", "shadowed");
        tag.set_child("field", inner);
        tag.set_child("entry", "plain");
        tag.set_child("entry", repeated);

        let expected = tag.export_tree(true);
        let mut merged = tag.clone();
        merged.merge_attributes();
        assert_eq!(merged.export_tree(false), expected);
        assert!(!merged.has_attributes());
    }

    #[test]
    fn test_merge_into_self_demotes_value() {
        let mut tag = RecordNode::new("tag");
        tag.set_attribute("tag", "attr");
        tag.set_value(Some("text".to_string()));

        tag.merge_attributes();
        assert!(tag.value().is_none());
        assert_eq!(tag.get("tag").and_then(ChildSlot::as_text), Some("text"));
        assert_eq!(tag.len(), 1);
    }

    #[test]
    fn test_merge_into_self_value_replaces_same_named_child() {
        let mut item = RecordNode::new("item");
        item.set_child("item", "x");
        item.set_value(Some("text".to_string()));

        let expected = item.export_tree(true);
        assert_eq!(expected, map(&[("item", text("text"))]));

        let mut merged = item.clone();
        merged.merge_attributes();
        assert_eq!(merged.get("item").and_then(ChildSlot::as_text), Some("text"));
        assert_eq!(merged.export_tree(false), expected);
    }

    #[test]
    fn test_merge_into_self_keeps_attributes_when_asked() {
        let mut tag = RecordNode::new("tag");
        tag.set_attribute("size", "large");
        tag.merge_attributes_into_self(false);
        assert_eq!(tag.attribute("size"), Some("large"));
        assert_eq!(tag.get("size").and_then(ChildSlot::as_text), Some("large"));
    }

    #[test]
    fn test_emptiness_law() {
        let empty = RecordNode::new("a");
        assert!(empty.is_empty());
        assert!(empty.export_tree(false).is_empty());

        let mut full = RecordNode::new("a");
        full.set_child("b", "");
        assert!(!full.is_empty());
        assert!(!full.export_tree(false).is_empty());
    }

    #[test]
    fn test_children_iteration_order() {
        let mut node = RecordNode::new("root");
        node.set_child("z", "1");
        node.set_child("a", "2");
        node.set_child("m", "3");
        let keys: Vec<_> = node.children().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert!(node.contains("a"));
        assert!(!node.contains("b"));
    }
}
