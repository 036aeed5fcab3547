//! Hierarchical tree form.
//!
//! [`Element`] is the node type adapters encode into and decode from: a possibly
//! prefix-qualified name, namespace declarations, an ordered attribute map, ordered child
//! elements and optional scalar content. It carries no text syntax of its own; callers
//! that need XML or another markup map it with their own printer.
//!
//! ## Namespaces
//!
//! Names are either `local` or `prefix:local`. A prefix resolves against the element's
//! own declarations first and then against its parent's, which is as far as adapters
//! need: every element an adapter creates declares the namespace it was written in.
//! The empty prefix declares the default namespace.
//!
//! ```rust
//! use propcodec::{Element, Value};
//!
//! let mut root = Element::new("order");
//! root.declare_namespace("p", "urn:shop");
//! let line = root.add_child("p:line");
//! line.set_attribute("id", Value::Int(0));
//!
//! assert_eq!(root.elements_matching("line", Some("urn:shop")).count(), 1);
//! assert_eq!(root.elements_matching("line", None).count(), 0);
//! ```

use crate::Value;
use indexmap::IndexMap;

/// A node of the tree form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespaces: IndexMap<String, String>,
    attributes: IndexMap<String, Value>,
    children: Vec<Element>,
    content: Option<Value>,
}

fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Builds the qualified name for a local name and an optional prefix.
pub(crate) fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}:{}", p, local),
        _ => local.to_string(),
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Element::default()
        }
    }

    /// The qualified name, `prefix:local` or `local`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        split_name(&self.name).1
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        split_name(&self.name).0
    }

    /// Appends a new empty child and returns it.
    pub fn add_child(&mut self, name: impl Into<String>) -> &mut Element {
        self.children.push(Element::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub(crate) fn take_children(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.children)
    }

    /// Child elements whose local name is `local` and whose namespace is `uri`.
    ///
    /// `None` selects children outside any namespace.
    pub fn elements_matching<'a>(
        &'a self,
        local: &'a str,
        uri: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |child| self.is_match(child, local, uri))
    }

    /// Returns the first child matching `local` and `uri`.
    #[must_use]
    pub fn first_matching(&self, local: &str, uri: Option<&str>) -> Option<&Element> {
        self.children
            .iter()
            .find(|child| self.is_match(child, local, uri))
    }

    /// Whether `child` has the local name `local` in namespace `uri`, resolving its prefix
    /// against the child first and then this element.
    pub(crate) fn is_match(&self, child: &Element, local: &str, uri: Option<&str>) -> bool {
        if child.local_name() != local {
            return false;
        }
        let prefix = child.prefix().unwrap_or("");
        let resolved = child
            .namespace_uri_for(prefix)
            .or_else(|| self.namespace_uri_for(prefix));
        resolved == uri
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    pub fn attributes(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.attributes.iter()
    }

    /// Looks up an attribute by local name and namespace uri.
    ///
    /// Unprefixed attributes are outside any namespace.
    #[must_use]
    pub fn attribute_matching(&self, local: &str, uri: Option<&str>) -> Option<&Value> {
        self.attributes.iter().find_map(|(name, value)| {
            let (prefix, name_local) = split_name(name);
            if name_local != local {
                return None;
            }
            let resolved = prefix.and_then(|p| self.namespace_uri_for(p));
            (resolved == uri).then_some(value)
        })
    }

    #[must_use]
    pub fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }

    pub fn set_content(&mut self, value: Value) {
        self.content = Some(value);
    }

    pub(crate) fn take_content(&mut self) -> Option<Value> {
        self.content.take()
    }

    /// Returns `true` when the node has no children, attributes or content.
    ///
    /// Namespace declarations do not count.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.children.is_empty() && self.attributes.is_empty() && self.content.is_none()
    }

    /// The prefix declared on this element for `uri`.
    #[must_use]
    pub fn namespace_prefix_for(&self, uri: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(_, u)| u.as_str() == uri)
            .map(|(p, _)| p.as_str())
    }

    /// The uri declared on this element for `prefix` (`""` for the default namespace).
    #[must_use]
    pub fn namespace_uri_for(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    pub fn declare_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    pub fn namespaces(&self) -> indexmap::map::Iter<'_, String, String> {
        self.namespaces.iter()
    }

    /// Copies every declaration of `other` whose prefix this element does not declare.
    pub(crate) fn inherit_namespaces(&mut self, other: &Element) {
        for (prefix, uri) in &other.namespaces {
            if !self.namespaces.contains_key(prefix) {
                self.namespaces.insert(prefix.clone(), uri.clone());
            }
        }
    }

    /// Moves the children, attributes and content of `other` into this element.
    pub(crate) fn splice(&mut self, mut other: Element) {
        self.inherit_namespaces(&other);
        for (name, value) in std::mem::take(&mut other.attributes) {
            self.attributes.insert(name, value);
        }
        self.children.append(&mut other.children);
        if let Some(content) = other.content.take() {
            self.content = Some(content);
        }
    }
}
