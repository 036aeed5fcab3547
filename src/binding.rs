//! Property bindings: where a property lives in a record and how it is named externally.
//!
//! A [`PropertyBinding`] is resolved once when a record type is registered and is shared
//! read-only by the adapter built for it. Element, key and value sub-adapters of compound
//! properties get bindings without a [`PropertyAccess`].

use crate::tree::{qualify, Element};
use crate::{Error, Record, Result, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A namespace uri with its default prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub uri: String,
    #[serde(default)]
    pub prefix: String,
}

impl Namespace {
    pub fn new(uri: impl Into<String>, prefix: impl Into<String>) -> Self {
        Namespace {
            uri: uri.into(),
            prefix: prefix.into(),
        }
    }
}

/// Whether a property is stored as an attribute of its parent or as a child element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Placement {
    Attribute,
    #[default]
    Element,
}

/// Get/set capability for one property of a record type.
pub trait PropertyAccess: fmt::Debug + Send + Sync {
    fn get(&self, record: &Record) -> Value;

    fn set(&self, record: &mut Record, value: Value) -> Result<()>;

    /// The type tag the property is declared with, if the resolver knows it.
    fn declared_type(&self) -> Option<&str> {
        None
    }

    fn is_writable(&self) -> bool {
        true
    }
}

/// Resolves a property of a record type to its accessor.
pub trait BindingResolver: fmt::Debug + Send + Sync {
    fn resolve(&self, record_type: &str, property: &str) -> Result<Arc<dyn PropertyAccess>>;
}

/// Reads and writes a named field of a [`Record`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldAccess {
    field: String,
    declared_type: Option<String>,
}

impl FieldAccess {
    pub fn new(field: impl Into<String>) -> Self {
        FieldAccess {
            field: field.into(),
            declared_type: None,
        }
    }

    #[must_use]
    pub fn with_declared_type(mut self, type_tag: impl Into<String>) -> Self {
        self.declared_type = Some(type_tag.into());
        self
    }
}

impl PropertyAccess for FieldAccess {
    fn get(&self, record: &Record) -> Value {
        record.get(&self.field).clone()
    }

    fn set(&self, record: &mut Record, value: Value) -> Result<()> {
        record.set(self.field.clone(), value);
        Ok(())
    }

    fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }
}

/// Binds every property to the record field of the same name.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldResolver;

impl BindingResolver for FieldResolver {
    fn resolve(&self, _record_type: &str, property: &str) -> Result<Arc<dyn PropertyAccess>> {
        if property.is_empty() {
            return Err(Error::configuration("property name must not be empty"));
        }
        Ok(Arc::new(FieldAccess::new(property)))
    }
}

/// A fixed table of record fields and their declared types.
///
/// Properties missing from the table fail to resolve.
///
/// # Examples
///
/// ```rust
/// use propcodec::{BindingResolver, FieldTable};
///
/// let table = FieldTable::new().with_field("Person", "age", "int");
/// let access = table.resolve("Person", "age").unwrap();
/// assert_eq!(access.declared_type(), Some("int"));
/// assert!(table.resolve("Person", "email").is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct FieldTable {
    fields: IndexMap<(String, String), String>,
}

impl FieldTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(
        mut self,
        record_type: impl Into<String>,
        property: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> Self {
        self.fields
            .insert((record_type.into(), property.into()), type_tag.into());
        self
    }
}

impl BindingResolver for FieldTable {
    fn resolve(&self, record_type: &str, property: &str) -> Result<Arc<dyn PropertyAccess>> {
        let key = (record_type.to_string(), property.to_string());
        match self.fields.get(&key) {
            Some(type_tag) => Ok(Arc::new(
                FieldAccess::new(property).with_declared_type(type_tag.clone()),
            )),
            None => Err(Error::configuration(format!(
                "record type '{}' has no accessible property '{}'",
                record_type, property
            ))),
        }
    }
}

/// Everything an adapter needs to know about the property it serves.
#[derive(Clone, Debug)]
pub struct PropertyBinding {
    name: String,
    value_type: String,
    tag: Option<String>,
    namespace: Option<Namespace>,
    placement: Placement,
    access: Option<Arc<dyn PropertyAccess>>,
}

impl PropertyBinding {
    /// Creates an element-placed binding tagged with the property name.
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        let name = name.into();
        PropertyBinding {
            tag: Some(name.clone()),
            name,
            value_type: value_type.into(),
            namespace: None,
            placement: Placement::Element,
            access: None,
        }
    }

    /// Sets the external tag; `None` or an empty tag makes the property anonymous.
    #[must_use]
    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag.filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: Option<Namespace>) -> Self {
        self.namespace = namespace;
        self
    }

    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    #[must_use]
    pub fn with_access(mut self, access: Arc<dyn PropertyAccess>) -> Self {
        self.access = Some(access);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type tag the adapter was selected by.
    #[must_use]
    pub fn value_type(&self) -> &str {
        &self.value_type
    }

    /// The local external tag; `None` for anonymous properties.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&Namespace> {
        self.namespace.as_ref()
    }

    #[must_use]
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace.as_ref().map(|ns| ns.uri.as_str())
    }

    /// The uri an attribute of this property is qualified with.
    ///
    /// Unprefixed attributes carry no namespace, so a namespace with an empty prefix does
    /// not apply to attributes.
    #[must_use]
    pub fn attribute_uri(&self) -> Option<&str> {
        self.namespace
            .as_ref()
            .filter(|ns| !ns.prefix.is_empty())
            .map(|ns| ns.uri.as_str())
    }

    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    #[must_use]
    pub fn is_attribute(&self) -> bool {
        self.placement == Placement::Attribute
    }

    #[must_use]
    pub fn access(&self) -> Option<&Arc<dyn PropertyAccess>> {
        self.access.as_ref()
    }

    /// Qualifies `local` with this binding's namespace prefix.
    #[must_use]
    pub fn qualified(&self, local: &str) -> String {
        qualify(self.namespace.as_ref().map(|ns| ns.prefix.as_str()), local)
    }

    /// Creates an element named `local` in this binding's namespace.
    #[must_use]
    pub fn new_element(&self, local: &str) -> Element {
        let mut element = Element::new(self.qualified(local));
        if let Some(ns) = &self.namespace {
            element.declare_namespace(ns.prefix.clone(), ns.uri.clone());
        }
        element
    }

    /// Reads the property from a record.
    pub fn get(&self, record: &Record) -> Result<Value> {
        match &self.access {
            Some(access) => Ok(access.get(record)),
            None => Err(self.no_access()),
        }
    }

    /// Writes the property into a record.
    pub fn set(&self, record: &mut Record, value: Value) -> Result<()> {
        match &self.access {
            Some(access) => access.set(record, value),
            None => Err(self.no_access()),
        }
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.access.as_ref().is_some_and(|a| a.is_writable())
    }

    fn no_access(&self) -> Error {
        Error::configuration(format!("property '{}' has no accessor", self.name))
    }
}
