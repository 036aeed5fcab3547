//! Declarative property and record descriptions.
//!
//! Descriptions are plain data and implement [`serde::Deserialize`], so they can be loaded
//! from any serde format. Field names are snake_case; the adapter type tag is `type`.
//!
//! ```rust
//! use propcodec::RecordDescription;
//!
//! let desc: RecordDescription = serde_json::from_str(r#"{
//!     "name": "Order",
//!     "properties": [
//!         { "name": "id", "type": "long", "attribute": true },
//!         { "name": "lines", "type": "array", "element_tag": "line",
//!           "element": { "type": "string" } }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(desc.properties.len(), 2);
//! assert_eq!(desc.properties[1].element_tag.as_deref(), Some("line"));
//! ```

use crate::{Namespace, SequenceKind};
use serde::{Deserialize, Serialize};

/// How one property is adapted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDescription {
    /// Property name; defaults to `element`, `key` or `value` for sub-descriptions.
    pub name: String,
    /// External tag; defaults to the property name.
    pub tag: Option<String>,
    /// Spliced into the parent instead of wrapped.
    pub anonymous: bool,
    /// Stored as an attribute of the parent.
    pub attribute: bool,
    /// Type tag used to select the adapter.
    #[serde(rename = "type")]
    pub type_name: String,
    pub namespace: Option<Namespace>,
    pub sparse: bool,
    pub empty_is_null: bool,
    pub element_tag: Option<String>,
    pub element: Option<Box<PropertyDescription>>,
    pub key: Option<Box<PropertyDescription>>,
    pub value: Option<Box<PropertyDescription>>,
    /// Sequence kind of collection properties.
    pub kind: Option<SequenceKind>,
    /// Adapter override, consulted before `type`.
    pub adapter: Option<String>,
}

impl PropertyDescription {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        PropertyDescription {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    #[must_use]
    pub fn attribute(mut self) -> Self {
        self.attribute = true;
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, uri: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.namespace = Some(Namespace::new(uri, prefix));
        self
    }

    #[must_use]
    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    #[must_use]
    pub fn empty_is_null(mut self) -> Self {
        self.empty_is_null = true;
        self
    }

    #[must_use]
    pub fn with_element_tag(mut self, tag: impl Into<String>) -> Self {
        self.element_tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: PropertyDescription) -> Self {
        self.element = Some(Box::new(element));
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: PropertyDescription) -> Self {
        self.key = Some(Box::new(key));
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: PropertyDescription) -> Self {
        self.value = Some(Box::new(value));
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: SequenceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    /// The tag the adapter is selected by: the override if present, else the type.
    #[must_use]
    pub fn selection_tag(&self) -> &str {
        self.adapter.as_deref().unwrap_or(&self.type_name)
    }

    /// The external tag, `None` when anonymous.
    #[must_use]
    pub fn effective_tag(&self) -> Option<String> {
        if self.anonymous {
            return None;
        }
        self.tag
            .clone()
            .or_else(|| Some(self.name.clone()))
            .filter(|t| !t.is_empty())
    }
}

/// How a record type is adapted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDescription {
    pub name: String,
    /// External tag; defaults to the record name.
    pub tag: Option<String>,
    /// A "choice" record: holds one of its properties at a time.
    pub anonymous: bool,
    /// Namespace inherited by properties that do not declare their own.
    pub namespace: Option<Namespace>,
    pub properties: Vec<PropertyDescription>,
}

impl RecordDescription {
    pub fn new(name: impl Into<String>) -> Self {
        RecordDescription {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, uri: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.namespace = Some(Namespace::new(uri, prefix));
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: PropertyDescription) -> Self {
        self.properties.push(property);
        self
    }

    /// The external tag, `None` for anonymous records.
    #[must_use]
    pub fn effective_tag(&self) -> Option<String> {
        if self.anonymous {
            return None;
        }
        self.tag
            .clone()
            .or_else(|| Some(self.name.clone()))
            .filter(|t| !t.is_empty())
    }
}
