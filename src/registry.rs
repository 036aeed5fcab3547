//! Adapter selection and record registration.
//!
//! A [`Registry`] maps type tags to adapter factories. The built-in tags are
//!
//! | tag | adapter |
//! |---|---|
//! | `boolean` `byte` `short` `char` `int` `long` `float` `double` `bigint` `decimal` `string` `date` `time` `timestamp` | [`ScalarAdapter`] |
//! | `boolean[]` `char[]` `short[]` `int[]` `long[]` `float[]` `double[]` | [`PrimitiveArrayAdapter`] |
//! | `bytes` | [`BytesAdapter`] |
//! | `array` | [`ArrayAdapter`] |
//! | `collection` | [`CollectionAdapter`] |
//! | `map` | [`MapAdapter`] |
//!
//! and every registered record type becomes a tag of its own, selecting a
//! [`NestedAdapter`]. Custom adapters are added with [`Registry::register_factory`].
//!
//! All configuration errors surface from [`Registry::register_record`], never later.
//!
//! ```rust
//! use propcodec::{CodecOptions, PropertyDescription, Record, RecordDescription, Registry};
//!
//! let mut registry = Registry::new(CodecOptions::new());
//! let person = registry
//!     .register_record(
//!         RecordDescription::new("Person")
//!             .with_property(PropertyDescription::new("name", "string"))
//!             .with_property(PropertyDescription::new("age", "int").attribute()),
//!     )
//!     .unwrap();
//!
//! let alice = Record::new("Person").with("name", "Alice").with("age", 30);
//! let node = person.to_tree(&alice).unwrap();
//! assert_eq!(person.from_tree(&node).unwrap(), alice);
//! ```

use crate::adapter::{
    ArrayAdapter, BytesAdapter, CollectionAdapter, MapAdapter, NestedAdapter,
    PrimitiveArrayAdapter, PropertyAdapter, ScalarAdapter, ScalarKind,
};
use crate::binding::{BindingResolver, FieldResolver, Placement, PropertyBinding};
use crate::describe::{PropertyDescription, RecordDescription};
use crate::{CodecOptions, Descriptor, Error, Result};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Builds an adapter for a binding from its description.
///
/// Compound factories resolve their element adapters through the selector they are given.
pub type AdapterFactory = Arc<
    dyn Fn(&dyn AdapterSelector, PropertyBinding, &PropertyDescription) -> Result<Box<dyn PropertyAdapter>>
        + Send
        + Sync,
>;

/// Wraps a closure as an [`AdapterFactory`].
///
/// ```rust
/// use propcodec::registry::factory;
/// use propcodec::{Registry, ScalarAdapter, ScalarKind};
///
/// let mut registry = Registry::default();
/// registry.register_factory(
///     "flag",
///     factory(|_, binding, _| Ok(Box::new(ScalarAdapter::new(binding, ScalarKind::Boolean)))),
/// );
/// assert!(registry.is_registered("flag"));
/// ```
pub fn factory<F>(f: F) -> AdapterFactory
where
    F: Fn(&dyn AdapterSelector, PropertyBinding, &PropertyDescription) -> Result<Box<dyn PropertyAdapter>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// The adapter-selection capability handed to factories.
pub trait AdapterSelector {
    /// Selects and builds the adapter for `binding`.
    fn select(
        &self,
        binding: PropertyBinding,
        desc: &PropertyDescription,
    ) -> Result<Box<dyn PropertyAdapter>>;

    fn options(&self) -> &CodecOptions;
}

/// Type-tag registry of adapter factories and record descriptors.
pub struct Registry {
    options: CodecOptions,
    factories: IndexMap<String, AdapterFactory>,
    records: IndexMap<String, Arc<Descriptor>>,
    resolver: Arc<dyn BindingResolver>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("options", &self.options)
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("records", &self.records.keys().collect::<Vec<_>>())
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(CodecOptions::default())
    }
}

impl Registry {
    /// Creates a registry with the built-in adapters and the [`FieldResolver`].
    #[must_use]
    pub fn new(options: CodecOptions) -> Self {
        let mut registry = Registry {
            options,
            factories: IndexMap::new(),
            records: IndexMap::new(),
            resolver: Arc::new(FieldResolver),
        };

        for kind in ScalarKind::ALL {
            registry.register_factory(
                kind.type_tag(),
                factory(move |_, binding, _| Ok(Box::new(ScalarAdapter::new(binding, kind)))),
            );
        }
        registry.register_factory(
            "bytes",
            factory(|_, binding, _| Ok(Box::new(BytesAdapter::new(binding)))),
        );
        for kind in PrimitiveArrayAdapter::KINDS {
            registry.register_factory(
                PrimitiveArrayAdapter::type_tag(kind),
                factory(move |selector, binding, desc| {
                    Ok(Box::new(PrimitiveArrayAdapter::new(selector, binding, desc, kind)?))
                }),
            );
        }
        registry.register_factory(
            "array",
            factory(|selector, binding, desc| {
                Ok(Box::new(ArrayAdapter::new(selector, binding, desc)?))
            }),
        );
        registry.register_factory(
            "collection",
            factory(|selector, binding, desc| {
                Ok(Box::new(CollectionAdapter::new(selector, binding, desc)?))
            }),
        );
        registry.register_factory(
            "map",
            factory(|selector, binding, desc| {
                Ok(Box::new(MapAdapter::new(selector, binding, desc)?))
            }),
        );
        registry
    }

    /// Replaces the resolver used to bind record properties.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn BindingResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Registers (or replaces) the factory for a type tag.
    pub fn register_factory(&mut self, tag: impl Into<String>, factory: AdapterFactory) {
        let tag = tag.into();
        trace!(tag = %tag, "registering adapter factory");
        self.factories.insert(tag, factory);
    }

    /// Builds the descriptor of a record type and makes the type selectable by name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any property cannot be bound or has no adapter.
    pub fn register_record(&mut self, desc: RecordDescription) -> Result<Arc<Descriptor>> {
        if desc.name.is_empty() {
            return Err(Error::configuration("record type name must not be empty"));
        }

        let mut adapters = Vec::with_capacity(desc.properties.len());
        for property in &desc.properties {
            let access = self.resolver.resolve(&desc.name, &property.name)?;
            let selection = property.selection_tag();
            if let Some(declared) = access.declared_type() {
                if declared != selection {
                    return Err(Error::configuration(format!(
                        "property '{}.{}' is declared as '{}' but described as '{}'",
                        desc.name, property.name, declared, selection
                    )));
                }
            }

            let placement = if property.attribute {
                Placement::Attribute
            } else {
                Placement::Element
            };
            let binding = PropertyBinding::new(property.name.clone(), selection)
                .with_tag(property.effective_tag())
                .with_namespace(property.namespace.clone().or_else(|| desc.namespace.clone()))
                .with_placement(placement)
                .with_access(access);
            adapters.push(self.select(binding, property)?);
        }

        let descriptor = Arc::new(Descriptor::new(
            desc.name.clone(),
            desc.effective_tag(),
            desc.namespace.clone(),
            adapters,
        ));
        debug!(
            record = %desc.name,
            properties = desc.properties.len(),
            anonymous = descriptor.is_anonymous(),
            "registered record type"
        );
        self.records.insert(desc.name, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// The descriptor of a registered record type.
    #[must_use]
    pub fn descriptor(&self, type_name: &str) -> Option<Arc<Descriptor>> {
        self.records.get(type_name).cloned()
    }

    /// Returns `true` if `tag` selects an adapter.
    #[must_use]
    pub fn is_registered(&self, tag: &str) -> bool {
        self.factories.contains_key(tag) || self.records.contains_key(tag)
    }
}

impl AdapterSelector for Registry {
    fn select(
        &self,
        binding: PropertyBinding,
        desc: &PropertyDescription,
    ) -> Result<Box<dyn PropertyAdapter>> {
        let tag = desc.selection_tag();
        trace!(property = binding.name(), tag, "selecting adapter");

        if let Some(factory) = self.factories.get(tag) {
            return factory(self, binding, desc);
        }
        if let Some(descriptor) = self.records.get(tag) {
            return Ok(Box::new(NestedAdapter::new(binding, Arc::clone(descriptor))));
        }
        if tag.is_empty() {
            return Err(Error::configuration(format!(
                "property '{}' has no type",
                binding.name()
            )));
        }
        Err(Error::configuration(format!(
            "unknown type '{}' for property '{}'",
            tag,
            binding.name()
        )))
    }

    fn options(&self) -> &CodecOptions {
        &self.options
    }
}
