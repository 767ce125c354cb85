// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style schemas: which elements are styleable, with which properties.
//!
//! The stylesheet engine consumes a schema through the [`StyleSchema`] trait
//! and never mutates it. [`Schema`] is a ready-made, immutable
//! implementation for embedders that declare their elements in code.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::value::ValueEncoder;

/// Read-only source of per-element property declarations.
///
/// The schema is passed explicitly to every compile, serialize and
/// deserialize call.
pub trait StyleSchema {
    /// Returns the property declarations for `element`, or `None` if the
    /// element is not styleable.
    fn property_set_spec(&self, element: &str) -> Option<&PropertySetSpec>;
}

impl<T: StyleSchema + ?Sized> StyleSchema for &T {
    fn property_set_spec(&self, element: &str) -> Option<&PropertySetSpec> {
        (**self).property_set_spec(element)
    }
}

/// One supported property: its name and the encoders able to decode it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertySpec {
    name: String,
    encoders: Vec<ValueEncoder>,
}

impl PropertySpec {
    /// Creates a property declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, encoders: impl IntoIterator<Item = ValueEncoder>) -> Self {
        Self {
            name: name.into(),
            encoders: encoders.into_iter().collect(),
        }
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the candidate encoders, in the order they are tried.
    #[must_use]
    pub fn encoders(&self) -> &[ValueEncoder] {
        &self.encoders
    }
}

/// The ordered list of properties an element supports.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertySetSpec {
    properties: Vec<PropertySpec>,
}

impl PropertySetSpec {
    /// Returns the supported properties in declaration order.
    #[must_use]
    pub fn supported_properties(&self) -> &[PropertySpec] {
        &self.properties
    }

    /// Looks up a property declaration by name.
    #[must_use]
    pub fn property_spec(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|spec| spec.name == name)
    }
}

/// Builder for [`PropertySetSpec`].
#[derive(Debug, Default)]
pub struct PropertySetSpecBuilder {
    properties: Vec<PropertySpec>,
}

impl PropertySetSpecBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a property.
    ///
    /// Redeclaring a name replaces the earlier declaration in place, keeping
    /// its position.
    #[must_use]
    pub fn property(
        mut self,
        name: impl Into<String>,
        encoders: impl IntoIterator<Item = ValueEncoder>,
    ) -> Self {
        let spec = PropertySpec::new(name, encoders);
        match self.properties.iter_mut().find(|p| p.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.properties.push(spec),
        }
        self
    }

    /// Builds the property set declaration.
    #[must_use]
    pub fn build(self) -> PropertySetSpec {
        PropertySetSpec {
            properties: self.properties,
        }
    }
}

/// An immutable, in-memory [`StyleSchema`].
///
/// # Example
///
/// ```rust
/// use understory_keystyle::{PropertySetSpecBuilder, SchemaBuilder, StyleSchema, ValueEncoder};
///
/// let schema = SchemaBuilder::new()
///     .element(
///         "key",
///         PropertySetSpecBuilder::new()
///             .property("background", [ValueEncoder::SolidColor, ValueEncoder::DefinedVar])
///             .build(),
///     )
///     .build();
///
/// let key = schema.property_set_spec("key").unwrap();
/// assert_eq!(key.supported_properties()[0].name(), "background");
/// assert!(schema.property_set_spec("ghost-key").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Schema {
    elements: HashMap<String, PropertySetSpec>,
}

impl Schema {
    /// Returns the number of styleable elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if no element is styleable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over the styleable element names, in no
    /// particular order.
    pub fn elements(&self) -> impl Iterator<Item = &str> + '_ {
        self.elements.keys().map(String::as_str)
    }
}

impl StyleSchema for Schema {
    fn property_set_spec(&self, element: &str) -> Option<&PropertySetSpec> {
        self.elements.get(element)
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    elements: HashMap<String, PropertySetSpec>,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a styleable element, replacing any earlier declaration.
    #[must_use]
    pub fn element(mut self, name: impl Into<String>, spec: PropertySetSpec) -> Self {
        self.elements.insert(name.into(), spec);
        self
    }

    /// Builds the schema.
    #[must_use]
    pub fn build(self) -> Schema {
        Schema {
            elements: self.elements,
        }
    }
}
