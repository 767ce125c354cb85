// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property sets: the style payload attached to a selector.
//!
//! This module provides [`PropertySet`], an immutable mapping from property
//! name to [`StyleValue`], and its editor [`PropertySetBuilder`].

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::iter::FromIterator;

use crate::value::StyleValue;

/// Well-known keyboard property names.
///
/// Schemas are free to declare other names; these are the ones renderers
/// commonly look up.
pub mod names {
    /// Fill of the element.
    pub const BACKGROUND: &str = "background";
    /// Content (label, icon) color.
    pub const FOREGROUND: &str = "foreground";
    /// Outline color.
    pub const BORDER_COLOR: &str = "border-color";
    /// Outline width.
    pub const BORDER_WIDTH: &str = "border-width";
    /// Label font size.
    pub const FONT_SIZE: &str = "font-size";
    /// Drop shadow color.
    pub const SHADOW_COLOR: &str = "shadow-color";
    /// Drop shadow elevation.
    pub const SHADOW_ELEVATION: &str = "shadow-elevation";
    /// Outline shape.
    pub const SHAPE: &str = "shape";
    /// Element width.
    pub const WIDTH: &str = "width";
    /// Element height.
    pub const HEIGHT: &str = "height";
}

static IMPLICIT_INHERIT: StyleValue = StyleValue::ImplicitInherit;

/// An immutable collection of named style values.
///
/// Entries are kept sorted by name, so iteration order is deterministic and
/// equality is structural regardless of insertion order.
///
/// Internally, `PropertySet` wraps an `Arc`, making cloning cheap and letting
/// many threads read one set. Use [`PropertySetBuilder`] (or
/// [`PropertySet::edit`]) to construct or modify sets.
///
/// # Example
///
/// ```rust
/// use understory_keystyle::{PropertySetBuilder, StyleValue, names};
///
/// let set = PropertySetBuilder::new()
///     .set(names::BACKGROUND, StyleValue::solid_color(0x20, 0x20, 0x20, 0xff))
///     .set(names::FONT_SIZE, StyleValue::SpSize(18.0))
///     .build();
///
/// assert_eq!(set.get(names::FONT_SIZE), Some(&StyleValue::SpSize(18.0)));
/// assert!(set.get_or_inherit(names::SHAPE).is_implicit_inherit());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertySet {
    inner: Arc<PropertySetData>,
}

#[derive(Debug, Default, PartialEq)]
struct PropertySetData {
    /// Sorted by name for binary search lookup.
    entries: Vec<(String, StyleValue)>,
}

impl PropertySet {
    /// Creates an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this set has no properties.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Returns the number of properties in this set.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Gets the value for a property, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        search(&self.inner.entries, name)
            .ok()
            .map(|idx| &self.inner.entries[idx].1)
    }

    /// Gets the value for a property, treating absence as
    /// [`StyleValue::ImplicitInherit`].
    #[must_use]
    pub fn get_or_inherit(&self, name: &str) -> &StyleValue {
        self.get(name).unwrap_or(&IMPLICIT_INHERIT)
    }

    /// Returns `true` if this set has an entry for the property.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        search(&self.inner.entries, name).is_ok()
    }

    /// Returns an iterator over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> + '_ {
        self.inner
            .entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Returns an iterator over the property names in this set.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns a builder pre-filled with a copy of this set's entries.
    ///
    /// Edits to the builder never affect this set.
    #[must_use]
    pub fn edit(&self) -> PropertySetBuilder {
        PropertySetBuilder {
            entries: self.inner.entries.clone(),
        }
    }
}

impl<N: Into<String>> FromIterator<(N, StyleValue)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (N, StyleValue)>>(iter: I) -> Self {
        let mut builder = PropertySetBuilder::new();
        for (name, value) in iter {
            builder.insert(name, value);
        }
        builder.build()
    }
}

/// Builder (editor) for [`PropertySet`] instances.
///
/// # Example
///
/// ```rust
/// use understory_keystyle::{PropertySetBuilder, StyleValue};
///
/// let mut editor = PropertySetBuilder::new().set("shape", StyleValue::CircleShape);
/// editor.insert("shape", StyleValue::RectangleShape);
/// editor.insert("border-width", StyleValue::DpSize(1.0));
/// editor.remove("border-width");
///
/// let set = editor.build();
/// assert_eq!(set.len(), 1);
/// assert_eq!(set.get("shape"), Some(&StyleValue::RectangleShape));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertySetBuilder {
    entries: Vec<(String, StyleValue)>,
}

impl PropertySetBuilder {
    /// Creates a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property value.
    ///
    /// If the property was already set, the value is replaced.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: StyleValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a property value in place, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: StyleValue) -> Option<StyleValue> {
        let name = name.into();
        match search(&self.entries, &name) {
            Ok(idx) => Some(core::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (name, value));
                None
            }
        }
    }

    /// Removes a property, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<StyleValue> {
        search(&self.entries, name)
            .ok()
            .map(|idx| self.entries.remove(idx).1)
    }

    /// Gets the value currently staged for a property.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        search(&self.entries, name)
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// Returns `true` if a value is staged for the property.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        search(&self.entries, name).is_ok()
    }

    /// Builds the property set.
    #[must_use]
    pub fn build(self) -> PropertySet {
        PropertySet {
            inner: Arc::new(PropertySetData {
                entries: self.entries,
            }),
        }
    }
}

fn search(entries: &[(String, StyleValue)], name: &str) -> Result<usize, usize> {
    entries.binary_search_by(|(probe, _)| probe.as_str().cmp(name))
}
