// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat, string-keyed persisted form of a [`Stylesheet`].
//!
//! Loading is tolerant: rules for unknown elements and unknown properties are
//! dropped, and values no declared encoder accepts degrade to
//! [`StyleValue::ImplicitInherit`]. Saving is strict: a value its own encoder
//! rejects fails the whole operation.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SelectorParseError, StylesheetError};
use crate::property_set::PropertySetBuilder;
use crate::schema::StyleSchema;
use crate::selector::{Selector, is_valid_element};
use crate::stylesheet::Stylesheet;
use crate::value::StyleValue;

/// A stylesheet as plain strings: selector key → property name → encoded
/// value.
///
/// Rules are keyed by the canonical selector key (see [`Selector`]'s
/// `Display`). Keys are kept as strings so that a document written by a newer
/// version, with selectors this version cannot parse, still loads: such rules
/// are dropped by [`Stylesheet::deserialize`] instead of failing the whole
/// document.
///
/// # Example
///
/// ```rust
/// use understory_keystyle::{RawStylesheet, Schema, Selector, Stylesheet};
///
/// let mut raw = RawStylesheet::new();
/// raw.insert(&Selector::new("key"), "background", "#336699ff");
///
/// // Nothing is declared in this schema, so everything is dropped.
/// let sheet = Stylesheet::deserialize(&raw, &Schema::default());
/// assert!(sheet.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawStylesheet {
    rules: BTreeMap<String, BTreeMap<String, String>>,
}

impl RawStylesheet {
    /// Creates an empty raw stylesheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an encoded value under the selector's canonical key, returning
    /// the value it replaced.
    pub fn insert(
        &mut self,
        selector: &Selector,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.insert_key(selector.to_string(), name, value)
    }

    /// Stores an encoded value under a raw selector key, which is not
    /// validated.
    pub fn insert_key(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.rules
            .entry(key.into())
            .or_default()
            .insert(name.into(), value.into())
    }

    /// Returns the encoded properties of a rule.
    #[must_use]
    pub fn get(&self, selector: &Selector) -> Option<&BTreeMap<String, String>> {
        self.get_key(&selector.to_string())
    }

    /// Returns the encoded properties stored under a raw selector key.
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&BTreeMap<String, String>> {
        self.rules.get(key)
    }

    /// Returns an iterator over `(key, properties)` pairs in key order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, String>)> + '_ {
        self.rules
            .iter()
            .map(|(key, properties)| (key.as_str(), properties))
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Stylesheet {
    /// Encodes every value of every rule with its own canonical encoder.
    ///
    /// `schema` is only consulted for diagnostics: entries it will not be
    /// able to load back are still written, with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StylesheetError::InvalidKey`] for a rule whose element name
    /// cannot appear in a selector key, and [`StylesheetError::Encode`] for
    /// the first value its encoder rejects, such as a non-finite size.
    pub fn serialize<S: StyleSchema + ?Sized>(
        &self,
        schema: &S,
    ) -> Result<RawStylesheet, StylesheetError> {
        let mut raw = RawStylesheet::new();
        for (selector, properties) in self.rules() {
            if !is_valid_element(&selector.element) {
                return Err(StylesheetError::InvalidKey {
                    selector: selector.clone(),
                    source: SelectorParseError::InvalidElement(selector.element.clone()),
                });
            }
            let spec = schema.property_set_spec(&selector.element);
            if spec.is_none() {
                warn!(%selector, "serializing a rule for an element the schema does not style");
            }
            let mut encoded = BTreeMap::new();
            for (name, value) in properties.iter() {
                let text = value
                    .serialize()
                    .map_err(|source| StylesheetError::Encode {
                        selector: selector.clone(),
                        property: String::from(name),
                        source,
                    })?;
                match spec.map(|spec| spec.property_spec(name)) {
                    Some(None) => {
                        warn!(%selector, property = name, "serializing an undeclared property");
                    }
                    Some(Some(property))
                        if !value.is_implicit_inherit()
                            && !property.encoders().contains(&value.encoder()) =>
                    {
                        warn!(
                            %selector,
                            property = name,
                            encoder = %value.encoder(),
                            "no declared encoder will load this value back"
                        );
                    }
                    _ => {}
                }
                encoded.insert(String::from(name), text);
            }
            raw.rules.insert(selector.to_string(), encoded);
        }
        Ok(raw)
    }

    /// Decodes a raw stylesheet against `schema`.
    ///
    /// Never fails. Rules whose key does not parse as a selector, rules for
    /// elements without a schema entry, and properties the element does not
    /// declare are dropped. Each value is decoded with
    /// the property's encoders in declared order; the first success wins, and
    /// if none succeeds the value becomes [`StyleValue::ImplicitInherit`].
    ///
    /// The result is not fully qualified.
    #[must_use]
    pub fn deserialize<S: StyleSchema + ?Sized>(raw: &RawStylesheet, schema: &S) -> Self {
        let mut rules = BTreeMap::new();
        for (key, encoded) in raw.rules() {
            let selector = match key.parse::<Selector>() {
                Ok(selector) => selector,
                Err(error) => {
                    debug!(key, %error, "dropping rule with an unreadable selector key");
                    continue;
                }
            };
            let Some(spec) = schema.property_set_spec(&selector.element) else {
                debug!(%selector, "dropping rule for an element the schema does not style");
                continue;
            };
            let mut editor = PropertySetBuilder::new();
            for (name, text) in encoded {
                let Some(property) = spec.property_spec(name) else {
                    debug!(%selector, property = %name, "dropping undeclared property");
                    continue;
                };
                let value = property
                    .encoders()
                    .iter()
                    .find_map(|encoder| encoder.deserialize(text).ok())
                    .unwrap_or_else(|| {
                        if !text.trim().is_empty() {
                            debug!(
                                %selector,
                                property = %name,
                                value = %text,
                                "no declared encoder accepts value, inheriting"
                            );
                        }
                        StyleValue::ImplicitInherit
                    });
                editor.insert(name.as_str(), value);
            }
            rules.insert(selector, editor.build());
        }
        Self::from_rules(rules, false)
    }
}
