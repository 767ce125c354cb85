// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule-based keyboard stylesheets.
//!
//! A [`Stylesheet`] maps unique [`Selector`]s to [`PropertySet`]s. Rules are
//! kept in ascending specificity order (broadest first), which drives both
//! point lookup and cascade compilation.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::error::StylesheetError;
use crate::property_set::{PropertySet, PropertySetBuilder};
use crate::schema::StyleSchema;
use crate::selector::{Selector, StyleQuery};
use crate::value::StyleValue;

#[derive(Debug, Default)]
struct StylesheetData {
    /// Sorted by selector, broadest first.
    rules: Vec<(Selector, PropertySet)>,
    /// Indices into `rules` per element, ascending.
    by_element: HashMap<String, SmallVec<[usize; 4]>>,
    fully_qualified: bool,
}

/// An immutable mapping from selectors to property sets.
///
/// `Stylesheet` is immutable after creation and cheap to clone; it can be
/// shared between threads. Use [`StylesheetBuilder`] (or
/// [`Stylesheet::edit`]) to construct or modify instances.
///
/// A stylesheet is *fully qualified* when it was produced by
/// [`Stylesheet::compile_to_fully_qualified`]: every rule then carries an
/// entry for every property its element supports, and every rule without the
/// pressed pseudo-state has a pressed sibling.
///
/// # Example
///
/// ```rust
/// use understory_keystyle::{PropertySetBuilder, Selector, StyleQuery, StyleValue, StylesheetBuilder};
///
/// let red = StyleValue::solid_color(255, 0, 0, 255);
/// let blue = StyleValue::solid_color(0, 0, 255, 255);
///
/// let sheet = StylesheetBuilder::new()
///     .rule(
///         Selector::new("key").with_codes([97]),
///         PropertySetBuilder::new().set("background", red.clone()).build(),
///     )
///     .rule(
///         Selector::new("key"),
///         PropertySetBuilder::new().set("background", blue.clone()).build(),
///     )
///     .build();
///
/// let a = sheet.resolve(&StyleQuery::new("key").with_code(97));
/// let b = sheet.resolve(&StyleQuery::new("key").with_code(98));
/// assert_eq!(a.get("background"), Some(&red));
/// assert_eq!(b.get("background"), Some(&blue));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Stylesheet {
    inner: Arc<StylesheetData>,
}

impl Stylesheet {
    pub(crate) fn from_rules(rules: BTreeMap<Selector, PropertySet>, fully_qualified: bool) -> Self {
        let rules: Vec<_> = rules.into_iter().collect();
        let mut by_element: HashMap<String, SmallVec<[usize; 4]>> = HashMap::new();
        for (idx, (selector, _)) in rules.iter().enumerate() {
            by_element
                .entry(selector.element.clone())
                .or_default()
                .push(idx);
        }
        Self {
            inner: Arc::new(StylesheetData {
                rules,
                by_element,
                fully_qualified,
            }),
        }
    }

    /// Returns the number of rules in this sheet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.rules.len()
    }

    /// Returns `true` if this sheet has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.rules.is_empty()
    }

    /// Returns `true` if this sheet is the output of a cascade compile.
    #[must_use]
    pub fn is_fully_qualified(&self) -> bool {
        self.inner.fully_qualified
    }

    /// Returns an iterator over rules, broadest selector first.
    pub fn rules(&self) -> impl DoubleEndedIterator<Item = (&Selector, &PropertySet)> + '_ {
        self.inner
            .rules
            .iter()
            .map(|(selector, properties)| (selector, properties))
    }

    /// Returns the property set stored for exactly `selector`.
    #[must_use]
    pub fn get(&self, selector: &Selector) -> Option<&PropertySet> {
        self.inner
            .rules
            .binary_search_by(|(probe, _)| probe.cmp(selector))
            .ok()
            .map(|idx| &self.inner.rules[idx].1)
    }

    /// Returns the rules for `element`, broadest selector first.
    fn element_rules<'a>(
        &'a self,
        element: &str,
    ) -> impl DoubleEndedIterator<Item = (&'a Selector, &'a PropertySet)> + use<'a> {
        self.inner
            .by_element
            .get(element)
            .into_iter()
            .flatten()
            .map(|&idx| {
                let (selector, properties) = &self.inner.rules[idx];
                (selector, properties)
            })
    }

    /// Resolves the property set a renderer should use for `query`.
    ///
    /// Returns the set of the most specific matching rule. If no rule
    /// matches, falls back to the broadest rule for the element, and if the
    /// element has no rules at all, to an empty set. This never fails.
    ///
    /// The returned set is a cheap reference-counted clone.
    #[must_use]
    pub fn resolve(&self, query: &StyleQuery<'_>) -> PropertySet {
        if let Some((_, properties)) = self
            .element_rules(query.element)
            .rev()
            .find(|(selector, _)| selector.matches(query))
        {
            return properties.clone();
        }
        self.element_rules(query.element)
            .next()
            .map(|(_, properties)| properties.clone())
            .unwrap_or_default()
    }

    /// Returns every property set able to act as a fallback for `reference`,
    /// most specific first.
    ///
    /// See [`Selector::is_compatible_with`] for the compatibility policy.
    #[must_use]
    pub fn candidates(&self, reference: &Selector) -> Vec<&PropertySet> {
        self.element_rules(&reference.element)
            .rev()
            .filter(|(selector, _)| selector.is_compatible_with(reference))
            .map(|(_, properties)| properties)
            .collect()
    }

    /// Compiles this sheet into a fully qualified one against `schema`.
    ///
    /// Rules are processed broadest first. Rules for elements the schema
    /// does not know are dropped. Every schema property a rule leaves unset
    /// is taken from the most specific compatible rule compiled so far that
    /// defines it, or set to [`StyleValue::ImplicitInherit`].
    ///
    /// Afterwards every rule without the pressed pseudo-state that lacks a
    /// pressed sibling gets one, filled from the compatible authored rules
    /// first and the compiled rules second.
    ///
    /// This sheet is left untouched; the result is a new sheet.
    #[must_use]
    pub fn compile_to_fully_qualified<S: StyleSchema + ?Sized>(&self, schema: &S) -> Self {
        let mut compiled: BTreeMap<Selector, PropertySet> = BTreeMap::new();
        for (selector, properties) in self.rules() {
            let Some(spec) = schema.property_set_spec(&selector.element) else {
                debug!(%selector, "dropping rule for an element the schema does not style");
                continue;
            };
            let fallbacks: Vec<&PropertySet> = candidates_in(&compiled, selector).collect();
            let mut editor = properties.edit();
            for property in spec.supported_properties() {
                if !editor.contains(property.name()) {
                    editor.insert(property.name(), first_defined(&fallbacks, property.name()));
                }
            }
            compiled.insert(selector.clone(), editor.build());
        }

        let mut output = compiled.clone();
        for selector in compiled.keys().filter(|selector| !selector.pressed) {
            let Some(spec) = schema.property_set_spec(&selector.element) else {
                continue;
            };
            let pressed = selector.clone().with_pressed(true);
            if compiled.contains_key(&pressed) {
                continue;
            }
            let fallbacks: Vec<&PropertySet> = self
                .candidates(&pressed)
                .into_iter()
                .chain(candidates_in(&compiled, &pressed))
                .collect();
            let mut editor = PropertySetBuilder::new();
            for property in spec.supported_properties() {
                editor.insert(property.name(), first_defined(&fallbacks, property.name()));
            }
            trace!(selector = %pressed, "synthesized pressed variant");
            output.insert(pressed, editor.build());
        }

        Self::from_rules(output, true)
    }

    /// Returns a builder pre-filled with a copy of this sheet's rules.
    ///
    /// Edits to the builder never affect this sheet.
    #[must_use]
    pub fn edit(&self) -> StylesheetBuilder {
        StylesheetBuilder {
            rules: self
                .rules()
                .map(|(selector, properties)| (selector.clone(), properties.edit()))
                .collect(),
        }
    }

    /// Combines this sheet with `other`.
    ///
    /// Whether `other` should replace whole rules or override individual
    /// properties is undecided, so this always fails with
    /// [`StylesheetError::MergeUnsupported`].
    pub fn merge(&self, other: &Self) -> Result<Self, StylesheetError> {
        warn!(
            left = self.len(),
            right = other.len(),
            "stylesheet merge requested, but merging is not implemented"
        );
        Err(StylesheetError::MergeUnsupported)
    }
}

/// Sheets are equal when they hold the same rules.
///
/// Whether a sheet is fully qualified is not compared: the persisted form does
/// not record it, so a compiled sheet equals its own reload.
impl PartialEq for Stylesheet {
    fn eq(&self, other: &Self) -> bool {
        self.inner.rules == other.inner.rules
    }
}

/// Compatible property sets from `rules`, most specific first.
fn candidates_in<'a>(
    rules: &'a BTreeMap<Selector, PropertySet>,
    reference: &'a Selector,
) -> impl Iterator<Item = &'a PropertySet> + 'a {
    rules
        .iter()
        .rev()
        .filter(move |(selector, _)| selector.is_compatible_with(reference))
        .map(|(_, properties)| properties)
}

fn first_defined(candidates: &[&PropertySet], name: &str) -> StyleValue {
    candidates
        .iter()
        .find_map(|properties| properties.get(name))
        .cloned()
        .unwrap_or(StyleValue::ImplicitInherit)
}

/// Builder (editor) for [`Stylesheet`] instances.
///
/// Rules are keyed by selector; adding a rule for a selector that is already
/// present replaces it.
///
/// The builder is a plain owned value: it is meant to be filled by one owner
/// and handed off through [`StylesheetBuilder::build`].
#[derive(Clone, Debug, Default)]
pub struct StylesheetBuilder {
    rules: BTreeMap<Selector, PropertySetBuilder>,
}

impl StylesheetBuilder {
    /// Creates a new empty stylesheet builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to the sheet, replacing any rule with the same selector.
    #[must_use]
    pub fn rule(mut self, selector: Selector, properties: PropertySet) -> Self {
        self.insert(selector, properties);
        self
    }

    /// Adds a rule in place, returning the replaced property set.
    pub fn insert(&mut self, selector: Selector, properties: PropertySet) -> Option<PropertySet> {
        self.rules
            .insert(selector, properties.edit())
            .map(PropertySetBuilder::build)
    }

    /// Removes a rule, returning its property set.
    pub fn remove(&mut self, selector: &Selector) -> Option<PropertySet> {
        self.rules.remove(selector).map(PropertySetBuilder::build)
    }

    /// Returns the staged property set for `selector`, creating an empty one
    /// if the rule does not exist yet.
    pub fn properties_mut(&mut self, selector: Selector) -> &mut PropertySetBuilder {
        self.rules.entry(selector).or_default()
    }

    /// Returns `true` if a rule with this selector is staged.
    #[must_use]
    pub fn contains(&self, selector: &Selector) -> bool {
        self.rules.contains_key(selector)
    }

    /// Returns the number of staged rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rule is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Builds the stylesheet.
    #[must_use]
    pub fn build(self) -> Stylesheet {
        let rules = self
            .rules
            .into_iter()
            .map(|(selector, editor)| (selector, editor.build()))
            .collect();
        Stylesheet::from_rules(rules, false)
    }
}
