// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selectors and render queries for keyboard element styling.
//!
//! A [`Selector`] names an element and optionally narrows it by key code,
//! group and mode sets and by the pressed/focus/disabled pseudo-states. A
//! [`StyleQuery`] describes the concrete context a renderer is painting.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::iter::FromIterator;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SelectorParseError;

/// Bucketed selector specificity: `(pseudo_states, codes, groups, modes)`.
///
/// The fields are ordered highest-weight-first so that derived `Ord` ranks
/// a selector constrained by more pseudo-states above one that only pins key
/// codes, which in turn outranks groups and then modes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32, pub u32);

/// An owned, sorted, deduplicated set of IDs.
///
/// This representation is optimized for "small sets": membership is
/// O(log n), intersection checks are O(n+m) via merge walk.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdSet<T>(Box<[T]>);

impl<T> Default for IdSet<T> {
    fn default() -> Self {
        Self(Vec::new().into_boxed_slice())
    }
}

impl<T> IdSet<T>
where
    T: Copy + Ord,
{
    /// Constructs a set from an iterator, sorting and deduplicating.
    #[must_use]
    pub fn from_ids(iter: impl IntoIterator<Item = T>) -> Self {
        let mut ids: Vec<T> = iter.into_iter().collect();
        ids.sort();
        ids.dedup();
        Self(ids.into_boxed_slice())
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of IDs in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the set as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Returns an iterator over the IDs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.0.iter().copied()
    }

    /// Returns `true` if this set contains the given ID.
    #[must_use]
    pub fn contains(&self, id: T) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Returns `true` if the two sets share at least one ID.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        intersects(self.as_slice(), other.as_slice())
    }
}

impl<T> FromIterator<T> for IdSet<T>
where
    T: Copy + Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

/// A concrete render context for one element.
///
/// `None` for `code`, `group` or `mode` means the renderer has not pinned
/// that dimension down, which every selector accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StyleQuery<'a> {
    /// The element being rendered.
    pub element: &'a str,
    /// The key code, if any.
    pub code: Option<i32>,
    /// The key group, if any.
    pub group: Option<i32>,
    /// The keyboard mode, if any.
    pub mode: Option<i32>,
    /// Whether the element is pressed.
    pub pressed: bool,
    /// Whether the element has focus.
    pub focus: bool,
    /// Whether the element is disabled.
    pub disabled: bool,
}

impl<'a> StyleQuery<'a> {
    /// Creates a query for `element` with every dimension unspecified and no
    /// pseudo-state active.
    #[must_use]
    pub const fn new(element: &'a str) -> Self {
        Self {
            element,
            code: None,
            group: None,
            mode: None,
            pressed: false,
            focus: false,
            disabled: false,
        }
    }

    /// Sets the key code.
    #[must_use]
    pub const fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Sets the key group.
    #[must_use]
    pub const fn with_group(mut self, group: i32) -> Self {
        self.group = Some(group);
        self
    }

    /// Sets the keyboard mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: i32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the pressed state.
    #[must_use]
    pub const fn with_pressed(mut self, pressed: bool) -> Self {
        self.pressed = pressed;
        self
    }

    /// Sets the focus state.
    #[must_use]
    pub const fn with_focus(mut self, focus: bool) -> Self {
        self.focus = focus;
        self
    }

    /// Sets the disabled state.
    #[must_use]
    pub const fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// A rule predicate over an element and its render context.
///
/// Empty `codes`, `groups` and `modes` sets are wildcards. A pseudo-state
/// flag set to `true` restricts the rule to that state; `false` leaves the
/// rule indifferent to it.
///
/// Selectors are totally ordered from broadest to most specific, see
/// [`Selector::specificity`]. Structurally identical selectors are equal and
/// collide as map keys.
///
/// # Example
///
/// ```rust
/// use understory_keystyle::{Selector, StyleQuery};
///
/// let enter = Selector::new("key").with_codes([10]);
/// let any_key = Selector::new("key");
///
/// assert!(enter.matches(&StyleQuery::new("key").with_code(10)));
/// assert!(!enter.matches(&StyleQuery::new("key").with_code(32)));
/// assert!(enter > any_key);
/// assert_eq!(enter.to_string(), "key[code=10]");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    /// The element identifier.
    pub element: String,
    /// Key codes (wildcard if empty).
    pub codes: IdSet<i32>,
    /// Key groups (wildcard if empty).
    pub groups: IdSet<i32>,
    /// Keyboard modes (wildcard if empty).
    pub modes: IdSet<i32>,
    /// Restrict to the pressed state.
    pub pressed: bool,
    /// Restrict to the focus state.
    pub focus: bool,
    /// Restrict to the disabled state.
    pub disabled: bool,
}

impl Selector {
    /// Creates a selector matching every instance of `element`.
    #[must_use]
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            ..Self::default()
        }
    }

    /// Restricts the selector to the given key codes.
    #[must_use]
    pub fn with_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.codes = IdSet::from_ids(codes);
        self
    }

    /// Restricts the selector to the given key groups.
    #[must_use]
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = i32>) -> Self {
        self.groups = IdSet::from_ids(groups);
        self
    }

    /// Restricts the selector to the given keyboard modes.
    #[must_use]
    pub fn with_modes(mut self, modes: impl IntoIterator<Item = i32>) -> Self {
        self.modes = IdSet::from_ids(modes);
        self
    }

    /// Sets the pressed pseudo-state requirement.
    #[must_use]
    pub fn with_pressed(mut self, pressed: bool) -> Self {
        self.pressed = pressed;
        self
    }

    /// Sets the focus pseudo-state requirement.
    #[must_use]
    pub fn with_focus(mut self, focus: bool) -> Self {
        self.focus = focus;
        self
    }

    /// Sets the disabled pseudo-state requirement.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Returns a bucketed specificity score.
    ///
    /// The number of required pseudo-states outranks a pinned code set,
    /// which outranks a pinned group set, which outranks a pinned mode set.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let pseudos = u32::from(self.pressed) + u32::from(self.focus) + u32::from(self.disabled);
        Specificity(
            pseudos,
            u32::from(!self.codes.is_empty()),
            u32::from(!self.groups.is_empty()),
            u32::from(!self.modes.is_empty()),
        )
    }

    /// Returns `true` if this selector applies to the given render context.
    ///
    /// The element must be equal. Each of codes, groups and modes matches
    /// when the selector's set is a wildcard, the query leaves the dimension
    /// unspecified, or the query's value is in the set. A required
    /// pseudo-state only matches a query in that state.
    #[must_use]
    pub fn matches(&self, query: &StyleQuery<'_>) -> bool {
        self.element == query.element
            && dimension_matches(&self.codes, query.code)
            && dimension_matches(&self.groups, query.group)
            && dimension_matches(&self.modes, query.mode)
            && state_matches(self.pressed, query.pressed)
            && state_matches(self.focus, query.focus)
            && state_matches(self.disabled, query.disabled)
    }

    /// Returns `true` if this selector can serve as a fallback for `reference`.
    ///
    /// Unlike [`Selector::matches`] the dimension check is symmetric: either
    /// side may be a wildcard, otherwise the sets must intersect. A
    /// pseudo-state this selector requires must also be required by
    /// `reference`.
    #[must_use]
    pub fn is_compatible_with(&self, reference: &Self) -> bool {
        self.element == reference.element
            && sets_compatible(&self.codes, &reference.codes)
            && sets_compatible(&self.groups, &reference.groups)
            && sets_compatible(&self.modes, &reference.modes)
            && state_matches(self.pressed, reference.pressed)
            && state_matches(self.focus, reference.focus)
            && state_matches(self.disabled, reference.disabled)
    }

    /// Returns a concrete query built from this selector's own fields.
    ///
    /// The first member of each non-empty set is used; wildcard sets leave
    /// the dimension unspecified. The selector always matches its own query.
    #[must_use]
    pub fn query(&self) -> StyleQuery<'_> {
        StyleQuery {
            element: &self.element,
            code: self.codes.iter().next(),
            group: self.groups.iter().next(),
            mode: self.modes.iter().next(),
            pressed: self.pressed,
            focus: self.focus,
            disabled: self.disabled,
        }
    }
}

impl Ord for Selector {
    fn cmp(&self, other: &Self) -> Ordering {
        self.specificity()
            .cmp(&other.specificity())
            .then_with(|| self.element.cmp(&other.element))
            .then_with(|| self.codes.cmp(&other.codes))
            .then_with(|| self.groups.cmp(&other.groups))
            .then_with(|| self.modes.cmp(&other.modes))
            .then_with(|| self.pressed.cmp(&other.pressed))
            .then_with(|| self.focus.cmp(&other.focus))
            .then_with(|| self.disabled.cmp(&other.disabled))
    }
}

impl PartialOrd for Selector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Canonical key: `element[code=1,2][group=3][mode=0]:pressed:focus:disabled`.

const CODE: &str = "code";
const GROUP: &str = "group";
const MODE: &str = "mode";
const PRESSED: &str = "pressed";
const FOCUS: &str = "focus";
const DISABLED: &str = "disabled";

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.element)?;
        for (name, set) in [(CODE, &self.codes), (GROUP, &self.groups), (MODE, &self.modes)] {
            if set.is_empty() {
                continue;
            }
            write!(f, "[{name}=")?;
            for (i, id) in set.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{id}")?;
            }
            f.write_str("]")?;
        }
        for (name, active) in [
            (PRESSED, self.pressed),
            (FOCUS, self.focus),
            (DISABLED, self.disabled),
        ] {
            if active {
                write!(f, ":{name}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Selector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s.find(['[', ':']).unwrap_or(s.len());
        let (element, mut rest) = s.split_at(split);
        if element.is_empty() {
            return Err(SelectorParseError::EmptyElement);
        }
        if !is_valid_element(element) {
            return Err(SelectorParseError::InvalidElement(element.to_string()));
        }
        let mut selector = Self::new(element);

        let mut seen = [false; 3];
        while let Some(block) = rest.strip_prefix('[') {
            let close = block.find(']').ok_or(SelectorParseError::UnclosedBracket)?;
            let attribute = &block[..close];
            rest = &block[close + 1..];

            let malformed = || SelectorParseError::MalformedAttribute(attribute.to_string());
            let (name, values) = attribute.split_once('=').ok_or_else(malformed)?;
            let (slot, set) = match name {
                CODE => (0, &mut selector.codes),
                GROUP => (1, &mut selector.groups),
                MODE => (2, &mut selector.modes),
                _ => return Err(SelectorParseError::UnknownAttribute(name.to_string())),
            };
            if seen[slot] {
                return Err(SelectorParseError::DuplicateAttribute(name.to_string()));
            }
            seen[slot] = true;
            *set = values
                .split(',')
                .map(|id| id.trim().parse::<i32>().map_err(|_| malformed()))
                .collect::<Result<IdSet<i32>, _>>()?;
        }

        while let Some(states) = rest.strip_prefix(':') {
            let end = states.find([':', '[']).unwrap_or(states.len());
            let (state, tail) = states.split_at(end);
            match state {
                PRESSED => selector.pressed = true,
                FOCUS => selector.focus = true,
                DISABLED => selector.disabled = true,
                _ => return Err(SelectorParseError::UnknownPseudoState(state.to_string())),
            }
            rest = tail;
        }

        if !rest.is_empty() {
            return Err(SelectorParseError::TrailingInput(rest.to_string()));
        }
        Ok(selector)
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !is_valid_element(&self.element) {
            return Err(serde::ser::Error::custom(SelectorParseError::InvalidElement(
                self.element.clone(),
            )));
        }
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

/// Returns `true` if `element` can be written as a canonical selector key.
pub(crate) fn is_valid_element(element: &str) -> bool {
    !element.is_empty()
        && element
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn dimension_matches(required: &IdSet<i32>, value: Option<i32>) -> bool {
    match value {
        None => true,
        Some(value) => required.is_empty() || required.contains(value),
    }
}

fn sets_compatible(a: &IdSet<i32>, b: &IdSet<i32>) -> bool {
    a.is_empty() || b.is_empty() || a.intersects(b)
}

fn state_matches(required: bool, actual: bool) -> bool {
    !required || actual
}

fn intersects<T: Ord>(a: &[T], b: &[T]) -> bool {
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Equal => return true,
            Ordering::Greater => j += 1,
        }
    }
    false
}
