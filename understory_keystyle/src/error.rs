// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only [`StylesheetError`] escapes the public stylesheet operations. Schema
//! mismatches and undecodable values are recovered locally while loading and
//! never show up here.

use alloc::string::String;

use crate::selector::Selector;
use crate::value::ValueEncoder;

/// A value was rejected by its own encoder.
///
/// Values are expected to always be representable by the encoder they report
/// through [`StyleValue::encoder`](crate::StyleValue::encoder), so this
/// indicates corrupted data or a programming error.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// The encoder does not handle this kind of value.
    #[error("the {encoder} encoder cannot serialize a {found} value")]
    EncoderMismatch {
        /// The encoder that was asked to serialize.
        encoder: ValueEncoder,
        /// The encoder the value actually belongs to.
        found: ValueEncoder,
    },
    /// A size or corner radius is NaN or infinite.
    #[error("dimension {0} is not finite")]
    NonFinite(f32),
    /// A variable reference has an empty or malformed name.
    #[error("`{0}` is not a valid variable name")]
    InvalidVariable(String),
}

/// A persisted string was rejected by an encoder.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("`{input}` is not a valid {encoder} value")]
pub struct DecodeError {
    /// The encoder that rejected the input.
    pub encoder: ValueEncoder,
    /// The rejected input.
    pub input: String,
}

/// A canonical selector key could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectorParseError {
    /// The key does not start with an element name.
    #[error("selector has no element name")]
    EmptyElement,
    /// The element name contains characters outside `[A-Za-z0-9_-]`.
    #[error("`{0}` is not a valid element name")]
    InvalidElement(String),
    /// A `[` was never closed.
    #[error("unclosed `[` in selector")]
    UnclosedBracket,
    /// An attribute block is not of the form `[name=v1,v2]`.
    #[error("malformed attribute `{0}`")]
    MalformedAttribute(String),
    /// An attribute other than `code`, `group` or `mode`.
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),
    /// The same attribute appears twice.
    #[error("attribute `{0}` given more than once")]
    DuplicateAttribute(String),
    /// A pseudo-state other than `pressed`, `focus` or `disabled`.
    #[error("unknown pseudo-state `{0}`")]
    UnknownPseudoState(String),
    /// Characters left over after the last section.
    #[error("unexpected trailing input `{0}`")]
    TrailingInput(String),
}

/// Errors surfaced by [`Stylesheet`](crate::Stylesheet) operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StylesheetError {
    /// A property value could not be encoded while serializing.
    #[error("failed to encode `{property}` of rule `{selector}`")]
    Encode {
        /// The rule owning the value.
        selector: Selector,
        /// The property name.
        property: String,
        /// The underlying encoder failure.
        #[source]
        source: EncodeError,
    },
    /// A rule's selector cannot be written as a canonical key.
    #[error("rule `{selector}` cannot be written as a selector key")]
    InvalidKey {
        /// The rule that cannot be persisted.
        selector: Selector,
        /// Why the key is not writable.
        #[source]
        source: SelectorParseError,
    },
    /// Stylesheet merging has no defined precedence rule yet.
    #[error("merging stylesheets is not implemented")]
    MergeUnsupported,
}
