// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Keystyle: selector-based styling for on-screen keyboards.
//!
//! A [`Stylesheet`] maps [`Selector`]s to [`PropertySet`]s. A selector names
//! a keyboard element (`key`, `smartbar`, ...) and optionally narrows it by
//! key code, key group, keyboard mode, and the `pressed`, `focus` and
//! `disabled` pseudo-states. Renderers ask for the style of one concrete
//! element with a [`StyleQuery`]; the most specific matching rule wins.
//!
//! ## Core Concepts
//!
//! ### Selectors and specificity
//!
//! Every restriction a selector carries makes it more specific. Pseudo-states
//! count the most, then codes, groups and modes, in that order. Selectors are
//! totally ordered by [`Specificity`] first, so a stylesheet can always pick
//! one deterministic winner.
//!
//! ### Cascade compilation
//!
//! Authored stylesheets are sparse. [`Stylesheet::compile_to_fully_qualified`]
//! fills every property a [`StyleSchema`] declares for each rule from the
//! broader compatible rules, and synthesizes a `pressed` variant for every
//! rule that lacks one. After compiling, a lookup never needs to merge
//! multiple rules.
//!
//! ```rust
//! use understory_keystyle::{
//!     PropertySetBuilder, PropertySetSpecBuilder, SchemaBuilder, Selector, StyleQuery,
//!     StyleValue, StylesheetBuilder, ValueEncoder, names,
//! };
//!
//! let schema = SchemaBuilder::new()
//!     .element(
//!         "key",
//!         PropertySetSpecBuilder::new()
//!             .property(names::BACKGROUND, [ValueEncoder::SolidColor])
//!             .property(names::FONT_SIZE, [ValueEncoder::SpSize])
//!             .build(),
//!     )
//!     .build();
//!
//! let sheet = StylesheetBuilder::new()
//!     .rule(
//!         Selector::new("key"),
//!         PropertySetBuilder::new()
//!             .set(names::BACKGROUND, StyleValue::solid_color(0x30, 0x30, 0x30, 0xff))
//!             .set(names::FONT_SIZE, StyleValue::SpSize(18.0))
//!             .build(),
//!     )
//!     .rule(
//!         Selector::new("key").with_codes([32]),
//!         PropertySetBuilder::new()
//!             .set(names::FONT_SIZE, StyleValue::SpSize(12.0))
//!             .build(),
//!     )
//!     .build()
//!     .compile_to_fully_qualified(&schema);
//!
//! // The space bar inherited the background, and gained a pressed variant.
//! let space = sheet.resolve(&StyleQuery::new("key").with_code(32).with_pressed(true));
//! assert_eq!(
//!     space.get(names::BACKGROUND),
//!     Some(&StyleValue::solid_color(0x30, 0x30, 0x30, 0xff))
//! );
//! assert_eq!(space.get(names::FONT_SIZE), Some(&StyleValue::SpSize(12.0)));
//! ```
//!
//! ### Persistence
//!
//! [`Stylesheet::serialize`] and [`Stylesheet::deserialize`] translate to and
//! from a [`RawStylesheet`], a string-keyed map that serde can write in any
//! self-describing format. Loading never fails: unknown entries are dropped
//! and undecodable values fall back to [`StyleValue::ImplicitInherit`].
//!
//! ## Features
//!
//! - `std` (default): forwards `std` support to dependencies.
//! - `libm`: float math for `no_std` targets without `std`.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod codec;
mod error;
mod property_set;
mod schema;
mod selector;
mod stylesheet;
mod value;

pub use codec::RawStylesheet;
pub use error::{DecodeError, EncodeError, SelectorParseError, StylesheetError};
pub use property_set::{PropertySet, PropertySetBuilder, names};
pub use schema::{
    PropertySetSpec, PropertySetSpecBuilder, PropertySpec, Schema, SchemaBuilder, StyleSchema,
};
pub use selector::{IdSet, Selector, Specificity, StyleQuery};
pub use stylesheet::{Stylesheet, StylesheetBuilder};
pub use value::{Corners, StyleValue, ValueEncoder};
