// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed style values and their string encoders.
//!
//! [`StyleValue`] is a closed set of value kinds. Every kind owns exactly one
//! canonical [`ValueEncoder`], which is the only way values are turned into
//! (and recovered from) their persisted string form.

use alloc::format;
use alloc::string::String;
use core::fmt;

use peniko::Color;
use peniko::color::{Rgba8, Srgb, parse_color};

use crate::error::{DecodeError, EncodeError};

const INHERIT: &str = "inherit";
const DP: &str = "dp";
const SP: &str = "sp";
const PERCENT: &str = "%";
const RECTANGLE: &str = "rectangle()";
const CIRCLE: &str = "circle()";
const ROUNDED_CORNER: &str = "rounded-corner";
const CUT_CORNER: &str = "cut-corner";
const VAR_PREFIX: &str = "var(--";

/// Per-corner sizes, in dp, for corner shapes.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Corners {
    /// Top-left corner size.
    pub top_left: f32,
    /// Top-right corner size.
    pub top_right: f32,
    /// Bottom-right corner size.
    pub bottom_right: f32,
    /// Bottom-left corner size.
    pub bottom_left: f32,
}

impl Corners {
    /// Creates corners from individual sizes, clockwise from top-left.
    #[must_use]
    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Creates corners that all share one size.
    #[must_use]
    pub const fn uniform(size: f32) -> Self {
        Self::new(size, size, size, size)
    }

    fn to_array(self) -> [f32; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// A style property value.
///
/// Equality is structural. Sizes are stored as `f32`, so two values holding
/// NaN never compare equal; such values are also rejected by their encoder.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    /// Not statically known; the renderer resolves it from ambient or parent
    /// context.
    ImplicitInherit,
    /// Explicitly inherit from the parent (`inherit`).
    ExplicitInherit,
    /// A solid sRGB color with 8-bit channels.
    SolidColor(Rgba8),
    /// A density-independent size.
    DpSize(f32),
    /// A scale-independent (font) size.
    SpSize(f32),
    /// A size relative to the containing element, in percent.
    PercentSize(f32),
    /// A plain rectangle.
    RectangleShape,
    /// A circle or ellipse.
    CircleShape,
    /// A rectangle with rounded corners.
    RoundedCornerShape(Corners),
    /// A rectangle with cut (chamfered) corners.
    CutCornerShape(Corners),
    /// A reference to a named variable (`var(--name)`), holding `name`.
    DefinedVar(String),
}

impl StyleValue {
    /// Creates a solid color from 8-bit RGBA channels.
    #[must_use]
    pub const fn solid_color(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::SolidColor(Rgba8 { r, g, b, a })
    }

    /// Returns the encoder that owns this kind of value.
    #[must_use]
    pub fn encoder(&self) -> ValueEncoder {
        match self {
            Self::ImplicitInherit => ValueEncoder::ImplicitInherit,
            Self::ExplicitInherit => ValueEncoder::ExplicitInherit,
            Self::SolidColor(_) => ValueEncoder::SolidColor,
            Self::DpSize(_) => ValueEncoder::DpSize,
            Self::SpSize(_) => ValueEncoder::SpSize,
            Self::PercentSize(_) => ValueEncoder::PercentSize,
            Self::RectangleShape => ValueEncoder::RectangleShape,
            Self::CircleShape => ValueEncoder::CircleShape,
            Self::RoundedCornerShape(_) => ValueEncoder::RoundedCornerShape,
            Self::CutCornerShape(_) => ValueEncoder::CutCornerShape,
            Self::DefinedVar(_) => ValueEncoder::DefinedVar,
        }
    }

    /// Returns `true` for [`StyleValue::ImplicitInherit`].
    #[must_use]
    pub fn is_implicit_inherit(&self) -> bool {
        matches!(self, Self::ImplicitInherit)
    }

    /// Returns the color of a [`StyleValue::SolidColor`].
    #[must_use]
    pub fn to_color(&self) -> Option<Color> {
        match self {
            Self::SolidColor(c) => Some(Color::from_rgba8(c.r, c.g, c.b, c.a)),
            _ => None,
        }
    }

    /// Encodes this value with its own encoder.
    pub fn serialize(&self) -> Result<String, EncodeError> {
        self.encoder().serialize(self)
    }
}

/// A string codec for one kind of [`StyleValue`].
///
/// Schemas list, per property, the encoders that may decode a persisted
/// string, in the order they should be tried.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueEncoder {
    /// Encodes [`StyleValue::ImplicitInherit`] as the empty string.
    ImplicitInherit,
    /// Encodes [`StyleValue::ExplicitInherit`] as `inherit`.
    ExplicitInherit,
    /// Encodes colors as `#rrggbbaa`; decodes any CSS color syntax.
    SolidColor,
    /// Encodes [`StyleValue::DpSize`] as `<n>dp`.
    DpSize,
    /// Encodes [`StyleValue::SpSize`] as `<n>sp`.
    SpSize,
    /// Encodes [`StyleValue::PercentSize`] as `<n>%`.
    PercentSize,
    /// Encodes [`StyleValue::RectangleShape`] as `rectangle()`.
    RectangleShape,
    /// Encodes [`StyleValue::CircleShape`] as `circle()`.
    CircleShape,
    /// Encodes [`StyleValue::RoundedCornerShape`] as `rounded-corner(a,b,c,d)`.
    RoundedCornerShape,
    /// Encodes [`StyleValue::CutCornerShape`] as `cut-corner(a,b,c,d)`.
    CutCornerShape,
    /// Encodes [`StyleValue::DefinedVar`] as `var(--name)`.
    DefinedVar,
}

impl ValueEncoder {
    /// Returns a short, stable name for this encoder.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ImplicitInherit => "implicit-inherit",
            Self::ExplicitInherit => "explicit-inherit",
            Self::SolidColor => "solid-color",
            Self::DpSize => "dp-size",
            Self::SpSize => "sp-size",
            Self::PercentSize => "percent-size",
            Self::RectangleShape => "rectangle-shape",
            Self::CircleShape => "circle-shape",
            Self::RoundedCornerShape => "rounded-corner-shape",
            Self::CutCornerShape => "cut-corner-shape",
            Self::DefinedVar => "defined-var",
        }
    }

    /// Encodes `value` to its canonical string form.
    ///
    /// Fails if `value` belongs to a different encoder, or if it holds data
    /// its canonical form cannot express (non-finite sizes, malformed
    /// variable names).
    pub fn serialize(self, value: &StyleValue) -> Result<String, EncodeError> {
        let found = value.encoder();
        if found != self {
            return Err(EncodeError::EncoderMismatch {
                encoder: self,
                found,
            });
        }
        let encoded = match value {
            StyleValue::ImplicitInherit => String::new(),
            StyleValue::ExplicitInherit => String::from(INHERIT),
            StyleValue::SolidColor(c) => {
                format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
            }
            StyleValue::DpSize(size) => format!("{}{DP}", finite(*size)?),
            StyleValue::SpSize(size) => format!("{}{SP}", finite(*size)?),
            StyleValue::PercentSize(size) => format!("{}{PERCENT}", finite(*size)?),
            StyleValue::RectangleShape => String::from(RECTANGLE),
            StyleValue::CircleShape => String::from(CIRCLE),
            StyleValue::RoundedCornerShape(corners) => format_corners(ROUNDED_CORNER, *corners)?,
            StyleValue::CutCornerShape(corners) => format_corners(CUT_CORNER, *corners)?,
            StyleValue::DefinedVar(name) => {
                if !is_valid_variable(name) {
                    return Err(EncodeError::InvalidVariable(name.clone()));
                }
                format!("{VAR_PREFIX}{name})")
            }
        };
        Ok(encoded)
    }

    /// Decodes a persisted string into a value of this encoder's kind.
    pub fn deserialize(self, input: &str) -> Result<StyleValue, DecodeError> {
        let trimmed = input.trim();
        let value = match self {
            Self::ImplicitInherit => trimmed.is_empty().then_some(StyleValue::ImplicitInherit),
            Self::ExplicitInherit => (trimmed == INHERIT).then_some(StyleValue::ExplicitInherit),
            Self::SolidColor => parse_color(trimmed)
                .ok()
                .map(|color| StyleValue::SolidColor(color.to_alpha_color::<Srgb>().to_rgba8())),
            Self::DpSize => parse_size(trimmed, DP).map(StyleValue::DpSize),
            Self::SpSize => parse_size(trimmed, SP).map(StyleValue::SpSize),
            Self::PercentSize => parse_size(trimmed, PERCENT).map(StyleValue::PercentSize),
            Self::RectangleShape => (trimmed == RECTANGLE).then_some(StyleValue::RectangleShape),
            Self::CircleShape => (trimmed == CIRCLE).then_some(StyleValue::CircleShape),
            Self::RoundedCornerShape => {
                parse_corners(trimmed, ROUNDED_CORNER).map(StyleValue::RoundedCornerShape)
            }
            Self::CutCornerShape => parse_corners(trimmed, CUT_CORNER).map(StyleValue::CutCornerShape),
            Self::DefinedVar => trimmed
                .strip_prefix(VAR_PREFIX)
                .and_then(|rest| rest.strip_suffix(')'))
                .filter(|name| is_valid_variable(name))
                .map(|name| StyleValue::DefinedVar(String::from(name))),
        };
        value.ok_or_else(|| DecodeError {
            encoder: self,
            input: String::from(input),
        })
    }
}

impl fmt::Display for ValueEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn finite(size: f32) -> Result<f32, EncodeError> {
    if size.is_finite() {
        Ok(size)
    } else {
        Err(EncodeError::NonFinite(size))
    }
}

fn format_corners(function: &str, corners: Corners) -> Result<String, EncodeError> {
    let [a, b, c, d] = corners.to_array();
    Ok(format!(
        "{function}({}{DP},{}{DP},{}{DP},{}{DP})",
        finite(a)?,
        finite(b)?,
        finite(c)?,
        finite(d)?,
    ))
}

fn parse_size(input: &str, suffix: &str) -> Option<f32> {
    input
        .strip_suffix(suffix)?
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|size| size.is_finite())
}

/// Parses `function(a)` or `function(a,b,c,d)` with dp arguments.
fn parse_corners(input: &str, function: &str) -> Option<Corners> {
    let args = input
        .strip_prefix(function)?
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let mut sizes = [0.0_f32; 4];
    let mut count = 0;
    for arg in args.split(',') {
        if count == sizes.len() {
            return None;
        }
        sizes[count] = parse_size(arg.trim(), DP)?;
        count += 1;
    }
    match count {
        1 => Some(Corners::uniform(sizes[0])),
        4 => Some(Corners::new(sizes[0], sizes[1], sizes[2], sizes[3])),
        _ => None,
    }
}

fn is_valid_variable(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn every_value_reports_its_own_encoder() {
        let values = [
            StyleValue::ImplicitInherit,
            StyleValue::ExplicitInherit,
            StyleValue::solid_color(1, 2, 3, 4),
            StyleValue::DpSize(1.0),
            StyleValue::SpSize(1.0),
            StyleValue::PercentSize(1.0),
            StyleValue::RectangleShape,
            StyleValue::CircleShape,
            StyleValue::RoundedCornerShape(Corners::uniform(1.0)),
            StyleValue::CutCornerShape(Corners::uniform(1.0)),
            StyleValue::DefinedVar("accent".to_string()),
        ];
        for value in &values {
            let encoded = value.serialize().unwrap();
            assert_eq!(
                value.encoder().deserialize(&encoded).as_ref(),
                Ok(value),
                "canonical form `{encoded}` should decode to the same value"
            );
        }
    }

    #[test]
    fn canonical_forms() {
        assert_eq!(StyleValue::ImplicitInherit.serialize().unwrap(), "");
        assert_eq!(StyleValue::ExplicitInherit.serialize().unwrap(), "inherit");
        assert_eq!(
            StyleValue::solid_color(0xff, 0x00, 0x80, 0xff)
                .serialize()
                .unwrap(),
            "#ff0080ff"
        );
        assert_eq!(StyleValue::DpSize(12.5).serialize().unwrap(), "12.5dp");
        assert_eq!(StyleValue::SpSize(14.0).serialize().unwrap(), "14sp");
        assert_eq!(StyleValue::PercentSize(50.0).serialize().unwrap(), "50%");
        assert_eq!(
            StyleValue::RoundedCornerShape(Corners::new(1.0, 2.0, 3.0, 4.0))
                .serialize()
                .unwrap(),
            "rounded-corner(1dp,2dp,3dp,4dp)"
        );
        assert_eq!(
            StyleValue::DefinedVar("key-bg".to_string())
                .serialize()
                .unwrap(),
            "var(--key-bg)"
        );
    }

    #[test]
    fn solid_color_accepts_css_syntax() {
        assert_eq!(
            ValueEncoder::SolidColor.deserialize("red"),
            Ok(StyleValue::solid_color(255, 0, 0, 255))
        );
        assert_eq!(
            ValueEncoder::SolidColor.deserialize("#00ff00"),
            Ok(StyleValue::solid_color(0, 255, 0, 255))
        );
        assert!(ValueEncoder::SolidColor.deserialize("not-a-color").is_err());
    }

    #[test]
    fn sizes_require_their_suffix() {
        assert_eq!(
            ValueEncoder::DpSize.deserialize(" 8dp "),
            Ok(StyleValue::DpSize(8.0))
        );
        assert!(ValueEncoder::DpSize.deserialize("8sp").is_err());
        assert!(ValueEncoder::SpSize.deserialize("8").is_err());
        assert!(ValueEncoder::PercentSize.deserialize("inf%").is_err());
    }

    #[test]
    fn corners_take_one_or_four_arguments() {
        assert_eq!(
            ValueEncoder::CutCornerShape.deserialize("cut-corner(6dp)"),
            Ok(StyleValue::CutCornerShape(Corners::uniform(6.0)))
        );
        assert!(
            ValueEncoder::CutCornerShape
                .deserialize("cut-corner(1dp,2dp)")
                .is_err()
        );
        assert!(
            ValueEncoder::RoundedCornerShape
                .deserialize("rounded-corner(1dp,2dp,3dp,4dp,5dp)")
                .is_err()
        );
    }

    #[test]
    fn encoder_rejects_foreign_values() {
        let err = ValueEncoder::DpSize
            .serialize(&StyleValue::SpSize(4.0))
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::EncoderMismatch {
                encoder: ValueEncoder::DpSize,
                found: ValueEncoder::SpSize,
            }
        );
    }

    #[test]
    fn malformed_values_fail_to_encode() {
        assert!(matches!(
            StyleValue::DpSize(f32::NAN).serialize(),
            Err(EncodeError::NonFinite(_))
        ));
        assert!(matches!(
            StyleValue::RoundedCornerShape(Corners::new(1.0, f32::INFINITY, 1.0, 1.0)).serialize(),
            Err(EncodeError::NonFinite(_))
        ));
        assert_eq!(
            StyleValue::DefinedVar("two words".to_string()).serialize(),
            Err(EncodeError::InvalidVariable("two words".to_string()))
        );
    }

    #[test]
    fn decode_error_names_encoder_and_input() {
        let err = ValueEncoder::CircleShape.deserialize("oval()").unwrap_err();
        assert_eq!(err.encoder, ValueEncoder::CircleShape);
        assert_eq!(err.input, "oval()");
        assert_eq!(
            err.to_string(),
            "`oval()` is not a valid circle-shape value"
        );
    }

    #[test]
    fn to_color_only_for_solid_colors() {
        assert!(StyleValue::solid_color(0, 0, 0, 255).to_color().is_some());
        assert!(StyleValue::DpSize(1.0).to_color().is_none());
    }
}
