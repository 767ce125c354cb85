// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_keystyle` crate.
//!
//! These load a persisted theme, compile it against a keyboard schema, and
//! check what a renderer would see for concrete keys.

use understory_keystyle::{
    Corners, PropertySetBuilder, PropertySetSpecBuilder, RawStylesheet, Schema, SchemaBuilder,
    Selector, StyleQuery, StyleValue, Stylesheet, StylesheetBuilder, StylesheetError,
    ValueEncoder, names,
};

const THEME: &str = r##"{
    "key": {
        "background": "#212121ff",
        "foreground": "white",
        "shape": "rounded-corner(6dp)",
        "font-size": "22sp"
    },
    "key[code=32]": { "font-size": "14sp" },
    "key[code=10][group=2]": { "background": "var(--accent)" },
    "key[code=44][mode=1]": { "background": "not-a-color" },
    "key:pressed": { "background": "#424242ff" },
    "smartbar": { "background": "#000000ff", "height": "40dp", "glow": "1dp" },
    "ghost-key": { "background": "red" }
}"##;

fn keyboard_schema() -> Schema {
    SchemaBuilder::new()
        .element(
            "key",
            PropertySetSpecBuilder::new()
                .property(
                    names::BACKGROUND,
                    [ValueEncoder::DefinedVar, ValueEncoder::SolidColor],
                )
                .property(names::FOREGROUND, [ValueEncoder::SolidColor])
                .property(
                    names::SHAPE,
                    [
                        ValueEncoder::RectangleShape,
                        ValueEncoder::RoundedCornerShape,
                        ValueEncoder::CutCornerShape,
                    ],
                )
                .property(names::FONT_SIZE, [ValueEncoder::SpSize])
                .property(names::BORDER_WIDTH, [ValueEncoder::DpSize])
                .build(),
        )
        .element(
            "smartbar",
            PropertySetSpecBuilder::new()
                .property(names::BACKGROUND, [ValueEncoder::SolidColor])
                .property(names::HEIGHT, [ValueEncoder::DpSize])
                .build(),
        )
        .build()
}

fn load_theme(schema: &Schema) -> Stylesheet {
    let raw: RawStylesheet = serde_json::from_str(THEME).unwrap();
    Stylesheet::deserialize(&raw, schema)
}

fn dark() -> StyleValue {
    StyleValue::solid_color(0x21, 0x21, 0x21, 0xff)
}

#[test]
fn loading_drops_unknown_entries() {
    let sheet = load_theme(&keyboard_schema());

    assert_eq!(sheet.len(), 6);
    assert!(!sheet.is_fully_qualified());
    assert!(
        sheet
            .rules()
            .all(|(selector, _)| selector.element != "ghost-key")
    );
    let smartbar = sheet.get(&Selector::new("smartbar")).unwrap();
    assert!(!smartbar.contains("glow"));
    assert_eq!(smartbar.get(names::HEIGHT), Some(&StyleValue::DpSize(40.0)));
}

#[test]
fn malformed_value_loads_as_implicit_inherit() {
    let sheet = load_theme(&keyboard_schema());
    let mode = sheet
        .get(&Selector::new("key").with_codes([44]).with_modes([1]))
        .unwrap();
    assert_eq!(
        mode.get(names::BACKGROUND),
        Some(&StyleValue::ImplicitInherit)
    );
}

#[test]
fn compiled_theme_resolves_concrete_keys() {
    let schema = keyboard_schema();
    let sheet = load_theme(&schema).compile_to_fully_qualified(&schema);
    assert!(sheet.is_fully_qualified());

    let space = sheet.resolve(&StyleQuery::new("key").with_code(32));
    assert_eq!(space.get(names::FONT_SIZE), Some(&StyleValue::SpSize(14.0)));
    assert_eq!(space.get(names::BACKGROUND), Some(&dark()));
    assert_eq!(
        space.get(names::FOREGROUND),
        Some(&StyleValue::solid_color(0xff, 0xff, 0xff, 0xff))
    );
    assert_eq!(
        space.get(names::SHAPE),
        Some(&StyleValue::RoundedCornerShape(Corners::uniform(6.0)))
    );
    assert_eq!(
        space.get(names::BORDER_WIDTH),
        Some(&StyleValue::ImplicitInherit)
    );

    let accent = sheet.resolve(&StyleQuery::new("key").with_code(10).with_group(2));
    assert_eq!(
        accent.get(names::BACKGROUND),
        Some(&StyleValue::DefinedVar("accent".into()))
    );
    assert_eq!(accent.get(names::FONT_SIZE), Some(&StyleValue::SpSize(22.0)));
}

#[test]
fn compiled_theme_has_pressed_variants() {
    let schema = keyboard_schema();
    let sheet = load_theme(&schema).compile_to_fully_qualified(&schema);

    // The authored pressed background wins over the space bar's own rule.
    let space = sheet.resolve(&StyleQuery::new("key").with_code(32).with_pressed(true));
    assert_eq!(
        space.get(names::BACKGROUND),
        Some(&StyleValue::solid_color(0x42, 0x42, 0x42, 0xff))
    );
    assert_eq!(space.get(names::FONT_SIZE), Some(&StyleValue::SpSize(14.0)));

    let smartbar = sheet
        .get(&Selector::new("smartbar").with_pressed(true))
        .unwrap();
    assert_eq!(
        smartbar.get(names::BACKGROUND),
        Some(&StyleValue::solid_color(0, 0, 0, 0xff))
    );
}

#[test]
fn compile_twice_changes_nothing() {
    let schema = keyboard_schema();
    let once = load_theme(&schema).compile_to_fully_qualified(&schema);
    let twice = once.compile_to_fully_qualified(&schema);
    assert_eq!(once, twice);
}

#[test]
fn compiled_theme_persists_through_json() {
    let schema = keyboard_schema();
    let compiled = load_theme(&schema).compile_to_fully_qualified(&schema);

    let json = serde_json::to_string_pretty(&compiled.serialize(&schema).unwrap()).unwrap();
    let raw: RawStylesheet = serde_json::from_str(&json).unwrap();
    let reloaded = Stylesheet::deserialize(&raw, &schema);

    assert_eq!(reloaded.len(), compiled.len());
    assert!(!reloaded.is_fully_qualified());
    assert_eq!(reloaded, compiled);
    assert_eq!(reloaded.compile_to_fully_qualified(&schema), compiled);
}

#[test]
fn theme_from_a_newer_writer_still_loads() {
    let json = r##"{
        "key": { "background": "#212121ff" },
        "key:hover": { "background": "#424242ff" },
        "key[row=2]": { "font-size": "18sp" },
        "key[code=32]": { "font-size": "14sp" }
    }"##;
    let raw: RawStylesheet = serde_json::from_str(json).unwrap();
    let sheet = Stylesheet::deserialize(&raw, &keyboard_schema());

    assert_eq!(sheet.len(), 2);
    let space = sheet.resolve(&StyleQuery::new("key").with_code(32));
    assert_eq!(space.get(names::FONT_SIZE), Some(&StyleValue::SpSize(14.0)));
    let plain = sheet.resolve(&StyleQuery::new("key"));
    assert_eq!(plain.get(names::BACKGROUND), Some(&dark()));
}

#[test]
fn lookup_never_fails() {
    let sheet = load_theme(&keyboard_schema());

    assert!(sheet.resolve(&StyleQuery::new("ghost-key")).is_empty());
    assert!(sheet.resolve(&StyleQuery::new("")).is_empty());

    // No smartbar rule restricts the mode, so the broad rule answers.
    let smartbar = sheet.resolve(&StyleQuery::new("smartbar").with_mode(7).with_focus(true));
    assert_eq!(smartbar.get(names::HEIGHT), Some(&StyleValue::DpSize(40.0)));
}

#[test]
fn rules_iterate_broadest_first() {
    let sheet = load_theme(&keyboard_schema());
    let order: Vec<_> = sheet.rules().map(|(selector, _)| selector.clone()).collect();

    let position = |selector: &Selector| order.iter().position(|s| s == selector).unwrap();
    let broad = position(&Selector::new("key"));
    let code = position(&Selector::new("key").with_codes([32]));
    let mode = position(&Selector::new("key").with_codes([44]).with_modes([1]));
    let pressed = position(&Selector::new("key").with_pressed(true));

    assert!(broad < code);
    assert!(code < mode);
    assert!(mode < pressed);
}

#[test]
fn serialize_reports_the_broken_rule() {
    let selector = Selector::new("key").with_codes([10]);
    let sheet = StylesheetBuilder::new()
        .rule(
            selector.clone(),
            PropertySetBuilder::new()
                .set(names::FONT_SIZE, StyleValue::SpSize(f32::INFINITY))
                .build(),
        )
        .build();

    match sheet.serialize(&keyboard_schema()) {
        Err(StylesheetError::Encode {
            selector: failed,
            property,
            ..
        }) => {
            assert_eq!(failed, selector);
            assert_eq!(property, names::FONT_SIZE);
        }
        other => panic!("expected an encode error, got {other:?}"),
    }
}

#[test]
fn merge_reports_unsupported() {
    let schema = keyboard_schema();
    let base = load_theme(&schema);
    let overlay = StylesheetBuilder::new().build();
    assert_eq!(
        base.merge(&overlay),
        Err(StylesheetError::MergeUnsupported)
    );
}

#[test]
fn compiled_sheet_is_shared_across_threads() {
    let schema = keyboard_schema();
    let sheet = load_theme(&schema).compile_to_fully_qualified(&schema);

    let handles: Vec<_> = (0..4)
        .map(|code| {
            let sheet = sheet.clone();
            std::thread::spawn(move || {
                sheet
                    .resolve(&StyleQuery::new("key").with_code(code).with_pressed(true))
                    .len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 5);
    }
}
