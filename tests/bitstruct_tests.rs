//! Integration tests for bit-level layouts

use binform::factory::{
    bit, bit_field, bit_integer_adapter, bit_struct, flag, nibble, octet, padding, struct_of,
};
use binform::{container, Construct, Error, StaticField, Value};

/// The canonical mixed layout: scalar bit fields, a flag, padding and a
/// nested struct, packed into two bytes.
fn mixed_layout() -> binform::BoxedConstruct {
    bit_struct(
        "foo",
        vec![
            bit_field("a", 3).unwrap(),
            flag("b").unwrap(),
            padding(3).unwrap(),
            nibble("c").unwrap(),
            struct_of(
                "bar",
                vec![nibble("d").unwrap(), bit("e").unwrap()],
            )
            .unwrap(),
        ],
    )
    .unwrap()
}

#[test]
fn mixed_bit_layout_parses() {
    let parsed = mixed_layout().parse(&[0xE1, 0x1F]).unwrap();
    assert_eq!(
        parsed,
        Value::Container(container! {
            "a" => 7,
            "b" => false,
            "c" => 8,
            "bar" => container! { "d" => 15, "e" => 1 },
        })
    );
}

#[test]
fn mixed_bit_layout_builds_back() {
    let layout = mixed_layout();
    let value = Value::Container(container! {
        "a" => 7,
        "b" => false,
        "c" => 8,
        "bar" => container! { "d" => 15, "e" => 1 },
    });
    assert_eq!(layout.build(&value).unwrap(), vec![0xE1, 0x1F]);

    // And the bytes parse back to the same container.
    let rebuilt = layout.build(&layout.parse(&[0xE1, 0x1F]).unwrap()).unwrap();
    assert_eq!(rebuilt, vec![0xE1, 0x1F]);
}

#[test]
fn bit_struct_sizeof_is_in_bytes() {
    assert_eq!(mixed_layout().sizeof().unwrap(), 2);
}

#[test]
fn flag_decodes_set_and_clear_bits() {
    let layout = bit_struct(
        "flags",
        vec![flag("x").unwrap(), padding(7).unwrap()],
    )
    .unwrap();

    let set = layout.parse(&[0x80]).unwrap();
    assert_eq!(
        set.as_container().unwrap().get("x"),
        Some(&Value::Bool(true))
    );
    let clear = layout.parse(&[0x00]).unwrap();
    assert_eq!(
        clear.as_container().unwrap().get("x"),
        Some(&Value::Bool(false))
    );

    assert_eq!(layout.build(&set).unwrap(), vec![0x80]);
    assert_eq!(layout.build(&clear).unwrap(), vec![0x00]);
}

#[test]
fn octet_spans_a_full_byte() {
    let layout = bit_struct("o", vec![octet("value").unwrap()]).unwrap();
    let parsed = layout.parse(&[0xA5]).unwrap();
    assert_eq!(
        parsed.as_container().unwrap().get("value"),
        Some(&Value::Int(0xA5))
    );
    assert_eq!(layout.build(&parsed).unwrap(), vec![0xA5]);
}

#[test]
fn swapped_bit_integer_reverses_byte_groups() {
    let inner = StaticField::new(Some("v"), 16).unwrap();
    let layout = bit_struct(
        "w",
        vec![bit_integer_adapter(Box::new(inner), 16, true, false, 8).unwrap()],
    )
    .unwrap();

    let parsed = layout.parse(&[0x12, 0x34]).unwrap();
    assert_eq!(
        parsed.as_container().unwrap().get("v"),
        Some(&Value::Int(0x3412))
    );
    assert_eq!(layout.build(&parsed).unwrap(), vec![0x12, 0x34]);
}

#[test]
fn signed_bit_field_round_trips() {
    let inner = StaticField::new(Some("v"), 8).unwrap();
    let layout = bit_struct(
        "s",
        vec![bit_integer_adapter(Box::new(inner), 8, false, true, 8).unwrap()],
    )
    .unwrap();

    let parsed = layout.parse(&[0xFE]).unwrap();
    assert_eq!(
        parsed.as_container().unwrap().get("v"),
        Some(&Value::Int(-2))
    );
    assert_eq!(layout.build(&parsed).unwrap(), vec![0xFE]);
}

#[test]
fn negative_into_unsigned_bit_field_is_rejected() {
    let layout = bit_struct("u", vec![bit_field("v", 8).unwrap()]).unwrap();
    let value = Value::Container(container! { "v" => -1 });
    assert!(matches!(
        layout.build(&value),
        Err(Error::BitInteger { .. })
    ));
}

#[test]
fn ragged_bit_width_is_rejected() {
    let layout = bit_struct("r", vec![bit_field("v", 5).unwrap()]).unwrap();
    assert!(layout.parse(&[0xFF]).is_err());
    assert!(matches!(layout.sizeof(), Err(Error::Sizeof { .. })));
}

#[test]
fn truncated_input_is_a_field_error() {
    let layout = mixed_layout();
    assert!(matches!(
        layout.parse(&[0xE1]),
        Err(Error::FieldSize {
            expected: 2,
            actual: 1
        })
    ));
}

#[test]
fn bit_field_width_zero_is_rejected_at_construction() {
    assert!(bit_field("v", 0).is_err());
}
