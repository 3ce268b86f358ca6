#![allow(clippy::approx_constant)]

mod common;

use common::{slot_as, Base, Envelope, Two, A, B, C};
use fieldjson::{
    bind, parse, read_from_file, read_from_str, read_from_str_with, serialize, JsonError,
    ReadOptions,
};

// ============================================================================
// Plain field sets
// ============================================================================

#[test]
fn read_b_from_string() {
    let mut b = B::default();
    read_from_str(r#"{"w":true,"y":2.5}"#, &mut b).unwrap();
    assert!(b.base.w);
    assert_eq!(b.y, 2.5);
}

#[test]
fn read_c_from_string() {
    let mut c = C::default();
    read_from_str(r#"{"w":false,"z":"hello"}"#, &mut c).unwrap();
    assert!(!c.base.w);
    assert_eq!(c.z, "hello");
}

#[test]
fn virtual_dispatch_read() {
    let mut b = B::default();
    {
        let base: &mut dyn Base = &mut b;
        read_from_str(r#"{"w":true,"y":2.5}"#, base).unwrap();
    }
    assert!(b.base.w);
    assert_eq!(b.y, 2.5);
}

#[test]
fn keys_outside_the_runtime_field_set_are_ignored() {
    // B does not expose `x`, even though its embedded A has one.
    let mut b = B::default();
    read_from_str(r#"{"x":42,"y":1}"#, &mut b).unwrap();
    assert_eq!(b.base.x, 1);
    assert_eq!(b.y, 1.0);
}

#[test]
fn absent_fields_keep_their_values() {
    let mut a = A { w: false, x: 5 };
    read_from_str(r#"{"x":6}"#, &mut a).unwrap();
    assert_eq!(a, A { w: false, x: 6 });
}

#[test]
fn bare_keys_read_back() {
    let mut a = A::default();
    read_from_str("{w:false,x:-9}", &mut a).unwrap();
    assert_eq!(a, A { w: false, x: -9 });
}

#[test]
fn later_duplicate_key_wins() {
    let mut a = A::default();
    read_from_str(r#"{"x":1,"x":2}"#, &mut a).unwrap();
    assert_eq!(a.x, 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn string_into_number_is_type_mismatch() {
    let mut a = A::default();
    let err = read_from_str(r#"{"x":"one"}"#, &mut a).unwrap_err();
    match err {
        JsonError::TypeMismatch {
            key,
            expected,
            found,
        } => {
            assert_eq!(key, "x");
            assert_eq!(expected, "i32");
            assert_eq!(found, "string");
        }
        other => panic!("expected type mismatch, got {other:?}"),
    }
}

#[test]
fn null_into_bool_is_type_mismatch() {
    let mut a = A::default();
    let err = read_from_str(r#"{"w":null}"#, &mut a).unwrap_err();
    assert!(matches!(err, JsonError::TypeMismatch { .. }));
    assert!(a.w);
}

#[test]
fn fraction_into_integer_is_type_mismatch() {
    let mut a = A::default();
    assert!(read_from_str(r#"{"x":1.5}"#, &mut a).is_err());
}

#[test]
fn nested_mismatch_names_full_path() {
    let mut envelope = Envelope::default();
    let err = read_from_str(
        r#"{"history":[{"x":1},{"x":true}]}"#,
        &mut envelope,
    )
    .unwrap_err();
    assert_eq!(err.key(), Some("history[1].x"));
}

#[test]
fn malformed_input_is_syntax_error() {
    let mut a = A::default();
    let err = read_from_str("{\"w\":true,\n\"x\":}", &mut a).unwrap_err();
    match err {
        JsonError::Syntax { line, column, .. } => {
            assert_eq!(line, 2);
            assert_eq!(column, 5);
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn non_object_root_is_rejected() {
    let mut a = A::default();
    let err = bind(&parse("[1]").unwrap(), &mut a).unwrap_err();
    assert_eq!(err.key(), Some("$"));
}

#[test]
fn depth_limit_applies_to_reads() {
    let mut envelope = Envelope::default();
    let options = ReadOptions { max_depth: 1 };
    let err = read_from_str_with(r#"{"header":{"x":1}}"#, &mut envelope, &options).unwrap_err();
    assert!(matches!(err, JsonError::Syntax { .. }));
}

// ============================================================================
// Nested composites
// ============================================================================

#[test]
fn nested_object_binds_in_place() {
    let mut envelope = Envelope::default();
    envelope.header.x = 10;
    read_from_str(
        r#"{"id":3,"header":{"w":false},"note":"hi","payload":{"type":"Two","s":"q"}}"#,
        &mut envelope,
    )
    .unwrap();
    assert_eq!(envelope.id, 3);
    assert_eq!(envelope.header, A { w: false, x: 10 });
    assert_eq!(envelope.note.as_deref(), Some("hi"));
    assert_eq!(
        slot_as::<Two>(&envelope.payload),
        Some(&Two { s: "q".into() })
    );
}

#[test]
fn object_array_replaces_elements() {
    let mut envelope = Envelope {
        history: vec![A::default(); 3],
        ..Envelope::default()
    };
    read_from_str(r#"{"history":[{"x":4}]}"#, &mut envelope).unwrap();
    assert_eq!(envelope.history, vec![A { w: true, x: 4 }]);
}

#[test]
fn null_clears_optional_leaf() {
    let mut envelope = Envelope {
        note: Some("old".into()),
        ..Envelope::default()
    };
    read_from_str(r#"{"note":null}"#, &mut envelope).unwrap();
    assert!(envelope.note.is_none());
}

// ============================================================================
// Round trips and files
// ============================================================================

#[test]
fn float_round_trip_is_bit_exact() {
    for y in [3.14f32, 0.1, -0.0, f32::MIN_POSITIVE, f32::MAX, 1.0e-7, 16777216.0] {
        let source = B {
            base: A::default(),
            y,
        };
        let mut parsed = B {
            y: 123.0,
            ..B::default()
        };
        read_from_str(&serialize(&source).unwrap(), &mut parsed).unwrap();
        assert_eq!(parsed.y.to_bits(), y.to_bits(), "value {y}");
    }
}

#[test]
fn non_finite_float_output_does_not_read_back() {
    let source = B {
        y: f32::INFINITY,
        ..B::default()
    };
    let text = serialize(&source).unwrap();
    assert_eq!(text, "{w:true,y:null}");

    let mut parsed = B::default();
    let err = read_from_str(&text, &mut parsed).unwrap_err();
    match err {
        JsonError::TypeMismatch {
            key,
            expected,
            found,
        } => {
            assert_eq!(key, "y");
            assert_eq!(expected, "f32");
            assert_eq!(found, "null");
        }
        other => panic!("expected type mismatch, got {other:?}"),
    }
    assert_eq!(parsed.y, 2.0);
}

#[test]
fn negative_zero_binds_into_unsigned_member() {
    let mut envelope = Envelope {
        id: 9,
        ..Envelope::default()
    };
    read_from_str(r#"{"id":-0}"#, &mut envelope).unwrap();
    assert_eq!(envelope.id, 0);
}

#[test]
fn read_from_file_binds_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.json");
    std::fs::write(&path, r#"{"w":false,"x":12}"#).unwrap();
    let mut a = A::default();
    read_from_file(&path, &mut a).unwrap();
    assert_eq!(a, A { w: false, x: 12 });
}

#[test]
fn read_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = A::default();
    let err = read_from_file(dir.path().join("absent.json"), &mut a).unwrap_err();
    assert!(matches!(err, JsonError::Io { .. }));
}
