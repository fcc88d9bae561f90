use dex::{from_str, from_str_with_options, ParseErrorKind, ParseOptions, Table};

const CHARACTER: &str = r#"MAYU : vocaloid {
taglist { yandere, lolita, gothic, small }

gender   : female
age      : 15
company  : EXIT TUNES
language : Japanese
code     : QWCE-00264

description: "
  MAYU's design is based on gothic lolita fashion.
  Her hair itself fades from a light blonde to rainbow.
"
}"#;

#[test]
fn complex_document() {
    let doc = from_str(CHARACTER).unwrap();
    assert_eq!(doc.len(), 1);

    let mayu = doc.get_table("MAYU").unwrap();
    assert_eq!(mayu.tag(), "vocaloid");
    assert_eq!(mayu.len(), 7);

    // The keyless tagged child is keyed by its tag, losing the tag itself.
    let taglist = mayu.get_table("taglist").unwrap();
    assert!(!taglist.has_tag());
    assert!(taglist.is_array());
    assert_eq!(taglist.values().get_str(0), Ok("yandere"));
    assert_eq!(taglist.values().get_str(3), Ok("small"));

    assert_eq!(mayu.get_str("gender"), Ok("female"));
    assert_eq!(mayu.get_f64("age"), Ok(15.0));
    assert_eq!(mayu.get_str("company"), Ok("EXIT TUNES"));
    assert_eq!(mayu.get_str("code"), Ok("QWCE-00264"));

    let description = mayu.get_str("description").unwrap();
    assert!(description.starts_with('\n'));
    assert!(description.contains("gothic lolita fashion."));
    assert!(description.lines().count() >= 3);
}

#[test]
fn end_to_end_tagged_document() {
    let doc = from_str(r#"NAME : kind { list { x, y, z } field : 1 other : "text" }"#).unwrap();
    assert_eq!(doc.len(), 1);

    let kind = doc.get_table("NAME").unwrap();
    assert_eq!(kind.tag(), "kind");
    // Positional access works on the outer table regardless of its keys.
    assert_eq!(doc.values().get_table(0).unwrap(), kind);

    let list = kind.get_table("list").unwrap();
    assert!(!list.has_tag());
    assert!(list.is_array());
    assert_eq!(list.len(), 3);
    assert_eq!(list.values().get_str(2), Ok("z"));

    assert_eq!(kind.get_f64("field"), Ok(1.0));
    assert_eq!(kind.get_str("other"), Ok("text"));
}

#[test]
fn empty_and_simple_arrays() {
    let table = from_str("{}").unwrap().values().get_table(0).unwrap().clone();
    assert!(table.is_array());
    assert_eq!(table.len(), 0);

    let table = from_str("{one, foo bar, three}").unwrap();
    let inner = table.values().get_table(0).unwrap();
    assert!(inner.is_array());
    assert_eq!(
        inner,
        &Table::builder().add("one").add("foo bar").add("three").create()
    );
}

#[test]
fn numeric_array_scenario() {
    let doc = from_str("{1,2,3}").unwrap();
    let inner = doc.values().get_table(0).unwrap();
    assert!(inner.is_array());
    assert!(!inner.has_tag());
    assert_eq!(inner.len(), 3);
    assert_eq!(inner.get_f64(0), Ok(1.0));
    assert_eq!(inner.get_f64(1), Ok(2.0));
    assert_eq!(inner.get_f64(2), Ok(3.0));
}

#[test]
fn map_scenario() {
    let doc = from_str("{a:1,b:2}").unwrap();
    let inner = doc.values().get_table(0).unwrap();
    assert!(!inner.is_array());
    assert_eq!(inner.get_f64("a"), Ok(1.0));
    assert_eq!(inner.get_f64("b"), Ok(2.0));
}

#[test]
fn explicit_positional_keys_form_an_array() {
    let doc = from_str("{0 : a, 1 : b}").unwrap();
    let inner = doc.values().get_table(0).unwrap();
    assert!(inner.is_array());

    // Out-of-order positional keys do not.
    let doc = from_str("{1 : b, 0 : a}").unwrap();
    assert!(!doc.values().get_table(0).unwrap().is_array());
}

#[test]
fn empty_input_is_an_empty_table() {
    let doc = from_str("").unwrap();
    assert!(doc.is_array());
    assert!(doc.is_empty());
    assert!(from_str(" \n \n ").unwrap().is_empty());
}

#[test]
fn empty_values_are_rejected() {
    for src in ["{val1, val2,,}", "{,val1, val2}", "{a:,b:1}", "{a:}"] {
        let err = from_str(src).unwrap_err();
        assert!(
            matches!(err.kind(), ParseErrorKind::UnexpectedToken(_)),
            "{src}: {err}"
        );
    }
}

#[test]
fn invalid_strings_are_rejected() {
    // A quote cannot open mid-token.
    let err = from_str("{this is \" invalid!}").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::UnexpectedToken(_)));

    // Unterminated literal.
    let err = from_str("{\"this is invalid!}").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::UnexpectedToken(_)));
}

#[test]
fn unbalanced_braces_are_rejected() {
    let err = from_str("{").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::UnexpectedEof(_)));

    let err = from_str("{a{b{").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::UnexpectedEof(_)));

    let err = from_str("}").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::UnexpectedToken(_)));

    let err = from_str("{a}}").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::UnexpectedToken(_)));
}

#[test]
fn trailing_top_level_content_is_rejected() {
    let err = from_str("{value}{value}").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::UnexpectedToken(_)));

    let err = from_str("{value} extra").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::UnexpectedToken(_)));
}

#[test]
fn separated_top_level_tables_are_fine() {
    let doc = from_str("{a}\n{b}").unwrap();
    assert_eq!(doc.len(), 2);
    assert!(doc.is_array());

    let doc = from_str("{a},{b}").unwrap();
    assert_eq!(doc.len(), 2);

    // Keyed top-level entries may even sit adjacent.
    let doc = from_str("first : {1} second : {2}").unwrap();
    assert_eq!(doc.len(), 2);
    assert!(doc.get_table("second").unwrap().is_array());
}

#[test]
fn duplicate_keys_raise_when_checked() {
    let err = from_str("{a:1,a:2}").unwrap_err();
    match err.kind() {
        ParseErrorKind::KeyDuplication(key) => assert_eq!(key, "a"),
        other => panic!("expected KeyDuplication, got {other:?}"),
    }
    // The error points at the second entry.
    assert_eq!(err.line(), 1);
    assert!(err.column() > 5);
}

#[test]
fn duplicate_numeric_keys_normalize() {
    let err = from_str("{1 : a, 1.0 : b}").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::KeyDuplication(_)));
}

#[test]
fn tag_derived_keys_join_duplicate_checking() {
    let err = from_str("{list{1}, list : 2}").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::KeyDuplication(_)));

    let err = from_str("{list{1}, list{2}}").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::KeyDuplication(_)));
}

#[test]
fn duplicate_checking_can_be_disabled() {
    let options = ParseOptions::new().with_duplicate_check(false);
    let doc = from_str_with_options("{a:1,a:2}", options.clone()).unwrap();
    let inner = doc.values().get_table(0).unwrap();
    assert_eq!(inner.len(), 1);
    assert_eq!(inner.get_f64("a"), Ok(2.0));

    assert!(from_str_with_options("{list{1}, list{2}}", options).is_ok());
}

#[test]
fn escape_sequences() {
    let doc = from_str(r#"{s : "tab\there\nand \"quotes\" and A\\"}"#).unwrap();
    let inner = doc.values().get_table(0).unwrap();
    assert_eq!(inner.get_str("s"), Ok("tab\there\nand \"quotes\" and A\\"));
}

#[test]
fn invalid_escapes_are_rejected() {
    let err = from_str(r#"{s : "\q"}"#).unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::InvalidEscape(_)));

    let err = from_str(r#"{s : "\u12g4"}"#).unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::InvalidEscape(_)));

    let err = from_str(r#"{s : "\u12"}"#).unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::InvalidEscape(_)));
}

#[test]
fn error_positions_span_lines() {
    let err = from_str("one : 1\ntwo :: 2").unwrap_err();
    assert_eq!(err.line(), 2);
    assert_eq!(err.column(), 6);
    assert_eq!(err.offset(), 13);
    let rendered = err.to_string();
    assert!(rendered.contains("1 | one : 1"));
    assert!(rendered.contains("2 | two :: 2"));
    assert!(err.context().contains('^'));
}

#[test]
fn newlines_separate_entries_without_commas() {
    let doc = from_str("a : 1\nb : 2\n\nc : 3").unwrap();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.get_f64("c"), Ok(3.0));
}

#[test]
fn key_takes_value_from_next_line() {
    let doc = from_str("a :\n1").unwrap();
    assert_eq!(doc.get_f64("a"), Ok(1.0));
}

#[test]
fn bare_tokens_coerce_opportunistically() {
    let doc = from_str("{0x10, 1e2, NaN, -Infinity, true, word}").unwrap();
    let inner = doc.values().get_table(0).unwrap();
    assert_eq!(inner.get_f64(0), Ok(16.0));
    assert_eq!(inner.get_f64(1), Ok(100.0));
    assert!(inner.get_f64(2).unwrap().is_nan());
    assert_eq!(inner.get_f64(3), Ok(f64::NEG_INFINITY));
    assert_eq!(inner.get_bool(4), Ok(true));
    assert_eq!(inner.get_str(5), Ok("word"));
}

#[test]
fn quoted_keys_stay_strings() {
    let doc = from_str("{\"1\" : string, 1 : number}").unwrap();
    let inner = doc.values().get_table(0).unwrap();
    assert_eq!(inner.len(), 2);
    assert_eq!(inner.get_str("1"), Ok("string"));
    assert_eq!(inner.get_str(1), Ok("number"));
}

#[test]
fn adjacent_sibling_tables_inside_a_scope() {
    let doc = from_str("{ {1}{2} }").unwrap();
    let inner = doc.values().get_table(0).unwrap();
    assert!(inner.is_array());
    assert_eq!(inner.len(), 2);
    assert_eq!(inner.get_table(0).unwrap().get_f64(0), Ok(1.0));
    assert_eq!(inner.get_table(1).unwrap().get_f64(0), Ok(2.0));
}

#[test]
fn double_key_is_rejected() {
    let err = from_str("{a : b : c}").unwrap_err();
    assert!(matches!(err.kind(), ParseErrorKind::UnexpectedToken(_)));
}
