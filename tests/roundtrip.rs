use rstest::rstest;
use serde_json::json;
use toon_codec::{
    from_str, from_str_with_options, round_trip, to_string, to_string_with_options,
    DecodeOptions, Delimiter, EncodeOptions, LengthMarker, Value,
};

fn value(json: serde_json::Value) -> Value {
    Value::from(json)
}

#[rstest]
fn tabular_users() {
    let users = value(json!({
        "users": [
            {"id": 1, "name": "Alice", "role": "admin"},
            {"id": 2, "name": "Bob", "role": "user"}
        ]
    }));

    let toon = to_string(&users).unwrap();
    assert_eq!(toon, "users[2]{id,name,role}:\n  1,Alice,admin\n  2,Bob,user");
    assert_eq!(from_str(&toon).unwrap(), users);
}

#[rstest]
fn inline_with_pipe_delimiter() {
    let items = value(json!({"items": ["a", "b", "c"]}));
    let options = EncodeOptions::new().with_delimiter(Delimiter::Pipe);

    let toon = to_string_with_options(&items, &options).unwrap();
    assert_eq!(toon, "items[3|]: a|b|c");

    // decoding needs no matching option: the header declares the delimiter
    assert_eq!(from_str(&toon).unwrap(), items);
}

#[rstest]
fn list_of_inline_arrays_with_inner_delimiter() {
    let toon = "matrix[2]:\n  - [3|]: 1|2|3\n  - [3|]: 4|5|6";
    assert_eq!(
        from_str(toon).unwrap(),
        value(json!({"matrix": [[1, 2, 3], [4, 5, 6]]}))
    );
}

#[rstest]
fn quoted_value_containing_the_delimiter() {
    let toon = "addresses[2|]{id,address}:\n  1|\"123 Main, Apt 4\"\n  2|\"456 Oak, Suite 10\"";
    let decoded = from_str(toon).unwrap();
    let rows = decoded.get("addresses").and_then(Value::as_array).unwrap();
    assert_eq!(
        rows[0].get("address").and_then(Value::as_str),
        Some("123 Main, Apt 4")
    );
    assert_eq!(
        rows[1].get("address").and_then(Value::as_str),
        Some("456 Oak, Suite 10")
    );
}

#[rstest]
fn length_marker_round_trip() {
    let nums = value(json!({"nums": [1, 2, 3]}));
    let options = EncodeOptions::new().with_length_marker(LengthMarker::Hash);

    let toon = to_string_with_options(&nums, &options).unwrap();
    assert_eq!(toon, "nums[#3]: 1,2,3");
    assert_eq!(from_str(&toon).unwrap(), nums);
}

#[rstest]
fn encoded_form_is_smaller_than_minified_json() {
    let users = json!({
        "users": [
            {"id": 1, "name": "Alice", "role": "admin"},
            {"id": 2, "name": "Bob", "role": "user"}
        ]
    });
    let toon = to_string(&value(users.clone())).unwrap();
    let minified = serde_json::to_string(&users).unwrap();
    assert!(toon.len() < minified.len());
}

#[rstest]
#[case(json!(null))]
#[case(json!(true))]
#[case(json!(-17))]
#[case(json!(2.5))]
#[case(json!("plain text"))]
#[case(json!(""))]
#[case(json!("null"))]
#[case(json!("123"))]
#[case(json!([]))]
#[case(json!([1, "two", false, null]))]
#[case(json!({"a": 1, "b": [1, 2, [3, 4]], "c": {"d": {"e": "deep"}}}))]
#[case(json!({"rows": [{"x": 1.5, "y": -2.25}, {"x": 0.0, "y": 9.75}]}))]
#[case(json!({"list": [{"a": 1}, {"a": 1, "b": 2}, "str", [true]]}))]
#[case(json!({"text": "line one\nline two\ttabbed"}))]
#[case(json!({"weird key: yes": {"and [brackets]": "ok, fine"}}))]
#[case(json!({"outer": [{"inner": [{"p": 1}, {"p": 2}], "tag": "t"}]}))]
#[case(json!({"empties": [{}, {}, []]}))]
fn round_trips_with_default_options(#[case] source: serde_json::Value) {
    let original = value(source);
    let reconstructed = round_trip(
        &original,
        &EncodeOptions::default(),
        &DecodeOptions::default(),
    )
    .unwrap();
    assert_eq!(reconstructed, original);
}

#[rstest]
#[case(Delimiter::Comma)]
#[case(Delimiter::Pipe)]
#[case(Delimiter::Tab)]
fn round_trips_under_every_delimiter(#[case] delimiter: Delimiter) {
    let original = value(json!({
        "table": [
            {"name": "a,b", "note": "x|y"},
            {"name": "c\td", "note": "plain"}
        ],
        "inline": [1, "two", "th,re|e"]
    }));
    let options = EncodeOptions::new().with_delimiter(delimiter);
    let reconstructed =
        round_trip(&original, &options, &DecodeOptions::default()).unwrap();
    assert_eq!(reconstructed, original);
}

#[rstest]
#[case("a: 1\nb: two")]
#[case("items[3]: 1,2,3")]
#[case("users[2]{id,name}:\n  1,Ada\n  2,Bob")]
#[case("outer:\n  inner[2]:\n    - x: 1\n    - y: 2")]
#[case("matrix[2]:\n  - [2|]: 1|2\n  - [2|]: 3|4")]
#[case("solo")]
#[case("[2]:\n  - a\n  - b")]
fn encoder_output_is_a_decode_fixed_point(#[case] document: &str) {
    let first = from_str(document).unwrap();
    let re_encoded = to_string(&first).unwrap();
    assert_eq!(from_str(&re_encoded).unwrap(), first);
}

#[rstest]
fn reserved_literals_round_trip_only_when_quoted() {
    let original = value(json!({"a": "null", "b": "true", "c": "false"}));
    let toon = to_string(&original).unwrap();
    assert_eq!(toon, "a: \"null\"\nb: \"true\"\nc: \"false\"");
    assert_eq!(from_str(&toon).unwrap(), original);

    // the bare forms decode as the literals themselves
    let bare = from_str("a: null\nb: true\nc: false").unwrap();
    assert_eq!(bare, value(json!({"a": null, "b": true, "c": false})));
}

#[rstest]
fn lenient_decode_round_trips_crlf_input() {
    let options = DecodeOptions::new().with_strict(false);
    let decoded = from_str_with_options("a: 1\r\nb: 2\r\n", &options).unwrap();
    assert_eq!(decoded, value(json!({"a": 1, "b": 2})));
}

#[rstest]
fn float_precision_survives() {
    let original = value(json!({
        "pi": std::f64::consts::PI,
        "tiny": 1.5e-12,
        "huge": 6.02e23,
        "exact": 2.0
    }));
    let toon = to_string(&original).unwrap();
    assert!(!toon.contains('e') && !toon.contains('E'));
    assert_eq!(from_str(&toon).unwrap(), original);
}
