//! Behavioural tests for the changeset
//!
//! Exercises the full cast → validate → project flow through the public API.

use familiar_changeset::{
    Changeset, ChangesetError, FieldOptions, FieldType, LengthValidator, NumberValidator, Record,
    Schema, SchemaBuilder, SchemaField,
};
use regex::Regex;
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

fn post_schema() -> Schema {
    SchemaBuilder::new()
        .string("title", None)
        .string("body", None)
        .float("rating", None)
        .boolean("published", Some(FieldOptions::with_default(false)))
        .integer("authorId", None)
        .decimal("price", Some(FieldOptions::with_default("0.00")))
        .binary("attachment", None)
        .string("previewText", Some(FieldOptions::virtual_field()))
        .build()
}

// =============================================================================
// Casting
// =============================================================================

#[test]
fn test_fields_not_permitted_never_change() {
    let params = record(json!({
        "title": "Hello",
        "body": "World",
        "rating": "4.5",
        "authorId": "7"
    }));

    for permitted in [vec![], vec!["title"], vec!["title", "rating"]] {
        let cs = Changeset::new(Record::new(), post_schema())
            .cast(&params, &permitted)
            .unwrap();
        for field in params.keys() {
            assert_eq!(
                cs.is_changed(field),
                permitted.contains(&field.as_str()),
                "field {} with permitted {:?}",
                field,
                permitted
            );
        }
    }
}

#[test]
fn test_values_equal_to_baseline_are_not_changes() {
    let baseline = record(json!({
        "title": "Hello",
        "rating": 4.5,
        "authorId": 7,
        "published": true,
        "price": "9.99"
    }));
    let params = record(json!({
        "title": " Hello ",
        "rating": "4.5",
        "authorId": 7.0,
        "published": "yes",
        "price": 9.99
    }));

    let cs = Changeset::new(baseline, post_schema())
        .cast(&params, &["title", "rating", "authorId", "published", "price"])
        .unwrap();

    assert!(cs.changes().is_empty(), "unexpected changes: {:?}", cs.changes());
    assert!(cs.is_valid());
}

#[test]
fn test_binary_is_always_a_change() {
    let baseline = record(json!({ "attachment": [104, 105] }));
    let cs = Changeset::new(baseline, post_schema())
        .cast(&record(json!({ "attachment": "hi" })), &["attachment"])
        .unwrap();

    assert_eq!(cs.get_change("attachment"), Some(&json!([104, 105])));
}

#[test]
fn test_unknown_permitted_field_aborts_cast() {
    let params = record(json!({ "title": "Hello", "slug": "hello" }));
    let err = Changeset::new(Record::new(), post_schema())
        .cast(&params, &["title", "slug"])
        .unwrap_err();

    assert!(matches!(err, ChangesetError::UnknownField { ref field } if field == "slug"));
    assert_eq!(err.to_string(), "unknown field slug given to cast");
}

#[test]
fn test_unknown_field_outside_permitted_is_ignored() {
    let params = record(json!({ "title": "Hello", "slug": "hello" }));
    let cs = Changeset::new(Record::new(), post_schema())
        .cast(&params, &["title"])
        .unwrap();
    assert!(cs.is_changed("title"));
    assert!(!cs.is_changed("slug"));
}

#[test]
fn test_put_change_records_even_when_equal() {
    let baseline = record(json!({ "title": "Hello" }));
    let cs = Changeset::new(baseline, post_schema()).put_change("title", "Hello");
    assert!(cs.is_changed("title"));
    assert_eq!(cs.get_change("title"), Some(&json!("Hello")));
}

#[test]
fn test_text_casts_use_exponent_form_at_extremes() {
    let schema = SchemaBuilder::new()
        .decimal("d", None)
        .string("t", None)
        .string("plain", None)
        .build();
    let cs = Changeset::new(Record::new(), schema)
        .cast(
            &record(json!({ "d": 1e21, "t": 0.0000001, "plain": 1e20 })),
            &["d", "t", "plain"],
        )
        .unwrap();

    assert_eq!(cs.get_change("d"), Some(&json!("1e+21")));
    assert_eq!(cs.get_change("t"), Some(&json!("1e-7")));
    assert_eq!(cs.get_change("plain"), Some(&json!("100000000000000000000")));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_underage_example() {
    let schema = SchemaBuilder::new().integer("age", None).build();
    let cs = Changeset::new(Record::new(), schema)
        .cast(&record(json!({ "age": "17" })), &["age"])
        .unwrap()
        .validate_number("age", &[(NumberValidator::GreaterThanOrEqualTo, 18.0)]);

    assert!(!cs.is_valid());
    assert_eq!(cs.errors().len(), 1);
    assert_eq!(cs.errors()[0].field, "age");
}

#[test]
fn test_required_never_flags_zero_or_false() {
    let schema = SchemaBuilder::new()
        .integer("count", None)
        .boolean("flag", None)
        .string("empty", None)
        .string("nothing", None)
        .build();
    let baseline = record(json!({ "count": 0, "flag": false, "empty": "", "nothing": null }));

    let cs = Changeset::new(baseline, schema)
        .validate_required(&["count", "flag", "empty", "nothing", "absent"]);

    let flagged: Vec<&str> = cs.errors().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(flagged, vec!["empty", "nothing", "absent"]);
}

#[test]
fn test_cast_zero_then_required_flags_field() {
    // A falsy cast result is stored as null, which is blank.
    let schema = SchemaBuilder::new().integer("count", None).build();
    let cs = Changeset::new(record(json!({ "count": 3 })), schema)
        .cast(&record(json!({ "count": "0" })), &["count"])
        .unwrap()
        .validate_required(&["count"]);

    assert_eq!(cs.get_field("count"), Some(&Value::Null));
    assert!(!cs.is_valid());
}

#[test]
fn test_less_than_or_equal_to_pins_upper_bound() {
    let schema = SchemaBuilder::new().float("rating", None).build();
    let check = |rating: f64| {
        Changeset::new(record(json!({ "rating": rating })), schema.clone())
            .validate_number("rating", &[(NumberValidator::LessThanOrEqualTo, 5.0)])
            .is_valid()
    };

    assert!(check(1.0));
    assert!(check(5.0));
    assert!(!check(5.5));
}

#[test]
fn test_chain_collects_every_error() {
    let email = Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap();
    let schema = SchemaBuilder::new()
        .string("name", None)
        .string("email", None)
        .integer("age", None)
        .build();

    let cs = Changeset::new(Record::new(), schema)
        .cast(
            &record(json!({ "name": "A", "email": "not-an-email", "age": "200" })),
            &["name", "email", "age"],
        )
        .unwrap()
        .validate_required(&["name", "email", "age"])
        .validate_length("name", &[(LengthValidator::Min, 2), (LengthValidator::Max, 40)])
        .validate_format("email", &email, None)
        .validate_number(
            "age",
            &[(NumberValidator::GreaterThan, 0.0), (NumberValidator::LessThan, 150.0)],
        )
        .add_error("name", "is reserved");

    let grouped = cs.transform_errors();
    assert_eq!(
        grouped["name"],
        vec!["length is invalid, expected: min: 2", "is reserved"]
    );
    assert_eq!(grouped["email"], vec!["has invalid format"]);
    assert_eq!(grouped["age"], vec!["must be less than 150"]);
    assert_eq!(cs.errors().len(), 4);
}

// =============================================================================
// Output
// =============================================================================

#[test]
fn test_apply_changes_overlays_baseline() {
    let schema = SchemaBuilder::new().integer("a", None).integer("b", None).build();
    let cs = Changeset::new(record(json!({ "a": 1, "b": 2 })), schema).put_change("b", 3);

    let applied = cs.apply_changes();
    assert_eq!(Value::Object(applied.clone()), json!({ "a": 1, "b": 3 }));
    assert_eq!(applied, cs.apply_changes());
}

#[test]
fn test_virtual_field_never_projected() {
    let schema = SchemaBuilder::new()
        .string("bio", Some(FieldOptions::virtual_field()))
        .build();
    let cs = Changeset::new(Record::new(), schema)
        .cast(&record(json!({ "bio": "hello" })), &["bio"])
        .unwrap()
        .put_change("bio", "forced");

    assert!(cs.is_changed("bio"));
    assert!(!cs.to_persistence_params().contains_key("bio"));
    assert!(!cs.to_snake_case_params().contains_key("bio"));
    assert_eq!(cs.apply_changes().get("bio"), Some(&json!("forced")));
}

#[test]
fn test_foreign_key_projects_as_connect() {
    let cs = Changeset::new(Record::new(), post_schema())
        .cast(&record(json!({ "authorId": 5 })), &["authorId"])
        .unwrap();

    let params = cs.to_persistence_params();
    assert_eq!(Value::Object(params.clone()), json!({ "author": { "connect": { "id": 5 } } }));
    assert!(!params.contains_key("authorId"));
}

#[test]
fn test_projection_uses_only_changes_and_defaults() {
    let baseline = record(json!({ "title": "Old", "body": "Kept", "published": true }));
    let cs = Changeset::new(baseline, post_schema())
        .cast(
            &record(json!({ "title": "New", "published": "", "price": 0 })),
            &["title", "published", "price"],
        )
        .unwrap();

    assert_eq!(
        Value::Object(cs.to_persistence_params()),
        json!({ "title": "New", "published": false, "price": "0.00" })
    );
}

#[test]
fn test_builder_schema_equals_hand_built() {
    let built = post_schema();
    let by_hand: Schema = [
        ("title", FieldType::String, FieldOptions::default()),
        ("body", FieldType::String, FieldOptions::default()),
        ("rating", FieldType::Float, FieldOptions::default()),
        ("published", FieldType::Boolean, FieldOptions::with_default(false)),
        ("authorId", FieldType::Integer, FieldOptions::default()),
        ("price", FieldType::Decimal, FieldOptions::with_default("0.00")),
        ("attachment", FieldType::Binary, FieldOptions::default()),
        ("previewText", FieldType::String, FieldOptions::virtual_field()),
    ]
    .into_iter()
    .map(|(name, t, opts)| (name.to_string(), SchemaField::new(t, opts)))
    .collect();

    assert_eq!(built, by_hand);

    let params = record(json!({ "title": " T ", "rating": "3", "authorId": "1" }));
    let permitted = ["title", "rating", "authorId"];
    let a = Changeset::new(Record::new(), built).cast(&params, &permitted).unwrap();
    let b = Changeset::new(Record::new(), by_hand).cast(&params, &permitted).unwrap();
    assert_eq!(a.changes(), b.changes());
    assert_eq!(a.to_persistence_params(), b.to_persistence_params());
}
