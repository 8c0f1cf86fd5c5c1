// tests/crm_encoding.rs
use investor_finder::crm::encode::{encode_value, FieldValue};
use investor_finder::crm::{ColumnMap, ColumnRole, ColumnType, MappedColumn};
use investor_finder::upload::{build_column_values, UploadOptions};
use investor_finder::CandidateRecord;

fn all_types() -> Vec<ColumnType> {
    vec![
        ColumnType::Link,
        ColumnType::Text,
        ColumnType::Numeric,
        ColumnType::Rating,
        ColumnType::Status,
        ColumnType::LongText,
        ColumnType::Email,
        ColumnType::from("dropdown"),
    ]
}

#[test]
fn encoding_is_deterministic_for_every_type() {
    let values = [
        FieldValue::text("hello@fund.vc"),
        FieldValue::link("https://fund.vc", "Fund"),
        FieldValue::Number(42),
        FieldValue::text("  "),
    ];
    for kind in all_types() {
        for v in &values {
            assert_eq!(encode_value(v, &kind), encode_value(v, &kind), "{kind:?} {v:?}");
        }
    }
}

#[test]
fn unknown_types_fall_back_to_text() {
    let kind = ColumnType::from("dropdown");
    assert_eq!(
        encode_value(&FieldValue::text("VC"), &kind),
        Some(serde_json::json!("VC"))
    );
}

#[test]
fn payload_string_is_stable_across_builds() {
    let mut map = ColumnMap::new();
    for (role, id, kind) in [
        (ColumnRole::Website, "link_mkyj3m1e", ColumnType::Link),
        (ColumnRole::Linkedin, "link_mkyjpc2z", ColumnType::Link),
        (ColumnRole::Score, "numeric_mkyjx5h6", ColumnType::Numeric),
        (ColumnRole::Location, "text_mkyjfhyc", ColumnType::Text),
        (ColumnRole::Email, "email_mkyjbej4", ColumnType::Email),
        (ColumnRole::Status, "color_mkyj5j54", ColumnType::Status),
    ] {
        map.insert(
            role,
            MappedColumn {
                id: id.into(),
                kind,
            },
        );
    }

    let mut rec = CandidateRecord::new("Homebrew", "Curated list");
    rec.website = Some("https://homebrew.co".into());
    rec.linkedin = Some("https://www.linkedin.com/company/homebrew".into());
    rec.email = Some("hello@homebrew.co".into());
    rec.location = "San Francisco, US".into();
    rec.score = 88;

    let opts = UploadOptions::default();
    let a = serde_json::Value::Object(build_column_values(&rec, &map, &opts)).to_string();
    let b = serde_json::Value::Object(build_column_values(&rec, &map, &opts)).to_string();
    assert_eq!(a, b);

    let v: serde_json::Value = serde_json::from_str(&a).unwrap();
    assert_eq!(v["numeric_mkyjx5h6"], "88");
    assert_eq!(v["link_mkyjpc2z"]["text"], "LinkedIn");
    assert_eq!(v["email_mkyjbej4"]["email"], "hello@homebrew.co");
    assert_eq!(v["color_mkyj5j54"]["label"], "New Lead");
    assert_eq!(v.as_object().unwrap().len(), 6);
}
