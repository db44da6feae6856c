//! Byte-for-byte comparison against the mongodb `bson` crate, which acts
//! as the reference implementation of the wire format.

use bson::doc;

use bsonic::{dump_document, load_document, Binary, Document, ObjectId, Value};

#[test]
fn document_bytes_match_the_reference_implementation() {
    let ground = doc! {
        "code": 200i32,
        "message": "hello world",
        "flag": true,
        "ratio": 0.5f64,
        "big": 1_234_567_890_123i64,
        "none": bson::Bson::Null,
        "nested": { "a": 1i32 },
        "arr": [1i32, 2i32, 3i32],
    };
    let mut expected = Vec::new();
    ground.to_writer(&mut expected).unwrap();

    let mut nested = Document::new();
    nested.insert("a", Value::Int32(1));
    let mut doc = Document::new();
    doc.insert("code", Value::Int32(200));
    doc.insert("message", Value::String("hello world".to_owned()));
    doc.insert("flag", Value::Boolean(true));
    doc.insert("ratio", Value::Double(0.5));
    doc.insert("big", Value::Int64(1_234_567_890_123));
    doc.insert("none", Value::Null);
    doc.insert("nested", Value::Document(nested));
    doc.insert(
        "arr",
        Value::Array(vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)].into()),
    );

    assert_eq!(dump_document(&doc).unwrap(), expected);
    assert_eq!(load_document(&expected).unwrap(), doc);
}

#[test]
fn driver_scalar_types_match() {
    let id = bson::oid::ObjectId::parse_str("5d505646cf6af4fe012b2415").unwrap();
    let ground = doc! {
        "id": id,
        "at": bson::DateTime::from_millis(1_577_836_800_000),
        "bin": bson::Bson::Binary(bson::Binary {
            subtype: bson::spec::BinarySubtype::Generic,
            bytes: vec![1, 2, 3, 4],
        }),
    };
    let mut expected = Vec::new();
    ground.to_writer(&mut expected).unwrap();

    let mut doc = Document::new();
    doc.insert(
        "id",
        Value::ObjectId("5d505646cf6af4fe012b2415".parse::<ObjectId>().unwrap()),
    );
    doc.insert("at", Value::DateTime(1_577_836_800_000));
    doc.insert("bin", Value::Binary(Binary::generic(vec![1, 2, 3, 4])));

    assert_eq!(dump_document(&doc).unwrap(), expected);
    assert_eq!(load_document(&expected).unwrap(), doc);
}

#[test]
fn reference_implementation_reads_our_bytes() {
    let mut doc = Document::new();
    doc.insert("name", Value::String("bsonic".to_owned()));
    doc.insert("stars", Value::Int32(8));
    let bytes = dump_document(&doc).unwrap();

    let parsed = bson::Document::from_reader(&mut &bytes[..]).unwrap();
    assert_eq!(parsed, doc! { "name": "bsonic", "stars": 8i32 });
}
