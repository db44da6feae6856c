use std::time::{Duration, UNIX_EPOCH};

use bsonic::{
    Binary, Bson, DateTime, DbPointer, Decimal128, Document, JavaScript, JavaScriptWithScope,
    MaxKey, MinKey, ObjectId, Regex, RegexFlags, Symbol, Timestamp, Value,
};

#[test]
fn documented_byte_layouts() {
    let bson = Bson::default();
    assert_eq!(bson.dump(&10i32).unwrap(), [0x0A, 0x00, 0x00, 0x00]);
    assert_eq!(bson.dump(&true).unwrap(), [0x01]);
    assert_eq!(
        bson.dump(&"hi").unwrap(),
        [0x03, 0x00, 0x00, 0x00, 0x68, 0x69, 0x00]
    );
}

#[test]
fn double_layout() {
    let bson = Bson::default();
    assert_eq!(bson.dump(&1.5f64).unwrap(), 1.5f64.to_le_bytes());
    assert_eq!(bson.load::<f64>(&1.5f64.to_le_bytes()).unwrap(), 1.5);
}

#[test]
fn integer_round_trips() {
    let bson = Bson::default();
    for value in [0i32, 1, -1, i32::MIN, i32::MAX] {
        assert_eq!(bson.load::<i32>(&bson.dump(&value).unwrap()).unwrap(), value);
    }
    for value in [0i64, -42, i64::MIN, i64::MAX] {
        assert_eq!(bson.load::<i64>(&bson.dump(&value).unwrap()).unwrap(), value);
    }
    // Narrow types travel as int32.
    assert_eq!(bson.to_value(&7u8).unwrap(), Value::Int32(7));
    assert_eq!(bson.to_value(&-3i16).unwrap(), Value::Int32(-3));
    // u32 always fits an int64.
    assert_eq!(bson.to_value(&u32::MAX).unwrap(), Value::Int64(u32::MAX as i64));
}

#[test]
fn unsigned_out_of_range() {
    let bson = Bson::default();
    let err = bson.dump(&u64::MAX).unwrap_err();
    assert!(err.to_string().contains("does not fit"));
    assert_eq!(bson.load::<u64>(&bson.dump(&5u64).unwrap()).unwrap(), 5);
}

#[test]
fn strings_and_chars() {
    let bson = Bson::default();
    let text = "snake? snake!? snaaaake!".to_owned();
    assert_eq!(bson.load::<String>(&bson.dump(&text).unwrap()).unwrap(), text);
    assert_eq!(bson.load::<char>(&bson.dump(&'x').unwrap()).unwrap(), 'x');
    assert!(bson.from_value::<char>(&Value::String("xy".to_owned())).is_err());
}

#[test]
fn bare_null_and_options() {
    let bson = Bson::default();
    assert!(bson.dump(&()).unwrap().is_empty());
    assert!(bson.dump(&None::<i32>).unwrap().is_empty());
    assert_eq!(bson.load::<Option<i32>>(&[]).unwrap(), None);
    assert_eq!(
        bson.load::<Option<i32>>(&[0x0A, 0x00, 0x00, 0x00]).unwrap(),
        Some(10)
    );
}

#[test]
fn boolean_byte_is_validated() {
    let bson = Bson::default();
    assert!(!bson.load::<bool>(&[0x00]).unwrap());
    assert!(bson.load::<bool>(&[0x01]).unwrap());
    let err = bson.load::<bool>(&[0x02]).unwrap_err();
    assert!(err.to_string().contains("invalid boolean byte"));
}

#[test]
fn object_id_round_trip() {
    let bson = Bson::default();
    let id = ObjectId::from_bytes(*b"\x5d\x50\x56\x46\xcf\x6a\xf4\xfe\x01\x2b\x24\x15");
    let bytes = bson.dump(&id).unwrap();
    assert_eq!(bytes, id.bytes());
    assert_eq!(bson.load::<ObjectId>(&bytes).unwrap(), id);
}

#[test]
fn date_time_is_distinct_from_int64() {
    let bson = Bson::default();
    let at = DateTime(1_577_836_800_000);
    assert_eq!(bson.to_value(&at).unwrap(), Value::DateTime(1_577_836_800_000));
    assert_eq!(bson.load::<DateTime>(&bson.dump(&at).unwrap()).unwrap(), at);
    // A date-time does not satisfy an int64 accessor.
    assert!(bson.from_value::<i64>(&Value::DateTime(1)).is_err());
}

#[test]
fn system_time_round_trip() {
    let bson = Bson::default();
    let at = UNIX_EPOCH + Duration::from_millis(1_234_567);
    let bytes = bson.dump(&at).unwrap();
    assert_eq!(bson.load::<std::time::SystemTime>(&bytes).unwrap(), at);

    let before_epoch = UNIX_EPOCH - Duration::from_millis(5_000);
    assert_eq!(bson.to_value(&before_epoch).unwrap(), Value::DateTime(-5_000));
}

#[test]
fn javascript_round_trip() {
    let bson = Bson::default();
    let code = JavaScript("function() { return 1; }".to_owned());
    let bytes = bson.dump(&code).unwrap();
    // Same payload layout as a string.
    assert_eq!(bytes, bson.dump(&code.0.as_str()).unwrap());
    assert_eq!(bson.load::<JavaScript>(&bytes).unwrap(), code);
}

#[test]
fn binary_round_trip() {
    let bson = Bson::default();
    let bin = Binary::generic(vec![1, 2, 3]);
    assert_eq!(
        bson.dump(&bin).unwrap(),
        [0x03, 0x00, 0x00, 0x00, 0x00, 1, 2, 3]
    );
    assert_eq!(bson.load::<Binary>(&bson.dump(&bin).unwrap()).unwrap(), bin);
}

#[test]
fn old_binary_wire_layout() {
    let bson = Bson::default();
    let bin = Binary::new(Binary::OLD_BINARY, vec![1, 2, 3]);
    let bytes = bson.dump(&bin).unwrap();
    assert_eq!(bytes, [0x07, 0x00, 0x00, 0x00, 0x02, 0x03, 0x00, 0x00, 0x00, 1, 2, 3]);
    assert_eq!(bson.load::<Binary>(&bytes).unwrap(), bin);
}

#[test]
fn regex_flags_canonicalize() {
    let bson = Bson::default();
    let re = Regex::new("^start", RegexFlags::MULTILINE | RegexFlags::IGNORE_CASE);
    let bytes = bson.dump(&re).unwrap();
    assert_eq!(bytes, b"^start\0im\0");
    let out = bson.load::<Regex>(&bytes).unwrap();
    assert_eq!(out, re);
    assert!(out.flags().contains(RegexFlags::IGNORE_CASE));
    assert!(out.flags().contains(RegexFlags::MULTILINE));
}

#[test]
fn runtime_only_regex_flags_vanish() {
    let bson = Bson::default();
    let re = Regex::new("a+", RegexFlags::GLOBAL | RegexFlags::IGNORE_CASE);
    let out = bson
        .load::<Regex>(&bson.dump(&re).unwrap())
        .unwrap();
    assert_eq!(out.options(), "i");
    assert!(!out.flags().contains(RegexFlags::GLOBAL));
}

#[test]
fn decimal128_round_trip() {
    let bson = Bson::default();
    // 1 at exponent 0.
    let one = Decimal128::from_bid(0x3040_0000_0000_0000, 1);
    let bytes = bson.dump(&one).unwrap();
    // Low word first, then high word.
    assert_eq!(&bytes[..8], 1u64.to_le_bytes());
    assert_eq!(&bytes[8..], 0x3040_0000_0000_0000u64.to_le_bytes());
    assert_eq!(bson.load::<Decimal128>(&bytes).unwrap(), one);
    assert_eq!(one.to_string(), "1");
}

#[test]
fn legacy_kinds_round_trip() {
    let bson = Bson::default();
    let ptr = DbPointer {
        namespace: "db.coll".to_owned(),
        id: ObjectId::from_bytes([9; 12]),
    };
    let tree = bson.to_value(&ptr).unwrap();
    assert_eq!(bson.from_value::<DbPointer>(&tree).unwrap(), ptr);

    let mut scope = Document::new();
    scope.insert("x", Value::Int32(1));
    let code = JavaScriptWithScope {
        code: "g(x)".to_owned(),
        scope,
    };
    let tree = bson.to_value(&code).unwrap();
    assert_eq!(bson.from_value::<JavaScriptWithScope>(&tree).unwrap(), code);

    assert_eq!(
        bson.from_value::<MaxKey>(&bson.to_value(&MaxKey).unwrap()).unwrap(),
        MaxKey
    );
    assert_eq!(
        bson.from_value::<MinKey>(&bson.to_value(&MinKey).unwrap()).unwrap(),
        MinKey
    );

    // Symbol and timestamp have no top-level form, but they travel fine
    // inside structures.
    let symbols = vec![Symbol("legacy".to_owned())];
    let tree = bson.to_value(&symbols).unwrap();
    assert_eq!(bson.from_value::<Vec<Symbol>>(&tree).unwrap(), symbols);

    let stamps = vec![Timestamp { time: 1, increment: 2 }];
    let tree = bson.to_value(&stamps).unwrap();
    assert_eq!(bson.from_value::<Vec<Timestamp>>(&tree).unwrap(), stamps);
}

#[test]
fn primitive_type_mismatch() {
    let bson = Bson::default();
    let err = bson.from_value::<i32>(&Value::String("10".to_owned())).unwrap_err();
    assert!(err.to_string().contains("Int32"));
    assert!(err.to_string().contains("String"));
    assert!(bson.from_value::<bool>(&Value::Int32(1)).is_err());
    assert!(bson.from_value::<String>(&Value::JavaScript("a".to_owned())).is_err());
}

#[test]
fn top_level_value_must_be_recorded_once() {
    use bsonic::{Descriptor, Encode, Encoder};

    struct Nothing;

    impl Encode for Nothing {
        fn descriptor() -> Descriptor {
            Descriptor::primitive("Nothing", bsonic::BsonType::Int32)
        }

        fn encode(&self, _encoder: &mut Encoder) -> bsonic::Result<()> {
            Ok(())
        }
    }

    struct Twice;

    impl Encode for Twice {
        fn descriptor() -> Descriptor {
            Descriptor::primitive("Twice", bsonic::BsonType::Int32)
        }

        fn encode(&self, encoder: &mut Encoder) -> bsonic::Result<()> {
            encoder.encode_i32(1)?;
            encoder.encode_i32(2)
        }
    }

    let bson = Bson::default();
    let err = bson.to_value(&Nothing).unwrap_err();
    assert!(err.to_string().contains("no value captured"));
    let err = bson.to_value(&Twice).unwrap_err();
    assert!(err.to_string().contains("already recorded"));
}
