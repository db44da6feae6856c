use bsonic::{
    Bson, BsonConfiguration, Decode, Decoder, Descriptor, Document, Encode, Encoder, Error,
    RegistryBuilder, Result, Value,
};

#[derive(Copy, Clone, Debug, PartialEq)]
enum HttpError {
    NotFound,
    InternalServerError,
}

impl Encode for HttpError {
    fn descriptor() -> Descriptor {
        Descriptor::enumeration("HttpError", &["NOT_FOUND", "INTERNAL_SERVER_ERROR"])
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_enum(&<Self as Encode>::descriptor(), *self as usize)
    }
}

impl Decode for HttpError {
    fn descriptor() -> Descriptor {
        <HttpError as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        match decoder.decode_enum(&<Self as Decode>::descriptor())? {
            0 => Ok(HttpError::NotFound),
            1 => Ok(HttpError::InternalServerError),
            _ => unreachable!(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Cat {
    sound: String,
}

#[derive(Clone, Debug, PartialEq)]
struct Dog {
    barks: bool,
}

#[derive(Clone, Debug, PartialEq)]
enum Animal {
    Cat(Cat),
    Dog(Dog),
}

macro_rules! record {
    ($ty:ident, $serial:literal, $field:ident: $decode:ident / $kind:ty) => {
        impl Encode for $ty {
            fn descriptor() -> Descriptor {
                Descriptor::structure($serial, &[stringify!($field)])
            }

            fn encode(&self, encoder: &mut Encoder) -> Result<()> {
                let d = <$ty as Encode>::descriptor();
                encoder.begin(&d)?;
                encoder.encode_element(&d, 0, &self.$field)?;
                encoder.end(&d)
            }
        }

        impl Decode for $ty {
            fn descriptor() -> Descriptor {
                <$ty as Encode>::descriptor()
            }

            fn decode(decoder: &mut Decoder) -> Result<Self> {
                let d = <$ty as Decode>::descriptor();
                decoder.begin(&d)?;
                let mut $field: Option<$kind> = None;
                while let Some(index) = decoder.next_element(&d)? {
                    match index {
                        0 => $field = Some(decoder.$decode()?),
                        _ => unreachable!(),
                    }
                }
                decoder.end(&d)?;
                Ok($ty {
                    $field: $field.ok_or_else(|| {
                        Error::decoding(concat!("missing field '", stringify!($field), "'"))
                    })?,
                })
            }
        }
    };
}
record!(Cat, "cat", sound: decode_string / String);
record!(Dog, "dog", barks: decode_bool / bool);

impl Encode for Animal {
    fn descriptor() -> Descriptor {
        Descriptor::open("Animal")
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        match self {
            Animal::Cat(cat) => encoder.encode_open(cat),
            Animal::Dog(dog) => encoder.encode_open(dog),
        }
    }
}

impl Decode for Animal {
    fn descriptor() -> Descriptor {
        <Animal as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_open(&<Self as Decode>::descriptor())
    }
}

fn zoo() -> Bson {
    let registry = RegistryBuilder::new()
        .variant::<Animal, Cat>(Animal::Cat)
        .unwrap()
        .variant::<Animal, Dog>(Animal::Dog)
        .unwrap()
        .build();
    Bson::with_registry(BsonConfiguration::default(), registry)
}

#[test]
fn enum_encodes_as_variant_name() {
    let bson = Bson::default();
    assert_eq!(
        bson.to_value(&HttpError::NotFound).unwrap(),
        Value::String("NOT_FOUND".to_owned())
    );
    let bytes = bson.dump(&HttpError::InternalServerError).unwrap();
    assert_eq!(
        bson.load::<HttpError>(&bytes).unwrap(),
        HttpError::InternalServerError
    );
}

#[test]
fn unknown_enum_variant() {
    let bson = Bson::default();
    let err = bson
        .from_value::<HttpError>(&Value::String("IM_A_TEAPOT".to_owned()))
        .unwrap_err();
    assert!(err.to_string().contains("not a valid variant"));
    assert!(err.to_string().contains("HttpError"));
}

#[test]
fn discriminator_is_injected_first() {
    let bson = zoo();
    let value = bson
        .to_value(&Animal::Cat(Cat { sound: "meow".to_owned() }))
        .unwrap();
    let doc = value.as_document().unwrap();
    assert_eq!(doc.get_index(0), Some(("type", &Value::String("cat".to_owned()))));
    assert_eq!(doc.get("sound"), Some(&Value::String("meow".to_owned())));
}

#[test]
fn polymorphic_round_trip() {
    let bson = zoo();
    for animal in [
        Animal::Cat(Cat { sound: "meow".to_owned() }),
        Animal::Dog(Dog { barks: true }),
    ] {
        let value = bson.to_value(&animal).unwrap();
        assert_eq!(bson.from_value::<Animal>(&value).unwrap(), animal);
        let bytes = bson.dump(&animal).unwrap();
        assert_eq!(bson.load::<Animal>(&bytes).unwrap(), animal);
    }
}

#[test]
fn missing_discriminator() {
    let bson = zoo();
    let mut doc = Document::new();
    doc.insert("sound", Value::String("meow".to_owned()));
    let err = bson.from_value::<Animal>(&Value::Document(doc)).unwrap_err();
    assert!(err.to_string().contains("class discriminator is missing"));
}

#[test]
fn unknown_discriminator() {
    let bson = zoo();
    let mut doc = Document::new();
    doc.insert("type", Value::String("axolotl".to_owned()));
    let err = bson.from_value::<Animal>(&Value::Document(doc)).unwrap_err();
    assert!(err.to_string().contains("axolotl"));
}

#[test]
fn encode_falls_back_to_serial_name_without_registry() {
    // A closed union still encodes without registrations; only decode
    // needs the registry.
    let bson = Bson::default();
    let value = bson
        .to_value(&Animal::Dog(Dog { barks: false }))
        .unwrap();
    assert_eq!(
        value.as_document().unwrap().get("type"),
        Some(&Value::String("dog".to_owned()))
    );
    assert!(bson.from_value::<Animal>(&value).is_err());
}

#[test]
fn discriminator_conflict() {
    #[derive(Clone, Debug, PartialEq)]
    struct Sneaky {
        name: String,
    }

    impl Encode for Sneaky {
        fn descriptor() -> Descriptor {
            // Claims a field with the reserved discriminator name.
            Descriptor::structure("sneaky", &["type"])
        }

        fn encode(&self, encoder: &mut Encoder) -> Result<()> {
            let d = Self::descriptor();
            encoder.begin(&d)?;
            encoder.encode_element(&d, 0, &self.name)?;
            encoder.end(&d)
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Shady {
        Sneaky(Sneaky),
    }

    impl Encode for Shady {
        fn descriptor() -> Descriptor {
            Descriptor::open("Shady")
        }

        fn encode(&self, encoder: &mut Encoder) -> Result<()> {
            match self {
                Shady::Sneaky(inner) => encoder.encode_open(inner),
            }
        }
    }

    let bson = Bson::default();
    let err = bson
        .to_value(&Shady::Sneaky(Sneaky { name: "x".to_owned() }))
        .unwrap_err();
    assert!(err.to_string().contains("class discriminator 'type' conflict"));
    assert!(err.to_string().contains("sneaky"));
}

#[test]
fn custom_discriminator_field() {
    let registry = RegistryBuilder::new()
        .variant::<Animal, Cat>(Animal::Cat)
        .unwrap()
        .variant::<Animal, Dog>(Animal::Dog)
        .unwrap()
        .build();
    let bson = Bson::with_registry(
        BsonConfiguration {
            class_discriminator: "kind".to_owned(),
            ..BsonConfiguration::default()
        },
        registry,
    );
    let animal = Animal::Cat(Cat { sound: "mrrp".to_owned() });
    let value = bson.to_value(&animal).unwrap();
    assert!(value.as_document().unwrap().contains_key("kind"));
    assert_eq!(bson.from_value::<Animal>(&value).unwrap(), animal);
}

#[test]
fn contextual_wire_name_override() {
    let registry = RegistryBuilder::new()
        .variant_named::<Animal, Cat>("kitty", Animal::Cat)
        .unwrap()
        .variant::<Animal, Dog>(Animal::Dog)
        .unwrap()
        .build();
    let bson = Bson::with_registry(BsonConfiguration::default(), registry);
    let animal = Animal::Cat(Cat { sound: "meow".to_owned() });
    let value = bson.to_value(&animal).unwrap();
    assert_eq!(
        value.as_document().unwrap().get("type"),
        Some(&Value::String("kitty".to_owned()))
    );
    assert_eq!(bson.from_value::<Animal>(&value).unwrap(), animal);
}

#[test]
fn conflicting_registrations_fail_at_build_time() {
    let err = RegistryBuilder::new()
        .variant::<Animal, Cat>(Animal::Cat)
        .unwrap()
        .variant::<Animal, Cat>(Animal::Cat)
        .unwrap_err();
    assert!(err.to_string().contains("conflicting registration"));

    let err = RegistryBuilder::new()
        .variant::<Animal, Cat>(Animal::Cat)
        .unwrap()
        .variant_named::<Animal, Cat>("kitty", Animal::Cat)
        .unwrap_err();
    assert!(err.to_string().contains("already registered"));
}

#[test]
fn polymorphic_field_inside_record() {
    #[derive(Clone, Debug, PartialEq)]
    struct Owner {
        pet: Animal,
    }

    impl Encode for Owner {
        fn descriptor() -> Descriptor {
            Descriptor::structure("Owner", &["pet"])
        }

        fn encode(&self, encoder: &mut Encoder) -> Result<()> {
            let d = <Owner as Encode>::descriptor();
            encoder.begin(&d)?;
            encoder.encode_element(&d, 0, &self.pet)?;
            encoder.end(&d)
        }
    }

    impl Decode for Owner {
        fn descriptor() -> Descriptor {
            <Owner as Encode>::descriptor()
        }

        fn decode(decoder: &mut Decoder) -> Result<Self> {
            let d = <Owner as Decode>::descriptor();
            decoder.begin(&d)?;
            let mut pet = None;
            while let Some(index) = decoder.next_element(&d)? {
                match index {
                    0 => pet = Some(Animal::decode(decoder)?),
                    _ => unreachable!(),
                }
            }
            decoder.end(&d)?;
            Ok(Owner {
                pet: pet.ok_or_else(|| Error::decoding("missing field 'pet'"))?,
            })
        }
    }

    let bson = zoo();
    let owner = Owner {
        pet: Animal::Dog(Dog { barks: true }),
    };
    let bytes = bson.dump(&owner).unwrap();
    assert_eq!(bson.load::<Owner>(&bytes).unwrap(), owner);
}
