use std::collections::BTreeMap;

use dict_serializer::{
    DeserializeContext, DeserializeError, DictEntity, DictHooks, FieldInfo, FieldMap,
    SerializeContext, SerializeError, Value, export, field_map, import,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, DictEntity)]
struct Tmp {
    param1: String,
    param2: i32,
}

#[derive(Debug, Clone, PartialEq, DictEntity)]
#[dict(hooks)]
struct TmpHooked {
    param1: Option<String>,
    param2: i64,
}

impl DictHooks for TmpHooked {
    fn pre_serialization(&self, mut mapping: FieldMap) -> FieldMap {
        mapping.insert("added", -1);
        mapping
    }

    fn pre_deserialization(mut mapping: FieldMap) -> FieldMap {
        if let Some(v) = mapping.get_mut("param2") {
            if let Some(n) = v.as_i64() {
                *v = Value::I64(n * 10);
            }
        }
        mapping
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Tier {
    Free,
    Paid { seats: u32 },
}

#[derive(Debug, Clone, PartialEq, DictEntity)]
struct Address {
    city: String,
    zip: u32,
}

#[derive(Debug, Clone, PartialEq, DictEntity)]
#[dict(name = "Person")]
struct PersonRecord {
    name: String,
    age: u8,
    active: bool,
    score: f64,
    tags: Vec<String>,
    limits: BTreeMap<String, u32>,
    tier: Tier,
    nickname: Option<String>,
    #[dict(nested)]
    home: Address,
    #[dict(nested)]
    work: Option<Address>,
    #[dict(nested)]
    previous: Vec<Address>,
}

#[derive(Debug, Default, PartialEq, DictEntity)]
#[dict(hooks)]
struct Session {
    user: String,
    _token: String,
    #[dict(skip)]
    cache: Vec<u8>,
}

impl DictHooks for Session {
    fn pre_serialization(&self, mut mapping: FieldMap) -> FieldMap {
        mapping.insert("_leak", self._token.clone());
        mapping.insert("", "empty");
        mapping
    }
}

#[derive(Debug, PartialEq, DictEntity)]
struct Profile {
    #[dict(rename = "displayName")]
    display_name: String,
    #[dict(default)]
    bio: String,
    #[dict(default)]
    followers: Option<u32>,
    extra: Value,
}

#[derive(Debug, PartialEq, DictEntity)]
struct Marker;

#[derive(Debug, PartialEq, DictEntity)]
struct Labeled<T: Serialize + DeserializeOwned> {
    label: String,
    value: T,
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn export_plain_entity() {
    let tmp = Tmp {
        param1: "test".into(),
        param2: 1,
    };
    let got = tmp.to_mapping().unwrap();
    assert_eq!(got, field_map! { "param1" => "test", "param2" => 1 });
}

#[test]
fn import_plain_entity() {
    let tmp = Tmp::from_mapping(field_map! { "param1" => "test2", "param2" => 2 }).unwrap();
    assert_eq!(tmp.param1, "test2");
    assert_eq!(tmp.param2, 2);
}

#[test]
fn pre_serialization_adds_key() {
    let tmp = TmpHooked {
        param1: Some("test".into()),
        param2: 1,
    };
    let got = tmp.to_mapping().unwrap();
    assert_eq!(got.get("added"), Some(&Value::I64(-1)));
    assert_eq!(got.get("param2"), Some(&Value::I64(1)));
}

#[test]
fn pre_deserialization_rewrites_value() {
    let tmp =
        TmpHooked::from_mapping(field_map! { "param1" => Value::Null, "param2" => 1 }).unwrap();
    assert_eq!(tmp.param1, None);
    assert_eq!(tmp.param2, 10);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn sample_person() -> PersonRecord {
    PersonRecord {
        name: "Ada".into(),
        age: 36,
        active: true,
        score: 97.5,
        tags: vec!["math".into(), "engines".into()],
        limits: BTreeMap::from([("cpu".to_string(), 4), ("ram".to_string(), 16)]),
        tier: Tier::Paid { seats: 3 },
        nickname: None,
        home: Address {
            city: "London".into(),
            zip: 1815,
        },
        work: None,
        previous: vec![
            Address {
                city: "Paris".into(),
                zip: 75,
            },
            Address {
                city: "Turin".into(),
                zip: 10,
            },
        ],
    }
}

#[test]
fn round_trip_preserves_fields() {
    let person = sample_person();
    let restored: PersonRecord = import(export(&person).unwrap()).unwrap();
    assert_eq!(restored, person);

    let tmp = Tmp {
        param1: "x".into(),
        param2: -7,
    };
    assert_eq!(Tmp::from_mapping(tmp.to_mapping().unwrap()).unwrap(), tmp);
}

#[test]
fn nested_entities_become_maps() {
    let mapping = sample_person().to_mapping().unwrap();
    assert_eq!(
        mapping.get("home"),
        Some(&Value::Map(field_map! { "city" => "London", "zip" => 1815u32 }))
    );
    assert_eq!(mapping.get("work"), Some(&Value::Null));
    assert_eq!(mapping.get("previous").and_then(Value::as_list).map(<[_]>::len), Some(2));
    assert_eq!(
        mapping.keys().collect::<Vec<_>>(),
        vec![
            "name", "age", "active", "score", "tags", "limits", "tier", "nickname", "home",
            "work", "previous"
        ]
    );
}

#[test]
fn hooks_run_around_the_raw_mapping() {
    #[derive(DictEntity)]
    #[dict(hooks)]
    struct Audited {
        a: u8,
        b: u8,
    }

    impl DictHooks for Audited {
        fn pre_serialization(&self, mut mapping: FieldMap) -> FieldMap {
            // Runs after the fields are in place.
            let seen = mapping.len() as u64;
            mapping.insert("seen", seen);
            mapping
        }

        fn pre_deserialization(mut mapping: FieldMap) -> FieldMap {
            // Runs before construction, so legacy keys can be migrated.
            mapping.rename("legacy_a", "a");
            mapping.remove("seen");
            mapping
        }
    }

    let exported = Audited { a: 1, b: 2 }.to_mapping().unwrap();
    assert_eq!(exported.get("seen"), Some(&Value::U64(2)));

    let migrated = Audited::from_mapping(field_map! { "legacy_a" => 5u8, "b" => 6u8 }).unwrap();
    assert_eq!((migrated.a, migrated.b), (5, 6));

    let again = Audited::from_mapping(exported).unwrap();
    assert_eq!((again.a, again.b), (1, 2));
}

#[test]
fn default_hooks_are_identity() {
    let mapping = field_map! { "param1" => "p", "param2" => 3 };
    let tmp = Tmp {
        param1: "p".into(),
        param2: 3,
    };
    assert_eq!(tmp.pre_serialization(mapping.clone()), mapping);
    assert_eq!(<Tmp as DictHooks>::pre_deserialization(mapping.clone()), mapping);
    assert_eq!(tmp.to_mapping().unwrap(), mapping);
}

#[test]
fn type_level_constants_exported_through_hook() {
    #[derive(Debug, PartialEq, DictEntity)]
    #[dict(hooks)]
    struct Sprite {
        name: String,
    }

    impl Sprite {
        const SCALE: i64 = 10;
    }

    impl DictHooks for Sprite {
        fn pre_serialization(&self, mut mapping: FieldMap) -> FieldMap {
            mapping.insert("scale", Self::SCALE);
            mapping
        }

        fn pre_deserialization(mut mapping: FieldMap) -> FieldMap {
            mapping.remove("scale");
            mapping
        }
    }

    let sprite = Sprite {
        name: "hero".into(),
    };
    let mapping = sprite.to_mapping().unwrap();
    assert_eq!(mapping, field_map! { "name" => "hero", "scale" => 10 });
    assert_eq!(Sprite::FIELDS.len(), 1);
    assert_eq!(Sprite::from_mapping(mapping).unwrap(), sprite);
}

#[test]
fn reserved_fields_never_exported() {
    let session = Session {
        user: "root".into(),
        _token: "s3cr3t".into(),
        cache: vec![1, 2, 3],
    };
    let mapping = session.to_mapping().unwrap();
    assert_eq!(mapping, field_map! { "user" => "root" });
}

#[test]
fn reserved_fields_default_on_import() {
    let session = Session::from_mapping(field_map! { "user" => "guest" }).unwrap();
    assert_eq!(
        session,
        Session {
            user: "guest".into(),
            ..Default::default()
        }
    );

    let err = Session::from_mapping(field_map! { "user" => "guest", "_token" => "x" }).unwrap_err();
    assert!(matches!(
        err,
        DeserializeError::UnexpectedField { field, .. } if field == "_token"
    ));
}

#[test]
fn rename_default_and_raw_value_fields() {
    let profile = Profile::from_mapping(field_map! {
        "displayName" => "ada",
        "extra" => vec![1, 2],
    })
    .unwrap();
    assert_eq!(profile.display_name, "ada");
    assert_eq!(profile.bio, "");
    assert_eq!(profile.followers, None);
    assert_eq!(profile.extra, Value::List(vec![Value::I64(1), Value::I64(2)]));

    let mapping = profile.to_mapping().unwrap();
    assert!(mapping.contains_key("displayName"));
    assert!(!mapping.contains_key("display_name"));
    assert_eq!(mapping.get("followers"), Some(&Value::Null));
}

#[test]
fn field_infos_describe_exports() {
    assert_eq!(
        Profile::FIELDS.iter().map(|f| f.key).collect::<Vec<_>>(),
        vec!["displayName", "bio", "followers", "extra"]
    );
    let followers: &FieldInfo = &Profile::FIELDS[2];
    assert_eq!(followers.ident, "followers");
    assert!(!followers.required);
    assert!(Profile::FIELDS[0].required);
    assert_eq!(Session::FIELDS.len(), 1);
    assert_eq!(PersonRecord::NAME, "Person");
    assert_eq!(Tmp::NAME, "Tmp");
}

#[test]
fn unit_entity_exports_empty_mapping() {
    assert!(Marker.to_mapping().unwrap().is_empty());
    assert_eq!(Marker::from_mapping(FieldMap::new()).unwrap(), Marker);
    assert!(Marker::from_mapping(field_map! { "x" => 1 }).is_err());
}

#[test]
fn generic_entity() {
    let labeled = Labeled {
        label: "answer".into(),
        value: vec![4u8, 2],
    };
    let mapping = labeled.to_mapping().unwrap();
    let back: Labeled<Vec<u8>> = Labeled::from_mapping(mapping).unwrap();
    assert_eq!(back, labeled);
}

// ---------------------------------------------------------------------------
// Construction mismatches
// ---------------------------------------------------------------------------

#[test]
fn missing_field_fails() {
    let err = Tmp::from_mapping(field_map! { "param1" => "only" }).unwrap_err();
    assert!(matches!(
        err,
        DeserializeError::MissingField { field, entity } if field == "param2" && entity == "Tmp"
    ));
}

#[test]
fn extra_field_fails() {
    let hooked = TmpHooked {
        param1: None,
        param2: 1,
    };
    // The export hook adds a key the constructor does not take.
    let err = TmpHooked::from_mapping(hooked.to_mapping().unwrap()).unwrap_err();
    assert!(matches!(
        err,
        DeserializeError::UnexpectedField { field, .. } if field == "added"
    ));
}

#[test]
fn mistyped_field_fails() {
    let err = Tmp::from_mapping(field_map! { "param1" => "x", "param2" => "two" }).unwrap_err();
    assert!(matches!(
        err,
        DeserializeError::InvalidField { field, .. } if field == "param2"
    ));
}

#[test]
fn numeric_strings_are_not_coerced() {
    #[derive(Debug, DictEntity)]
    struct Toggle {
        level: i32,
        enabled: bool,
    }

    let err = Tmp::from_mapping(field_map! { "param1" => "x", "param2" => "7" }).unwrap_err();
    assert!(matches!(
        err,
        DeserializeError::InvalidField { field, .. } if field == "param2"
    ));

    let err = Toggle::from_mapping(field_map! { "level" => 3, "enabled" => "true" }).unwrap_err();
    assert!(matches!(
        err,
        DeserializeError::InvalidField { field, .. } if field == "enabled"
    ));
}

#[test]
fn out_of_range_float_fails() {
    #[derive(Debug, DictEntity)]
    struct Gain {
        factor: f32,
    }

    let err = Gain::from_mapping(field_map! { "factor" => 1e300f64 }).unwrap_err();
    assert!(matches!(
        err,
        DeserializeError::InvalidField { field, .. } if field == "factor"
    ));
    let gain = Gain::from_mapping(field_map! { "factor" => 0.25f64 }).unwrap();
    assert_eq!(gain.factor, 0.25);
}

#[test]
fn nested_failure_carries_path() {
    let mut mapping = sample_person().to_mapping().unwrap();
    if let Some(home) = mapping.get_mut("home").and_then(Value::as_map_mut) {
        home.remove("zip");
    }
    let err = PersonRecord::from_mapping(mapping).unwrap_err();
    assert!(err.to_string().starts_with("in field 'home': missing field 'zip'"));
    assert!(matches!(
        err.root_cause(),
        DeserializeError::MissingField { entity, .. } if entity == "Address"
    ));
}

#[test]
fn nested_wrong_shape_fails() {
    let mut mapping = sample_person().to_mapping().unwrap();
    mapping.insert("previous", "nowhere");
    let err = PersonRecord::from_mapping(mapping).unwrap_err();
    assert!(matches!(
        err,
        DeserializeError::TypeMismatch { field, entity, .. }
            if field == "previous" && entity == "Person"
    ));
}

#[test]
fn unrepresentable_field_fails_export() {
    #[derive(DictEntity)]
    struct Grid {
        cells: BTreeMap<(u8, u8), bool>,
    }

    let grid = Grid {
        cells: BTreeMap::from([((0, 0), true)]),
    };
    assert!(matches!(
        grid.to_mapping(),
        Err(SerializeError::FieldError { field, .. }) if field == "cells"
    ));
}

// ---------------------------------------------------------------------------
// Manual implementation through a constructor
// ---------------------------------------------------------------------------

struct Temperature {
    kelvin: f64,
}

impl Temperature {
    fn from_celsius(celsius: f64) -> Self {
        Self {
            kelvin: celsius + 273.15,
        }
    }

    fn celsius(&self) -> f64 {
        self.kelvin - 273.15
    }
}

impl DictHooks for Temperature {}

impl DictEntity for Temperature {
    const NAME: &'static str = "Temperature";
    const FIELDS: &'static [FieldInfo] = &[FieldInfo {
        key: "celsius",
        ident: "kelvin",
        type_name: "f64",
        required: true,
    }];

    fn serialize_fields(&self, ctx: &mut SerializeContext) -> Result<(), SerializeError> {
        ctx.write_serde("celsius", &self.celsius())
    }

    fn deserialize_fields(ctx: &mut DeserializeContext) -> Result<Self, DeserializeError> {
        Ok(Self::from_celsius(ctx.read_serde("celsius")?))
    }
}

#[test]
fn manual_entity_goes_through_constructor() {
    let t = Temperature::from_mapping(field_map! { "celsius" => 20.0f64 }).unwrap();
    assert!((t.kelvin - 293.15).abs() < 1e-9);
    let back = t.to_mapping().unwrap();
    let celsius = back.get("celsius").and_then(Value::as_f64).unwrap();
    assert!((celsius - 20.0).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn distinct_instances_across_threads() {
    let entities: Vec<Tmp> = (0..8)
        .map(|i| Tmp {
            param1: format!("t{i}"),
            param2: i,
        })
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = entities
            .iter()
            .map(|e| scope.spawn(move || Tmp::from_mapping(e.to_mapping().unwrap()).unwrap()))
            .collect();
        for (handle, original) in handles.into_iter().zip(&entities) {
            assert_eq!(&handle.join().unwrap(), original);
        }
    });
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

#[cfg(feature = "serialize-ron")]
#[test]
fn ron_entity_round_trip() {
    use dict_serializer::{Format, decode_entity, encode_entity};

    let person = sample_person();
    let bytes = encode_entity(&person, Format::Ron).unwrap();
    let back: PersonRecord = decode_entity(&bytes, Format::Ron).unwrap();
    assert_eq!(back, person);
}

#[cfg(feature = "serialize-ron")]
#[test]
fn ron_decode_applies_hooks() {
    use dict_serializer::{Format, decode_entity, encode};

    let bytes = encode(&field_map! { "param1" => "x", "param2" => 4 }, Format::Ron).unwrap();
    let hooked: TmpHooked = decode_entity(&bytes, Format::Ron).unwrap();
    assert_eq!(hooked.param2, 40);
}
