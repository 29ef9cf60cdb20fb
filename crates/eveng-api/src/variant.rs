// Variant-typed field decoding
//
// The platform is inconsistent about scalar types: the same logical field
// may come back as `true`, `1`, `"1"`, or be missing depending on which
// endpoint produced it (single-item read vs. list read). Each ambiguous
// field goes through exactly one of these tagged unions right at the
// envelope boundary, so nothing past this module ever sees raw JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

// ── Boolean-like ────────────────────────────────────────────────────

/// A flag that may arrive as a boolean, a number, or a numeral string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BoolLike {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl BoolLike {
    /// Non-zero numbers and `"1"`, `"true"`, `"yes"`, `"on"`, `"enabled"`
    /// are true.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true")
                    || s.eq_ignore_ascii_case("yes")
                    || s.eq_ignore_ascii_case("on")
                    || s.eq_ignore_ascii_case("enabled")
                    || s.parse::<f64>().is_ok_and(|n| n != 0.0)
            }
        }
    }
}

/// Canonical boolean for an optional flag; absent means `false`.
pub fn canonical_bool(value: Option<&BoolLike>) -> bool {
    value.is_some_and(BoolLike::truthy)
}

// ── Integer-like ────────────────────────────────────────────────────

/// A number that may arrive natively or as a numeral string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IntLike {
    Int(i64),
    Float(f64),
    Text(String),
}

impl IntLike {
    /// `None` when a string does not hold a numeral.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            Self::Float(_) => None,
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| Self::Float(s.parse().ok()?).to_i64())
            }
        }
    }
}

/// Canonical integer for an optional numeric field.
pub fn canonical_int(value: Option<&IntLike>) -> Option<i64> {
    value.and_then(IntLike::to_i64)
}

// ── Text-like ───────────────────────────────────────────────────────

/// A string field that some endpoints send as a bare number
/// (lab `version`, network `visibility`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextLike {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl TextLike {
    /// Numbers render without a fractional part when they have none.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => if b { "1" } else { "0" }.to_owned(),
        }
    }
}

// ── Id or list of ids ───────────────────────────────────────────────

/// Create endpoints may answer with `{"id": 3}` or `{"id": [3]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdOrList {
    One(IntLike),
    Many(Vec<IntLike>),
}

impl IdOrList {
    /// The single id, or the first element of a list.
    pub fn first(&self) -> Option<i64> {
        match self {
            Self::One(id) => id.to_i64(),
            Self::Many(ids) => ids.first().and_then(IntLike::to_i64),
        }
    }
}

// ── Keyed collections ───────────────────────────────────────────────

/// A collection the platform sends either as an object keyed by id
/// (`{"1": {...}, "2": {...}}`) or as an array. Arrays are keyed by
/// position, and an empty array (PHP's empty map) becomes an empty map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyed<T>(BTreeMap<String, T>);

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T> Keyed<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.get(key)
    }

    /// Look up by numeric id.
    pub fn by_id(&self, id: u32) -> Option<&T> {
        self.0.get(&id.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.values()
    }

    pub fn into_inner(self) -> BTreeMap<String, T> {
        self.0
    }
}

impl<T> FromIterator<(String, T)> for Keyed<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Keyed<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyedVisitor<T>(std::marker::PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for KeyedVisitor<T> {
            type Value = Keyed<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by id, an array, or null")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = BTreeMap::new();
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    out.insert(key, value);
                }
                Ok(Keyed(out))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut out = BTreeMap::new();
                let mut index = 0usize;
                while let Some(value) = seq.next_element::<T>()? {
                    out.insert(index.to_string(), value);
                    index += 1;
                }
                Ok(Keyed(out))
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Keyed::default())
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Keyed::default())
            }
        }

        deserializer.deserialize_any(KeyedVisitor(std::marker::PhantomData))
    }
}

// ── `deserialize_with` adapters ─────────────────────────────────────

/// Field adapters for `#[serde(default, deserialize_with = "...")]`.
pub mod de {
    use serde::{Deserialize, Deserializer};

    use super::{BoolLike, IdOrList, IntLike, TextLike, canonical_bool};

    /// Boolean-like field; `null` is `false`.
    pub fn bool_like<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(canonical_bool(Option::<BoolLike>::deserialize(d)?.as_ref()))
    }

    /// Integer-like field; `null` is `0`, a non-numeral string is an error.
    pub fn int_like<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(opt_int_like(d)?.unwrap_or_default())
    }

    /// Optional integer-like field.
    pub fn opt_int_like<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        match Option::<IntLike>::deserialize(d)? {
            None => Ok(None),
            Some(v) => v.to_i64().map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("expected an integer, got {v:?}"))
            }),
        }
    }

    /// Text-like field; `null` is the empty string.
    pub fn text_like<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(opt_text_like(d)?.unwrap_or_default())
    }

    /// Optional text-like field.
    pub fn opt_text_like<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<TextLike>::deserialize(d)?.map(TextLike::into_text))
    }

    /// Id that may be wrapped in a list.
    pub fn id_or_first<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(Option::<IdOrList>::deserialize(d)?.and_then(|v| v.first()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bool_of(v: serde_json::Value) -> bool {
        serde_json::from_value::<BoolLike>(v).unwrap().truthy()
    }

    #[test]
    fn bool_like_canonicalization() {
        assert!(bool_of(json!(true)));
        assert!(bool_of(json!(1)));
        assert!(bool_of(json!(1.0)));
        assert!(!canonical_bool(None));
    }

    #[test]
    fn bool_like_falsy_values() {
        assert!(!bool_of(json!(false)));
        assert!(!bool_of(json!(0)));
        assert!(!bool_of(json!(0.0)));
        assert!(!bool_of(json!("0")));
        assert!(!bool_of(json!("")));
        assert!(bool_of(json!("1")));
        assert!(bool_of(json!("True")));
    }

    #[test]
    fn int_like_accepts_numeral_strings() {
        let a: IntLike = serde_json::from_value(json!("1")).unwrap();
        let b: IntLike = serde_json::from_value(json!(1)).unwrap();
        assert_eq!(a.to_i64(), Some(1));
        assert_eq!(b.to_i64(), Some(1));
        assert_eq!(canonical_int(Some(&IntLike::Float(3.0))), Some(3));
        assert_eq!(canonical_int(Some(&IntLike::Text("abc".into()))), None);
    }

    #[test]
    fn text_like_renders_numbers_without_fraction() {
        let v: TextLike = serde_json::from_value(json!(2.0)).unwrap();
        assert_eq!(v.into_text(), "2");
        let v: TextLike = serde_json::from_value(json!(0)).unwrap();
        assert_eq!(v.into_text(), "0");
        let v: TextLike = serde_json::from_value(json!("1")).unwrap();
        assert_eq!(v.into_text(), "1");
    }

    #[test]
    fn id_or_list_takes_first() {
        let v: IdOrList = serde_json::from_value(json!([7, 8])).unwrap();
        assert_eq!(v.first(), Some(7));
        let v: IdOrList = serde_json::from_value(json!(4)).unwrap();
        assert_eq!(v.first(), Some(4));
        let v: IdOrList = serde_json::from_value(json!([])).unwrap();
        assert_eq!(v.first(), None);
    }

    #[test]
    fn keyed_accepts_object_array_and_null() {
        let map: Keyed<i64> = serde_json::from_value(json!({"1": 10, "3": 30})).unwrap();
        assert_eq!(map.by_id(3), Some(&30));
        assert_eq!(map.len(), 2);

        let arr: Keyed<i64> = serde_json::from_value(json!([10, 20])).unwrap();
        assert_eq!(arr.get("1"), Some(&20));

        let empty: Keyed<i64> = serde_json::from_value(json!([])).unwrap();
        assert!(empty.is_empty());

        let null: Keyed<i64> = serde_json::from_value(json!(null)).unwrap();
        assert!(null.is_empty());
    }

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "de::bool_like")]
        lock: bool,
        #[serde(default, deserialize_with = "de::text_like")]
        version: String,
        #[serde(default, deserialize_with = "de::int_like")]
        top: i64,
    }

    #[test]
    fn adapters_apply_defaults_for_missing_and_null() {
        let s: Sample = serde_json::from_value(json!({"version": 3, "top": "42"})).unwrap();
        assert!(!s.lock);
        assert_eq!(s.version, "3");
        assert_eq!(s.top, 42);

        let s: Sample = serde_json::from_value(json!({"lock": null, "version": null})).unwrap();
        assert!(!s.lock);
        assert_eq!(s.version, "");
        assert_eq!(s.top, 0);
    }

    #[test]
    fn int_adapter_rejects_garbage() {
        let r = serde_json::from_value::<Sample>(json!({"top": "left"}));
        assert!(r.is_err());
    }
}
